use validator::ValidationErrors;

use crate::core::error::{AppError, Result};
use crate::shared::constants::MAX_ITEM_NAME_LEN;

/// Flatten validator errors into user-facing messages, sorted by field
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect()
}

/// Validate a file or folder name, returning it trimmed.
///
/// `empty_message` is the error used when nothing is left after trimming.
pub fn validate_item_name(raw: &str, empty_message: &str) -> Result<String> {
    let name = raw.trim();

    if name.is_empty() {
        return Err(AppError::BadRequest(empty_message.to_string()));
    }

    if name.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Name must be at most {} characters",
            MAX_ITEM_NAME_LEN
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(AppError::Validation(
            "Name cannot contain '/' or '\\'".to_string(),
        ));
    }

    Ok(name.to_string())
}
