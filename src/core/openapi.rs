use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::shared::constants::SESSION_COOKIE;
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Files
        files_handlers::upload_file,
        files_handlers::delete_file,
        files_handlers::search_files,
        files_handlers::download_file,
        // Folders
        files_handlers::create_folder,
        files_handlers::delete_folder,
        files_handlers::rename_item,
    ),
    components(
        schemas(
            files_dtos::UploadFileDto,
            files_dtos::DeleteFileRequest,
            files_dtos::RenameRequest,
            files_dtos::CreateFolderRequest,
            files_dtos::DeleteFolderRequest,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
            ApiResponse<files_dtos::FolderResponseDto>,
            ApiResponse<files_dtos::DeleteFolderSummaryDto>,
        )
    ),
    tags(
        (name = "files", description = "File upload, search, download and deletion"),
        (name = "folders", description = "Folder management and renaming"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Cloud Drive API",
        version = "0.1.0",
        description = "JSON endpoints behind the Cloud Drive file manager",
    )
)]
pub struct ApiDoc;

/// Adds the session cookie and Bearer JWT security schemes to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_file_endpoints() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/File/Upload",
            "/File/Delete",
            "/File/Search",
            "/File/Download",
            "/File/CreateFolder",
            "/File/DeleteFolder",
            "/File/Rename",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }

    #[test]
    fn test_swagger_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Drive".to_string(),
            version: "9.9.9".to_string(),
            description: "Docs".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Drive");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("Docs"));
    }
}
