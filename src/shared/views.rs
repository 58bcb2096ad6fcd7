//! HTML views rendered with minijinja.
//!
//! Templates live in `templates/views/` and are embedded at compile time.
//! Names ending in `.html` get HTML auto-escaping.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;
use std::sync::OnceLock;

use crate::core::error::{AppError, Result};

static VIEW_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const VIEWS: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/views/layout.html")),
    ("home.html", include_str!("../../templates/views/home.html")),
    ("login.html", include_str!("../../templates/views/login.html")),
    ("register.html", include_str!("../../templates/views/register.html")),
    ("manager.html", include_str!("../../templates/views/manager.html")),
    ("dashboard.html", include_str!("../../templates/views/dashboard.html")),
];

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in VIEWS {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load view {}: {}", name, e);
        } else {
            tracing::debug!("Loaded view: {}", name);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    VIEW_ENV.get_or_init(init_environment)
}

/// Render the view `name` with `ctx`
pub fn render_view<S: Serialize>(name: &str, ctx: S) -> Result<Html<String>> {
    let template = get_environment()
        .get_template(name)
        .map_err(|_| AppError::Internal(format!("View '{}' not found", name)))?;

    template
        .render(ctx)
        .map(Html)
        .map_err(|e| AppError::Internal(format!("Failed to render view '{}': {}", name, e)))
}
