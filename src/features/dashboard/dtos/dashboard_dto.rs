use rust_decimal::Decimal;
use serde::Serialize;

use crate::features::files::dtos::FileResponseDto;

/// Quota overview shown after login
#[derive(Debug, Default, Serialize)]
pub struct DashboardDto {
    pub user_name: String,
    pub role: String,
    pub storage_used_mb: Decimal,
    pub storage_limit_mb: Decimal,
    pub usage_percent: f64,
    pub total_files: i64,
    pub total_folders: i64,
    pub recent_files: Vec<FileResponseDto>,
    pub error: Option<String>,
}

impl DashboardDto {
    /// Empty dashboard carrying only an error banner
    pub fn failed(message: String) -> Self {
        Self {
            error: Some(message),
            ..Default::default()
        }
    }
}

/// Landing page for anonymous visitors
#[derive(Debug, Serialize)]
pub struct HomeViewDto {
    pub default_quota_mb: i64,
}
