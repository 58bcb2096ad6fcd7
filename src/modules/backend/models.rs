use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Row of the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub storage_used_mb: Decimal,
    pub storage_limit_mb: Decimal,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Share of the quota in use, in percent with one decimal, capped at 100
    pub fn usage_percent(&self) -> f64 {
        if self.storage_limit_mb <= Decimal::ZERO {
            return 0.0;
        }

        let percent = (self.storage_used_mb / self.storage_limit_mb * Decimal::ONE_HUNDRED)
            .round_dp(1)
            .min(Decimal::ONE_HUNDRED)
            .max(Decimal::ZERO);

        percent.to_f64().unwrap_or(0.0)
    }
}

/// Row of the `files` table
#[derive(Debug, Clone, FromRow)]
pub struct FileRow {
    pub id: i64,
    pub user_id: String,
    pub file_name: String,
    pub file_path: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_on: DateTime<Utc>,
    pub folder_id: Option<i64>,
    pub version: i32,
    pub is_deleted: bool,
    pub storage_url: String,
}

impl FileRow {
    pub fn size_mb(&self) -> Decimal {
        bytes_to_mb(self.file_size)
    }
}

/// Row of the `folders` table
#[derive(Debug, Clone, FromRow)]
pub struct FolderRow {
    pub id: i64,
    pub user_id: String,
    pub folder_name: String,
    pub parent_folder_id: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub storage_limit_mb: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewFile {
    pub user_id: String,
    pub file_name: String,
    pub file_path: String,
    pub content_type: String,
    pub file_size: i64,
    pub folder_id: Option<i64>,
    pub storage_url: String,
}

#[derive(Debug, Clone)]
pub struct NewFolder {
    pub user_id: String,
    pub folder_name: String,
    pub parent_folder_id: Option<i64>,
}

/// Convert a byte count into (decimal) megabytes
pub fn bytes_to_mb(bytes: i64) -> Decimal {
    Decimal::from(bytes) / Decimal::from(1024) / Decimal::from(1024)
}
