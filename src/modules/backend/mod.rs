//! Typed access to the metadata tables
//!
//! Every query is scoped by owner id (and parent id where relevant) so the
//! database can answer it from an index. Writes that move quota are paired
//! with the metadata change inside a single transaction.

mod models;
mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::core::error::Result;

pub use models::{bytes_to_mb, FileRow, FolderRow, NewFile, NewFolder, NewUser, UserRow};
pub use postgres::PgBackend;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRow>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>>;

    /// Insert a user; a duplicate email yields `AppError::Conflict`
    async fn insert(&self, user: NewUser) -> Result<UserRow>;
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Non-deleted files of `user_id` directly inside `folder_id` (`None` = root)
    async fn list(&self, user_id: &str, folder_id: Option<i64>) -> Result<Vec<FileRow>>;

    /// Non-deleted file owned by `user_id`
    async fn find(&self, file_id: i64, user_id: &str) -> Result<Option<FileRow>>;

    /// Case-insensitive substring match on file name within one folder level
    async fn search(
        &self,
        user_id: &str,
        folder_id: Option<i64>,
        term: &str,
    ) -> Result<Vec<FileRow>>;

    /// Insert the file row and add `size_mb` to the owner's usage atomically.
    ///
    /// Fails with `AppError::StorageLimitExceeded` (and writes nothing) when
    /// the charge would push usage over the owner's limit.
    async fn insert_charging_quota(&self, file: NewFile, size_mb: Decimal) -> Result<FileRow>;

    /// Soft-delete the file and release its size from the owner's usage
    /// (clamped at zero) atomically. `None` when no such live file exists.
    async fn soft_delete_releasing_quota(
        &self,
        file_id: i64,
        user_id: &str,
    ) -> Result<Option<FileRow>>;

    async fn rename(&self, file_id: i64, user_id: &str, name: &str) -> Result<Option<FileRow>>;

    async fn recent(&self, user_id: &str, limit: i64) -> Result<Vec<FileRow>>;

    async fn count(&self, user_id: &str) -> Result<i64>;
}

#[async_trait]
pub trait FolderStore: Send + Sync {
    /// Non-deleted folders of `user_id` whose parent is `parent_id` (`None` = root)
    async fn list(&self, user_id: &str, parent_id: Option<i64>) -> Result<Vec<FolderRow>>;

    /// Non-deleted folder owned by `user_id`
    async fn find(&self, folder_id: i64, user_id: &str) -> Result<Option<FolderRow>>;

    async fn insert(&self, folder: NewFolder) -> Result<FolderRow>;

    /// Soft-delete the given folders, returns how many rows changed
    async fn soft_delete_many(&self, folder_ids: &[i64], user_id: &str) -> Result<u64>;

    async fn rename(&self, folder_id: i64, user_id: &str, name: &str)
        -> Result<Option<FolderRow>>;

    async fn count(&self, user_id: &str) -> Result<i64>;
}
