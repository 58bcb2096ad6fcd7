use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;

use super::models::{FileRow, FolderRow, NewFile, NewFolder, NewUser, UserRow};
use super::{FileStore, FolderStore, UserStore};
use crate::core::error::{AppError, Result};

/// PostgreSQL implementation of the metadata stores
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `%term%` with LIKE wildcards in `term` matched literally
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl UserStore for PgBackend {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRow> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, storage_used_mb, storage_limit_mb)
            VALUES ($1, $2, $3, $4, 0, $5)
            RETURNING *
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.storage_limit_mb)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::Conflict("Email already registered".to_string()))
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }
}

#[async_trait]
impl FileStore for PgBackend {
    async fn list(&self, user_id: &str, folder_id: Option<i64>) -> Result<Vec<FileRow>> {
        let files = sqlx::query_as::<_, FileRow>(
            r#"
            SELECT * FROM files
            WHERE user_id = $1 AND folder_id IS NOT DISTINCT FROM $2 AND NOT is_deleted
            ORDER BY file_name
            "#,
        )
        .bind(user_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn find(&self, file_id: i64, user_id: &str) -> Result<Option<FileRow>> {
        let file = sqlx::query_as::<_, FileRow>(
            "SELECT * FROM files WHERE id = $1 AND user_id = $2 AND NOT is_deleted",
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn search(
        &self,
        user_id: &str,
        folder_id: Option<i64>,
        term: &str,
    ) -> Result<Vec<FileRow>> {
        let files = sqlx::query_as::<_, FileRow>(
            r#"
            SELECT * FROM files
            WHERE user_id = $1 AND folder_id IS NOT DISTINCT FROM $2 AND NOT is_deleted
              AND file_name ILIKE $3 ESCAPE '\'
            ORDER BY file_name
            "#,
        )
        .bind(user_id)
        .bind(folder_id)
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn insert_charging_quota(&self, file: NewFile, size_mb: Decimal) -> Result<FileRow> {
        let mut tx = self.pool.begin().await?;

        let charged = sqlx::query(
            r#"
            UPDATE users
            SET storage_used_mb = storage_used_mb + $2
            WHERE id = $1 AND storage_used_mb + $2 <= storage_limit_mb
            "#,
        )
        .bind(&file.user_id)
        .bind(size_mb)
        .execute(&mut *tx)
        .await?;

        if charged.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::StorageLimitExceeded(
                "Storage limit exceeded".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, FileRow>(
            r#"
            INSERT INTO files (user_id, file_name, file_path, content_type, file_size, folder_id, storage_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&file.user_id)
        .bind(&file.file_name)
        .bind(&file.file_path)
        .bind(&file.content_type)
        .bind(file.file_size)
        .bind(file.folder_id)
        .bind(&file.storage_url)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            "File row {} inserted, charged {} MB to user {}",
            row.id, size_mb, row.user_id
        );

        Ok(row)
    }

    async fn soft_delete_releasing_quota(
        &self,
        file_id: i64,
        user_id: &str,
    ) -> Result<Option<FileRow>> {
        let mut tx = self.pool.begin().await?;

        let file = sqlx::query_as::<_, FileRow>(
            r#"
            UPDATE files
            SET is_deleted = TRUE
            WHERE id = $1 AND user_id = $2 AND NOT is_deleted
            RETURNING *
            "#,
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(file) = file else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE users
            SET storage_used_mb = GREATEST(storage_used_mb - $2, 0)
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(file.size_mb())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(file))
    }

    async fn rename(&self, file_id: i64, user_id: &str, name: &str) -> Result<Option<FileRow>> {
        let file = sqlx::query_as::<_, FileRow>(
            r#"
            UPDATE files
            SET file_name = $3
            WHERE id = $1 AND user_id = $2 AND NOT is_deleted
            RETURNING *
            "#,
        )
        .bind(file_id)
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn recent(&self, user_id: &str, limit: i64) -> Result<Vec<FileRow>> {
        let files = sqlx::query_as::<_, FileRow>(
            r#"
            SELECT * FROM files
            WHERE user_id = $1 AND NOT is_deleted
            ORDER BY uploaded_on DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn count(&self, user_id: &str) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM files WHERE user_id = $1 AND NOT is_deleted",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

#[async_trait]
impl FolderStore for PgBackend {
    async fn list(&self, user_id: &str, parent_id: Option<i64>) -> Result<Vec<FolderRow>> {
        let folders = sqlx::query_as::<_, FolderRow>(
            r#"
            SELECT * FROM folders
            WHERE user_id = $1 AND parent_folder_id IS NOT DISTINCT FROM $2 AND NOT is_deleted
            ORDER BY folder_name
            "#,
        )
        .bind(user_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(folders)
    }

    async fn find(&self, folder_id: i64, user_id: &str) -> Result<Option<FolderRow>> {
        let folder = sqlx::query_as::<_, FolderRow>(
            "SELECT * FROM folders WHERE id = $1 AND user_id = $2 AND NOT is_deleted",
        )
        .bind(folder_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(folder)
    }

    async fn insert(&self, folder: NewFolder) -> Result<FolderRow> {
        let row = sqlx::query_as::<_, FolderRow>(
            r#"
            INSERT INTO folders (user_id, folder_name, parent_folder_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&folder.user_id)
        .bind(&folder.folder_name)
        .bind(folder.parent_folder_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn soft_delete_many(&self, folder_ids: &[i64], user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE folders
            SET is_deleted = TRUE
            WHERE user_id = $1 AND id = ANY($2) AND NOT is_deleted
            "#,
        )
        .bind(user_id)
        .bind(folder_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn rename(
        &self,
        folder_id: i64,
        user_id: &str,
        name: &str,
    ) -> Result<Option<FolderRow>> {
        let folder = sqlx::query_as::<_, FolderRow>(
            r#"
            UPDATE folders
            SET folder_name = $3
            WHERE id = $1 AND user_id = $2 AND NOT is_deleted
            RETURNING *
            "#,
        )
        .bind(folder_id)
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(folder)
    }

    async fn count(&self, user_id: &str) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM folders WHERE user_id = $1 AND NOT is_deleted",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
