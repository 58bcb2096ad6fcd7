//! In-memory stores and service wiring for tests

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::core::config::{AppConfig, SessionConfig, SwaggerConfig};
use crate::core::error::{AppError, Result};
use crate::core::router::{build_router, AppServices};
use crate::features::auth::{AuthService, SessionService};
use crate::features::dashboard::DashboardService;
use crate::features::files::{FileService, FolderService};
use crate::modules::backend::{
    FileRow, FileStore, FolderRow, FolderStore, NewFile, NewFolder, NewUser, UserRow, UserStore,
};
use crate::modules::storage::{BlobStore, StorageClient};
use crate::shared::constants::DEFAULT_STORAGE_LIMIT_MB;

pub const TEST_BUCKET: &str = "cloud-drive-files";

pub fn test_session_config() -> SessionConfig {
    SessionConfig {
        secret: "test-session-secret-at-least-32-bytes!".to_string(),
        ttl: Duration::from_secs(7200),
        cookie_secure: false,
        jwt_leeway: Duration::from_secs(0),
        bcrypt_cost: 4,
    }
}

pub fn test_app_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_allowed_origins: vec!["*".to_string()],
        max_upload_size: 10 * 1024 * 1024,
    }
}

pub fn test_swagger_config() -> SwaggerConfig {
    SwaggerConfig {
        username: None,
        password: None,
        title: "Cloud Drive API".to_string(),
        version: "test".to_string(),
        description: "test".to_string(),
    }
}

pub fn sample_user(id: &str, email: &str) -> UserRow {
    UserRow {
        id: id.to_string(),
        email: email.to_string(),
        password_hash: String::new(),
        full_name: "Test User".to_string(),
        storage_used_mb: Decimal::ZERO,
        storage_limit_mb: Decimal::from(DEFAULT_STORAGE_LIMIT_MB),
        is_admin: false,
        created_at: Utc::now(),
    }
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, UserRow>,
    files: HashMap<i64, FileRow>,
    folders: HashMap<i64, FolderRow>,
    next_id: i64,
    failing_soft_deletes: HashSet<i64>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// `UserStore`, `FileStore` and `FolderStore` over shared maps
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    fail_next_insert: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, email: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let user = sample_user(&id, email);
        self.state.lock().unwrap().users.insert(id.clone(), user);
        id
    }

    pub fn add_folder(&self, user_id: &str, name: &str, parent: Option<i64>) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.folders.insert(
            id,
            FolderRow {
                id,
                user_id: user_id.to_string(),
                folder_name: name.to_string(),
                parent_folder_id: parent,
                created_on: Utc::now(),
                is_deleted: false,
            },
        );
        id
    }

    pub fn remove_user(&self, user_id: &str) {
        self.state.lock().unwrap().users.remove(user_id);
    }

    pub fn user(&self, user_id: &str) -> Option<UserRow> {
        self.state.lock().unwrap().users.get(user_id).cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<UserRow> {
        self.state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    /// File row, deleted or not
    pub fn file(&self, file_id: i64) -> Option<FileRow> {
        self.state.lock().unwrap().files.get(&file_id).cloned()
    }

    /// Folder row, deleted or not
    pub fn folder(&self, folder_id: i64) -> Option<FolderRow> {
        self.state.lock().unwrap().folders.get(&folder_id).cloned()
    }

    pub fn set_limit(&self, user_id: &str, limit_mb: Decimal) {
        if let Some(user) = self.state.lock().unwrap().users.get_mut(user_id) {
            user.storage_limit_mb = limit_mb;
        }
    }

    pub fn set_usage(&self, user_id: &str, used_mb: Decimal) {
        if let Some(user) = self.state.lock().unwrap().users.get_mut(user_id) {
            user.storage_used_mb = used_mb;
        }
    }

    pub fn set_file_path(&self, file_id: i64, path: &str) {
        if let Some(file) = self.state.lock().unwrap().files.get_mut(&file_id) {
            file.file_path = path.to_string();
        }
    }

    pub fn set_folder_parent(&self, folder_id: i64, parent: Option<i64>) {
        if let Some(folder) = self.state.lock().unwrap().folders.get_mut(&folder_id) {
            folder.parent_folder_id = parent;
        }
    }

    /// The next `insert_charging_quota` fails without writing
    pub fn fail_next_file_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    /// Every `soft_delete_releasing_quota` of `file_id` fails
    pub fn fail_soft_delete_of(&self, file_id: i64) {
        self.state
            .lock()
            .unwrap()
            .failing_soft_deletes
            .insert(file_id);
    }
}

/// Backend holding one user with the default quota
pub fn seeded_backend() -> (Arc<MemoryBackend>, String) {
    let backend = Arc::new(MemoryBackend::new());
    let user_id = backend.add_user("owner@example.com");
    (backend, user_id)
}

#[async_trait]
impl UserStore for MemoryBackend {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRow>> {
        Ok(self.user(user_id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self.user_by_email(email))
    }

    async fn insert(&self, user: NewUser) -> Result<UserRow> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let row = UserRow {
            id: user.id.clone(),
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            storage_used_mb: Decimal::ZERO,
            storage_limit_mb: user.storage_limit_mb,
            is_admin: false,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl FileStore for MemoryBackend {
    async fn list(&self, user_id: &str, folder_id: Option<i64>) -> Result<Vec<FileRow>> {
        let state = self.state.lock().unwrap();
        let mut files: Vec<FileRow> = state
            .files
            .values()
            .filter(|f| f.user_id == user_id && !f.is_deleted && f.folder_id == folder_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }

    async fn find(&self, file_id: i64, user_id: &str) -> Result<Option<FileRow>> {
        Ok(self
            .file(file_id)
            .filter(|f| f.user_id == user_id && !f.is_deleted))
    }

    async fn search(
        &self,
        user_id: &str,
        folder_id: Option<i64>,
        term: &str,
    ) -> Result<Vec<FileRow>> {
        let needle = term.to_lowercase();
        let files = FileStore::list(self, user_id, folder_id).await?;
        Ok(files
            .into_iter()
            .filter(|f| f.file_name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn insert_charging_quota(&self, file: NewFile, size_mb: Decimal) -> Result<FileRow> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal("injected insert failure".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .get_mut(&file.user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if user.storage_used_mb + size_mb > user.storage_limit_mb {
            return Err(AppError::StorageLimitExceeded(
                "Storage limit exceeded".to_string(),
            ));
        }
        user.storage_used_mb += size_mb;

        let id = state.next_id();
        let row = FileRow {
            id,
            user_id: file.user_id,
            file_name: file.file_name,
            file_path: file.file_path,
            content_type: file.content_type,
            file_size: file.file_size,
            uploaded_on: Utc::now(),
            folder_id: file.folder_id,
            version: 1,
            is_deleted: false,
            storage_url: file.storage_url,
        };
        state.files.insert(id, row.clone());
        Ok(row)
    }

    async fn soft_delete_releasing_quota(
        &self,
        file_id: i64,
        user_id: &str,
    ) -> Result<Option<FileRow>> {
        let mut state = self.state.lock().unwrap();
        if state.failing_soft_deletes.contains(&file_id) {
            return Err(AppError::Internal("injected delete failure".to_string()));
        }

        let Some(file) = state
            .files
            .get_mut(&file_id)
            .filter(|f| f.user_id == user_id && !f.is_deleted)
        else {
            return Ok(None);
        };
        file.is_deleted = true;
        let file = file.clone();

        if let Some(user) = state.users.get_mut(user_id) {
            user.storage_used_mb = (user.storage_used_mb - file.size_mb()).max(Decimal::ZERO);
        }

        Ok(Some(file))
    }

    async fn rename(&self, file_id: i64, user_id: &str, name: &str) -> Result<Option<FileRow>> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .files
            .get_mut(&file_id)
            .filter(|f| f.user_id == user_id && !f.is_deleted)
            .map(|f| {
                f.file_name = name.to_string();
                f.clone()
            }))
    }

    async fn recent(&self, user_id: &str, limit: i64) -> Result<Vec<FileRow>> {
        let state = self.state.lock().unwrap();
        let mut files: Vec<FileRow> = state
            .files
            .values()
            .filter(|f| f.user_id == user_id && !f.is_deleted)
            .cloned()
            .collect();
        files.sort_by(|a, b| (b.uploaded_on, b.id).cmp(&(a.uploaded_on, a.id)));
        files.truncate(limit.max(0) as usize);
        Ok(files)
    }

    async fn count(&self, user_id: &str) -> Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .files
            .values()
            .filter(|f| f.user_id == user_id && !f.is_deleted)
            .count() as i64)
    }
}

#[async_trait]
impl FolderStore for MemoryBackend {
    async fn list(&self, user_id: &str, parent_id: Option<i64>) -> Result<Vec<FolderRow>> {
        let state = self.state.lock().unwrap();
        let mut folders: Vec<FolderRow> = state
            .folders
            .values()
            .filter(|f| f.user_id == user_id && !f.is_deleted && f.parent_folder_id == parent_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.folder_name.cmp(&b.folder_name).then(a.id.cmp(&b.id)));
        Ok(folders)
    }

    async fn find(&self, folder_id: i64, user_id: &str) -> Result<Option<FolderRow>> {
        Ok(self
            .folder(folder_id)
            .filter(|f| f.user_id == user_id && !f.is_deleted))
    }

    async fn insert(&self, folder: NewFolder) -> Result<FolderRow> {
        let id = self.add_folder(
            &folder.user_id,
            &folder.folder_name,
            folder.parent_folder_id,
        );
        self.folder(id)
            .ok_or_else(|| AppError::Internal("folder vanished".to_string()))
    }

    async fn soft_delete_many(&self, folder_ids: &[i64], user_id: &str) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let mut changed = 0;
        for id in folder_ids {
            if let Some(folder) = state
                .folders
                .get_mut(id)
                .filter(|f| f.user_id == user_id && !f.is_deleted)
            {
                folder.is_deleted = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn rename(
        &self,
        folder_id: i64,
        user_id: &str,
        name: &str,
    ) -> Result<Option<FolderRow>> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .folders
            .get_mut(&folder_id)
            .filter(|f| f.user_id == user_id && !f.is_deleted)
            .map(|f| {
                f.folder_name = name.to_string();
                f.clone()
            }))
    }

    async fn count(&self, user_id: &str) -> Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .folders
            .values()
            .filter(|f| f.user_id == user_id && !f.is_deleted)
            .count() as i64)
    }
}

/// `BlobStore` over a map of keys to bytes
pub struct MemoryBlobStore {
    bucket: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    failing_deletes: Mutex<HashSet<String>>,
}

impl MemoryBlobStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Mutex::new(HashMap::new()),
            failing_deletes: Mutex::new(HashSet::new()),
        }
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn insert_object(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn fail_delete_of(&self, key: &str) {
        self.failing_deletes.lock().unwrap().insert(key.to_string());
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn bucket_name(&self) -> String {
        self.bucket.clone()
    }

    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<()> {
        self.insert_object(key, data);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.object(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.failing_deletes.lock().unwrap().contains(key) {
            return Err(AppError::Storage("injected delete failure".to_string()));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://storage.test/{}/{}", self.bucket, key)
    }
}

/// Services wired over a `MemoryBackend` and a `MemoryBlobStore`
pub struct TestServices {
    pub blobs: Arc<MemoryBlobStore>,
    pub sessions: Arc<SessionService>,
    pub auth: Arc<AuthService>,
    pub files: Arc<FileService>,
    pub folders: Arc<FolderService>,
    pub dashboard: Arc<DashboardService>,
    services: AppServices,
}

impl TestServices {
    pub fn new(backend: Arc<MemoryBackend>) -> Self {
        let blobs = Arc::new(MemoryBlobStore::new(TEST_BUCKET));
        let storage = Arc::new(StorageClient::new(blobs.clone()));
        let services = AppServices::new(
            backend.clone(),
            backend.clone(),
            backend,
            storage,
            test_session_config(),
        );

        Self {
            blobs,
            sessions: Arc::clone(&services.sessions),
            auth: Arc::clone(&services.auth),
            files: Arc::clone(&services.files),
            folders: Arc::clone(&services.folders),
            dashboard: Arc::clone(&services.dashboard),
            services,
        }
    }

    /// Full application router, layers included
    pub fn router(&self) -> axum::Router {
        build_router(&self.services, &test_app_config(), &test_swagger_config())
    }
}
