use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginForm, RegisterForm};
use crate::features::auth::services::SessionService;
use crate::modules::backend::{NewUser, UserRow, UserStore};
use crate::shared::constants::DEFAULT_STORAGE_LIMIT_MB;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Service for account operations (register, login)
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<SessionService>,
    /// Hash checked for unknown emails so both login failures cost one bcrypt verify
    decoy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<SessionService>) -> Self {
        Self {
            users,
            sessions,
            decoy_hash: OnceCell::new(),
        }
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    /// Register a new account with the default quota
    pub async fn register(&self, form: RegisterForm) -> Result<UserRow> {
        if form.password != form.confirm_password {
            return Err(AppError::BadRequest("Passwords do not match".to_string()));
        }

        let email = normalize_email(&form.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(form.password, self.sessions.bcrypt_cost()).await?;

        let user = self
            .users
            .insert(NewUser {
                id: Uuid::new_v4().to_string(),
                email,
                password_hash,
                full_name: form.full_name.trim().to_string(),
                storage_limit_mb: Decimal::from(DEFAULT_STORAGE_LIMIT_MB),
            })
            .await?;

        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Verify credentials and issue a session token.
    ///
    /// Unknown email and wrong password fail with the same message.
    pub async fn login(&self, form: &LoginForm) -> Result<String> {
        let email = normalize_email(&form.email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            debug!("Login attempt for unknown email");
            let decoy = self
                .decoy_hash
                .get_or_try_init(|| {
                    hash_password(Uuid::new_v4().to_string(), self.sessions.bcrypt_cost())
                })
                .await?;
            verify_password(form.password.clone(), decoy.clone()).await?;
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(form.password.clone(), user.password_hash.clone()).await? {
            debug!("Wrong password for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.sessions.issue(&user)?;
        info!("User {} logged in", user.id);

        Ok(token)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?;

    match verified {
        Ok(valid) => Ok(valid),
        Err(e) => {
            warn!("Stored password hash could not be verified: {}", e);
            Ok(false)
        }
    }
}
