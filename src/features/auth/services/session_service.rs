use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::config::SessionConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Role, SessionClaims};
use crate::modules::backend::UserRow;
use crate::shared::constants::SESSION_COOKIE;

/// Issues and validates HS256 session tokens and builds the session cookie
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: SessionConfig,
}

impl SessionService {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
        }
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.config.bcrypt_cost
    }

    /// Issue a session token for `user`, valid for the configured TTL
    pub fn issue(&self, user: &UserRow) -> Result<String> {
        let iat = Utc::now().timestamp().max(0) as u64;
        let claims = SessionClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.full_name.clone(),
            role: Role::from_admin_flag(user.is_admin).as_str().to_string(),
            iat,
            exp: iat + self.config.ttl.as_secs(),
        };

        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &SessionClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    pub fn validate(&self, token: &str) -> Result<AuthenticatedUser> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.jwt_leeway.as_secs();

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid session: {}", e)))?;

        Ok(data.claims.into())
    }

    /// Session cookie carrying `token`.
    ///
    /// Persistent (Max-Age = TTL) only when `remember_me` is set, otherwise
    /// it lives until the browser closes.
    pub fn build_cookie(&self, token: String, remember_me: bool) -> Cookie<'static> {
        let mut session = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.cookie_secure)
            .build();

        if remember_me {
            session.set_max_age(cookie::time::Duration::seconds(
                self.config.ttl.as_secs() as i64,
            ));
        }

        session
    }

    /// Cookie matching the session cookie's path, used to remove it
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, "")).path("/").build()
    }
}
