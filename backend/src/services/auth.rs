//! Authentication service for user registration, login, and token management

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::{Credentials, NewUser, Role, User};
use tracing::instrument;
use validator::Validate;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn InventoryStore>,
    jwt_secret: String,
    access_token_expiry: i64,
    bcrypt_cost: u32,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<i32> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }
}

/// Response after successful registration or login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(store: Arc<dyn InventoryStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            jwt_secret: config.jwt_secret.clone(),
            access_token_expiry: config.access_token_expiry,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Register a new account. The first account ever created is an admin.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn register(&self, credentials: Credentials) -> AppResult<AuthResponse> {
        credentials.validate()?;

        let username = credentials.username.trim().to_string();
        if username.len() != credentials.username.len() {
            return Err(AppError::validation(
                "username",
                "Username must not start or end with whitespace",
            ));
        }

        let password_hash = self.hash_password(credentials.password).await?;
        let user = self
            .store
            .create_user(NewUser {
                username,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "user registered");

        self.issue(user)
    }

    /// Authenticate with username and password
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: Credentials) -> AppResult<AuthResponse> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        let user = self
            .store
            .find_user_by_username(&credentials.username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let stored = user.password.clone();
        let valid = tokio::task::spawn_blocking(move || verify(credentials.password, &stored))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::debug!("password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        self.issue(user)
    }

    /// Validate access token and return claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })
    }

    /// Look up the account behind an authenticated request
    pub async fn current_user(&self, user_id: i32) -> AppResult<User> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    async fn hash_password(&self, password: String) -> AppResult<String> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    fn issue(&self, user: User) -> AppResult<AuthResponse> {
        let access_token = self.generate_token(&user)?;
        Ok(AuthResponse {
            user,
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> AuthService {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_token_expiry: 3600,
            bcrypt_cost: 4,
        };
        AuthService::new(Arc::new(MemoryStore::new()), &config)
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_user_admin_then_staff() {
        let auth = service();
        let first = auth.register(credentials("alice", "password1")).await.unwrap();
        let second = auth.register(credentials("bob", "password2")).await.unwrap();
        assert_eq!(first.user.role, Role::Admin);
        assert_eq!(second.user.role, Role::Staff);
    }

    #[tokio::test]
    async fn test_login_and_token_round_trip() {
        let auth = service();
        auth.register(credentials("alice", "password1")).await.unwrap();

        let response = auth.login(credentials("alice", "password1")).await.unwrap();
        let claims = auth.validate_token(&response.access_token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.user_id().unwrap(), response.user.id);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let auth = service();
        auth.register(credentials("alice", "password1")).await.unwrap();

        let err = auth.login(credentials("alice", "not-the-password")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        let err = auth.login(credentials("nobody", "password1")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let auth = service();
        auth.register(credentials("alice", "password1")).await.unwrap();
        let err = auth.register(credentials("alice", "password2")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEntry(_)));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let err = service().register(credentials("alice", "short")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "password"));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            service().validate_token("not.a.jwt"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let auth = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "1".to_string(),
            username: "alice".to_string(),
            role: Role::Admin,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(auth.validate_token(&token), Err(AppError::TokenExpired)));
    }
}
