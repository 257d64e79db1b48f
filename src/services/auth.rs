//! Authentication and user administration

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, LoginResponse, ResetPassword, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Check credentials and issue a JWT
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            tracing::warn!(username = %username, "Failed login attempt");
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!(user_id = user.id, "User logged in");

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.jwt_expiration_hours as i64 * 3600,
            user,
        })
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            is_admin: user.is_admin,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Create a new user
    pub async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        data.validate()?;
        if self.repository.users.get_by_username(&data.username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let hash = self.hash_password(&data.password)?;
        let user = self
            .repository
            .users
            .create(&data.username, &hash, data.is_admin)
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, is_admin = user.is_admin, "User created");
        Ok(user)
    }

    /// Change a user's admin flag; nobody may change their own
    pub async fn set_admin(&self, actor_id: i32, user_id: i32, is_admin: bool) -> AppResult<User> {
        if actor_id == user_id {
            return Err(AppError::BusinessRule(
                "You cannot change your own administrator status".to_string(),
            ));
        }
        let user = self.repository.users.set_admin(user_id, is_admin).await?;
        tracing::info!(user_id, is_admin, actor_id, "Administrator status changed");
        Ok(user)
    }

    pub async fn reset_password(&self, user_id: i32, data: ResetPassword) -> AppResult<()> {
        data.validate()?;
        let hash = self.hash_password(&data.password)?;
        self.repository.users.set_password(user_id, &hash).await?;
        tracing::info!(user_id, "Password reset");
        Ok(())
    }

    /// Create the configured admin account when no user exists yet
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<Option<User>> {
        if self.repository.users.count().await? > 0 {
            return Ok(None);
        }

        let (Some(username), Some(password)) = (
            self.config.bootstrap_admin_username.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            tracing::warn!("No users exist and no bootstrap admin is configured");
            return Ok(None);
        };

        let hash = self.hash_password(password)?;
        let user = self.repository.users.create(username, &hash, true).await?;
        tracing::warn!(username = %user.username, "Created bootstrap admin account; change its password");
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argon2_hash_verifies() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"s3cret", &salt)
            .unwrap()
            .to_string();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"s3cret", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }
}
