// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! Authentication Service
//!
//! Password login, bearer-token resolution and bootstrap of the default
//! administrator account.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Operator authentication use cases

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::repository::{RepositoryError, UserRepository};
use crate::domain::service_config::DefaultAdminConfig;
use crate::domain::user::User;
use crate::infrastructure::credentials::{CredentialError, PasswordHasher, TokenIssuer};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Account is disabled")]
    Forbidden,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::Credential(_) => "credential_error",
            Self::Repository(_) => "repository_error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AccessToken, AuthError> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) if self.hasher.verify(password, &user.hashed_password) => user,
            _ => {
                warn!(username, "Login failed");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !user.is_active {
            warn!(username, "Login refused for disabled account");
            return Err(AuthError::Forbidden);
        }

        let access_token = self.tokens.issue(&user.username)?;
        info!(username, "User logged in");
        Ok(AccessToken {
            access_token,
            token_type: "bearer",
        })
    }

    /// Resolve the active user a bearer token was issued to
    pub async fn resolve_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            AuthError::Unauthorized
        })?;

        match self.users.find_by_username(&claims.sub).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AuthError::Unauthorized),
        }
    }

    /// Create the configured administrator when no account with that
    /// username exists. Returns whether an account was created.
    pub async fn ensure_admin_exists(&self, admin: &DefaultAdminConfig) -> Result<bool, AuthError> {
        if self.users.find_by_username(&admin.username).await?.is_some() {
            info!(username = %admin.username, "Admin user already exists, skipping creation");
            return Ok(false);
        }

        let hashed = self.hasher.hash(&admin.password);
        let user = User::new(&admin.username, &admin.email, hashed, true);
        self.users.create(&user).await?;
        info!(username = %admin.username, "Default admin user created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::InMemoryUserRepository;

    fn service(users: Arc<InMemoryUserRepository>) -> AuthService {
        AuthService::new(users, PasswordHasher::new(10), TokenIssuer::new("test-secret", 5))
    }

    #[tokio::test]
    async fn test_admin_bootstrap_is_idempotent() {
        let users = Arc::new(InMemoryUserRepository::new());
        let auth = service(users.clone());
        let admin = DefaultAdminConfig::default();

        assert!(auth.ensure_admin_exists(&admin).await.unwrap());
        assert!(!auth.ensure_admin_exists(&admin).await.unwrap());

        let stored = users.find_by_username("admin").await.unwrap().unwrap();
        assert!(stored.is_admin);
        assert_ne!(stored.hashed_password, "admin");
    }

    #[tokio::test]
    async fn test_login_and_resolve() {
        let users = Arc::new(InMemoryUserRepository::new());
        let auth = service(users);
        auth.ensure_admin_exists(&DefaultAdminConfig::default()).await.unwrap();

        let token = auth.authenticate("admin", "admin").await.unwrap();
        assert_eq!(token.token_type, "bearer");

        let user = auth.resolve_user(&token.access_token).await.unwrap();
        assert_eq!(user.username, "admin");

        assert!(matches!(
            auth.authenticate("admin", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("ghost", "admin").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.resolve_user("not-a-token").await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_disabled_account_is_forbidden() {
        let users = Arc::new(InMemoryUserRepository::new());
        let hasher = PasswordHasher::new(10);
        let mut user = User::new("clerk", "clerk@example.com", hasher.hash("pw"), false);
        user.is_active = false;
        users.create(&user).await.unwrap();

        let auth = service(users);
        assert!(matches!(
            auth.authenticate("clerk", "pw").await,
            Err(AuthError::Forbidden)
        ));
    }
}
