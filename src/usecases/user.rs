//! Registration, login and promotion.
//!
//! The first account ever registered becomes the administrator; there is no other
//! way to provision one. The check counts users right before the insert and is not
//! atomic with it, so two registrations racing on an empty store can both end up as
//! admins. The unique username index still rejects duplicate usernames.

use std::sync::Arc;

use log::{info, warn};

use crate::auth::{PasswordHasher, TokenService};
use crate::error::AppError;
use crate::models::{NewUser, Role};
use crate::repository::UserRepository;

const INVALID_CREDENTIALS: &str = "invalid username or password";

pub struct UserUsecase {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl UserUsecase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Creates an account, making it the admin if it is the first one.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "username and password are required".into(),
            ));
        }

        match self.users.find_by_username(username).await {
            Ok(_) => return Err(AppError::BadRequest("username already exists".into())),
            Err(AppError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let password_hash = self
            .hash(password)
            .await
            .map_err(|_| AppError::InternalServerError("error hashing password".into()))?;

        let role = if self.users.count_users().await? == 0 {
            Role::Admin
        } else {
            Role::User
        };

        self.users
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
                role,
            })
            .await?;

        info!("registered user {} with role {}", username, role);
        Ok(())
    }

    /// Checks the credentials and issues a signed token.
    ///
    /// An unknown username and a wrong password fail with the same message.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = match self.users.find_by_username(username).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::BadRequest(INVALID_CREDENTIALS.into()));
            }
            Err(_) => {
                return Err(AppError::InternalServerError(
                    "error authenticating user".into(),
                ));
            }
        };

        // A hash that cannot be parsed counts as a mismatch.
        if !self.verify(password, &user.password_hash).await.unwrap_or(false) {
            warn!("failed login for {}", username);
            return Err(AppError::BadRequest(INVALID_CREDENTIALS.into()));
        }

        self.tokens
            .generate_token(&user.username, user.role)
            .map_err(|_| AppError::InternalServerError("error generating token".into()))
    }

    /// Grants the admin role. Callers are expected to have checked that the
    /// requester is an admin.
    pub async fn promote_user(&self, username: &str) -> Result<(), AppError> {
        let mut user = self.users.find_by_username(username).await?;

        if user.role == Role::Admin {
            return Err(AppError::BadRequest("user is already an admin".into()));
        }

        user.role = Role::Admin;
        self.users.update_user(user.id, &user).await?;

        info!("promoted {} to admin", username);
        Ok(())
    }

    async fn hash(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
    }

    async fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hashed_password = hashed_password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hashed_password))
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
    }
}
