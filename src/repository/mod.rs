//! Persistence abstraction.
//!
//! Use cases only see the `UserRepository` and `TaskRepository` traits. Each method is
//! a single independent store operation; nothing here spans a transaction. Errors are
//! already classified as `AppError`: a missing row is `NotFound`, anything the store
//! reports unexpectedly is `InternalServerError`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, User};

pub use memory::{InMemoryTaskRepository, InMemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. A duplicate username is a `BadRequest`.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    /// Replaces the stored fields of the user with `id`.
    async fn update_user(&self, id: Uuid, user: &User) -> Result<(), AppError>;

    async fn find_by_username(&self, username: &str) -> Result<User, AppError>;

    async fn count_users(&self) -> Result<i64, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create_task(&self, task: NewTask) -> Result<Task, AppError>;

    async fn get_task(&self, id: Uuid) -> Result<Task, AppError>;

    /// All tasks, ordered by due date. Empty when there are none.
    async fn get_tasks(&self) -> Result<Vec<Task>, AppError>;

    async fn update_task(&self, id: Uuid, task: NewTask) -> Result<Task, AppError>;

    async fn delete_task(&self, id: Uuid) -> Result<(), AppError>;
}

pub(crate) fn user_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

pub(crate) fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

pub(crate) fn username_taken() -> AppError {
    AppError::BadRequest("username already exists".into())
}

pub(crate) fn task_exists() -> AppError {
    AppError::BadRequest("Task already exists".into())
}
