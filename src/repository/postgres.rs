use std::future::Future;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use log::error;
use sqlx::PgPool;
use uuid::Uuid;

use super::{task_exists, task_not_found, user_not_found, username_taken};
use super::{TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, User};

const USER_COLUMNS: &str = "id, username, password_hash, role";
const TASK_COLUMNS: &str = "id, title, due_date, status";

/// Runs a store operation under a deadline. An elapsed deadline surfaces as an
/// I/O timeout so callers classify it like any other store failure.
async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, sqlx::Error>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(sqlx::Error::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("store operation exceeded {:?}", timeout),
        ))),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

/// Logs the underlying cause and returns a generic internal error with `msg`.
fn internal(msg: &str, err: sqlx::Error) -> AppError {
    error!("{}: {}", msg, err);
    AppError::InternalServerError(msg.to_string())
}

pub struct PgUserRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgUserRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (id, username, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let query = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool);

        bounded(self.timeout, query).await.map_err(|e| {
            if is_unique_violation(&e) {
                username_taken()
            } else {
                internal("Error creating user", e)
            }
        })
    }

    async fn update_user(&self, id: Uuid, user: &User) -> Result<(), AppError> {
        let query = sqlx::query(
            "UPDATE users SET username = $1, password_hash = $2, role = $3 WHERE id = $4",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(id)
        .execute(&self.pool);

        let result = bounded(self.timeout, query).await.map_err(|e| {
            if is_unique_violation(&e) {
                username_taken()
            } else {
                internal("Error updating user", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<User, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let query = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool);

        bounded(self.timeout, query)
            .await
            .map_err(|e| internal("Error retrieving user", e))?
            .ok_or_else(user_not_found)
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        let query = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&self.pool);

        bounded(self.timeout, query)
            .await
            .map_err(|e| internal("Error counting users", e))
    }
}

pub struct PgTaskRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (id, title, due_date, status) VALUES ($1, $2, $3, $4) RETURNING {}",
            TASK_COLUMNS
        );
        let query = sqlx::query_as::<_, Task>(&sql)
            .bind(Uuid::new_v4())
            .bind(&task.title)
            .bind(task.due_date)
            .bind(task.status)
            .fetch_one(&self.pool);

        bounded(self.timeout, query).await.map_err(|e| {
            if is_unique_violation(&e) {
                task_exists()
            } else {
                internal("Error creating task", e)
            }
        })
    }

    async fn get_task(&self, id: Uuid) -> Result<Task, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let query = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool);

        bounded(self.timeout, query)
            .await
            .map_err(|e| internal("Error retrieving task", e))?
            .ok_or_else(task_not_found)
    }

    async fn get_tasks(&self) -> Result<Vec<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks ORDER BY due_date, title", TASK_COLUMNS);
        let query = sqlx::query_as::<_, Task>(&sql).fetch_all(&self.pool);

        bounded(self.timeout, query)
            .await
            .map_err(|e| internal("Error retrieving tasks", e))
    }

    async fn update_task(&self, id: Uuid, task: NewTask) -> Result<Task, AppError> {
        let sql = format!(
            "UPDATE tasks SET title = $1, due_date = $2, status = $3 WHERE id = $4 RETURNING {}",
            TASK_COLUMNS
        );
        let query = sqlx::query_as::<_, Task>(&sql)
            .bind(&task.title)
            .bind(task.due_date)
            .bind(task.status)
            .bind(id)
            .fetch_optional(&self.pool);

        bounded(self.timeout, query)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    task_exists()
                } else {
                    internal("Error updating task", e)
                }
            })?
            .ok_or_else(task_not_found)
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), AppError> {
        let query = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool);

        let result = bounded(self.timeout, query)
            .await
            .map_err(|e| internal("Error deleting task", e))?;

        if result.rows_affected() == 0 {
            return Err(task_not_found());
        }
        Ok(())
    }
}
