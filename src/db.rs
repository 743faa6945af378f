//! Process-wide store handle.
//!
//! Created once at startup and shared by every repository. `DATABASE_URL` selects the
//! backend: a `postgres://` URL opens a pooled connection and applies migrations,
//! `memory://` keeps everything in process (tests and local experiments).

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::AppError;
use crate::repository::{
    InMemoryTaskRepository, InMemoryUserRepository, PgTaskRepository, PgUserRepository,
    TaskRepository, UserRepository,
};

pub const MEMORY_URL_SCHEME: &str = "memory://";

#[derive(Clone)]
pub enum Store {
    Postgres { pool: PgPool, timeout: Duration },
    Memory {
        users: Arc<InMemoryUserRepository>,
        tasks: Arc<InMemoryTaskRepository>,
    },
}

impl Store {
    /// Connects to the store behind `url` and brings its schema up to date.
    pub async fn connect(url: &str, max_connections: u32, timeout: Duration) -> Result<Self, AppError> {
        if url.starts_with(MEMORY_URL_SCHEME) {
            info!("using in-memory store");
            return Ok(Self::memory());
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(url)
            .await
            .map_err(|e| {
                error!("failed to connect to database: {}", e);
                AppError::InternalServerError("Failed to connect to database".into())
            })?;

        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            error!("failed to run migrations: {}", e);
            AppError::InternalServerError("Failed to run migrations".into())
        })?;

        info!("connected to database");
        Ok(Self::Postgres { pool, timeout })
    }

    pub fn memory() -> Self {
        Self::Memory {
            users: Arc::new(InMemoryUserRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
        }
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        match self {
            Store::Postgres { pool, timeout } => Arc::new(PgUserRepository::new(pool.clone(), *timeout)),
            Store::Memory { users, .. } => users.clone(),
        }
    }

    pub fn task_repository(&self) -> Arc<dyn TaskRepository> {
        match self {
            Store::Postgres { pool, timeout } => Arc::new(PgTaskRepository::new(pool.clone(), *timeout)),
            Store::Memory { tasks, .. } => tasks.clone(),
        }
    }

    /// Round-trips a trivial query to check the store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        match self {
            Store::Postgres { pool, timeout } => {
                let probe = sqlx::query("SELECT 1").execute(pool);
                tokio::time::timeout(*timeout, probe)
                    .await
                    .map_err(|_| AppError::InternalServerError("store ping timed out".into()))??;
                Ok(())
            }
            Store::Memory { .. } => Ok(()),
        }
    }
}
