use std::sync::Arc;

use log::info;

use crate::clock::Clock;
use crate::error::AppError;
use crate::models::{parse_task_id, Task, TaskInput};
use crate::repository::TaskRepository;

pub struct TaskUsecase {
    tasks: Arc<dyn TaskRepository>,
    clock: Arc<dyn Clock>,
}

impl TaskUsecase {
    pub fn new(tasks: Arc<dyn TaskRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { tasks, clock }
    }

    /// Validates and stores a new task. Titles must be unique.
    ///
    /// The title check scans every task; the unique index on the table catches
    /// creates that race past it.
    pub async fn create_task(&self, input: &TaskInput) -> Result<Task, AppError> {
        let task = input.validate(self.clock.now())?;

        let existing = self.tasks.get_tasks().await?;
        if existing.iter().any(|t| t.title == task.title) {
            return Err(AppError::BadRequest("Task already exists".into()));
        }

        let created = self.tasks.create_task(task).await?;
        info!("created task {} ({})", created.id, created.title);
        Ok(created)
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, AppError> {
        self.tasks.get_task(parse_task_id(id)?).await
    }

    pub async fn get_tasks(&self) -> Result<Vec<Task>, AppError> {
        self.tasks.get_tasks().await
    }

    pub async fn update_task(&self, id: &str, input: &TaskInput) -> Result<Task, AppError> {
        let id = parse_task_id(id)?;
        let task = input.validate(self.clock.now())?;

        let updated = self.tasks.update_task(id, task).await?;
        info!("updated task {}", updated.id);
        Ok(updated)
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let id = parse_task_id(id)?;
        self.tasks.delete_task(id).await?;
        info!("deleted task {}", id);
        Ok(())
    }
}
