use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{task_exists, task_not_found, user_not_found, username_taken};
use super::{TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, User};

/// In-memory user store.
///
/// Intended for tests/dev. Enforces the same unique-username rule as the database.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

/// In-memory task store with a unique-title rule matching the database index.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

fn poisoned() -> AppError {
    AppError::InternalServerError("store lock poisoned".into())
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, AppError> {
    lock.read().map_err(|_| poisoned())
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, AppError> {
    lock.write().map_err(|_| poisoned())
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = write(&self.users)?;
        if users.iter().any(|u| u.username == user.username) {
            return Err(username_taken());
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, user: &User) -> Result<(), AppError> {
        let mut users = write(&self.users)?;
        let slot = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(user_not_found)?;

        *slot = User {
            id,
            ..user.clone()
        };
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<User, AppError> {
        read(&self.users)?
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(user_not_found)
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        Ok(read(&self.users)?.len() as i64)
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tasks = write(&self.tasks)?;
        if tasks.iter().any(|t| t.title == task.title) {
            return Err(task_exists());
        }

        let task = Task::new(Uuid::new_v4(), task);
        tasks.push(task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> Result<Task, AppError> {
        read(&self.tasks)?
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(task_not_found)
    }

    async fn get_tasks(&self) -> Result<Vec<Task>, AppError> {
        let mut tasks = read(&self.tasks)?.clone();
        tasks.sort_by(|a, b| (a.due_date, &a.title).cmp(&(b.due_date, &b.title)));
        Ok(tasks)
    }

    async fn update_task(&self, id: Uuid, task: NewTask) -> Result<Task, AppError> {
        let mut tasks = write(&self.tasks)?;
        if tasks.iter().any(|t| t.id != id && t.title == task.title) {
            return Err(task_exists());
        }

        let slot = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(task_not_found)?;
        *slot = Task::new(id, task);
        Ok(slot.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), AppError> {
        let mut tasks = write(&self.tasks)?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);

        if tasks.len() == before {
            return Err(task_not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, TaskStatus};
    use chrono::{Duration, Utc};

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.into(),
            password_hash: "hash".into(),
            role,
        }
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.into(),
            due_date: Utc::now() + Duration::days(1),
            status: TaskStatus::Pending,
        }
    }

    #[actix_rt::test]
    async fn test_user_lifecycle() {
        let repo = InMemoryUserRepository::new();
        assert_eq!(repo.count_users().await.unwrap(), 0);

        let created = repo.create_user(new_user("alice", Role::User)).await.unwrap();
        assert_eq!(repo.count_users().await.unwrap(), 1);
        assert_eq!(
            repo.create_user(new_user("alice", Role::User)).await.unwrap_err(),
            username_taken()
        );

        let mut promoted = created.clone();
        promoted.role = Role::Admin;
        repo.update_user(created.id, &promoted).await.unwrap();
        assert_eq!(repo.find_by_username("alice").await.unwrap().role, Role::Admin);

        assert_eq!(
            repo.find_by_username("nobody").await.unwrap_err(),
            user_not_found()
        );
        assert_eq!(
            repo.update_user(Uuid::new_v4(), &promoted).await.unwrap_err(),
            user_not_found()
        );
    }

    #[actix_rt::test]
    async fn test_task_lifecycle() {
        let repo = InMemoryTaskRepository::new();
        assert!(repo.get_tasks().await.unwrap().is_empty());

        let task = repo.create_task(new_task("one")).await.unwrap();
        assert_eq!(repo.get_task(task.id).await.unwrap(), task);

        let updated = repo.update_task(task.id, new_task("renamed")).await.unwrap();
        assert_eq!(updated.id, task.id);
        assert_eq!(updated.title, "renamed");

        repo.delete_task(task.id).await.unwrap();
        assert_eq!(repo.get_task(task.id).await.unwrap_err(), task_not_found());
        assert_eq!(repo.delete_task(task.id).await.unwrap_err(), task_not_found());
        assert_eq!(
            repo.update_task(task.id, new_task("x")).await.unwrap_err(),
            task_not_found()
        );
    }

    #[actix_rt::test]
    async fn test_task_titles_are_unique() {
        let repo = InMemoryTaskRepository::new();
        let first = repo.create_task(new_task("one")).await.unwrap();
        let second = repo.create_task(new_task("two")).await.unwrap();

        assert_eq!(repo.create_task(new_task("one")).await.unwrap_err(), task_exists());
        assert_eq!(
            repo.update_task(second.id, new_task("one")).await.unwrap_err(),
            task_exists()
        );
        // Keeping its own title is not a collision.
        assert!(repo.update_task(first.id, new_task("one")).await.is_ok());
    }

    #[actix_rt::test]
    async fn test_tasks_are_listed_by_due_date() {
        let repo = InMemoryTaskRepository::new();
        let mut late = new_task("late");
        late.due_date = Utc::now() + Duration::days(10);
        repo.create_task(late).await.unwrap();
        repo.create_task(new_task("soon")).await.unwrap();

        let titles: Vec<String> = repo
            .get_tasks()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["soon", "late"]);
    }

    #[actix_rt::test]
    async fn test_tasks_due_together_are_listed_by_title() {
        let repo = InMemoryTaskRepository::new();
        let due = Utc::now() + Duration::days(3);
        for title in ["charlie", "alpha", "bravo"] {
            let mut task = new_task(title);
            task.due_date = due;
            repo.create_task(task).await.unwrap();
        }

        let titles: Vec<String> = repo
            .get_tasks()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["alpha", "bravo", "charlie"]);
    }
}
