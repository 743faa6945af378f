pub mod task;
pub mod user;

pub use task::{parse_task_id, NewTask, Task, TaskInput, TaskStatus};
pub use user::{Credentials, NewUser, PromoteRequest, Role, User};
