//! Business rules between the HTTP layer and the repositories.

pub mod task;
pub mod user;

pub use task::TaskUsecase;
pub use user::UserUsecase;
