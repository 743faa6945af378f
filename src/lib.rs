#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "A layered task management API: HTTP handlers call use cases, use cases call"]
#![doc = "repositories. Bearer tokens authenticate every protected request and roles"]
#![doc = "gate the routes that change state. The binary (`main.rs`) wires it together."]

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod usecases;

pub use crate::error::AppError;
