use crate::{
    auth::{AuthContext, Authorize},
    error::AppError,
    models::TaskInput,
    usecases::TaskUsecase,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::debug;
use serde_json::json;

/// Retrieves every task.
///
/// ## Responses:
/// - `200 OK`: A JSON array of tasks, possibly empty.
/// - `401 Unauthorized`: Missing or invalid bearer token.
#[get("")]
pub async fn get_tasks(tasks: web::Data<TaskUsecase>) -> Result<impl Responder, AppError> {
    let tasks = tasks.get_tasks().await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: The task.
/// - `400 Bad Request`: The id is not a UUID.
/// - `404 Not Found`: No task has this id.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskUsecase>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task = tasks.get_task(&task_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Creates a new task. Admin only.
///
/// ## Request Body:
/// - `title`: Unique, non-empty.
/// - `due_date`: RFC 3339 timestamp; in the future when pending, in the past when completed.
/// - `status`: `pending` or `completed`.
///
/// ## Responses:
/// - `201 Created`: The stored task.
/// - `400 Bad Request`: Validation failure or `Task already exists`.
/// - `403 Forbidden`: Caller is not an admin.
#[post("", wrap = "Authorize::admin()")]
pub async fn create_task(
    tasks: web::Data<TaskUsecase>,
    caller: AuthContext,
    body: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    debug!("{} creating task {:?}", caller.username, body.title);
    let task = tasks.create_task(&body).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Replaces a task's title, due date and status. Admin only.
#[put("/{id}", wrap = "Authorize::admin()")]
pub async fn update_task(
    tasks: web::Data<TaskUsecase>,
    task_id: web::Path<String>,
    body: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = tasks.update_task(&task_id, &body).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID. Admin only.
#[delete("/{id}", wrap = "Authorize::admin()")]
pub async fn delete_task(
    tasks: web::Data<TaskUsecase>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    tasks.delete_task(&task_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Task deleted successfully"
    })))
}
