use crate::{
    auth::{AuthContext, Authorize, LoginResponse},
    error::AppError,
    models::{Credentials, PromoteRequest},
    usecases::UserUsecase,
};
use actix_web::{post, web, HttpResponse, Responder};
use log::info;
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// The first account registered becomes the administrator.
///
/// ## Responses:
/// - `201 Created`: `{"message": "User registered successfully"}`.
/// - `400 Bad Request`: Missing username/password or the username is taken.
/// - `500 Internal Server Error`: Hashing or store failure.
#[post("/register")]
pub async fn register(
    users: web::Data<UserUsecase>,
    body: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    users.register(&body.username, &body.password).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully"
    })))
}

/// Login user
///
/// Authenticates a user and returns a bearer token valid for 24 hours.
///
/// ## Responses:
/// - `200 OK`: `{"message": ..., "token": ...}`.
/// - `400 Bad Request`: `invalid username or password`, whichever factor failed.
/// - `500 Internal Server Error`: Store or signing failure.
#[post("/login")]
pub async fn login(
    users: web::Data<UserUsecase>,
    body: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    let token = users.login(&body.username, &body.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Logged in successfully".into(),
        token,
    }))
}

/// Promote a user to admin. Admin only.
///
/// Mounted under a scope wrapped by `Authenticate`.
#[post("", wrap = "Authorize::admin()")]
pub async fn promote(
    users: web::Data<UserUsecase>,
    caller: AuthContext,
    body: web::Json<PromoteRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    users.promote_user(&body.username).await?;
    info!("{} promoted {}", caller.username, body.username);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User promoted successfully"
    })))
}
