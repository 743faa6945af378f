#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value};

use taskgate::auth::{BcryptHasher, JwtService, TokenService};
use taskgate::clock::SystemClock;
use taskgate::db::Store;
use taskgate::routes;
use taskgate::usecases::{TaskUsecase, UserUsecase};

pub const SECRET: &str = "integration_test_secret";

/// Everything an app instance needs, backed by a fresh in-memory store.
#[derive(Clone)]
pub struct TestState {
    pub store: web::Data<Store>,
    pub users: web::Data<UserUsecase>,
    pub tasks: web::Data<TaskUsecase>,
    pub tokens: Arc<dyn TokenService>,
}

impl TestState {
    pub fn new() -> Self {
        let store = Store::memory();
        let tokens: Arc<dyn TokenService> = Arc::new(JwtService::new(SECRET));
        Self {
            users: web::Data::new(UserUsecase::new(
                store.user_repository(),
                Arc::new(BcryptHasher::new(4)),
                tokens.clone(),
            )),
            tasks: web::Data::new(TaskUsecase::new(
                store.task_repository(),
                Arc::new(SystemClock),
            )),
            store: web::Data::new(store),
            tokens,
        }
    }

    /// Registers the state and every route on an app.
    pub fn configure(&self) -> impl FnOnce(&mut web::ServiceConfig) {
        let state = self.clone();
        move |cfg| {
            cfg.app_data(state.store)
                .app_data(state.users)
                .app_data(state.tasks);
            routes::config(state.tokens)(cfg);
        }
    }
}

pub async fn init_app() -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(App::new().configure(TestState::new().configure())).await
}

/// Sends a JSON request, optionally with a bearer token, and returns status and body.
pub async fn send<S, B>(
    app: &S,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut req = match method {
        "GET" => test::TestRequest::get(),
        "POST" => test::TestRequest::post(),
        "PUT" => test::TestRequest::put(),
        "DELETE" => test::TestRequest::delete(),
        other => panic!("unsupported method {}", other),
    }
    .uri(uri);

    if let Some(token) = token {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)));
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }

    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn register<S, B>(app: &S, username: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

/// Logs in and returns the token, panicking on failure.
pub async fn login<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

/// Registers the bootstrap admin and one regular user, returning their tokens.
pub async fn admin_and_user<S, B>(app: &S) -> (String, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    assert_eq!(register(app, "admin", "admin-pw").await.0, StatusCode::CREATED);
    assert_eq!(register(app, "user", "user-pw").await.0, StatusCode::CREATED);
    (
        login(app, "admin", "admin-pw").await,
        login(app, "user", "user-pw").await,
    )
}
