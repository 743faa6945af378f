pub mod health;
pub mod tasks;
pub mod users;

use std::sync::Arc;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::auth::{Authenticate, TokenService};
use crate::error::AppError;

/// Registers every route.
///
/// `/register`, `/login` and `/health` are public. Everything else sits behind
/// `Authenticate`; handlers that change state add `Authorize::admin()` themselves.
pub fn config(tokens: Arc<dyn TokenService>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(json_config())
            .service(health::health)
            .service(users::register)
            .service(users::login)
            .service(
                web::scope("/promote")
                    .wrap(Authenticate::new(tokens.clone()))
                    .service(users::promote),
            )
            .service(
                web::scope("/tasks")
                    .wrap(Authenticate::new(tokens))
                    .service(tasks::get_tasks)
                    .service(tasks::create_task)
                    .service(tasks::get_task)
                    .service(tasks::update_task)
                    .service(tasks::delete_task),
            );
    }
}

/// Rejects unparseable JSON bodies with the usual `{"error"}` shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        AppError::BadRequest(err.to_string()).into()
    })
}
