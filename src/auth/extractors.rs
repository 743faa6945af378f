use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::Role;

/// Identity of the caller, attached to the request by `Authenticate`.
///
/// Lives only as long as the request. Handlers can take it as an argument on any
/// route wrapped by `Authenticate`; elsewhere extraction fails with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
    pub role: Role,
}

impl FromRequest for AuthContext {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthContext>().cloned() {
            Some(ctx) => ready(Ok(ctx)),
            None => {
                let err = AppError::Unauthorized("Authorization header is required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
