//! Request gates for protected routes.
//!
//! `Authenticate` turns a bearer token into an [`AuthContext`] stored in the request
//! extensions. `Authorize` must be wrapped inside it and only checks the role found
//! there, so each request verifies its token exactly once. Both short-circuit with an
//! error response; the wrapped service is never called for a rejected request.

use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{debug, warn};

use crate::auth::extractors::AuthContext;
use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::models::Role;

/// Requires a valid `Authorization: Bearer <token>` header.
#[derive(Clone)]
pub struct Authenticate {
    tokens: Arc<dyn TokenService>,
}

impl Authenticate {
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthenticateMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateMiddleware {
            service,
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct AuthenticateMiddleware<S> {
    service: S,
    tokens: Arc<dyn TokenService>,
}

impl<S, B> Service<ServiceRequest> for AuthenticateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req, self.tokens.as_ref()) {
            Ok(ctx) => {
                debug!("authenticated {} as {}", ctx.username, ctx.role);
                req.extensions_mut().insert(ctx);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                warn!("unauthenticated {} {}: {}", req.method(), req.path(), err);
                let res = req.error_response(err).map_into_right_body();
                Box::pin(ready(Ok(res)))
            }
        }
    }
}

/// Extracts and verifies the bearer token of `req`.
fn authenticate(req: &ServiceRequest, tokens: &dyn TokenService) -> Result<AuthContext, AppError> {
    let value = match req.headers().get(header::AUTHORIZATION) {
        Some(value) if !value.is_empty() => value,
        _ => {
            return Err(AppError::Unauthorized(
                "Authorization header is required".into(),
            ))
        }
    };

    let invalid = || AppError::Unauthorized("Invalid authorization header".into());
    let value = value.to_str().map_err(|_| invalid())?;

    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("bearer") {
        return Err(invalid());
    }

    let claims = tokens.validate_token(parts[1])?;

    Ok(AuthContext {
        username: claims.sub,
        role: claims.role,
    })
}

/// Restricts a route to a set of roles. Must run after `Authenticate`.
#[derive(Clone)]
pub struct Authorize {
    allowed: Rc<[Role]>,
}

impl Authorize {
    pub fn new<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        Self {
            allowed: roles.into_iter().collect(),
        }
    }

    pub fn admin() -> Self {
        Self::new([Role::Admin])
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authorize
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthorizeMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizeMiddleware {
            service,
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct AuthorizeMiddleware<S> {
    service: S,
    allowed: Rc<[Role]>,
}

impl<S, B> Service<ServiceRequest> for AuthorizeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let caller = req
            .extensions()
            .get::<AuthContext>()
            .map(|ctx| (ctx.username.clone(), ctx.role));

        let rejection = match caller {
            Some((_, role)) if self.allowed.contains(&role) => None,
            Some((username, role)) => {
                warn!(
                    "forbidden {} {} for {} ({})",
                    req.method(),
                    req.path(),
                    username,
                    role
                );
                Some(AppError::Forbidden(
                    "You are not authorized for this action".into(),
                ))
            }
            None => Some(AppError::Unauthorized(
                "Authorization header is required".into(),
            )),
        };

        match rejection {
            None => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Some(err) => {
                let res = req.error_response(err).map_into_right_body();
                Box::pin(ready(Ok(res)))
            }
        }
    }
}
