mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::json;

use taskgate::auth::{JwtService, TokenService};
use taskgate::models::Role;

use common::{init_app, login, register, send};

#[actix_rt::test]
async fn test_first_registration_becomes_admin() {
    let app = init_app().await;

    let (status, body) = register(&app, "alice", "secret").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "message": "User registered successfully" }));
    assert_eq!(register(&app, "bob", "secret").await.0, StatusCode::CREATED);

    let tokens = JwtService::new(common::SECRET);

    let alice = tokens
        .validate_token(&login(&app, "alice", "secret").await)
        .unwrap();
    assert_eq!(alice.sub, "alice");
    assert_eq!(alice.role, Role::Admin);

    let bob = tokens
        .validate_token(&login(&app, "bob", "secret").await)
        .unwrap();
    assert_eq!(bob.sub, "bob");
    assert_eq!(bob.role, Role::User);
}

#[test_log::test(actix_rt::test)]
async fn test_register_validation_and_duplicates() {
    let app = init_app().await;

    for body in [
        json!({ "username": "", "password": "secret" }),
        json!({ "username": "alice", "password": "" }),
        json!({}),
    ] {
        let (status, resp) = send(&app, "POST", "/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"], "username and password are required");
    }

    assert_eq!(register(&app, "alice", "secret").await.0, StatusCode::CREATED);
    let (status, resp) = register(&app, "alice", "other").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "username already exists");
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let app = init_app().await;
    register(&app, "alice", "secret").await;

    let login_body = |username: &str, password: &str| {
        Some(json!({ "username": username, "password": password }))
    };

    let wrong_password = send(&app, "POST", "/login", None, login_body("alice", "nope")).await;
    let unknown_user = send(&app, "POST", "/login", None, login_body("ghost", "secret")).await;

    assert_eq!(wrong_password.0, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password.1["error"], "invalid username or password");
    assert_eq!(wrong_password, unknown_user);

    let (status, body) = send(&app, "POST", "/login", None, login_body("alice", "secret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged in successfully");
    assert!(body["token"].is_string());
}

#[actix_rt::test]
async fn test_malformed_json_is_a_bad_request() {
    let app = init_app().await;

    let req = test::TestRequest::post()
        .uri("/register")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"username\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert!(body["error"].is_string());
}

#[actix_rt::test]
async fn test_promote_flow() {
    let app = init_app().await;
    let (admin, user) = common::admin_and_user(&app).await;
    register(&app, "carol", "carol-pw").await;

    let promote = |username: &str| Some(json!({ "username": username }));

    let (status, body) = send(&app, "POST", "/promote", None, promote("carol")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authorization header is required");

    let (status, body) = send(&app, "POST", "/promote", Some(&user), promote("carol")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You are not authorized for this action");

    let (status, body) = send(&app, "POST", "/promote", Some(&admin), promote("")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "username is required");

    let (status, body) = send(&app, "POST", "/promote", Some(&admin), promote("ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = send(&app, "POST", "/promote", Some(&admin), promote("carol")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "User promoted successfully" }));

    let (status, body) = send(&app, "POST", "/promote", Some(&admin), promote("carol")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user is already an admin");

    // The role is read at login, so carol needs a fresh token.
    let carol = JwtService::new(common::SECRET)
        .validate_token(&login(&app, "carol", "carol-pw").await)
        .unwrap();
    assert_eq!(carol.role, Role::Admin);
}

#[actix_rt::test]
async fn test_rejects_bad_authorization_headers() {
    let app = init_app().await;
    let (admin, _) = common::admin_and_user(&app).await;

    for value in [
        format!("Basic {}", admin),
        format!("Bearer {} extra", admin),
        admin.clone(),
    ] {
        let req = test::TestRequest::get()
            .uri("/tasks")
            .insert_header((header::AUTHORIZATION, value))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["error"], "Invalid authorization header");
    }

    let (status, body) = send(&app, "GET", "/tasks", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid token");

    let forged = JwtService::new("some_other_secret")
        .generate_token("admin", Role::Admin)
        .unwrap();
    let (status, body) = send(&app, "GET", "/tasks", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token signature is invalid");

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header((header::AUTHORIZATION, format!("bearer {}", admin)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
