use actix_web::{http::StatusCode, test, web, App};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use serial_test::serial;

use leavedesk::handlers::auth;
use leavedesk::AppState;

mod common;

macro_rules! auth_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState {
                    auth_service: $ctx.auth_service.clone(),
                    leave_service: $ctx.leave_service.clone(),
                }))
                .app_data(web::Data::new($ctx.config.clone()))
                .service(
                    web::scope("/api/v1").service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    ),
                ),
        )
        .await
    };
}

#[actix_web::test]
#[serial]
async fn register_login_me_roundtrip() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let app = auth_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&json!({
            "name": "Ada Lovelace",
            "email": "Ada@Example.com",
            "password": "password123",
            "role": "Employee",
            "joiningDate": "2024-01-01"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    // Emails are stored lowercased; the hash never appears in responses.
    assert_eq!(body["data"]["user"]["email"], json!("ada@example.com"));
    assert_eq!(body["data"]["user"]["leaveBalance"], json!(20));
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(&json!({
            "email": "ada@example.com",
            "password": "password123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    let (name, value) = common::auth_header(&token);
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header((name, value))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["email"], json!("ada@example.com"));
    assert_eq!(body["data"]["role"], json!("Employee"));
}

#[actix_web::test]
#[serial]
async fn register_rejects_duplicates_and_missing_joining_date() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let app = auth_app!(ctx);

    common::register_employee(&ctx, "ada@example.com", "2024-01-01").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&json!({
            "name": "Ada Again",
            "email": "ada@example.com",
            "password": "password123",
            "role": "Employee",
            "joiningDate": "2024-01-01"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&json!({
            "name": "Bob",
            "email": "bob@example.com",
            "password": "password123",
            "role": "Employee"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
#[serial]
async fn login_rejects_bad_credentials_and_inactive_accounts() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let app = auth_app!(ctx);

    let employee = common::register_employee(&ctx, "ada@example.com", "2024-01-01").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(&json!({
            "email": "ada@example.com",
            "password": "wrong-password"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(&json!({
            "email": "nobody@example.com",
            "password": "password123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Deactivated accounts cannot authenticate even with the right
    // password.
    sqlx::query("UPDATE accounts SET status = 'inactive' WHERE id = ?")
        .bind(&employee.user.id)
        .execute(&ctx.pool)
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(&json!({
            "email": "ada@example.com",
            "password": "password123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
#[serial]
async fn me_requires_authentication() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let app = auth_app!(ctx);

    let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", "Bearer not-a-real-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
