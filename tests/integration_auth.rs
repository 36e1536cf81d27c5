mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use common::{create_test_user, generate_unique_email};
use userforge::config::cors::CorsConfig;
use userforge::config::jwt::JwtConfig;
use userforge::router::init_router;
use userforge::state::AppState;
use userforge::utils::jwt::verify_access_token;

async fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
    };
    init_router(state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_success(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let email = generate_unique_email();
    let request = json_request(
        "POST",
        "/api/auth/register",
        json!({
            "name": "Jane Doe",
            "email": email,
            "password": "testpass123"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], email);
    assert_eq!(body["data"]["user"]["role"], "user");
    assert_eq!(body["data"]["user"]["is_active"], true);
    assert!(body["data"]["token"].is_string());
    assert!(body["data"]["refreshToken"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_token_subject_is_account_id(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let email = generate_unique_email();
    let request = json_request(
        "POST",
        "/api/auth/register",
        json!({
            "name": "Jane Doe",
            "email": email,
            "password": "testpass123"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    let body = response_json(response).await;

    let token = body["data"]["token"].as_str().unwrap();
    let user_id = body["data"]["user"]["id"].as_str().unwrap();

    let claims = verify_access_token(token, &JwtConfig::from_env()).unwrap();
    assert_eq!(claims.id, user_id);
    assert!(claims.exp > claims.iat);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_normalizes_email(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let marker = Uuid::new_v4();
    let request = json_request(
        "POST",
        "/api/auth/register",
        json!({
            "name": "  Jane Doe  ",
            "email": format!("  TEST-{marker}@EXAMPLE.COM "),
            "password": "testpass123"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(
        body["data"]["user"]["email"],
        format!("test-{marker}@example.com")
    );
    assert_eq!(body["data"]["user"]["name"], "Jane Doe");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_duplicate_email(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let email = generate_unique_email();
    let payload = json!({
        "name": "Jane Doe",
        "email": email,
        "password": "testpass123"
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same address with different case and padding still collides.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "name": "Someone Else",
                "email": format!("  {} ", email.to_uppercase()),
                "password": "otherpass123"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email already exists");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_missing_password(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let request = json_request(
        "POST",
        "/api/auth/register",
        json!({
            "name": "Jane Doe",
            "email": generate_unique_email()
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_invalid_email(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let request = json_request(
        "POST",
        "/api/auth/register",
        json!({
            "name": "Jane Doe",
            "email": "not-an-email",
            "password": "testpass123"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_short_password(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let request = json_request(
        "POST",
        "/api/auth/register",
        json!({
            "name": "Jane Doe",
            "email": generate_unique_email(),
            "password": "short"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_response_has_no_password(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let request = json_request(
        "POST",
        "/api/auth/register",
        json!({
            "name": "Jane Doe",
            "email": generate_unique_email(),
            "password": "testpass123"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let raw = String::from_utf8(body.to_vec()).unwrap();

    // Neither the field name nor a bcrypt hash may appear anywhere.
    assert!(!raw.contains("password"));
    assert!(!raw.contains("$2"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_success(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &email, password, "user", true).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": email, "password": password}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["data"]["user"]["email"], email);
    assert!(body["data"]["token"].is_string());
    assert!(body["data"]["refreshToken"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    create_test_user(&mut tx, &email, "correctpass", "user", true).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": email, "password": "wrongpassword"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Invalid credentials");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_unknown_email_same_message(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "nonexistent@test.com", "password": "whatever1"}),
        ))
        .await
        .unwrap();

    // Indistinguishable from a wrong password, to prevent account enumeration.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Invalid credentials");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_missing_password(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "test@test.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_inactive_account(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &email, password, "user", false).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": email, "password": password}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Account is inactive, please contact support");
}

async fn login_token(app: axum::Router, email: &str, password: &str) -> String {
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": email, "password": password}),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_success(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &email, password, "user", true).await;
    tx.commit().await.unwrap();

    let token = login_token(setup_test_app(pool.clone()).await, &email, password).await;
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], email);
    assert!(body["data"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_missing_header(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Not authorized to access this route");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_non_bearer_header(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    // Wrong scheme collapses to the missing-header message.
    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header("authorization", "Token abc.def.ghi")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Not authorized to access this route");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_garbage_token(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header("authorization", "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Not authorized, token failed");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_deleted_user(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    let password = "testpass123";
    let user = create_test_user(&mut tx, &email, password, "user", true).await;
    tx.commit().await.unwrap();

    let token = login_token(setup_test_app(pool.clone()).await, &email, password).await;

    // The token stays structurally valid, but its subject is gone.
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await;
    assert_eq!(body["message"], "User not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_deactivated_user(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    let password = "testpass123";
    let user = create_test_user(&mut tx, &email, password, "user", true).await;
    tx.commit().await.unwrap();

    let token = login_token(setup_test_app(pool.clone()).await, &email, password).await;

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await;
    assert_eq!(body["message"], "User account is inactive");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &email, password, "user", true).await;
    tx.commit().await.unwrap();

    let token = login_token(setup_test_app(pool.clone()).await, &email, password).await;
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Logged out successfully");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout_requires_token(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
