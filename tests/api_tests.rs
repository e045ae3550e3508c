use axum::{
    Router,
    body::Body,
    http::{
        Request, Response, StatusCode,
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
};
use deskhub::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Bootstrap admin seeded by the initial migration
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // One pooled connection so the in-memory database is shared
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = deskhub::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    deskhub::api::router(state)
}

async fn post_json(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
    body: &serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }

    app.clone()
        .oneshot(
            builder
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }

    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(SET_COOKIE)
        .expect("expected a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, username: &str, email: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/register",
        None,
        &serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
            "confirm_password": password,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/login",
        None,
        &serde_json::json!({ "username": username, "password": password }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

#[tokio::test]
async fn test_registration_establishes_session() {
    let app = spawn_app().await;

    let response = post_json(
        &app,
        "/api/auth/register",
        None,
        &serde_json::json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "secret123",
            "confirm_password": "secret123",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "CUSTOMER");

    let response = get(&app, "/api/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "alice");

    let response = get(&app, "/api/home", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["capabilities"]["can_reserve_equipment"], true);
    assert_eq!(body["data"]["capabilities"]["can_manage_equipment"], false);
}

#[tokio::test]
async fn test_registration_validation() {
    let app = spawn_app().await;

    // Mismatched confirmation
    let response = post_json(
        &app,
        "/api/auth/register",
        None,
        &serde_json::json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "secret123",
            "confirm_password": "different",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Password too short
    let response = post_json(
        &app,
        "/api/auth/register",
        None,
        &serde_json::json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "short",
            "confirm_password": "short",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Malformed email
    let response = post_json(
        &app,
        "/api/auth/register",
        None,
        &serde_json::json!({
            "username": "alice",
            "email": "not-an-email",
            "password": "secret123",
            "confirm_password": "secret123",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    register(&app, "alice", "alice@example.com", "secret123").await;

    // Duplicate username
    let response = post_json(
        &app,
        "/api/auth/register",
        None,
        &serde_json::json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "secret123",
            "confirm_password": "secret123",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Duplicate email
    let response = post_json(
        &app,
        "/api/auth/register",
        None,
        &serde_json::json!({
            "username": "bob",
            "email": "alice@example.com",
            "password": "secret123",
            "confirm_password": "secret123",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let app = spawn_app().await;
    register(&app, "alice", "alice@example.com", "secret123").await;

    let wrong_password = post_json(
        &app,
        "/api/auth/login",
        None,
        &serde_json::json!({ "username": "alice", "password": "wrong" }),
    )
    .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(wrong_password).await;

    let unknown_user = post_json(
        &app,
        "/api/auth/login",
        None,
        &serde_json::json!({ "username": "nobody", "password": "secret123" }),
    )
    .await;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = body_json(unknown_user).await;

    // No way to tell a bad username from a bad password
    assert_eq!(wrong_password["error"], unknown_user["error"]);

    login(&app, "alice", "secret123").await;
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = spawn_app().await;

    for uri in ["/api/home", "/api/equipment", "/api/users", "/api/reservations"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    // Meta stays public
    let response = get(&app, "/api/meta", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_capability_gates() {
    let app = spawn_app().await;

    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let customer = register(&app, "carol", "carol@example.com", "secret123").await;

    // Admin can see the user list; customers cannot
    let response = get(&app, "/api/users", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/users", Some(&customer)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Customers cannot manage equipment
    let response = post_json(
        &app,
        "/api/equipment",
        Some(&customer),
        &serde_json::json!({ "name": "Drill", "purchase_price": "100" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin creates a staff account; the staff member can manage equipment
    // but not create further staff
    let response = post_json(
        &app,
        "/api/users/staff",
        Some(&admin),
        &serde_json::json!({
            "username": "sam",
            "email": "sam@example.com",
            "password": "secret123",
            "confirm_password": "secret123",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "STAFF");

    let staff = login(&app, "sam", "secret123").await;

    let response = post_json(
        &app,
        "/api/equipment",
        Some(&staff),
        &serde_json::json!({ "name": "Bench PSU", "purchase_price": "249.99", "category": "power_supply" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        &app,
        "/api/users/staff",
        Some(&staff),
        &serde_json::json!({
            "username": "eve",
            "email": "eve@example.com",
            "password": "secret123",
            "confirm_password": "secret123",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admins do not reserve equipment
    let response = post_json(
        &app,
        "/api/reservations",
        Some(&admin),
        &serde_json::json!({ "equipment_id": 1, "reservation_date": "2025-06-01" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_equipment_crud_and_category_coercion() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // Known category string, any case
    let response = post_json(
        &app,
        "/api/equipment",
        Some(&admin),
        &serde_json::json!({
            "name": "Torque screwdriver",
            "purchase_price": "89.50",
            "category": "tools",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["category"], "TOOLS");
    let id = body["data"]["id"].as_i64().unwrap();

    // Unknown category coerces to OTHER instead of failing
    let response = post_json(
        &app,
        "/api/equipment",
        Some(&admin),
        &serde_json::json!({
            "name": "Mystery box",
            "purchase_price": "0",
            "category": "xyz",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["category"], "OTHER");

    // Missing category also defaults to OTHER
    let response = post_json(
        &app,
        "/api/equipment",
        Some(&admin),
        &serde_json::json!({ "name": "Unlabeled crate", "purchase_price": "10" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["category"], "OTHER");

    // Negative price is a validation failure
    let response = post_json(
        &app,
        "/api/equipment",
        Some(&admin),
        &serde_json::json!({ "name": "Refund magnet", "purchase_price": "-5" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Update and delete round out the lifecycle
    let builder = Request::builder()
        .method("PUT")
        .uri(format!("/api/equipment/{id}"))
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, admin.as_str());
    let response = app
        .clone()
        .oneshot(
            builder
                .body(Body::from(
                    serde_json::json!({
                        "name": "Torque screwdriver set",
                        "purchase_price": "120.00",
                        "category": "TOOLS",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Torque screwdriver set");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/equipment/{id}"))
                .header(COOKIE, admin.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, &format!("/api/equipment/{id}"), Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reservation_conflict_scenario() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = post_json(
        &app,
        "/api/equipment",
        Some(&admin),
        &serde_json::json!({
            "name": "Laser cutter",
            "purchase_price": "3200",
            "category": "tools",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let equipment_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let alice = register(&app, "alice", "alice@example.com", "secret123").await;
    let bob = register(&app, "bob", "bob@example.com", "secret123").await;

    let request = serde_json::json!({
        "equipment_id": equipment_id,
        "reservation_date": "2025-06-01",
    });

    // Alice books the slot
    let response = post_json(&app, "/api/reservations", Some(&alice), &request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let reservation_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Bob is turned away for the same (equipment, date)
    let response = post_json(&app, "/api/reservations", Some(&bob), &request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A different day is fine
    let response = post_json(
        &app,
        "/api/reservations",
        Some(&bob),
        &serde_json::json!({
            "equipment_id": equipment_id,
            "reservation_date": "2025-06-02",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Bob cannot cancel Alice's reservation
    let response = post_json(
        &app,
        &format!("/api/reservations/{reservation_id}/cancel"),
        Some(&bob),
        &serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Alice cancels, freeing the slot for Bob
    let response = post_json(
        &app,
        &format!("/api/reservations/{reservation_id}/cancel"),
        Some(&alice),
        &serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(&app, "/api/reservations", Some(&bob), &request).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Alice's listing shows the cancelled row; Bob's shows two active ones
    let response = get(&app, "/api/reservations", Some(&alice)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["status"], "CANCELLED");
    assert_eq!(body["data"][0]["equipment_name"], "Laser cutter");

    let response = get(&app, "/api/reservations", Some(&bob)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Unknown equipment and malformed date are rejected
    let response = post_json(
        &app,
        "/api/reservations",
        Some(&bob),
        &serde_json::json!({ "equipment_id": 9999, "reservation_date": "2025-06-01" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(
        &app,
        "/api/reservations",
        Some(&bob),
        &serde_json::json!({ "equipment_id": equipment_id, "reservation_date": "yesterday" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forgot_password_is_enumeration_safe() {
    let app = spawn_app().await;
    register(&app, "alice", "alice@example.com", "secret123").await;

    let known = post_json(
        &app,
        "/api/auth/forgot-password",
        None,
        &serde_json::json!({ "email": "alice@example.com" }),
    )
    .await;
    assert_eq!(known.status(), StatusCode::OK);
    let known = body_json(known).await;

    let unknown = post_json(
        &app,
        "/api/auth/forgot-password",
        None,
        &serde_json::json!({ "email": "stranger@example.com" }),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::OK);
    let unknown = body_json(unknown).await;

    assert_eq!(known, unknown);
}

#[tokio::test]
async fn test_reset_password_rejects_bad_tokens() {
    let app = spawn_app().await;

    let response = get(&app, "/api/auth/reset-password/bogus-token", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["valid"], false);

    let response = post_json(
        &app,
        "/api/auth/reset-password",
        None,
        &serde_json::json!({
            "token": "bogus-token",
            "new_password": "newsecret1",
            "confirm_password": "newsecret1",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_routes_render_the_envelope() {
    let app = spawn_app().await;

    let response = get(&app, "/api/does-not-exist", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_logout_clears_the_session() {
    let app = spawn_app().await;
    let cookie = register(&app, "alice", "alice@example.com", "secret123").await;

    let response = get(&app, "/api/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(&app, "/api/auth/logout", Some(&cookie), &serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
