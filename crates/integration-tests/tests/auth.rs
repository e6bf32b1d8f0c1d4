//! Login, session and account management over HTTP.

use phone_dialer_integration_tests::TestServer;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_login_session_logout() {
    let server = TestServer::start().await;
    let client = server.login("sales1", "sales123", "salesperson").await;

    let resp = client
        .get(server.url("/api/auth/session"))
        .send()
        .await
        .expect("Failed to get session");
    assert_eq!(resp.status(), StatusCode::OK);
    let user: Value = resp.json().await.expect("Failed to parse session");
    assert_eq!(user["username"], "sales1");
    assert_eq!(user["role"], "salesperson");
    assert_eq!(user["name"], "Salesperson 1");

    let resp = client
        .post(server.url("/api/auth/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse logout");
    assert_eq!(body, json!({ "success": true }));

    let resp = client
        .get(server.url("/api/auth/session"))
        .send()
        .await
        .expect("Failed to get session");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_response_shape() {
    let server = TestServer::start().await;
    let resp = server
        .client()
        .post(server.url("/api/auth/login"))
        .json(&json!({ "username": "admin", "password": "admin123", "role": "admin" }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse login");
    assert_eq!(
        body,
        json!({
            "success": true,
            "user": { "username": "admin", "role": "admin", "name": "System Administrator" }
        })
    );
}

#[tokio::test]
async fn test_login_role_mismatch() {
    let server = TestServer::start().await;
    let resp = server
        .client()
        .post(server.url("/api/auth/login"))
        .json(&json!({ "username": "sales1", "password": "sales123", "role": "admin" }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_account_lifecycle() {
    let server = TestServer::start().await;
    let admin = server.login("admin", "admin123", "admin").await;

    let resp = admin
        .post(server.url("/api/users"))
        .json(&json!({
            "username": "sales4",
            "password": "pw4",
            "role": "salesperson",
            "name": "Salesperson 4"
        }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = admin
        .post(server.url("/api/users"))
        .json(&json!({ "username": "sales4", "password": "x", "role": "salesperson" }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    server.login("sales4", "pw4", "salesperson").await;

    let resp = admin
        .delete(server.url("/api/users/sales4"))
        .send()
        .await
        .expect("Failed to delete user");
    assert_eq!(resp.status(), StatusCode::OK);

    let users: Value = admin
        .get(server.url("/api/users"))
        .send()
        .await
        .expect("Failed to list users")
        .json()
        .await
        .expect("Failed to parse users");
    assert!(users.get("sales4").is_none());
    assert_eq!(users["admin"]["role"], "admin");
}

#[tokio::test]
async fn test_admin_cannot_be_deleted() {
    let server = TestServer::start().await;

    for client in [
        server.login("admin", "admin123", "admin").await,
        server.login("sales1", "sales123", "salesperson").await,
    ] {
        let resp = client
            .delete(server.url("/api/users/admin"))
            .send()
            .await
            .expect("Failed to send delete");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    let admin = server.login("admin", "admin123", "admin").await;
    let users: Value = admin
        .get(server.url("/api/users"))
        .send()
        .await
        .expect("Failed to list users")
        .json()
        .await
        .expect("Failed to parse users");
    assert!(users.get("admin").is_some());
}

#[tokio::test]
async fn test_salesperson_cannot_manage_accounts() {
    let server = TestServer::start().await;
    let client = server.login("sales1", "sales123", "salesperson").await;

    let resp = client
        .get(server.url("/api/users"))
        .send()
        .await
        .expect("Failed to list users");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .delete(server.url("/api/users/sales2"))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
