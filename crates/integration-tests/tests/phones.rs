//! Working lists and call records over HTTP.

use phone_dialer_integration_tests::TestServer;
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn phones(server: &TestServer, client: &reqwest::Client, username: &str) -> Value {
    client
        .get(server.url(&format!("/api/users/{username}/phones")))
        .send()
        .await
        .expect("Failed to get phones")
        .json()
        .await
        .expect("Failed to parse phones")
}

#[tokio::test]
async fn test_personal_list_flow() {
    let server = TestServer::start().await;
    let client = server.login("sales1", "sales123", "salesperson").await;

    let resp = client
        .post(server.url("/api/users/sales1/phones"))
        .json(&json!({ "phone": "(021) 5555-0000" }))
        .send()
        .await
        .expect("Failed to add phone");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(server.url("/api/users/sales1/phones"))
        .json(&json!({ "phone": "12-34" }))
        .send()
        .await
        .expect("Failed to add phone");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(server.url("/api/users/sales1/phones/bulk"))
        .json(&json!({ "phones": ["9000000", "13812345678", "9000000", "x"] }))
        .send()
        .await
        .expect("Failed to add bulk");
    let body: Value = resp.json().await.expect("Failed to parse bulk");
    assert_eq!(body["added"], 2);
    assert_eq!(
        body["phoneNumbers"],
        json!(["02155550000", "9000000", "13812345678"])
    );

    let resp = client
        .put(server.url("/api/users/sales1/phones/sort"))
        .json(&json!({ "order": "asc" }))
        .send()
        .await
        .expect("Failed to sort");
    let body: Value = resp.json().await.expect("Failed to parse sort");
    assert_eq!(
        body["phones"],
        json!(["9000000", "02155550000", "13812345678"])
    );

    let resp = client
        .delete(server.url("/api/users/sales1/phones/9000000"))
        .send()
        .await
        .expect("Failed to remove phone");
    assert_eq!(resp.status(), StatusCode::OK);

    let list = phones(&server, &client, "sales1").await;
    assert_eq!(list, json!({ "phones": ["02155550000", "13812345678"] }));

    let resp = client
        .delete(server.url("/api/users/sales1/phones"))
        .send()
        .await
        .expect("Failed to clear phones");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(phones(&server, &client, "sales1").await, json!({ "phones": [] }));
}

#[tokio::test]
async fn test_working_list_includes_assignment() {
    let server = TestServer::start().await;
    let admin = server.login("admin", "admin123", "admin").await;
    admin
        .put(server.url("/api/assignments"))
        .json(&json!({ "sales2": ["13900000001"] }))
        .send()
        .await
        .expect("Failed to put assignments");

    let client = server.login("sales2", "sales123", "salesperson").await;
    client
        .post(server.url("/api/users/sales2/phones/extract"))
        .json(&json!({ "text": "new lead 13900000002, old 13900000001" }))
        .send()
        .await
        .expect("Failed to extract");

    let list = phones(&server, &client, "sales2").await;
    assert_eq!(list, json!({ "phones": ["13900000001", "13900000002"] }));

    // Admins can read anyone's list.
    assert_eq!(phones(&server, &admin, "sales2").await, list);
}

#[tokio::test]
async fn test_salesperson_forbidden_on_other_user() {
    let server = TestServer::start().await;
    let client = server.login("sales1", "sales123", "salesperson").await;

    let resp = client
        .get(server.url("/api/users/sales2/phones"))
        .send()
        .await
        .expect("Failed to get phones");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .put(server.url("/api/userData/sales2"))
        .json(&json!({ "phones": [], "totalCalls": 0, "lastCallTime": null }))
        .send()
        .await
        .expect("Failed to put user data");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_record_call() {
    let server = TestServer::start().await;
    let client = server.login("sales3", "sales123", "salesperson").await;

    let resp = client
        .post(server.url("/api/users/sales3/calls"))
        .json(&json!({ "phone": "138 1234 5678" }))
        .send()
        .await
        .expect("Failed to record call");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse call");
    assert_eq!(body["totalCalls"], 1);
    assert_eq!(body["dialUri"], "tel:13812345678");

    let data: Value = client
        .get(server.url("/api/userData/sales3"))
        .send()
        .await
        .expect("Failed to get user data")
        .json()
        .await
        .expect("Failed to parse user data");
    assert_eq!(data["totalCalls"], 1);
    assert!(data["lastCallTime"].is_string());
}
