use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::json;

pub const TEST_PASSWORD: &str = "toto1234!";

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub fn basic_header(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", email, password)))
}

/// Register `email` and open a session for it.
pub async fn register_and_connect(client: &TestServer, email: &str) -> TestUser {
    let response = client
        .post("/users")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    let id = response.json::<serde_json::Value>()["id"]
        .as_str()
        .expect("user id")
        .to_string();

    let response = client
        .get("/connect")
        .add_header("Authorization", basic_header(email, TEST_PASSWORD))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    let token = response.json::<serde_json::Value>()["token"]
        .as_str()
        .expect("token")
        .to_string();

    TestUser {
        id,
        email: email.to_string(),
        token,
    }
}
