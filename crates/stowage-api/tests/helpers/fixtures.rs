use axum_test::{TestResponse, TestServer};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::time::Duration;

pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn create_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("Failed to encode png");
    buffer
}

pub async fn create_node(client: &TestServer, token: &str, body: Value) -> TestResponse {
    client
        .post("/files")
        .add_header("X-Token", token.to_string())
        .json(&body)
        .await
}

pub async fn create_folder(client: &TestServer, token: &str, name: &str, parent_id: &str) -> Value {
    let response = create_node(
        client,
        token,
        json!({ "name": name, "type": "folder", "parentId": parent_id }),
    )
    .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    response.json::<Value>()
}

pub async fn create_file(
    client: &TestServer,
    token: &str,
    name: &str,
    parent_id: &str,
    content: &[u8],
) -> Value {
    let response = create_node(
        client,
        token,
        json!({
            "name": name,
            "type": "file",
            "parentId": parent_id,
            "data": encode(content),
        }),
    )
    .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    response.json::<Value>()
}

/// Poll `GET /files/{id}/data?size={size}` until the variant exists.
pub async fn wait_for_thumbnail(
    client: &TestServer,
    token: &str,
    id: &str,
    size: u32,
) -> TestResponse {
    for _ in 0..200 {
        let response = client
            .get(&format!("/files/{}/data", id))
            .add_query_param("size", size)
            .add_header("X-Token", token.to_string())
            .await;
        if response.status_code() == 200 {
            return response;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("thumbnail {size} for {id} was never generated");
}
