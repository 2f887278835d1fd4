use base64::Engine as _;
use httpmock::MockServer;
use serde_json::json;

use super::*;

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(Client::new(), &server.url("/v1beta"), Some("gk".into()))
}

#[tokio::test]
async fn text_joins_parts() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path("/v1beta/models/gemini-2.5-flash:generateContent")
            .header("x-goog-api-key", "gk");
        then.status(200).json_body(json!({
            "candidates": [{ "content": { "parts": [{ "text": "one " }, { "text": "two" }] } }]
        }));
    });

    let out = client(&server)
        .text("gemini-2.5-flash", Some("sys"), "raw", 64)
        .await
        .unwrap();
    assert_eq!(out, "one two");
    mock.assert();
}

#[tokio::test]
async fn image_reads_inline_data_and_sends_reference() {
    let payload = base64::engine::general_purpose::STANDARD.encode(b"img");
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path(format!("/v1beta/models/{IMAGE_MODEL}:generateContent"))
            .body_includes("inlineData")
            .body_includes("\"aspectRatio\":\"4:5\"");
        then.status(200).json_body(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "here you go" },
                { "inlineData": { "mimeType": "image/png", "data": payload } }
            ] } }]
        }));
    });

    let out = client(&server)
        .image("scene", AspectRatio::Portrait4x5, Some(&b"\x89PNG\r\n\x1a\n"[..]))
        .await
        .unwrap();
    assert_eq!(out, b"img");
    mock.assert();
}

#[tokio::test]
async fn text_only_reply_to_image_request_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST");
        then.status(200).json_body(json!({
            "candidates": [{ "content": { "parts": [{ "text": "I cannot draw that" }] } }]
        }));
    });
    let err = client(&server)
        .image("scene", AspectRatio::Square, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CarouselError::Provider(_)));
}
