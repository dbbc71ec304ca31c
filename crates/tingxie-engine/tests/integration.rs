use mockito::{Matcher, Server};
use tingxie_core::{TranscriptionError, TranscriptionRequest};
use tingxie_engine::{EngineRegistry, TranscriptionEngine};

fn request(api_key: &str) -> TranscriptionRequest {
    TranscriptionRequest {
        audio: b"RIFF\x00\x00\x00\x00WAVE".to_vec(),
        filename: "lesson.wav".to_string(),
        content_type: Some("audio/wav".to_string()),
        language: "zh".to_string(),
        temperature: 0.0,
        api_key: api_key.to_string(),
    }
}

async fn openai_engine(base_url: &str) -> Box<dyn TranscriptionEngine> {
    let mut table = toml::map::Map::new();
    table.insert(
        "base_url".to_string(),
        toml::Value::String(base_url.to_string()),
    );
    EngineRegistry::new()
        .build("openai", toml::Value::Table(table))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_openai_transcribe_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/audio/transcriptions")
        .match_header("authorization", "Bearer sk-request")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="model"\r\n\r\nwhisper-1"#.to_string()),
            Matcher::Regex(r#"name="language"\r\n\r\nzh"#.to_string()),
            Matcher::Regex(r#"name="temperature"\r\n\r\n0"#.to_string()),
            Matcher::Regex(r#"filename="lesson.wav""#.to_string()),
            Matcher::Regex(r#"(?i)content-type: audio/wav\r\n"#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text":"  你好，世界 ","language":"chinese"}"#)
        .create_async()
        .await;

    let engine = openai_engine(&server.url()).await;
    let result = engine.transcribe(request("sk-request")).await.unwrap();
    assert_eq!(result.text, "  你好，世界 ");
    assert_eq!(result.language.as_deref(), Some("chinese"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_transcribe_auth_failure_maps_to_api_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/audio/transcriptions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"Incorrect API key provided: sk-bad"}}"#)
        .create_async()
        .await;

    let engine = openai_engine(&server.url()).await;
    match engine.transcribe(request("sk-bad")).await {
        Err(TranscriptionError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert!(message.contains("Incorrect API key"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_openai_transcribe_rejects_body_without_text() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/audio/transcriptions")
        .with_status(200)
        .with_body(r#"{"segments":[]}"#)
        .create_async()
        .await;

    let engine = openai_engine(&server.url()).await;
    let result = engine.transcribe(request("sk")).await;
    assert!(matches!(result, Err(TranscriptionError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_openai_transcribe_rejects_non_json_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/audio/transcriptions")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let engine = openai_engine(&server.url()).await;
    let result = engine.transcribe(request("sk")).await;
    assert!(matches!(result, Err(TranscriptionError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_openai_transcribe_connection_refused() {
    // Nothing listens on port 9 locally.
    let engine = openai_engine("http://127.0.0.1:9").await;
    let result = engine.transcribe(request("sk")).await;
    assert!(matches!(result, Err(TranscriptionError::Request(_))));
}

#[tokio::test]
async fn test_null_engine_through_registry() {
    let mut table = toml::map::Map::new();
    table.insert("text".to_string(), toml::Value::String("谢谢".to_string()));
    let engine = EngineRegistry::new()
        .build("null", toml::Value::Table(table))
        .await
        .unwrap();
    let result = engine.transcribe(request("unused")).await.unwrap();
    assert_eq!(result.text, "谢谢");
}

#[tokio::test]
async fn test_unknown_engine_fails_to_build() {
    let result = EngineRegistry::new()
        .build("deepgram", toml::Value::Table(Default::default()))
        .await;
    assert!(matches!(result, Err(TranscriptionError::EngineNotFound(_))));
}
