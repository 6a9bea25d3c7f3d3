// Unit tests for the line-delimited message loop

use super::*;
use std::sync::Mutex;
use tokio::io::BufReader;

#[derive(Default)]
struct RecordingHandler {
    calls: Mutex<Vec<Option<String>>>,
    fail_with: Option<fn() -> FillError>,
}

#[async_trait]
impl FillHandler for RecordingHandler {
    async fn fill_form(&self, url: Option<&str>) -> Result<(), FillError> {
        self.calls.lock().unwrap().push(url.map(str::to_string));
        match self.fail_with {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

async fn run(handler: &RecordingHandler, input: &str) -> Vec<serde_json::Value> {
    let mut output = Vec::new();
    serve(BufReader::new(input.as_bytes()), &mut output, handler)
        .await
        .unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_response_serialization() {
    assert_eq!(
        serde_json::to_string(&BridgeResponse::ok()).unwrap(),
        r#"{"success":true}"#
    );
    assert_eq!(
        serde_json::to_string(&BridgeResponse::failed("boom")).unwrap(),
        r#"{"success":false,"error":"boom"}"#
    );
}

#[tokio::test]
async fn test_fill_form_success() {
    let handler = RecordingHandler::default();

    let responses = run(
        &handler,
        "{\"action\":\"fillForm\"}\n{\"action\":\"fillForm\",\"url\":\"https://jobs.test/a\"}\n",
    )
    .await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0], serde_json::json!({"success": true}));
    assert_eq!(
        *handler.calls.lock().unwrap(),
        vec![None, Some("https://jobs.test/a".to_string())]
    );
}

#[tokio::test]
async fn test_failure_carries_error_text() {
    let handler = RecordingHandler {
        fail_with: Some(|| FillError::NoFieldsFound),
        ..Default::default()
    };

    let responses = run(&handler, "{\"action\":\"fillForm\"}\n").await;

    assert_eq!(
        responses,
        vec![serde_json::json!({
            "success": false,
            "error": "No form fields found on this page"
        })]
    );
}

#[tokio::test]
async fn test_unknown_action_and_malformed_lines() {
    let handler = RecordingHandler::default();

    let responses = run(&handler, "{\"action\":\"ping\"}\n\n   \nnot json\n").await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"], "Unknown action: ping");
    assert_eq!(responses[1]["success"], false);
    assert!(
        responses[1]["error"]
            .as_str()
            .unwrap()
            .starts_with("Malformed message")
    );
    assert!(handler.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_input_ends_cleanly() {
    let handler = RecordingHandler::default();
    assert!(run(&handler, "").await.is_empty());
}
