// Unit tests for résumé import and PDF text extraction

use super::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    }))
}

fn pdf() -> ResumeFile {
    ResumeFile {
        name: "cv.pdf".into(),
        mime_type: "application/pdf".into(),
        bytes: b"%PDF-1.4 fake".to_vec(),
    }
}

fn models(names: &[&str]) -> Vec<String> {
    names.iter().map(|m| m.to_string()).collect()
}

#[tokio::test]
async fn test_import_text_resume() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("resume.TXT");
    std::fs::write(&file, "Jane Doe\nRust engineer").unwrap();
    let store = ProfileStore::with_path(dir.path().join("profile.json"));

    let imported = import_resume(&file, &store, false, &FillerConfig::default())
        .await
        .unwrap();

    assert_eq!(imported, ImportedResume::Text { chars: 22 });
    assert_eq!(store.load().unwrap().resume_text(), Some("Jane Doe\nRust engineer"));
}

#[tokio::test]
async fn test_import_rejects_empty_and_unknown_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProfileStore::with_path(dir.path().join("profile.json"));

    let empty = dir.path().join("empty.txt");
    std::fs::write(&empty, "  \n").unwrap();
    assert!(
        import_resume(&empty, &store, false, &FillerConfig::default())
            .await
            .is_err()
    );

    let docx = dir.path().join("cv.docx");
    std::fs::write(&docx, "binary").unwrap();
    let err = import_resume(&docx, &store, false, &FillerConfig::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unsupported resume type"));
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_import_pdf_without_extraction_keeps_text() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("cv.pdf");
    std::fs::write(&file, b"%PDF-1.4").unwrap();
    let store = ProfileStore::with_path(dir.path().join("profile.json"));
    store
        .update(|p| p.resume_text = Some("typed resume".into()))
        .unwrap();

    let imported = import_resume(&file, &store, false, &FillerConfig::default())
        .await
        .unwrap();

    assert_eq!(
        imported,
        ImportedResume::Pdf {
            file_name: "cv.pdf".into(),
            extracted_chars: None
        }
    );
    let profile = store.load().unwrap();
    assert_eq!(profile.resume_text(), Some("typed resume"));
    let stored = profile.resume_file().unwrap().unwrap();
    assert_eq!(stored.name, "cv.pdf");
    assert_eq!(stored.bytes, b"%PDF-1.4");
}

#[tokio::test]
async fn test_extraction_needs_an_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("cv.pdf");
    std::fs::write(&file, b"%PDF-1.4").unwrap();
    let store = ProfileStore::with_path(dir.path().join("profile.json"));

    let err = import_resume(&file, &store, true, &FillerConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FillError>(),
        Some(FillError::NoCredentials)
    ));
}

#[tokio::test]
async fn test_import_pdf_with_extraction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/pdf-model:generateContent"))
        .and(query_param("key", "secret"))
        .respond_with(reply("Jane Doe, Rust engineer since 2015"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("cv.pdf");
    std::fs::write(&file, b"%PDF-1.4").unwrap();
    let store = ProfileStore::with_path(dir.path().join("profile.json"));
    store.update(|p| p.api_key = Some("secret".into())).unwrap();
    let config = FillerConfig {
        api_base: server.uri(),
        extraction_models: models(&["pdf-model"]),
        ..Default::default()
    };

    let imported = import_resume(&file, &store, true, &config).await.unwrap();

    assert_eq!(
        imported,
        ImportedResume::Pdf {
            file_name: "cv.pdf".into(),
            extracted_chars: Some(34)
        }
    );
    let profile = store.load().unwrap();
    assert!(profile.has_credentials());
    assert_eq!(profile.resume_text(), Some("Jane Doe, Rust engineer since 2015"));
}

#[tokio::test]
async fn test_short_extraction_falls_through_to_next_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/a:generateContent"))
        .respond_with(reply("oops"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/b:generateContent"))
        .respond_with(reply("Experienced Rust developer"))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri()).unwrap();
    let text = extract_pdf_text(&client, "k", &models(&["a", "b"]), &pdf())
        .await
        .unwrap();

    assert_eq!(text, "Experienced Rust developer");
}

#[tokio::test]
async fn test_quota_stops_extraction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/a:generateContent"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/b:generateContent"))
        .respond_with(reply("never reached"))
        .expect(0)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri()).unwrap();
    let err = extract_pdf_text(&client, "k", &models(&["a", "b"]), &pdf())
        .await
        .unwrap_err();

    assert!(matches!(err, FillError::QuotaExceeded));
}

#[tokio::test]
async fn test_all_extraction_models_failing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri()).unwrap();
    let err = extract_pdf_text(&client, "k", &models(&["a", "b"]), &pdf())
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), 5);
    match err {
        FillError::AllModelsFailed { last } => {
            assert_eq!(last.to_string(), "Model b unavailable: model not found")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
