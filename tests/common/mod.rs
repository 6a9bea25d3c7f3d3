// Common test utilities and fixtures

#![allow(dead_code)]

use jobfill::{FillerConfig, StoredProfile, WriterSettings};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Application form with one control of every kind a fill run handles
pub const APPLICATION_FORM: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Backend Engineer - Acme</title></head>
<body>
    <h1>Backend Engineer</h1>
    <p>We build payment systems in Rust.</p>
    <form>
        <label for="name">Full name*</label>
        <input id="name" name="name">
        <label for="email">Email:</label>
        <input id="email" type="email">
        <label for="years">Years of experience</label>
        <input id="years" type="number">
        <label for="country">Country</label>
        <select id="country">
            <option value="">Select...</option>
            <option value="us">United States</option>
            <option value="de">Germany</option>
        </select>
        <label for="why">Why Acme?</label>
        <textarea id="why"></textarea>
        <label><input type="radio" name="visa_sponsorship" value="yes"> Yes</label>
        <label><input type="radio" name="visa_sponsorship" value="no"> No</label>
        <label for="cv">Resume/CV</label>
        <input id="cv" type="file">
    </form>
</body>
</html>
"#;

/// Answers for [`APPLICATION_FORM`], in field order
pub const FORM_ANSWERS: &[&str] = &[
    "Jane Doe",
    "jane@example.com",
    "7 years",
    "Germany",
    "I enjoy building reliable payment systems.",
    "No",
];

/// Page without a single fillable control
pub const EMPTY_PAGE: &str = r#"
<html><head><title>Careers</title></head>
<body><h1>No openings</h1><button>Subscribe</button></body></html>
"#;

pub const RESUME: &str = "Jane Doe\nSenior Rust engineer, 7 years building payment systems.";

/// Profile with credentials and an uploadable PDF
pub fn profile() -> StoredProfile {
    let mut profile = StoredProfile {
        api_key: Some("test-key".into()),
        resume_text: Some(RESUME.into()),
        ..Default::default()
    };
    profile.set_resume_file("jane-doe.pdf", "application/pdf", b"%PDF-1.4 test");
    profile
}

/// Config pointed at a mock API, with no pauses between writes
pub fn config(server: &MockServer, models: &[&str]) -> FillerConfig {
    FillerConfig {
        api_base: server.uri(),
        models: models.iter().map(|m| m.to_string()).collect(),
        writer: WriterSettings::immediate(),
        ..Default::default()
    }
}

/// Successful generateContent reply carrying `text`
pub fn model_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    }))
}

/// Reply holding `answers` as a fenced JSON array, the way models tend to answer
pub fn answers_reply(answers: &[&str]) -> ResponseTemplate {
    let array = serde_json::to_string_pretty(answers).unwrap_or_default();
    model_reply(&format!("```json\n{}\n```", array))
}

/// Mount `response` for one model, expecting exactly `calls` requests
pub async fn mount_model(server: &MockServer, model: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/models/{}:generateContent", model)))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}
