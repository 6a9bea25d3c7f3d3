// End-to-end fill runs against an in-memory page and a mock model API
use jobfill::port::NoticeLevel;
use jobfill::{
    AnswerRequester, DomSnapshot, FillError, FillState, MemoryDocument, Orchestrator,
    StoredProfile, WriteAction, WriteOutcome,
};
use pretty_assertions::assert_eq;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

mod common;
use common::{APPLICATION_FORM, EMPTY_PAGE, FORM_ANSWERS, answers_reply, config, mount_model, profile};

fn page(html: &str) -> MemoryDocument {
    MemoryDocument::from_html(html, "https://jobs.test/acme")
}

fn id(html: &str, element_id: &str) -> jobfill::NodeId {
    DomSnapshot::from_html(html).get_element_by_id(element_id).unwrap()
}

fn notices(page: &MemoryDocument) -> Vec<(String, NoticeLevel)> {
    page.journal()
        .into_iter()
        .filter_map(|a| match a {
            WriteAction::Notify { message, level } => Some((message, level)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_fill_application_form() {
    let server = MockServer::start().await;
    mount_model(&server, "model-a", answers_reply(FORM_ANSWERS), 1).await;
    let config = config(&server, &["model-a"]);
    let requester = AnswerRequester::new(&config).unwrap();
    let page = page(APPLICATION_FORM);

    let mut orchestrator = Orchestrator::new(&page, &requester, &config);
    assert_eq!(orchestrator.state(), &FillState::Idle);
    let report = orchestrator.run(&profile()).await.unwrap();
    assert_eq!(orchestrator.state(), &FillState::Done);

    assert_eq!(report.fields_found, 6);
    assert_eq!(report.files_found, 1);
    assert_eq!(report.fields_written, 6);
    assert_eq!(report.files_attached, 1);

    let outcomes: Vec<(&str, &WriteOutcome)> = report
        .fields
        .iter()
        .map(|f| (f.label.as_str(), &f.outcome))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("Full name", &WriteOutcome::Written("Jane Doe".into())),
            ("Email", &WriteOutcome::Written("jane@example.com".into())),
            ("Years of experience", &WriteOutcome::Written("7".into())),
            ("Country", &WriteOutcome::Selected("Germany".into())),
            (
                "Why Acme?",
                &WriteOutcome::Written("I enjoy building reliable payment systems.".into())
            ),
            ("visa sponsorship", &WriteOutcome::Selected("No".into())),
        ]
    );

    let country = id(APPLICATION_FORM, "country");
    assert_eq!(page.value(country).as_deref(), Some("de"));

    // The résumé is attached before any answer is written
    let journal = page.journal();
    let attach = journal
        .iter()
        .position(|a| matches!(a, WriteAction::AttachFile { .. }))
        .unwrap();
    let first_write = journal
        .iter()
        .position(|a| matches!(a, WriteAction::SetValue { .. }))
        .unwrap();
    assert!(attach < first_write);

    assert_eq!(
        notices(&page),
        vec![
            ("Scanning form fields...".to_string(), NoticeLevel::Info),
            (
                "Found 6 fields. Asking AI for answers...".to_string(),
                NoticeLevel::Info
            ),
            ("Filled 7 fields".to_string(), NoticeLevel::Success),
        ]
    );
}

#[tokio::test]
async fn test_blank_and_unmatched_answers_leave_controls_alone() {
    let server = MockServer::start().await;
    mount_model(
        &server,
        "model-a",
        answers_reply(&["Jane Doe", "", "", "Atlantis", "", "Maybe"]),
        1,
    )
    .await;
    let config = config(&server, &["model-a"]);
    let requester = AnswerRequester::new(&config).unwrap();
    let page = page(APPLICATION_FORM);

    let report = Orchestrator::new(&page, &requester, &config)
        .run(&profile())
        .await
        .unwrap();

    assert_eq!(report.fields_written, 1);
    assert_eq!(report.fields[1].outcome, WriteOutcome::Skipped);
    assert_eq!(report.fields[3].outcome, WriteOutcome::Unmatched);
    assert_eq!(report.fields[3].answer, "Atlantis");
    assert_eq!(report.fields[5].outcome, WriteOutcome::Unmatched);
    assert_eq!(page.value(id(APPLICATION_FORM, "country")).as_deref(), Some(""));
}

#[tokio::test]
async fn test_missing_credentials_fail_the_run() {
    let server = MockServer::start().await;
    mount_model(&server, "model-a", answers_reply(FORM_ANSWERS), 0).await;
    let config = config(&server, &["model-a"]);
    let requester = AnswerRequester::new(&config).unwrap();
    let page = page(APPLICATION_FORM);

    let mut orchestrator = Orchestrator::new(&page, &requester, &config);
    let err = orchestrator
        .run(&StoredProfile::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FillError::NoCredentials));
    assert!(matches!(orchestrator.state(), FillState::Failed(_)));
    let notices = notices(&page);
    assert_eq!(notices.len(), 1);
    assert!(notices[0].0.starts_with("Error: API key or resume not found"));
    assert_eq!(notices[0].1, NoticeLevel::Error);
}

#[tokio::test]
async fn test_page_without_fields() {
    let server = MockServer::start().await;
    mount_model(&server, "model-a", answers_reply(FORM_ANSWERS), 0).await;
    let config = config(&server, &["model-a"]);
    let requester = AnswerRequester::new(&config).unwrap();
    let page = page(EMPTY_PAGE);

    let err = Orchestrator::new(&page, &requester, &config)
        .run(&profile())
        .await
        .unwrap_err();

    assert!(matches!(err, FillError::NoFieldsFound));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_upload_only_page_attaches_without_asking() {
    let html = r#"<label for="cv">Resume</label><input id="cv" type="file">"#;
    let server = MockServer::start().await;
    mount_model(&server, "model-a", answers_reply(&[]), 0).await;
    let config = config(&server, &["model-a"]);
    let requester = AnswerRequester::new(&config).unwrap();
    let page = page(html);

    let report = Orchestrator::new(&page, &requester, &config)
        .run(&profile())
        .await
        .unwrap();

    assert_eq!(report.fields_found, 0);
    assert_eq!(report.files_attached, 1);
    assert!(page.journal().contains(&WriteAction::AttachFile {
        node: id(html, "cv"),
        name: "jane-doe.pdf".into(),
        mime_type: "application/pdf".into(),
        size: 13,
    }));
}

#[tokio::test]
async fn test_quota_error_after_files_attached() {
    let server = MockServer::start().await;
    mount_model(&server, "model-a", ResponseTemplate::new(429), 1).await;
    mount_model(&server, "model-b", answers_reply(FORM_ANSWERS), 0).await;
    let config = config(&server, &["model-a", "model-b"]);
    let requester = AnswerRequester::new(&config).unwrap();
    let page = page(APPLICATION_FORM);

    let mut orchestrator = Orchestrator::new(&page, &requester, &config);
    let err = orchestrator.run(&profile()).await.unwrap_err();

    assert!(matches!(err, FillError::QuotaExceeded));
    assert!(matches!(orchestrator.state(), FillState::Failed(msg) if msg.starts_with("Quota exceeded")));
    let journal = page.journal();
    assert!(journal.iter().any(|a| matches!(a, WriteAction::AttachFile { .. })));
    assert!(!journal.iter().any(|a| matches!(a, WriteAction::SetValue { .. })));
}
