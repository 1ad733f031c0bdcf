use std::sync::Arc;

use axum::http::Method;

use super::common::*;
use crate::enquiry::service::PARENT_DELIVERY_WARNING;
use crate::enquiry::{
    EnquiryNotifier, FormProfile, MessageBody, NotifierSettings, SubmissionError,
    SubmissionOutcome,
};

#[tokio::test]
async fn both_sends_succeed() {
    let mailer = Arc::new(RecordingMailer::default());
    let service = notifier(mailer.clone());

    let outcome = service
        .submit(&FormProfile::consultation(), &form())
        .await
        .expect("submission delivered");

    assert_eq!(outcome, SubmissionOutcome::Delivered);
    let attempts = mailer.attempts();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].to, INBOX);
    assert_eq!(attempts[1].to, "alice@example.com");
    assert!(attempts.iter().all(|message| message.from == SENDER));
    assert!(matches!(attempts[0].body, MessageBody::Html(_)));
}

#[tokio::test]
async fn admin_failure_skips_parent_confirmation() {
    let mailer = Arc::new(RecordingMailer::failing_admin());
    let service = notifier(mailer.clone());

    let err = service
        .submit(&FormProfile::consultation(), &form())
        .await
        .expect_err("admin failure is fatal");

    assert!(matches!(err, SubmissionError::AdminDelivery(_)));
    assert_eq!(err.public_message(), "Failed to send admin email");
    assert_eq!(mailer.attempts().len(), 1);
}

#[tokio::test]
async fn parent_failure_becomes_a_warning() {
    let mailer = Arc::new(RecordingMailer::failing_parent());
    let service = notifier(mailer.clone());

    let outcome = service
        .submit(&FormProfile::send_consultation(), &form())
        .await
        .expect("admin copy delivered");

    assert_eq!(
        outcome,
        SubmissionOutcome::DeliveredWithWarning(PARENT_DELIVERY_WARNING.to_string())
    );
    assert_eq!(mailer.attempts().len(), 2);
    assert!(matches!(mailer.attempts()[1].body, MessageBody::Text(_)));
}

#[tokio::test]
async fn missing_api_key_short_circuits_before_sending() {
    let mailer = Arc::new(RecordingMailer::unconfigured());
    let service = notifier(mailer.clone());

    let err = service
        .process(
            &FormProfile::consultation(),
            &Method::POST,
            Some("application/json"),
            consultation_json().to_string().as_bytes(),
        )
        .await
        .expect_err("unconfigured mailer rejected");

    assert!(matches!(&err, SubmissionError::Misconfigured(missing) if missing == "RESEND_API_KEY"));
    assert_eq!(err.public_message(), "Server misconfigured");
    assert!(mailer.attempts().is_empty());
}

#[tokio::test]
async fn missing_inbox_short_circuits_before_sending() {
    let mailer = Arc::new(RecordingMailer::default());
    let service = EnquiryNotifier::new(
        mailer.clone(),
        NotifierSettings {
            sender: SENDER.to_string(),
            admin_inbox: None,
        },
    );

    let err = service
        .submit(&FormProfile::waitlist(), &form())
        .await
        .expect_err("no inbox configured");

    assert!(matches!(&err, SubmissionError::Misconfigured(missing) if missing == "ABB_ENQUIRY_EMAIL"));
    assert!(mailer.attempts().is_empty());
}

#[tokio::test]
async fn process_rejects_non_post_before_anything_else() {
    let mailer = Arc::new(RecordingMailer::unconfigured());
    let service = notifier(mailer.clone());

    let err = service
        .process(&FormProfile::consultation(), &Method::GET, None, b"")
        .await
        .expect_err("GET rejected");

    assert!(matches!(err, SubmissionError::MethodNotAllowed(ref method) if *method == Method::GET));
    assert!(mailer.attempts().is_empty());
}

#[tokio::test]
async fn process_reports_missing_fields_without_sending() {
    let mailer = Arc::new(RecordingMailer::default());
    let service = notifier(mailer.clone());

    let err = service
        .process(
            &FormProfile::consultation(),
            &Method::POST,
            Some("application/json"),
            br#"{"parentName":"A"}"#,
        )
        .await
        .expect_err("incomplete submission");

    match err {
        SubmissionError::MissingFields(missing) => assert_eq!(
            missing.0,
            vec!["studentName", "contactEmail", "grade", "examPathway"]
        ),
        other => panic!("unexpected error: {other}"),
    }
    assert!(mailer.attempts().is_empty());
}

#[tokio::test]
async fn process_surfaces_malformed_json() {
    let mailer = Arc::new(RecordingMailer::default());
    let service = notifier(mailer.clone());

    let err = service
        .process(
            &FormProfile::consultation(),
            &Method::POST,
            Some("application/json"),
            b"{not json",
        )
        .await
        .expect_err("malformed body");

    assert!(matches!(err, SubmissionError::MalformedBody(_)));
    assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(mailer.attempts().is_empty());
}

#[test]
fn acknowledgement_uses_profile_key() {
    let delivered = SubmissionOutcome::Delivered.acknowledgement("ok");
    assert_eq!(delivered, serde_json::json!({ "ok": true }));

    let warned = SubmissionOutcome::DeliveredWithWarning("careful".to_string())
        .acknowledgement("success");
    assert_eq!(
        warned,
        serde_json::json!({ "success": true, "warning": "careful" })
    );
}
