use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use serde_json::Value;

use crate::enquiry::{
    enquiry_router, DeliveryReceipt, EnquiryForm, EnquiryNotifier, FormProfile, Mailer,
    MailerError, NotificationMessage, NotifierSettings,
};

pub(super) const SENDER: &str = "ABB Tutoring <noreply@abbtutoring.org>";
pub(super) const INBOX: &str = "tutors@abbtutoring.org";

/// Records every attempted send; individual attempts can be scripted to fail.
#[derive(Default)]
pub(super) struct RecordingMailer {
    attempts: Mutex<Vec<NotificationMessage>>,
    failing_attempts: Vec<usize>,
    unconfigured: bool,
}

impl RecordingMailer {
    pub(super) fn failing_admin() -> Self {
        Self {
            failing_attempts: vec![0],
            ..Self::default()
        }
    }

    pub(super) fn failing_parent() -> Self {
        Self {
            failing_attempts: vec![1],
            ..Self::default()
        }
    }

    pub(super) fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Self::default()
        }
    }

    pub(super) fn attempts(&self) -> Vec<NotificationMessage> {
        self.attempts.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &NotificationMessage) -> Result<DeliveryReceipt, MailerError> {
        let attempt = {
            let mut guard = self.attempts.lock().expect("mailer mutex poisoned");
            guard.push(message.clone());
            guard.len() - 1
        };

        if self.failing_attempts.contains(&attempt) {
            return Err(MailerError::Rejected {
                status: 422,
                body: "invalid recipient".to_string(),
            });
        }

        Ok(DeliveryReceipt {
            provider_id: Some(format!("msg-{attempt}")),
        })
    }

    fn is_configured(&self) -> bool {
        !self.unconfigured
    }
}

#[derive(Default)]
pub(super) struct PanickingMailer {
    pub(super) calls: AtomicUsize,
}

#[async_trait]
impl Mailer for PanickingMailer {
    async fn send(&self, _message: &NotificationMessage) -> Result<DeliveryReceipt, MailerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("provider client blew up");
    }

    fn is_configured(&self) -> bool {
        true
    }
}

pub(super) fn settings() -> NotifierSettings {
    NotifierSettings {
        sender: SENDER.to_string(),
        admin_inbox: Some(INBOX.to_string()),
    }
}

pub(super) fn notifier<M>(mailer: Arc<M>) -> Arc<EnquiryNotifier<M>>
where
    M: Mailer + 'static,
{
    Arc::new(EnquiryNotifier::new(mailer, settings()))
}

pub(super) fn router_with<M>(mailer: Arc<M>) -> axum::Router
where
    M: Mailer + 'static,
{
    enquiry_router(notifier(mailer), &FormProfile::builtins())
}

pub(super) fn form() -> EnquiryForm {
    EnquiryForm {
        parent_name: "Alice Nguyen".to_string(),
        student_name: "Ben Nguyen".to_string(),
        contact_email: "alice@example.com".to_string(),
        phone: Some("0400 000 000".to_string()),
        year_level: "10".to_string(),
        exam_pathway: "HSC".to_string(),
        subjects: Some("Maths, English".to_string()),
        notes: Some("line1\nline2".to_string()),
    }
}

pub(super) fn minimal_form() -> EnquiryForm {
    EnquiryForm {
        phone: None,
        subjects: None,
        notes: None,
        ..form()
    }
}

pub(super) fn consultation_json() -> Value {
    serde_json::json!({
        "parentName": "A",
        "studentName": "B",
        "contactEmail": "a@x.com",
        "grade": "10",
        "examPathway": "HSC",
    })
}

pub(super) fn json_request(method: Method, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("serialize payload")))
        .expect("request builds")
}

pub(super) fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
