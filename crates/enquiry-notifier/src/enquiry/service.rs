use std::sync::Arc;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

use super::decode::{decode_fields, DecodeError};
use super::domain::{EnquiryForm, MissingFields};
use super::mailer::{Mailer, MailerError};
use super::profile::FormProfile;
use super::render::{admin_notification, parent_confirmation};
use crate::config::MailConfig;

pub const PARENT_DELIVERY_WARNING: &str = "Admin email sent, but parent email failed";

/// Addressing shared by every outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierSettings {
    pub sender: String,
    pub admin_inbox: Option<String>,
}

impl From<&MailConfig> for NotifierSettings {
    fn from(config: &MailConfig) -> Self {
        Self {
            sender: config.sender.clone(),
            admin_inbox: config.admin_inbox.clone(),
        }
    }
}

/// Result of a submission whose admin notification went out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Delivered,
    DeliveredWithWarning(String),
}

impl SubmissionOutcome {
    /// JSON acknowledgement returned to the form, e.g. `{"success": true}`.
    pub fn acknowledgement(&self, ack_key: &str) -> Value {
        let mut payload = Map::new();
        payload.insert(ack_key.to_string(), Value::Bool(true));
        if let SubmissionOutcome::DeliveredWithWarning(warning) = self {
            payload.insert("warning".to_string(), Value::String(warning.clone()));
        }
        Value::Object(payload)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),
    #[error("missing required fields: {0}")]
    MissingFields(MissingFields),
    #[error("server misconfigured: {0} not set")]
    Misconfigured(String),
    #[error(transparent)]
    MalformedBody(#[from] DecodeError),
    #[error("admin notification failed: {0}")]
    AdminDelivery(#[source] MailerError),
}

impl SubmissionError {
    pub fn status(&self) -> StatusCode {
        match self {
            SubmissionError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            SubmissionError::MissingFields(_) => StatusCode::BAD_REQUEST,
            SubmissionError::Misconfigured(_)
            | SubmissionError::MalformedBody(_)
            | SubmissionError::AdminDelivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the caller; internal detail stays in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            SubmissionError::MethodNotAllowed(_) => "Method not allowed",
            SubmissionError::MissingFields(_) => "Missing required fields",
            SubmissionError::Misconfigured(_) => "Server misconfigured",
            SubmissionError::MalformedBody(_) => "Malformed request body",
            SubmissionError::AdminDelivery(_) => "Failed to send admin email",
        }
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.public_message() }));
        let mut response = (self.status(), body).into_response();
        if let SubmissionError::MethodNotAllowed(_) = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

/// Validates submissions and dispatches the admin and parent emails.
pub struct EnquiryNotifier<M> {
    mailer: Arc<M>,
    settings: NotifierSettings,
}

impl<M> EnquiryNotifier<M>
where
    M: Mailer + 'static,
{
    pub fn new(mailer: Arc<M>, settings: NotifierSettings) -> Self {
        Self { mailer, settings }
    }

    pub fn settings(&self) -> &NotifierSettings {
        &self.settings
    }

    /// Returns the admin inbox, or an error naming whatever is missing.
    pub fn ensure_configured(&self) -> Result<&str, SubmissionError> {
        let mut missing = Vec::new();
        if !self.mailer.is_configured() {
            missing.push("RESEND_API_KEY");
        }
        let inbox = self.settings.admin_inbox.as_deref();
        if inbox.is_none() {
            missing.push("ABB_ENQUIRY_EMAIL");
        }

        match inbox {
            Some(inbox) if missing.is_empty() => Ok(inbox),
            _ => {
                let missing = missing.join(", ");
                error!(%missing, "email notifications are not configured");
                Err(SubmissionError::Misconfigured(missing))
            }
        }
    }

    /// Runs the full pipeline for one request against `profile`.
    pub async fn process(
        &self,
        profile: &FormProfile,
        method: &Method,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<SubmissionOutcome, SubmissionError> {
        if *method != Method::POST {
            return Err(SubmissionError::MethodNotAllowed(method.clone()));
        }

        self.ensure_configured()?;

        let fields = decode_fields(content_type, body).map_err(|err| {
            error!(profile = profile.name, error = %err, "failed to decode submission body");
            err
        })?;

        let form = EnquiryForm::from_fields(&fields, &profile.fields).map_err(|missing| {
            debug!(profile = profile.name, %missing, "submission rejected");
            SubmissionError::MissingFields(missing)
        })?;

        self.submit(profile, &form).await
    }

    /// Sends the admin notification, then the parent confirmation.
    ///
    /// The admin send is on the critical path: its failure fails the request and
    /// the parent is never emailed. A failed parent send only adds a warning.
    pub async fn submit(
        &self,
        profile: &FormProfile,
        form: &EnquiryForm,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let inbox = self.ensure_configured()?;

        let admin = admin_notification(profile, form, &self.settings.sender, inbox, Utc::now());
        if let Err(err) = self.mailer.send(&admin).await {
            error!(profile = profile.name, error = %err, "admin notification failed");
            return Err(SubmissionError::AdminDelivery(err));
        }

        let parent = parent_confirmation(profile, form, &self.settings.sender);
        match self.mailer.send(&parent).await {
            Ok(_) => {
                info!(profile = profile.name, "enquiry notifications delivered");
                Ok(SubmissionOutcome::Delivered)
            }
            Err(err) => {
                warn!(
                    profile = profile.name,
                    to = %parent.to,
                    error = %err,
                    "parent confirmation failed"
                );
                Ok(SubmissionOutcome::DeliveredWithWarning(
                    PARENT_DELIVERY_WARNING.to_string(),
                ))
            }
        }
    }
}
