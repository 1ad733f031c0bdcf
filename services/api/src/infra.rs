use enquiry_notifier::config::MailConfig;
use enquiry_notifier::enquiry::{EnquiryNotifier, FormProfile, NotifierSettings, ResendMailer};
use enquiry_notifier::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the notifier once at startup; the HTTP client is shared by every request.
pub(crate) fn build_notifier(
    mail: &MailConfig,
) -> Result<Arc<EnquiryNotifier<ResendMailer>>, AppError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("enquiry-notifier/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let mailer = ResendMailer::new(client, mail.api_key.clone(), &mail.api_url);
    Ok(Arc::new(EnquiryNotifier::new(
        Arc::new(mailer),
        NotifierSettings::from(mail),
    )))
}

pub(crate) fn parse_profile(raw: &str) -> Result<FormProfile, String> {
    FormProfile::builtin(raw).ok_or_else(|| {
        let known: Vec<&str> = FormProfile::builtins()
            .iter()
            .map(|profile| profile.name)
            .collect();
        format!("unknown form profile '{raw}' (expected one of: {})", known.join(", "))
    })
}
