use crate::infra::parse_profile;
use chrono::{DateTime, Utc};
use clap::Args;
use enquiry_notifier::config::AppConfig;
use enquiry_notifier::enquiry::{
    admin_notification, decode_fields, parent_confirmation, EnquiryForm, FormProfile,
    NotificationMessage, SubmissionError,
};
use enquiry_notifier::error::AppError;
use std::fmt::Write as _;
use std::path::PathBuf;

const INBOX_PLACEHOLDER: &str = "(ABB_ENQUIRY_EMAIL not set)";

#[derive(Args, Debug)]
pub(crate) struct PreviewArgs {
    /// Form profile to render with (consultation, send-consultation, waitlist)
    #[arg(long, value_parser = parse_profile)]
    pub(crate) profile: FormProfile,
    /// File holding a sample request body
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Content type the body would be posted with
    #[arg(long)]
    pub(crate) content_type: Option<String>,
}

pub(crate) fn run_preview(args: PreviewArgs) -> Result<(), AppError> {
    let PreviewArgs {
        profile,
        input,
        content_type,
    } = args;

    let config = AppConfig::load()?;
    let body = std::fs::read(&input)?;
    let inbox = config
        .mail
        .admin_inbox
        .as_deref()
        .unwrap_or(INBOX_PLACEHOLDER);

    let rendered = render_preview(
        &profile,
        content_type.as_deref(),
        &body,
        &config.mail.sender,
        inbox,
        Utc::now(),
    )?;
    print!("{rendered}");
    Ok(())
}

/// Decodes and renders a submission exactly as the HTTP route would.
pub(crate) fn render_preview(
    profile: &FormProfile,
    content_type: Option<&str>,
    body: &[u8],
    sender: &str,
    inbox: &str,
    received_at: DateTime<Utc>,
) -> Result<String, SubmissionError> {
    let fields = decode_fields(content_type, body)?;
    let form = EnquiryForm::from_fields(&fields, &profile.fields)
        .map_err(SubmissionError::MissingFields)?;

    let admin = admin_notification(profile, &form, sender, inbox, received_at);
    let parent = parent_confirmation(profile, &form, sender);

    let mut out = String::new();
    let _ = writeln!(out, "Profile: {} ({})", profile.name, profile.path);
    write_message(&mut out, "Admin notification", &admin);
    write_message(&mut out, "Parent confirmation", &parent);
    Ok(out)
}

fn write_message(out: &mut String, heading: &str, message: &NotificationMessage) {
    let _ = writeln!(out, "\n--- {heading} ---");
    let _ = writeln!(out, "From: {}", message.from);
    let _ = writeln!(out, "To: {}", message.to);
    let _ = writeln!(out, "Subject: {}", message.subject);
    let _ = writeln!(out, "\n{}", message.body.as_str().trim_end());
}
