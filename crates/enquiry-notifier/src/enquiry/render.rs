use chrono::{DateTime, Utc};

use super::domain::{EnquiryForm, MessageBody, NotificationMessage};
use super::profile::{FormProfile, MessageFormat};

const NOT_PROVIDED: &str = "(not provided)";
const NONE: &str = "(none)";
const SIGNATURE_NAME: &str = "ABB Tutoring";
const SIGNATURE_TAGLINE: &str = "Selective · HSC · IB";

/// Operator copy of the submission, sent to the business inbox.
pub fn admin_notification(
    profile: &FormProfile,
    form: &EnquiryForm,
    sender: &str,
    inbox: &str,
    received_at: DateTime<Utc>,
) -> NotificationMessage {
    let body = match profile.format {
        MessageFormat::Html => MessageBody::Html(admin_html(profile, form, received_at)),
        MessageFormat::Text => MessageBody::Text(admin_text(profile, form, received_at)),
    };

    NotificationMessage {
        from: sender.to_string(),
        to: inbox.to_string(),
        subject: profile.admin_subject.to_string(),
        body,
    }
}

/// Courtesy confirmation echoing the submission back to the parent.
pub fn parent_confirmation(
    profile: &FormProfile,
    form: &EnquiryForm,
    sender: &str,
) -> NotificationMessage {
    let body = match profile.format {
        MessageFormat::Html => MessageBody::Html(parent_html(profile, form)),
        MessageFormat::Text => MessageBody::Text(parent_text(profile, form)),
    };

    NotificationMessage {
        from: sender.to_string(),
        to: form.contact_email.clone(),
        subject: profile.parent_subject.to_string(),
        body,
    }
}

fn received_label(received_at: DateTime<Utc>) -> String {
    received_at.format("%d %B %Y, %H:%M UTC").to_string()
}

fn admin_html(profile: &FormProfile, form: &EnquiryForm, received_at: DateTime<Utc>) -> String {
    let row = |label: &str, value: &str| format!("<p><strong>{label}:</strong> {value}</p>\n");

    let mut html = format!("<h2>{}</h2>\n", escape_html(profile.admin_title));
    html.push_str(&row("Parent name", &escape_html(&form.parent_name)));
    html.push_str(&row("Student name", &escape_html(&form.student_name)));
    html.push_str(&row("Contact email", &escape_html(&form.contact_email)));
    html.push_str(&row("Phone", &html_or(form.phone.as_deref(), NOT_PROVIDED)));
    html.push_str(&row("Year / grade", &escape_html(&form.year_level)));
    html.push_str(&row("Exam pathway", &escape_html(&form.exam_pathway)));
    html.push_str(&row("Subjects", &html_or(form.subjects.as_deref(), NONE)));
    html.push_str(&format!(
        "<p><strong>Notes:</strong><br>{}</p>\n",
        form.notes.as_deref().map(notes_html).unwrap_or_else(|| NONE.to_string())
    ));
    html.push_str(&row("Received", &received_label(received_at)));
    html
}

fn admin_text(profile: &FormProfile, form: &EnquiryForm, received_at: DateTime<Utc>) -> String {
    let phone = form.phone.as_deref().unwrap_or(NOT_PROVIDED);
    let subjects = form.subjects.as_deref().unwrap_or(NONE);
    let notes = form.notes.as_deref().unwrap_or(NONE);

    format!(
        "{title}\n\n\
         Parent or guardian: {parent}\n\
         Student: {student}\n\
         Year level: {year}\n\
         Pathway: {pathway}\n\
         Subjects or areas: {subjects}\n\n\
         Parent email: {email}\n\
         Parent phone: {phone}\n\n\
         Notes:\n{notes}\n\n\
         Received: {received}",
        title = profile.admin_title,
        parent = form.parent_name,
        student = form.student_name,
        year = form.year_level,
        pathway = form.exam_pathway,
        email = form.contact_email,
        received = received_label(received_at),
    )
}

fn parent_html(profile: &FormProfile, form: &EnquiryForm) -> String {
    let muted = "margin-top: 12px; font-size: 14px; color: #4b5563;";
    let mut html = String::from(
        "<div style=\"font-family: system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; line-height: 1.6; color: #111827;\">\n",
    );
    html.push_str(&format!(
        "<h2 style=\"margin-bottom: 8px;\">Thank you for contacting {SIGNATURE_NAME}</h2>\n"
    ));
    html.push_str(&format!("<p>Dear {},</p>\n", escape_html(&form.parent_name)));
    html.push_str(&format!(
        "<p>We have received your {} for <strong>{}</strong>. \
         One of our tutors will review your details and get back to you shortly to organise a time.</p>\n",
        profile.request_label,
        escape_html(&form.student_name)
    ));

    html.push_str(&format!("<p style=\"{muted}\">\n<strong>Summary of your submission:</strong><br>\n"));
    let summary = [
        ("Year / grade", escape_html(&form.year_level)),
        ("Exam pathway", escape_html(&form.exam_pathway)),
        ("Subjects", html_or(form.subjects.as_deref(), "none")),
        ("Contact email", escape_html(&form.contact_email)),
        ("Phone", html_or(form.phone.as_deref(), "not provided")),
    ];
    let lines: Vec<String> = summary
        .iter()
        .map(|(label, value)| format!("{label}: <strong>{value}</strong>"))
        .collect();
    html.push_str(&lines.join("<br>\n"));
    html.push_str("\n</p>\n");

    if let Some(notes) = form.notes.as_deref() {
        html.push_str(&format!(
            "<p style=\"{muted}\">\n<strong>Your notes:</strong><br>{}\n</p>\n",
            notes_html(notes)
        ));
    }

    html.push_str(&format!(
        "<p style=\"margin-top: 16px;\">Kind regards,<br>\n<strong>{SIGNATURE_NAME}</strong><br>\n{SIGNATURE_TAGLINE}</p>\n</div>\n"
    ));
    html
}

fn parent_text(profile: &FormProfile, form: &EnquiryForm) -> String {
    let mut text = format!(
        "Dear {parent},\n\n\
         Thank you for contacting {SIGNATURE_NAME}. We have received your {label} for {student}. \
         One of our tutors will review your details and get back to you shortly to organise a time.\n\n\
         Summary of your submission:\n\
         Year level: {year}\n\
         Pathway: {pathway}\n\
         Subjects or areas: {subjects}\n\
         Contact email: {email}\n\
         Phone: {phone}\n",
        parent = form.parent_name,
        label = profile.request_label,
        student = form.student_name,
        year = form.year_level,
        pathway = form.exam_pathway,
        subjects = form.subjects.as_deref().unwrap_or("none"),
        email = form.contact_email,
        phone = form.phone.as_deref().unwrap_or("not provided"),
    );

    if let Some(notes) = form.notes.as_deref() {
        text.push_str(&format!("\nYour notes:\n{notes}\n"));
    }

    text.push_str(&format!(
        "\nKind regards,\n{SIGNATURE_NAME}\n{SIGNATURE_TAGLINE}\n"
    ));
    text
}

fn html_or(value: Option<&str>, placeholder: &str) -> String {
    match value {
        Some(value) => escape_html(value),
        None => placeholder.to_string(),
    }
}

/// Escapes free text and turns its line breaks into `<br>`.
pub(crate) fn notes_html(raw: &str) -> String {
    escape_html(&raw.replace("\r\n", "\n")).replace('\n', "<br>")
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
