//! Form submission intake and notification dispatch.
//!
//! One parameterized handler serves every enquiry form on the site. A
//! [`FormProfile`] describes how a form names its fields and how the
//! notifications are rendered; bodies are decoded by declared content type.
//! [`EnquiryNotifier`] runs the validate/render/send pipeline against an
//! injected [`Mailer`].

pub mod decode;
pub mod domain;
pub mod mailer;
pub mod profile;
pub mod render;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use decode::{decode_fields, DecodeError, SubmittedFields};
pub use domain::{EnquiryForm, MessageBody, MissingFields, NotificationMessage};
pub use mailer::{DeliveryReceipt, Mailer, MailerError, ResendMailer};
pub use profile::{FieldNames, FormProfile, MessageFormat};
pub use render::{admin_notification, parent_confirmation};
pub use router::enquiry_router;
pub use service::{EnquiryNotifier, NotifierSettings, SubmissionError, SubmissionOutcome};
