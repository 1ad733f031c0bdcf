use std::fmt;

use super::decode::SubmittedFields;
use super::profile::FieldNames;

/// A single form submission, normalised through a profile's field mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnquiryForm {
    pub parent_name: String,
    pub student_name: String,
    pub contact_email: String,
    pub phone: Option<String>,
    pub year_level: String,
    pub exam_pathway: String,
    pub subjects: Option<String>,
    pub notes: Option<String>,
}

/// Required fields that were absent or blank, named by their submitted keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(pub Vec<&'static str>);

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

impl EnquiryForm {
    /// Builds the form from decoded fields. Values are trimmed; blank values
    /// are treated as absent.
    pub fn from_fields(
        fields: &SubmittedFields,
        names: &FieldNames,
    ) -> Result<Self, MissingFields> {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| match fields.value(key) {
            Some(value) => value.to_string(),
            None => {
                missing.push(key);
                String::new()
            }
        };

        let parent_name = required(names.parent_name);
        let student_name = required(names.student_name);
        let contact_email = required(names.contact_email);
        let year_level = required(names.year_level);
        let exam_pathway = required(names.exam_pathway);

        if !missing.is_empty() {
            return Err(MissingFields(missing));
        }

        let optional = |key: &str| fields.value(key).map(str::to_string);

        Ok(Self {
            parent_name,
            student_name,
            contact_email,
            phone: optional(names.phone),
            year_level,
            exam_pathway,
            subjects: optional(names.subjects),
            notes: optional(names.notes),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Html(String),
    Text(String),
}

impl MessageBody {
    pub fn as_str(&self) -> &str {
        match self {
            MessageBody::Html(body) | MessageBody::Text(body) => body,
        }
    }
}

/// An outbound email, built right before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: MessageBody,
}
