/// Rendering used for both outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Html,
    Text,
}

/// Submitted key for each [`EnquiryForm`](super::EnquiryForm) field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub parent_name: &'static str,
    pub student_name: &'static str,
    pub contact_email: &'static str,
    pub phone: &'static str,
    pub year_level: &'static str,
    pub exam_pathway: &'static str,
    pub subjects: &'static str,
    pub notes: &'static str,
}

/// Everything that differs between the website's enquiry forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormProfile {
    pub name: &'static str,
    pub path: &'static str,
    pub fields: FieldNames,
    pub format: MessageFormat,
    /// Key of the boolean flag in a successful JSON response.
    pub ack_key: &'static str,
    pub admin_title: &'static str,
    pub admin_subject: &'static str,
    pub parent_subject: &'static str,
    /// Phrase used in the parent confirmation, e.g. "consultation request".
    pub request_label: &'static str,
}

const CONSULTATION: &str = "consultation";
const SEND_CONSULTATION: &str = "send-consultation";
const WAITLIST: &str = "waitlist";

impl FormProfile {
    pub fn builtin(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            CONSULTATION => Some(Self::consultation()),
            SEND_CONSULTATION => Some(Self::send_consultation()),
            WAITLIST => Some(Self::waitlist()),
            _ => None,
        }
    }

    pub fn builtins() -> Vec<Self> {
        vec![
            Self::consultation(),
            Self::send_consultation(),
            Self::waitlist(),
        ]
    }

    /// Consultation booking form, posted as JSON by the site's fetch call.
    pub fn consultation() -> Self {
        Self {
            name: CONSULTATION,
            path: "/api/consultation",
            fields: FieldNames {
                parent_name: "parentName",
                student_name: "studentName",
                contact_email: "contactEmail",
                phone: "phone",
                year_level: "grade",
                exam_pathway: "examPathway",
                subjects: "subjects",
                notes: "message",
            },
            format: MessageFormat::Html,
            ack_key: "success",
            admin_title: "New Consultation Request",
            admin_subject: "New ABB Tutoring consultation request",
            parent_subject: "We have received your ABB Tutoring consultation request",
            request_label: "consultation request",
        }
    }

    /// Plain enquiry form; both emails go out as plain text.
    pub fn send_consultation() -> Self {
        Self {
            name: SEND_CONSULTATION,
            path: "/api/send-consultation",
            fields: FieldNames {
                parent_name: "parentName",
                student_name: "studentName",
                contact_email: "email",
                phone: "phone",
                year_level: "yearLevel",
                exam_pathway: "pathway",
                subjects: "subjects",
                notes: "notes",
            },
            format: MessageFormat::Text,
            ack_key: "ok",
            admin_title: "New ABB consultation enquiry",
            admin_subject: "New ABB consultation enquiry",
            parent_subject: "We have received your ABB consultation enquiry",
            request_label: "consultation enquiry",
        }
    }

    /// Waitlist registration, submitted by a plain HTML form.
    pub fn waitlist() -> Self {
        Self {
            name: WAITLIST,
            path: "/api/waitlist",
            fields: FieldNames {
                parent_name: "parentName",
                student_name: "studentName",
                contact_email: "contactEmail",
                phone: "phone",
                year_level: "yearLevel",
                exam_pathway: "pathway",
                subjects: "subjects",
                notes: "notes",
            },
            format: MessageFormat::Html,
            ack_key: "success",
            admin_title: "New Waitlist Registration",
            admin_subject: "New ABB Tutoring waitlist registration",
            parent_subject: "You are on the ABB Tutoring waitlist",
            request_label: "waitlist registration",
        }
    }
}
