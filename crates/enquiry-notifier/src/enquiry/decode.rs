use std::collections::BTreeMap;

use serde_json::Value;

/// Key/value pairs decoded from a request body, independent of its encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmittedFields(BTreeMap<String, String>);

impl SubmittedFields {
    /// Trimmed value for `key`, or `None` when absent or blank.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn append(&mut self, key: String, value: String) {
        match self.0.get_mut(&key) {
            Some(existing) if !existing.is_empty() => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            Some(existing) => *existing = value,
            None => {
                self.0.insert(key, value);
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for SubmittedFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = SubmittedFields::default();
        for (key, value) in iter {
            fields.append(key.into(), value.into());
        }
        fields
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
}

/// Decodes a request body into fields, picking the parser from the declared
/// content type: JSON when declared as JSON, form pairs otherwise.
pub fn decode_fields(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<SubmittedFields, DecodeError> {
    if content_type.is_some_and(is_json_content_type) {
        decode_json(body)
    } else {
        decode_form(body)
    }
}

pub(crate) fn is_json_content_type(raw: &str) -> bool {
    match raw.parse::<mime::Mime>() {
        Ok(parsed) => {
            (parsed.type_() == mime::APPLICATION && parsed.subtype() == mime::JSON)
                || parsed.suffix() == Some(mime::JSON)
        }
        Err(_) => raw.to_ascii_lowercase().contains("application/json"),
    }
}

fn decode_json(body: &[u8]) -> Result<SubmittedFields, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SubmittedFields::default());
    }

    let value: Value = serde_json::from_slice(body)?;
    let Value::Object(object) = value else {
        return Ok(SubmittedFields::default());
    };

    Ok(object
        .into_iter()
        .filter_map(|(key, value)| json_field_value(value).map(|value| (key, value)))
        .collect())
}

fn json_field_value(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .into_iter()
                .filter(|item| !item.is_array())
                .filter_map(json_field_value)
                .collect();
            Some(parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

fn decode_form(body: &[u8]) -> Result<SubmittedFields, DecodeError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
    Ok(pairs.into_iter().collect())
}
