//! Client-side limits and the glue between `validator` and [`ValidationError`].

use std::borrow::Cow;

use crate::errors::ValidationError;

/// 25 MB per file.
pub const MAX_ATTACHMENT_BYTES: u64 = 25 * 1024 * 1024;

pub const MAX_MESSAGE_CHARS: usize = 2000;

pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/jpeg",
    "image/png",
    "video/mp4",
];

const BLANK: &str = "blank";

pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new(BLANK));
    }
    Ok(())
}

/// Collapse `validator` output into the first problem, in `field_order`.
/// A blank field wins over any other rule on the same field.
pub fn first_error(errors: &validator::ValidationErrors, field_order: &[&'static str]) -> ValidationError {
    let by_field = errors.field_errors();
    for &field in field_order {
        let Some(field_errors) = by_field.get(field) else {
            continue;
        };
        if field_errors.iter().any(|e| e.code == BLANK) {
            return ValidationError::Required { field };
        }
        if let Some(e) = field_errors.first() {
            let message = e
                .message
                .clone()
                .unwrap_or_else(|| Cow::Owned(format!("{field} is invalid")));
            return ValidationError::Invalid {
                field,
                message: message.into_owned(),
            };
        }
    }
    ValidationError::Invalid {
        field: "form",
        message: errors.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewMessage, ReportDraft};
    use validator::Validate;

    #[test]
    fn blank_title_is_required() {
        let fields = ReportDraft::new("   ", "body").fields();
        let errors = fields.validate().unwrap_err();
        assert_eq!(
            first_error(&errors, &["title", "body"]),
            ValidationError::Required { field: "title" }
        );
    }

    #[test]
    fn title_order_wins_over_body() {
        let fields = ReportDraft::new("", "").fields();
        let errors = fields.validate().unwrap_err();
        assert_eq!(
            first_error(&errors, &["title", "body"]),
            ValidationError::Required { field: "title" }
        );
    }

    #[test]
    fn short_title_reports_length_message() {
        let fields = ReportDraft::new("x", "body").fields();
        let errors = fields.validate().unwrap_err();
        let err = first_error(&errors, &["title", "body"]);
        assert_eq!(err.to_string(), "Title must be between 2 and 200 characters");
    }

    #[test]
    fn long_message_reports_limit() {
        let msg = NewMessage::new(&"x".repeat(MAX_MESSAGE_CHARS + 1));
        let errors = msg.validate().unwrap_err();
        let err = first_error(&errors, &["body"]);
        assert_eq!(err.to_string(), "Message must be at most 2000 characters");
    }
}
