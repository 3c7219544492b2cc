use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::report::Report;
use super::timestamp;
use crate::validation::{not_blank, MAX_MESSAGE_CHARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "user")]
    Reporter,
    #[serde(alias = "staff")]
    Moderator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Reporter => write!(f, "reporter"),
            Role::Moderator => write!(f, "moderator"),
        }
    }
}

/// One entry in a report's reporter/moderator thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(alias = "author")]
    pub role: Role,
    pub body: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/v1/reports/{ticket}/messages`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewMessage {
    #[validate(
        custom = "not_blank",
        length(max = 2000, message = "Message must be at most 2000 characters")
    )]
    pub body: String,
}

impl NewMessage {
    pub fn new(body: &str) -> Self {
        Self {
            body: body.trim().to_string(),
        }
    }

    pub fn char_count(&self) -> usize {
        self.body.chars().count()
    }

    pub fn remaining_chars(&self) -> usize {
        MAX_MESSAGE_CHARS.saturating_sub(self.char_count())
    }
}

/// Bare acknowledgement some backends return instead of the message itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAck {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// What the server handed back after a message was appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostedMessage {
    Report(Box<Report>),
    Message(Message),
    Ack(MessageAck),
}

impl PostedMessage {
    pub fn message_id(&self) -> Option<i64> {
        match self {
            PostedMessage::Report(report) => report.messages.last().and_then(|m| m.id),
            PostedMessage::Message(message) => message.id,
            PostedMessage::Ack(ack) => ack.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn role_accepts_backend_author_names() {
        let m: Message = serde_json::from_str(
            r#"{"id":3,"body":"hello","author":"user","created_at":"2024-01-02T03:04:05.000001"}"#,
        )
        .unwrap();
        assert_eq!(m.role, Role::Reporter);

        let m: Message = serde_json::from_str(
            r#"{"role":"moderator","body":"we are looking into it","created_at":"2024-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        assert_eq!(m.role, Role::Moderator);
        assert_eq!(m.id, None);

        let staff: Role = serde_json::from_str(r#""staff""#).unwrap();
        assert_eq!(staff, Role::Moderator);
    }

    #[test]
    fn new_message_limits() {
        assert!(NewMessage::new("ok").validate().is_ok());
        assert!(NewMessage::new("   ").validate().is_err());
        assert!(NewMessage::new(&"a".repeat(2000)).validate().is_ok());
        assert!(NewMessage::new(&"a".repeat(2001)).validate().is_err());
        // multi-byte characters count once each
        assert!(NewMessage::new(&"é".repeat(2000)).validate().is_ok());
        assert_eq!(NewMessage::new(&"é".repeat(1990)).remaining_chars(), 10);
    }

    #[test]
    fn posted_message_variants() {
        let ack: PostedMessage =
            serde_json::from_str(r#"{"message":"Message posted","id":42}"#).unwrap();
        assert_eq!(ack.message_id(), Some(42));

        let created: PostedMessage = serde_json::from_str(
            r#"{"id":7,"role":"reporter","body":"more","created_at":"2024-01-02T03:04:05"}"#,
        )
        .unwrap();
        assert!(matches!(created, PostedMessage::Message(_)));
    }
}
