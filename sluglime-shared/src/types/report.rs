use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::attachment::Attachment;
use super::credentials::Ticket;
use super::message::{Message, Role};
use super::timestamp;
use crate::validation::not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Corruption,
    Fraud,
    Harassment,
    Safety,
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Corruption,
        Category::Fraud,
        Category::Harassment,
        Category::Safety,
        Category::Other,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Corruption => write!(f, "corruption"),
            Category::Fraud => write!(f, "fraud"),
            Category::Harassment => write!(f, "harassment"),
            Category::Safety => write!(f, "safety"),
            Category::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "corruption" => Ok(Category::Corruption),
            "fraud" => Ok(Category::Fraud),
            "harassment" => Ok(Category::Harassment),
            "safety" => Ok(Category::Safety),
            "other" => Ok(Category::Other),
            _ => Err(format!("unknown category: {s}")),
        }
    }
}

/// Moderation status. Anything the client does not recognise reads as `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    InProgress,
    Resolved,
    Closed,
    #[default]
    #[serde(other)]
    Open,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::InProgress => "IN PROGRESS",
            Status::Resolved => "RESOLVED",
            Status::Closed => "CLOSED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Resolved | Status::Closed)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Open => write!(f, "open"),
            Status::InProgress => write!(f, "in_progress"),
            Status::Resolved => write!(f, "resolved"),
            Status::Closed => write!(f, "closed"),
        }
    }
}

/// Display identity attached to public-feed entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// A report as seen by the holder of its credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub ticket: Ticket,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub status: Status,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Report {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Whether a moderator has replied at least once.
    pub fn has_moderator_reply(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::Moderator)
    }
}

/// Public-feed projection of a report: no thread, body possibly truncated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub ticket: Ticket,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub status: Status,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub like_count: u32,
}

/// Everything needed to file a new report.
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub title: String,
    pub body: String,
    pub category: Option<Category>,
    pub attachments: Vec<Attachment>,
}

/// The text fields of a draft as they are validated and sent.
#[derive(Debug, Clone, Validate)]
pub struct ReportFields {
    #[validate(
        custom = "not_blank",
        length(min = 2, max = 200, message = "Title must be between 2 and 200 characters")
    )]
    pub title: String,
    #[validate(custom = "not_blank")]
    pub body: String,
}

impl ReportDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Trimmed title and body, ready for validation.
    pub fn fields(&self) -> ReportFields {
        ReportFields {
            title: self.title.trim().to_string(),
            body: self.body.trim().to_string(),
        }
    }
}
