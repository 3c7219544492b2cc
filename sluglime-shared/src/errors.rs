use serde::{Deserialize, Serialize};

/// Stable error codes surfaced alongside user-facing messages.
///
/// Ranges:
/// - E0xxx: transport (no response received)
/// - E1xxx: server responses
/// - E2xxx: client-side validation
/// - E3xxx: local state (session, configuration, flow)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Transport (E0xxx)
    Unreachable,
    TimedOut,

    // Server (E1xxx)
    Rejected,
    AccessDenied,
    InvalidResponse,

    // Validation (E2xxx)
    ValidationFailed,

    // Local (E3xxx)
    SessionStorage,
    Configuration,
    Busy,
    AlreadySubmitted,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unreachable => "E0001",
            Self::TimedOut => "E0002",

            Self::Rejected => "E1001",
            Self::AccessDenied => "E1002",
            Self::InvalidResponse => "E1003",

            Self::ValidationFailed => "E2001",

            Self::SessionStorage => "E3001",
            Self::Configuration => "E3002",
            Self::Busy => "E3003",
            Self::AlreadySubmitted => "E3004",
        }
    }

    /// Whether no response was received from the backend at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Unreachable | Self::TimedOut)
    }
}

/// Problems caught before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{message}")]
    Invalid { field: &'static str, message: String },

    #[error("File {name} is too large. Maximum size is 25MB.")]
    AttachmentTooLarge { name: String, size: u64 },

    #[error("File {name} is not supported. Please use PDF, DOCX, JPG, PNG, or MP4.")]
    UnsupportedAttachment { name: String, content_type: String },

    #[error("File {name} could not be read: {reason}")]
    UnreadableAttachment { name: String, reason: String },

    #[error("Please enter both ticket and access code")]
    MissingCredentials,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response was received.
    #[error("{message}")]
    Unreachable { message: String, reason: String },

    #[error("Request to {base_url} timed out after {secs}s. Check that the backend is available.")]
    TimedOut { base_url: String, secs: u64 },

    /// A response arrived with a non-success status.
    #[error("Server rejected the request: {status}{}", detail_suffix(.detail))]
    Rejected { status: u16, detail: Option<String> },

    /// Wrong ticket and wrong access code are deliberately indistinguishable.
    #[error("No report matches that ticket and access code")]
    AccessDenied,

    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("session storage error: {0}")]
    Session(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("Another request is already in progress")]
    Busy,

    /// The draft has been filed; a new report needs a fresh draft.
    #[error("This report has already been submitted. Start a new report to submit again.")]
    AlreadySubmitted,
}

impl ClientError {
    /// Build the unreachable error, worded for a local development backend
    /// when the base URL points at localhost.
    pub fn unreachable(base_url: &str, reason: impl Into<String>) -> Self {
        let message = if base_url.contains("localhost") {
            format!("Cannot connect to server. Make sure the backend is running on {base_url}")
        } else {
            format!("Cannot connect to backend at {base_url}")
        };
        Self::Unreachable {
            message,
            reason: reason.into(),
        }
    }

    pub fn rejected(status: u16, detail: Option<String>) -> Self {
        Self::Rejected { status, detail }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unreachable { .. } => ErrorCode::Unreachable,
            Self::TimedOut { .. } => ErrorCode::TimedOut,
            Self::Rejected { .. } => ErrorCode::Rejected,
            Self::AccessDenied => ErrorCode::AccessDenied,
            Self::InvalidResponse(_) => ErrorCode::InvalidResponse,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Session(_) => ErrorCode::SessionStorage,
            Self::Config(_) => ErrorCode::Configuration,
            Self::Busy => ErrorCode::Busy,
            Self::AlreadySubmitted => ErrorCode::AlreadySubmitted,
        }
    }

    /// The inline message a flow shows for this error.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether the failure happened before any request left the client.
    pub fn is_client_side(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Busy | Self::AlreadySubmitted)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(" - {d}"),
        _ => String::new(),
    }
}
