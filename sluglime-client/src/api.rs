use async_trait::async_trait;
use validator::Validate;

use sluglime_shared::validation::first_error;
use sluglime_shared::{
    check_attachment, ClientResult, Credentials, NewMessage, PostedMessage, Report, ReportDraft,
    ReportFields, ReportSummary, ValidationError,
};

/// The four operations the Sluglime backend exposes to reporters.
///
/// Implementations must run [`validate_draft`] / [`validate_message`] before
/// touching the network, and must map both "unknown ticket" and "wrong
/// access code" onto the same `ClientError::AccessDenied`.
#[async_trait]
pub trait ReportApi: Send + Sync {
    /// File a new report. The returned pair is issued once and never again.
    async fn create_report(&self, draft: &ReportDraft) -> ClientResult<Credentials>;

    /// Full report including its message thread.
    async fn fetch_report(&self, credentials: &Credentials) -> ClientResult<Report>;

    /// Append a reporter message to the thread.
    async fn post_message(&self, credentials: &Credentials, body: &str) -> ClientResult<PostedMessage>;

    /// Reports flagged public, newest first, without their threads.
    async fn list_public_reports(&self) -> ClientResult<Vec<ReportSummary>>;
}

/// Check title, body and every attachment of a draft.
pub fn validate_draft(draft: &ReportDraft) -> Result<ReportFields, ValidationError> {
    let fields = draft.fields();
    fields
        .validate()
        .map_err(|e| first_error(&e, &["title", "body"]))?;

    for attachment in &draft.attachments {
        check_attachment(&attachment.name, attachment.size(), &attachment.content_type)?;
    }

    Ok(fields)
}

pub fn validate_message(body: &str) -> Result<NewMessage, ValidationError> {
    let message = NewMessage::new(body);
    message.validate().map_err(|e| first_error(&e, &["body"]))?;
    Ok(message)
}
