use tracing::{info, warn};

use sluglime_shared::{
    check_attachment, AccessCode, Attachment, Category, ClientError, ClientResult, Credentials,
    ReportDraft, Ticket,
};

use crate::api::{validate_draft, ReportApi};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Editing,
    Submitting,
    Submitted,
}

/// The one-time view of a freshly issued ticket and access code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    credentials: Credentials,
}

impl Receipt {
    pub const WARNING: &'static str =
        "Save these details securely - they won't be shown again. You'll need them to track your report.";

    pub fn ticket(&self) -> &Ticket {
        &self.credentials.ticket
    }

    pub fn access_code(&self) -> &AccessCode {
        &self.credentials.access_code
    }
}

/// `editing -> submitting -> {submitted, editing + error}`.
///
/// A failed submission goes back to editing with the draft untouched, so the
/// reporter never loses text or already-accepted attachments.
#[derive(Debug)]
pub struct SubmitFlow {
    draft: ReportDraft,
    phase: SubmitPhase,
    error: Option<String>,
    receipt: Option<Receipt>,
}

impl Default for SubmitFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitFlow {
    pub fn new() -> Self {
        Self {
            draft: ReportDraft::default(),
            phase: SubmitPhase::Editing,
            error: None,
            receipt: None,
        }
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Error for any draft change or submit attempt outside `Editing`.
    fn not_editing(&self) -> Option<ClientError> {
        match self.phase {
            SubmitPhase::Editing => None,
            SubmitPhase::Submitting => Some(ClientError::Busy),
            SubmitPhase::Submitted => Some(ClientError::AlreadySubmitted),
        }
    }

    fn editable(&mut self) -> ClientResult<&mut ReportDraft> {
        match self.not_editing() {
            None => Ok(&mut self.draft),
            Some(err) => Err(err),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> ClientResult<()> {
        self.editable()?.title = title.into();
        Ok(())
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> ClientResult<()> {
        self.editable()?.body = body.into();
        Ok(())
    }

    pub fn set_category(&mut self, category: Option<Category>) -> ClientResult<()> {
        self.editable()?.category = category;
        Ok(())
    }

    /// Add a file to the draft if it passes the size and type gate. A rejected
    /// file leaves the draft as it was.
    pub fn add_attachment(&mut self, attachment: Attachment) -> ClientResult<()> {
        check_attachment(&attachment.name, attachment.size(), &attachment.content_type)?;
        self.editable()?.attachments.push(attachment);
        Ok(())
    }

    pub fn remove_attachment(&mut self, index: usize) -> ClientResult<Option<Attachment>> {
        let draft = self.editable()?;
        if index < draft.attachments.len() {
            Ok(Some(draft.attachments.remove(index)))
        } else {
            Ok(None)
        }
    }

    /// Validate and move to `Submitting`. Returns the draft to send.
    pub fn begin(&mut self) -> ClientResult<ReportDraft> {
        if let Some(err) = self.not_editing() {
            return Err(err);
        }
        if let Err(e) = validate_draft(&self.draft) {
            self.error = Some(e.to_string());
            return Err(e.into());
        }
        self.error = None;
        self.phase = SubmitPhase::Submitting;
        Ok(self.draft.clone())
    }

    /// Apply the outcome of the request started by [`SubmitFlow::begin`].
    ///
    /// On success the credentials go into `session` and a receipt becomes
    /// available. A session write failure is logged but does not fail the
    /// submission: the receipt is the reporter's only copy that matters.
    pub fn complete(&mut self, outcome: ClientResult<Credentials>, session: &mut Session) -> ClientResult<()> {
        if self.phase != SubmitPhase::Submitting {
            warn!(phase = ?self.phase, "submission outcome arrived outside of submitting");
            return Err(ClientError::Busy);
        }

        match outcome {
            Ok(credentials) => {
                if let Err(e) = session.remember(credentials.clone()) {
                    warn!(error = %e, "could not cache credentials");
                }
                info!(ticket = %credentials.ticket, "submission complete");
                self.receipt = Some(Receipt { credentials });
                self.phase = SubmitPhase::Submitted;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.user_message());
                self.phase = SubmitPhase::Editing;
                Err(e)
            }
        }
    }

    /// Abandon an in-flight submission whose future was dropped.
    pub fn cancel(&mut self) {
        if self.phase == SubmitPhase::Submitting {
            self.phase = SubmitPhase::Editing;
        }
    }

    pub async fn submit<A>(&mut self, api: &A, session: &mut Session) -> ClientResult<()>
    where
        A: ReportApi + ?Sized,
    {
        let draft = self.begin()?;
        let outcome = api.create_report(&draft).await;
        self.complete(outcome, session)
    }

    /// Hand out the receipt. Only the first call after a submission gets it.
    pub fn take_receipt(&mut self) -> Option<Receipt> {
        self.receipt.take()
    }

    /// Start over with an empty draft after a completed submission.
    pub fn reset(&mut self) -> ClientResult<()> {
        if self.phase == SubmitPhase::Submitting {
            return Err(ClientError::Busy);
        }
        *self = Self::new();
        Ok(())
    }
}
