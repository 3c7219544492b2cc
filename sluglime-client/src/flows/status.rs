use tracing::{debug, warn};

use sluglime_shared::{ClientError, ClientResult, Credentials, Report, ValidationError};

use crate::api::{validate_message, ReportApi};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPhase {
    Idle,
    Loading,
    Loaded,
    Sending,
    Failed,
}

impl StatusPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Loading | Self::Sending)
    }
}

/// Look up a report by ticket and access code and talk to the moderators.
///
/// `idle -> loading -> {loaded, failed}`; from `loaded`, sending posts the
/// reply and then re-fetches so the thread shown is always the server's.
#[derive(Debug)]
pub struct StatusFlow {
    ticket: String,
    access_code: String,
    reply: String,
    phase: StatusPhase,
    report: Option<Report>,
    error: Option<String>,
    /// The pair the current report was fetched with; replies go to it even if
    /// the input fields have been edited since.
    loaded_with: Option<Credentials>,
}

impl Default for StatusFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusFlow {
    pub fn new() -> Self {
        Self {
            ticket: String::new(),
            access_code: String::new(),
            reply: String::new(),
            phase: StatusPhase::Idle,
            report: None,
            error: None,
            loaded_with: None,
        }
    }

    /// Pre-fill ticket and code from the cached pair, if any.
    pub fn from_session(session: &Session) -> Self {
        match session.credentials() {
            Some(creds) => Self::new().with_credentials(creds.ticket.as_str(), creds.access_code.expose()),
            None => Self::new(),
        }
    }

    pub fn with_credentials(mut self, ticket: &str, access_code: &str) -> Self {
        self.ticket = ticket.to_string();
        self.access_code = access_code.to_string();
        self
    }

    pub fn phase(&self) -> StatusPhase {
        self.phase
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn ticket(&self) -> &str {
        &self.ticket
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    pub fn set_ticket(&mut self, ticket: impl Into<String>) {
        self.ticket = ticket.into();
    }

    pub fn set_access_code(&mut self, access_code: impl Into<String>) {
        self.access_code = access_code.into();
    }

    pub fn set_reply(&mut self, reply: impl Into<String>) {
        self.reply = reply.into();
    }

    /// Whether both credential fields hold something other than whitespace.
    pub fn can_load(&self) -> bool {
        !self.phase.is_busy() && !self.ticket.trim().is_empty() && !self.access_code.trim().is_empty()
    }

    fn fail_validation(&mut self, err: ValidationError) -> ClientError {
        self.error = Some(err.to_string());
        err.into()
    }

    /// Fetch the report for the current ticket and code.
    pub async fn load<A>(&mut self, api: &A) -> ClientResult<()>
    where
        A: ReportApi + ?Sized,
    {
        if self.phase.is_busy() {
            return Err(ClientError::Busy);
        }
        let credentials = match Credentials::parse(&self.ticket, &self.access_code) {
            Ok(c) => c,
            Err(e) => return Err(self.fail_validation(e)),
        };

        self.phase = StatusPhase::Loading;
        self.error = None;
        match api.fetch_report(&credentials).await {
            Ok(report) => {
                debug!(ticket = %credentials.ticket, messages = report.messages.len(), "status loaded");
                self.report = Some(report);
                self.loaded_with = Some(credentials);
                self.phase = StatusPhase::Loaded;
                Ok(())
            }
            Err(e) => {
                self.report = None;
                self.loaded_with = None;
                self.error = Some(e.user_message());
                self.phase = StatusPhase::Failed;
                Err(e)
            }
        }
    }

    /// Post the reply draft to the loaded report, then reload the thread.
    ///
    /// The draft is cleared only once the server has accepted it. If the post
    /// or the reload fails, the previously loaded report stays on screen.
    pub async fn send<A>(&mut self, api: &A) -> ClientResult<()>
    where
        A: ReportApi + ?Sized,
    {
        if self.phase.is_busy() {
            return Err(ClientError::Busy);
        }
        let credentials = match (&self.phase, &self.loaded_with) {
            (StatusPhase::Loaded, Some(c)) => c.clone(),
            _ => return Err(self.fail_validation(ValidationError::MissingCredentials)),
        };
        if let Err(e) = validate_message(&self.reply) {
            return Err(self.fail_validation(e));
        }

        self.phase = StatusPhase::Sending;
        self.error = None;
        if let Err(e) = api.post_message(&credentials, &self.reply).await {
            self.error = Some(e.user_message());
            self.phase = StatusPhase::Loaded;
            return Err(e);
        }
        self.reply.clear();

        self.phase = StatusPhase::Loading;
        match api.fetch_report(&credentials).await {
            Ok(report) => {
                self.report = Some(report);
                self.phase = StatusPhase::Loaded;
                Ok(())
            }
            Err(e) => {
                warn!(ticket = %credentials.ticket, error = %e, "reply posted but reload failed");
                self.error = Some(e.user_message());
                self.phase = StatusPhase::Loaded;
                Err(e)
            }
        }
    }

    /// Return to a resting phase after the caller dropped an in-flight future.
    pub fn cancel(&mut self) {
        self.phase = match (self.phase, &self.report) {
            (StatusPhase::Loading | StatusPhase::Sending, Some(_)) => StatusPhase::Loaded,
            (StatusPhase::Loading | StatusPhase::Sending, None) => StatusPhase::Idle,
            (phase, _) => phase,
        };
    }
}
