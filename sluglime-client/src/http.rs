use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use sluglime_shared::{
    error_detail, ClientError, ClientResult, Credentials, PostedMessage, PublicReports, Report,
    ReportDraft, ReportSummary, ValidationError,
};

use crate::api::{validate_draft, validate_message, ReportApi};
use crate::config::ClientConfig;

const RESERVED_TICKETS: &[&str] = &["public", ".", ".."];

/// Slowest upload rate a report submission is expected to survive.
const MIN_UPLOAD_BYTES_PER_SEC: u64 = 64 * 1024;

/// [`ReportApi`] over HTTP against a Sluglime backend.
#[derive(Clone)]
pub struct HttpReportApi {
    client: Client,
    base_url: Url,
    /// Base URL as configured, for error messages.
    display_url: String,
    timeout: Duration,
}

impl HttpReportApi {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let display_url = config.api_url.trim_end_matches('/').to_string();
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| ClientError::Config(format!("invalid api_url {}: {e}", config.api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "api_url {} cannot be used as a base URL",
                config.api_url
            )));
        }

        let timeout = config.request_timeout();
        // deadlines are per request so uploads can scale with payload size
        let client = Client::builder()
            .connect_timeout(timeout)
            .user_agent(concat!("sluglime-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            display_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.display_url
    }

    /// `{base}/api/v1/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("api_url {} cannot be a base", self.display_url)))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    /// Path for a credential-gated call on `ticket`. Tickets that would land
    /// on another route (`public`, or dot segments the URL parser collapses)
    /// are refused the same way an unknown ticket is.
    fn gated_endpoint(&self, ticket: &str, tail: Option<&str>) -> ClientResult<Url> {
        if RESERVED_TICKETS.contains(&ticket) {
            debug!("reserved ticket segment refused");
            return Err(ClientError::AccessDenied);
        }
        match tail {
            Some(tail) => self.endpoint(&["reports", ticket, tail]),
            None => self.endpoint(&["reports", ticket]),
        }
    }

    /// Deadline for a report submission: the base request timeout plus the
    /// time the payload needs at [`MIN_UPLOAD_BYTES_PER_SEC`].
    fn upload_timeout(&self, payload_bytes: u64) -> Duration {
        self.timeout + Duration::from_secs(payload_bytes.div_ceil(MIN_UPLOAD_BYTES_PER_SEC))
    }

    fn transport_error(&self, err: reqwest::Error, deadline: Duration) -> ClientError {
        if err.is_timeout() {
            warn!(base_url = %self.display_url, secs = deadline.as_secs(), "request timed out");
            return ClientError::TimedOut {
                base_url: self.display_url.clone(),
                secs: deadline.as_secs(),
            };
        }
        if err.is_builder() {
            return ClientError::Config(err.to_string());
        }
        warn!(base_url = %self.display_url, error = %err, "backend unreachable");
        ClientError::unreachable(&self.display_url, err.to_string())
    }

    /// Decode a success body, or turn the status into the right error.
    /// `gated` marks calls that carry credentials: any auth-ish failure there
    /// collapses into `AccessDenied`.
    async fn read_json<T: DeserializeOwned>(
        &self,
        resp: Response,
        gated: bool,
        deadline: Duration,
    ) -> ClientResult<T> {
        let status = resp.status();

        if status.is_success() {
            let bytes = resp.bytes().await.map_err(|e| self.transport_error(e, deadline))?;
            return serde_json::from_slice(&bytes)
                .map_err(|e| ClientError::InvalidResponse(e.to_string()));
        }

        if gated
            && matches!(
                status,
                StatusCode::NOT_FOUND
                    | StatusCode::FORBIDDEN
                    | StatusCode::UNAUTHORIZED
                    | StatusCode::METHOD_NOT_ALLOWED
            )
        {
            debug!(status = status.as_u16(), "credential check failed");
            return Err(ClientError::AccessDenied);
        }

        let body = resp.text().await.unwrap_or_default();
        let detail = error_detail(&body);
        warn!(status = status.as_u16(), detail = detail.as_deref().unwrap_or(""), "request rejected");
        Err(ClientError::rejected(status.as_u16(), detail))
    }
}

#[async_trait]
impl ReportApi for HttpReportApi {
    async fn create_report(&self, draft: &ReportDraft) -> ClientResult<Credentials> {
        let fields = validate_draft(draft)?;

        let mut form = Form::new()
            .text("title", fields.title)
            .text("body", fields.body);
        if let Some(category) = draft.category {
            form = form.text("category", category.to_string());
        }
        for (index, attachment) in draft.attachments.iter().enumerate() {
            let part = Part::bytes(attachment.bytes.clone())
                .file_name(attachment.name.clone())
                .mime_str(&attachment.content_type)
                .map_err(|_| ValidationError::UnsupportedAttachment {
                    name: attachment.name.clone(),
                    content_type: attachment.content_type.clone(),
                })?;
            form = form.part(format!("file_{index}"), part);
        }

        let url = self.endpoint(&["reports"])?;
        let payload_bytes: u64 = draft.attachments.iter().map(|a| a.size()).sum();
        let deadline = self.upload_timeout(payload_bytes);
        info!(
            attachments = draft.attachments.len(),
            payload_bytes,
            timeout_secs = deadline.as_secs(),
            "submitting report"
        );

        let resp = self
            .client
            .post(url)
            .timeout(deadline)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e, deadline))?;

        let credentials: Credentials = self.read_json(resp, false, deadline).await?;
        info!(ticket = %credentials.ticket, "report created");
        Ok(credentials)
    }

    async fn fetch_report(&self, credentials: &Credentials) -> ClientResult<Report> {
        let url = self.gated_endpoint(credentials.ticket.as_str(), None)?;
        debug!(ticket = %credentials.ticket, "fetching report");

        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .query(&[("code", credentials.access_code.expose())])
            .send()
            .await
            .map_err(|e| self.transport_error(e, self.timeout))?;

        let report: Report = self.read_json(resp, true, self.timeout).await?;
        debug!(ticket = %report.ticket, messages = report.messages.len(), status = %report.status, "report loaded");
        Ok(report)
    }

    async fn post_message(&self, credentials: &Credentials, body: &str) -> ClientResult<PostedMessage> {
        let message = validate_message(body)?;
        let url = self.gated_endpoint(credentials.ticket.as_str(), Some("messages"))?;
        debug!(ticket = %credentials.ticket, chars = message.char_count(), "posting message");

        let resp = self
            .client
            .post(url)
            .timeout(self.timeout)
            .query(&[("code", credentials.access_code.expose())])
            .json(&message)
            .send()
            .await
            .map_err(|e| self.transport_error(e, self.timeout))?;

        self.read_json(resp, true, self.timeout).await
    }

    async fn list_public_reports(&self) -> ClientResult<Vec<ReportSummary>> {
        let url = self.endpoint(&["reports", "public"])?;

        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e, self.timeout))?;

        let list: PublicReports = self.read_json(resp, false, self.timeout).await?;
        debug!(count = list.reports.len(), "public reports loaded");
        Ok(list.reports)
    }
}
