use tracing::debug;

use sluglime_shared::{ClientError, ClientResult, ReportSummary};

use crate::api::ReportApi;

/// What the public feed currently shows. An empty list is its own state, not
/// a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Loading,
    Empty,
    Loaded(Vec<ReportSummary>),
    Failed(String),
}

#[derive(Debug)]
pub struct FeedFlow {
    state: FeedState,
    in_flight: bool,
}

impl Default for FeedFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedFlow {
    pub fn new() -> Self {
        Self {
            state: FeedState::Loading,
            in_flight: false,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn reports(&self) -> &[ReportSummary] {
        match &self.state {
            FeedState::Loaded(reports) => reports,
            _ => &[],
        }
    }

    pub async fn load<A>(&mut self, api: &A) -> ClientResult<()>
    where
        A: ReportApi + ?Sized,
    {
        if self.in_flight {
            return Err(ClientError::Busy);
        }
        self.in_flight = true;
        self.state = FeedState::Loading;

        let outcome = api.list_public_reports().await;
        self.in_flight = false;
        match outcome {
            Ok(reports) if reports.is_empty() => {
                self.state = FeedState::Empty;
                Ok(())
            }
            Ok(reports) => {
                debug!(count = reports.len(), "feed loaded");
                self.state = FeedState::Loaded(reports);
                Ok(())
            }
            Err(e) => {
                self.state = FeedState::Failed(e.user_message());
                Err(e)
            }
        }
    }

    /// Manual retry after a failure; there is no automatic one.
    pub async fn retry<A>(&mut self, api: &A) -> ClientResult<()>
    where
        A: ReportApi + ?Sized,
    {
        self.load(api).await
    }

    /// Clear the in-flight flag after the caller dropped a pending load.
    pub fn cancel(&mut self) {
        if self.in_flight {
            self.in_flight = false;
            self.state = FeedState::Failed("Loading was cancelled".into());
        }
    }
}
