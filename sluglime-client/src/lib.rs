pub mod api;
pub mod attachment;
pub mod config;
pub mod flows;
pub mod http;
pub mod session;

pub use api::ReportApi;
pub use config::ClientConfig;
pub use flows::{FeedFlow, FeedState, Receipt, StatusFlow, StatusPhase, SubmitFlow, SubmitPhase};
pub use http::HttpReportApi;
pub use session::Session;
