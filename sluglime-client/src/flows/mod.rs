//! The three reporter-facing flows as explicit state machines.
//!
//! Each flow owns its view state and lets at most one request run at a time.
//! Errors are caught at the flow boundary and kept as a dismissible message;
//! nothing here is fatal and nothing is retried automatically.

mod feed;
mod status;
mod submit;

pub use feed::{FeedFlow, FeedState};
pub use status::{StatusFlow, StatusPhase};
pub use submit::{Receipt, SubmitFlow, SubmitPhase};
