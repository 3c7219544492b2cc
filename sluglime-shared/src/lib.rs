pub mod types;
pub mod errors;
pub mod telemetry;
pub mod validation;

pub use types::*;
pub use errors::{ClientError, ClientResult, ErrorCode, ValidationError};
