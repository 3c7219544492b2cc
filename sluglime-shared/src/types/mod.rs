pub mod api;
pub mod attachment;
pub mod credentials;
pub mod message;
pub mod report;
pub mod timestamp;

pub use api::*;
pub use attachment::*;
pub use credentials::*;
pub use message::*;
pub use report::*;
