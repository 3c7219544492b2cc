use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ValidationError;

/// Public identifier of a submitted report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(String);

impl Ticket {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Secret paired with a ticket. `Debug` never prints the value; use
/// [`AccessCode::expose`] where the raw code is actually needed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCode(String);

impl AccessCode {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCode(***)")
    }
}

/// The ticket/access-code pair. It is the only thing that grants read and
/// append access to a report, and the server issues it exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub ticket: Ticket,
    pub access_code: AccessCode,
}

impl Credentials {
    /// Build from user input. Both parts are trimmed and must be non-blank.
    pub fn parse(ticket: &str, access_code: &str) -> Result<Self, ValidationError> {
        let ticket = Ticket::new(ticket);
        let access_code = AccessCode::new(access_code);
        if ticket.is_blank() || access_code.is_blank() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(Self { ticket, access_code })
    }
}
