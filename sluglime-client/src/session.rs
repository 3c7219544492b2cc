use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use sluglime_shared::{ClientError, ClientResult, Credentials};

/// On-disk shape. The key names are fixed so other Sluglime clients can share
/// the cache.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(rename = "sluglime_ticket", default, skip_serializing_if = "Option::is_none")]
    ticket: Option<String>,
    #[serde(rename = "sluglime_code", default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

/// Last-used ticket and access code.
///
/// Created at start-up, passed explicitly to the flows that read or write it,
/// and cleared on logout. When backed by a file, every change is written
/// through immediately.
#[derive(Debug, Default)]
pub struct Session {
    path: Option<PathBuf>,
    credentials: Option<Credentials>,
}

impl Session {
    /// A session that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the session file at `path`. A missing file is an empty session; an
    /// unreadable or malformed one is logged and treated as empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let credentials = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<StoredSession>(&raw) {
                Ok(stored) => match (stored.ticket, stored.code) {
                    (Some(ticket), Some(code)) => Credentials::parse(&ticket, &code).ok(),
                    _ => None,
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring malformed session file");
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read session file");
                None
            }
        };

        debug!(path = %path.display(), cached = credentials.is_some(), "session loaded");
        Self {
            path: Some(path),
            credentials,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Cache a freshly issued pair, replacing whatever was there.
    pub fn remember(&mut self, credentials: Credentials) -> ClientResult<()> {
        self.credentials = Some(credentials);
        self.persist()
    }

    /// Forget the cached pair and delete the session file.
    pub fn clear(&mut self) -> ClientResult<()> {
        self.credentials = None;
        let Some(path) = &self.path else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "session file removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Session(format!("{}: {e}", path.display()))),
        }
    }

    fn persist(&self) -> ClientResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let stored = StoredSession {
            ticket: self.credentials.as_ref().map(|c| c.ticket.to_string()),
            code: self
                .credentials
                .as_ref()
                .map(|c| c.access_code.expose().to_string()),
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| ClientError::Session(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| ClientError::Session(format!("{}: {e}", parent.display())))?;
        }
        write_private(path, json.as_bytes())
            .map_err(|e| ClientError::Session(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), "session saved");
        Ok(())
    }
}

/// Write `contents` to a file that is owner-only from the moment it exists.
/// A file left over with wider permissions is narrowed before it is written.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::write(path, contents)
}
