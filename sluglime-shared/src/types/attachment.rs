use std::fmt;

use crate::errors::ValidationError;
use crate::validation::{ALLOWED_CONTENT_TYPES, MAX_ATTACHMENT_BYTES};

/// A file picked for upload. Only lives until the report is submitted; the
/// server owns storage afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Accept the file only if it passes [`check_attachment`].
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let content_type = content_type.into();
        check_attachment(&name, bytes.len() as u64, &content_type)?;
        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Size and type gate applied to every file before it joins a draft.
pub fn check_attachment(name: &str, size: u64, content_type: &str) -> Result<(), ValidationError> {
    if size > MAX_ATTACHMENT_BYTES {
        return Err(ValidationError::AttachmentTooLarge {
            name: name.to_string(),
            size,
        });
    }
    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
        return Err(ValidationError::UnsupportedAttachment {
            name: name.to_string(),
            content_type: content_type.to_string(),
        });
    }
    Ok(())
}
