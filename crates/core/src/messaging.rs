//! Chat message validation and previews.

use crate::error::{CoreError, CODE_EMPTY_MESSAGE, CODE_VALIDATION};

/// Number of characters of a message body copied into notifications and
/// conversation list previews.
pub const PREVIEW_CHARS: usize = 120;

/// Upper bound on a single message body, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// A trimmed, non-empty chat message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::validation(
                CODE_EMPTY_MESSAGE,
                "Message body must not be empty",
            ));
        }
        if trimmed.chars().count() > MAX_MESSAGE_CHARS {
            return Err(CoreError::validation(
                CODE_VALIDATION,
                format!("Message body must be at most {MAX_MESSAGE_CHARS} characters"),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn preview(&self) -> String {
        preview(&self.0)
    }
}

/// The first [`PREVIEW_CHARS`] characters of `text`, never splitting a
/// multi-byte character.
pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
