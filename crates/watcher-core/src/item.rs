use chrono::{DateTime, Utc};

use crate::priority::Priority;

/// One detected message, normalized across sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Identity key, unique within the source's namespace. Used for dedup.
    pub source_id: String,

    /// Sender / contact display name.
    pub origin: String,

    /// Short text preview of the message.
    pub body_excerpt: String,

    /// Capture time, not necessarily the source's true send time.
    pub received_at: DateTime<Utc>,

    pub priority: Priority,

    /// Source-specific header fields carried through to the action file
    /// (e.g. the email subject). Rendered after the fixed header fields.
    pub extra_fields: Vec<(&'static str, String)>,
}
