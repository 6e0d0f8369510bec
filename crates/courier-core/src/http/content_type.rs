//! Content types surfaced for request encoding
//!
//! A pure value table of the MIME strings the dispatcher negotiates with.
//! Selection has exactly one behavioral consequence: form-data switches the
//! body encoding to multipart.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Enumerated MIME types accepted by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    /// application/json
    Json,
    /// multipart/form-data
    FormData,
    /// text/plain
    TextPlain,
    /// text/html
    TextHtml,
    /// image/jpeg
    Jpeg,
    /// image/png
    Png,
    /// image/gif
    Gif,
    /// video/mp4
    Mp4,
}

impl ContentType {
    /// The MIME string sent in the `Content-Type` header
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::FormData => "multipart/form-data",
            ContentType::TextPlain => "text/plain",
            ContentType::TextHtml => "text/html",
            ContentType::Jpeg => "image/jpeg",
            ContentType::Png => "image/png",
            ContentType::Gif => "image/gif",
            ContentType::Mp4 => "video/mp4",
        }
    }

    /// Multipart bodies own their boundary-based `Content-Type` header, so
    /// the dispatcher leaves the header to the form encoder for these.
    pub fn is_form_data(&self) -> bool {
        matches!(self, ContentType::FormData)
    }
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType::Json
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
