//! Crawl tasks and their wire format
//!
//! A task is stored in the sorted set as the JSON object
//! `{"user_id": …, "url": …, "content_type": …}`. Payloads use `", "` and
//! `": "` separators with every non-ASCII character `\u`-escaped, the
//! layout existing producers write, so the same task enqueued from either
//! side is byte-identical and deduplicates.

use crate::queue::QueueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// Owner of a crawl task
///
/// Producers have written both numeric and string identifiers; the form
/// read is the form written back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{}", id),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for OwnerId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// Content-type hint categories, in the order they are given weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentCategory {
    Html,
    Image,
    Video,
    Other,
}

impl ContentCategory {
    /// Maps a hint to its category; anything unrecognised is `Other`
    pub fn from_hint(hint: &str) -> Self {
        match hint {
            "html" => Self::Html,
            "image" => Self::Image,
            "video" => Self::Video,
            _ => Self::Other,
        }
    }

    /// Relative crawl urgency; larger is dequeued sooner
    pub fn weight(&self) -> u32 {
        match self {
            Self::Html => 10,
            Self::Image => 5,
            Self::Video => 1,
            Self::Other => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Image => "image",
            Self::Video => "video",
            Self::Other => "other",
        }
    }
}

/// One unit of queued work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTask {
    pub user_id: OwnerId,
    pub url: String,
    pub content_type: String,
}

impl CrawlTask {
    pub fn new(user_id: impl Into<OwnerId>, url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            url: url.into(),
            content_type: content_type.into(),
        }
    }

    pub fn category(&self) -> ContentCategory {
        ContentCategory::from_hint(&self.content_type)
    }

    /// Serializes the task into its sorted-set member
    pub fn to_payload(&self) -> Result<String, QueueError> {
        let mut buffer = Vec::with_capacity(96);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, LegacyFormatter);
        self.serialize(&mut serializer)
            .map_err(QueueError::Serialization)?;
        // The formatter only ever emits ASCII
        String::from_utf8(buffer).map_err(|e| QueueError::Encoding(e.to_string()))
    }

    /// Parses a sorted-set member back into a task
    pub fn from_payload(payload: &str) -> Result<Self, QueueError> {
        serde_json::from_str(payload).map_err(|source| QueueError::Deserialization {
            payload: payload.to_string(),
            source,
        })
    }
}

/// JSON formatter with `", "` and `": "` separators and `\uXXXX` escapes
/// for every non-ASCII character
struct LegacyFormatter;

impl serde_json::ser::Formatter for LegacyFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for c in fragment.chars() {
            if c.is_ascii() {
                let mut byte = [0u8; 1];
                writer.write_all(c.encode_utf8(&mut byte).as_bytes())?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}
