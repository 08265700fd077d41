use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{de_id, de_null_default, de_opt_id};
use crate::constants::{CHAT_EMOJIS, COMMENT_EMOJIS, DEFAULT_AUTHOR};

static IMAGE_ATTACHMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp)$").expect("valid image regex"));

/// The two conversation channels attached to every post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Comment,
    Chat,
}

impl Channel {
    /// Wire decoding used for typing events: anything other than
    /// `"comment"` lands in chat.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("comment") => Channel::Comment,
            _ => Channel::Chat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Comment => "comment",
            Channel::Chat => "chat",
        }
    }

    /// Path segment under `/api/posts/:id/`
    pub fn path_segment(&self) -> &'static str {
        match self {
            Channel::Comment => "comments",
            Channel::Chat => "chat",
        }
    }

    /// JSON field carrying the entry body
    pub fn body_field(&self) -> &'static str {
        match self {
            Channel::Comment => "text",
            Channel::Chat => "message",
        }
    }

    /// Quick-insert emoji offered under this channel's compose field
    pub fn quick_emojis(&self) -> &'static [&'static str] {
        match self {
            Channel::Comment => &COMMENT_EMOJIS,
            Channel::Chat => &CHAT_EMOJIS,
        }
    }

    /// Prefix of stream event types that signal a change in this channel
    pub fn event_prefix(&self) -> &'static str {
        match self {
            Channel::Comment => "comment_",
            Channel::Chat => "chat_",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub post_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub text: String,
    #[serde(default)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub post_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub message: String,
    #[serde(default)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Channel-neutral view of a comment or chat message, as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadEntry {
    pub id: String,
    pub channel: Channel,
    pub author: Option<String>,
    pub body: String,
    pub attachment_url: Option<String>,
    pub created_at: Option<String>,
}

impl ThreadEntry {
    pub fn display_author(&self) -> &str {
        match self.author.as_deref() {
            Some(a) if !a.is_empty() => a,
            _ => DEFAULT_AUTHOR,
        }
    }

    /// Non-empty attachment URL, if any
    pub fn attachment(&self) -> Option<&str> {
        self.attachment_url.as_deref().filter(|u| !u.is_empty())
    }

    pub fn has_image_attachment(&self) -> bool {
        self.attachment().map(is_image_attachment).unwrap_or(false)
    }

    /// `created_at` formatted in local time, or empty when absent/unparseable
    pub fn display_timestamp(&self) -> String {
        self.created_at
            .as_deref()
            .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| {
                dt.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_default()
    }
}

impl From<Comment> for ThreadEntry {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            channel: Channel::Comment,
            author: c.author,
            body: c.text,
            attachment_url: c.attachment_url,
            created_at: c.created_at,
        }
    }
}

impl From<ChatMessage> for ThreadEntry {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            channel: Channel::Chat,
            author: m.author,
            body: m.message,
            attachment_url: m.attachment_url,
            created_at: m.created_at,
        }
    }
}

/// Attachments ending in a known image extension render inline; others as links.
pub fn is_image_attachment(url: &str) -> bool {
    IMAGE_ATTACHMENT.is_match(url)
}
