use serde::{Deserialize, Serialize};

use crate::models::{de_null_default, de_opt_id, de_opt_string, Channel};

/// JSON envelope pushed over `/api/stream`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEnvelope {
    #[serde(rename = "type", default, deserialize_with = "de_null_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub channel: Option<String>,
    /// RFC 3339 instant at which a typing indicator should disappear
    #[serde(default, deserialize_with = "de_opt_string")]
    pub expires_at: Option<String>,
}

/// What an envelope asks the feed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// `comment_*`: the comment thread of `post_id` changed
    CommentChange,
    /// `chat_*`: the chat thread of `post_id` changed
    ChatChange,
    Typing,
    Other,
}

impl StreamEnvelope {
    /// Decode one SSE data payload. Malformed JSON and `null` yield `None`.
    pub fn parse(data: &str) -> Option<Self> {
        serde_json::from_str::<Option<Self>>(data).ok().flatten()
    }

    pub fn kind(&self) -> EnvelopeKind {
        if self.kind == "typing" {
            EnvelopeKind::Typing
        } else if self.kind.starts_with(Channel::Comment.event_prefix()) {
            EnvelopeKind::CommentChange
        } else if self.kind.starts_with(Channel::Chat.event_prefix()) {
            EnvelopeKind::ChatChange
        } else {
            EnvelopeKind::Other
        }
    }

    /// True when the envelope names `post_id`. Envelopes without a post id
    /// never match.
    pub fn targets(&self, post_id: &str) -> bool {
        self.post_id.as_deref() == Some(post_id)
    }

    pub fn typing_channel(&self) -> Channel {
        Channel::from_wire(self.channel.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typing_envelope() {
        let env = StreamEnvelope::parse(
            r#"{"type": "typing", "post_id": "p1", "author": "Ada", "channel": "comment", "expires_at": "2026-01-01T00:00:03Z"}"#,
        )
        .unwrap();
        assert_eq!(env.kind(), EnvelopeKind::Typing);
        assert!(env.targets("p1"));
        assert!(!env.targets("p2"));
        assert_eq!(env.typing_channel(), Channel::Comment);
    }

    #[test]
    fn test_change_families() {
        let env = StreamEnvelope::parse(r#"{"type": "comment_created", "post_id": 7}"#).unwrap();
        assert_eq!(env.kind(), EnvelopeKind::CommentChange);
        assert!(env.targets("7"));

        let env = StreamEnvelope::parse(r#"{"type": "chat_deleted", "post_id": "7"}"#).unwrap();
        assert_eq!(env.kind(), EnvelopeKind::ChatChange);

        let env = StreamEnvelope::parse(r#"{"type": "post_published"}"#).unwrap();
        assert_eq!(env.kind(), EnvelopeKind::Other);
        assert!(!env.targets("7"));
    }

    #[test]
    fn test_garbage_is_discarded() {
        assert!(StreamEnvelope::parse("not json").is_none());
        assert!(StreamEnvelope::parse("null").is_none());
        assert!(StreamEnvelope::parse("[1,2]").is_none());
    }

    #[test]
    fn test_wrong_typed_fields_fall_back() {
        let env = StreamEnvelope::parse(
            r#"{"type": "typing", "post_id": "p1", "author": "Ada", "channel": "comment", "expires_at": 1767225600000}"#,
        )
        .unwrap();
        assert_eq!(env.kind(), EnvelopeKind::Typing);
        assert_eq!(env.author.as_deref(), Some("Ada"));
        assert!(env.expires_at.is_none());

        let env = StreamEnvelope::parse(r#"{"type": "comment_updated", "post_id": "p1", "author": 42, "channel": ["x"]}"#)
            .unwrap();
        assert_eq!(env.kind(), EnvelopeKind::CommentChange);
        assert!(env.author.is_none());
        assert_eq!(env.typing_channel(), Channel::Chat);
    }

    #[test]
    fn test_missing_type_is_other() {
        let env = StreamEnvelope::parse(r#"{"post_id": "p1"}"#).unwrap();
        assert_eq!(env.kind(), EnvelopeKind::Other);
    }
}
