//! Application-wide constants
//!
//! Timing windows, defaults and wire names shared by the stream client,
//! the typing tracker and the feed controller.

/// Backend used when neither config nor environment names one
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Fixed delay before re-opening a dropped stream connection
pub const STREAM_RECONNECT_DELAY_MS: u64 = 2000;

/// Typing indicator lifetime when the server omits `expires_at`
pub const TYPING_FALLBACK_MS: u64 = 3000;

/// Lower bound for any typing expiry delay
pub const TYPING_MIN_DELAY_MS: u64 = 500;

/// Thread refresh interval while a post is open
pub const THREAD_POLL_INTERVAL_SECS: u64 = 5;

/// Maximum number of mention candidates requested per lookup
pub const MENTION_LOOKUP_LIMIT: usize = 6;

// Display defaults
pub const DEFAULT_AUTHOR: &str = "Anon";
pub const DEFAULT_TYPING_AUTHOR: &str = "Someone";

/// File name of the post draft handoff inside the data dir
pub const POST_DRAFT_FILE: &str = "nexus_post_draft.json";

/// Quick-insert emoji offered under the comment box
pub const COMMENT_EMOJIS: [&str; 6] = ["👍", "🎯", "🔥", "✨", "💡", "✅"];

/// Quick-insert emoji offered under the chat box
pub const CHAT_EMOJIS: [&str; 6] = ["👋", "😁", "🚀", "🙌", "🤝", "💬"];

// Environment variables
pub mod env {
    pub const BACKEND_URL: &str = "NEXUS_BACKEND_URL";
    pub const DATA_DIR: &str = "NEXUS_DATA_DIR";
    pub const LOG_FILE: &str = "NEXUS_LOG_FILE";
}
