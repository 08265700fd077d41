use crate::models::Channel;

/// Errors surfaced by the feed client.
///
/// Background refreshes log these and carry on; user-initiated mutations
/// return them so a front end can report the failure.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode backend payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cannot send an empty {channel}")]
    BlankBody { channel: Channel },

    #[error("Post content cannot be empty")]
    BlankContent,
}

pub type Result<T> = std::result::Result<T, FeedError>;
