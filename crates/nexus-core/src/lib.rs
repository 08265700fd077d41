pub mod api;
pub mod composer;
pub mod config;
pub mod constants;
pub mod error;
pub mod feed;
pub mod mentions;
pub mod models;
pub mod session;
pub mod store;
pub mod streaming;
pub mod tracing_setup;
pub mod typing;

pub use api::FeedApiClient;
pub use config::{FeedConfig, MentionOrdering};
pub use error::{FeedError, Result};
pub use feed::{FeedController, FeedEvent, StreamStatus};
pub use session::FeedSession;
