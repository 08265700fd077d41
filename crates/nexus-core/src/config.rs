use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    env, DEFAULT_BACKEND_URL, MENTION_LOOKUP_LIMIT, STREAM_RECONNECT_DELAY_MS,
    THREAD_POLL_INTERVAL_SECS, TYPING_FALLBACK_MS, TYPING_MIN_DELAY_MS,
};

/// How mention lookup responses are applied when several are in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MentionOrdering {
    /// Only the response to the most recent lookup may update the menu
    #[default]
    LatestWins,
    /// Every response replaces the menu as it arrives, so a slow early
    /// response can overwrite a newer one
    ArrivalOrder,
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub backend_url: String,
    pub reconnect_delay: Duration,
    pub typing_fallback: Duration,
    pub typing_min_delay: Duration,
    pub poll_interval: Duration,
    pub mention_limit: usize,
    pub mention_ordering: MentionOrdering,
    /// Directory holding the post draft handoff file
    pub data_dir: PathBuf,
}

impl FeedConfig {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            reconnect_delay: Duration::from_millis(STREAM_RECONNECT_DELAY_MS),
            typing_fallback: Duration::from_millis(TYPING_FALLBACK_MS),
            typing_min_delay: Duration::from_millis(TYPING_MIN_DELAY_MS),
            poll_interval: Duration::from_secs(THREAD_POLL_INTERVAL_SECS),
            mention_limit: MENTION_LOOKUP_LIMIT,
            mention_ordering: MentionOrdering::default(),
            data_dir: default_data_dir(),
        }
    }

    /// Build a config from `NEXUS_BACKEND_URL` / `NEXUS_DATA_DIR`, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Self {
        let backend = std::env::var(env::BACKEND_URL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let mut config = Self::new(backend);
        if let Some(dir) = std::env::var_os(env::DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_data_dir<P: AsRef<Path>>(mut self, data_dir: P) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("nexus"))
        .unwrap_or_else(|| PathBuf::from("nexus_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_dropped() {
        let config = FeedConfig::new("http://example.test/");
        assert_eq!(config.backend_url, "http://example.test");
    }

    #[test]
    fn test_defaults_match_feed_timings() {
        let config = FeedConfig::default();
        assert_eq!(config.reconnect_delay, Duration::from_millis(2000));
        assert_eq!(config.typing_fallback, Duration::from_millis(3000));
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.mention_limit, 6);
        assert_eq!(config.mention_ordering, MentionOrdering::LatestWins);
    }
}
