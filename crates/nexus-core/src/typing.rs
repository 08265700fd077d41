//! Typing indicators driven by `typing` push events.
//!
//! Every (post, channel, author) key owns one expiry timer. A newer event for
//! the same key cancels the running timer before installing its own, so the
//! indicator window restarts instead of stacking. Timers report back over a
//! channel; the owner feeds those reports into [`TypingTracker::expire`].

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::constants::DEFAULT_TYPING_AUTHOR;
use crate::models::Channel;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypingKey {
    pub post_id: String,
    pub channel: Channel,
    pub author: String,
}

/// Sent by a timer when its window elapses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingExpiry {
    pub key: TypingKey,
    generation: u64,
}

struct ExpiryTimer {
    generation: u64,
    task: JoinHandle<()>,
}

pub struct TypingTracker {
    /// Typing names per (post, channel), in the order they first appeared
    names: HashMap<(String, Channel), Vec<String>>,
    timers: HashMap<TypingKey, ExpiryTimer>,
    next_generation: u64,
    expiry_tx: mpsc::UnboundedSender<TypingExpiry>,
    fallback: Duration,
    min_delay: Duration,
}

impl TypingTracker {
    pub fn new(
        expiry_tx: mpsc::UnboundedSender<TypingExpiry>,
        fallback: Duration,
        min_delay: Duration,
    ) -> Self {
        Self {
            names: HashMap::new(),
            timers: HashMap::new(),
            next_generation: 0,
            expiry_tx,
            fallback,
            min_delay,
        }
    }

    /// Register a typing event. Must run inside a tokio runtime.
    pub fn record(
        &mut self,
        post_id: &str,
        channel: Channel,
        author: Option<&str>,
        expires_at: Option<&str>,
    ) {
        let author = author
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_TYPING_AUTHOR)
            .to_string();

        let names = self
            .names
            .entry((post_id.to_string(), channel))
            .or_default();
        if !names.contains(&author) {
            names.push(author.clone());
        }

        let key = TypingKey {
            post_id: post_id.to_string(),
            channel,
            author,
        };

        if let Some(previous) = self.timers.remove(&key) {
            previous.task.abort();
        }

        let delay = expiry_delay(expires_at, Utc::now(), self.fallback, self.min_delay);
        self.next_generation += 1;
        let generation = self.next_generation;

        let expiry_tx = self.expiry_tx.clone();
        let expiry = TypingExpiry {
            key: key.clone(),
            generation,
        };
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = expiry_tx.send(expiry);
        });

        trace!(post_id, %channel, author = %key.author, ?delay, "Typing indicator armed");
        self.timers.insert(key, ExpiryTimer { generation, task });
    }

    /// Apply a timer report. Reports from superseded timers are ignored.
    /// Returns true when a name was removed.
    pub fn expire(&mut self, expiry: TypingExpiry) -> bool {
        match self.timers.get(&expiry.key) {
            Some(timer) if timer.generation == expiry.generation => {}
            _ => return false,
        }
        self.timers.remove(&expiry.key);

        let slot = (expiry.key.post_id.clone(), expiry.key.channel);
        let mut removed = false;
        if let Some(names) = self.names.get_mut(&slot) {
            let before = names.len();
            names.retain(|n| n != &expiry.key.author);
            removed = names.len() != before;
            if names.is_empty() {
                self.names.remove(&slot);
            }
        }
        removed
    }

    pub fn names(&self, post_id: &str, channel: Channel) -> &[String] {
        self.names
            .get(&(post_id.to_string(), channel))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn label(&self, post_id: &str, channel: Channel) -> Option<String> {
        typing_label(self.names(post_id, channel))
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    /// Cancel every timer and forget every name (view teardown)
    pub fn clear(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.task.abort();
        }
        self.names.clear();
    }
}

impl Drop for TypingTracker {
    fn drop(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.task.abort();
        }
    }
}

/// "X is typing…" / "X and N more are typing…"
pub fn typing_label(names: &[String]) -> Option<String> {
    match names {
        [] => None,
        [only] => Some(format!("{} is typing…", only)),
        [first, rest @ ..] => Some(format!("{} and {} more are typing…", first, rest.len())),
    }
}

/// Time until an indicator should disappear: `expires_at - now` when the
/// server sent a parseable instant, otherwise `fallback`; never below `min`.
pub fn expiry_delay(
    expires_at: Option<&str>,
    now: DateTime<Utc>,
    fallback: Duration,
    min: Duration,
) -> Duration {
    let expires = expires_at.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok());
    match expires {
        Some(expires) => {
            let remaining = expires.with_timezone(&Utc) - now;
            remaining.to_std().unwrap_or(Duration::ZERO).max(min)
        }
        None => fallback,
    }
}
