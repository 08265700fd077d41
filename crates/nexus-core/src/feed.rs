//! The posts feed controller.
//!
//! Owns every piece of view state (posts, open post, threads, typing
//! indicators, mention menu, post form) and is driven from a single loop:
//! stream updates, typing expiries, finished background lookups and the
//! poll deadline are all handled one at a time by [`FeedController::run`].

use std::future::Future;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::api::FeedApiClient;
use crate::composer::{PostDraft, PostForm};
use crate::config::FeedConfig;
use crate::constants::DEFAULT_AUTHOR;
use crate::error::{FeedError, Result};
use crate::mentions::{current_mention_query, replace_mention_token, LookupTicket, MentionMenu, MentionTarget};
use crate::models::{Channel, MentionCandidate, Post, ThreadEntry};
use crate::store::ThreadStore;
use crate::streaming::{EnvelopeKind, StreamEnvelope, StreamUpdate};
use crate::typing::{TypingExpiry, TypingTracker};

/// Completions of work the controller spawned off the loop
#[derive(Debug)]
pub enum FeedEvent {
    MentionResults {
        ticket: LookupTicket,
        target: MentionTarget,
        result: Result<Vec<MentionCandidate>>,
    },
}

/// Last known state of the push connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamStatus {
    #[default]
    Idle,
    Connecting { attempt: u64 },
    Connected,
    Disconnected,
}

pub struct FeedController {
    config: FeedConfig,
    api: FeedApiClient,
    posts: Vec<Post>,
    open_post: Option<String>,
    threads: ThreadStore,
    typing: TypingTracker,
    mentions: MentionMenu,
    post_form: PostForm,
    stream_status: StreamStatus,
    poll_deadline: Option<Instant>,
    events_tx: mpsc::UnboundedSender<FeedEvent>,
    events_rx: mpsc::UnboundedReceiver<FeedEvent>,
    expiry_rx: mpsc::UnboundedReceiver<TypingExpiry>,
}

impl FeedController {
    pub fn new(config: FeedConfig) -> Self {
        let api = FeedApiClient::new(&config);
        Self::with_api(config, api)
    }

    pub fn with_api(config: FeedConfig, api: FeedApiClient) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (expiry_tx, expiry_rx) = mpsc::unbounded_channel();
        let typing = TypingTracker::new(expiry_tx, config.typing_fallback, config.typing_min_delay);
        let mentions = MentionMenu::new(config.mention_ordering);

        Self {
            config,
            api,
            posts: Vec::new(),
            open_post: None,
            threads: ThreadStore::new(),
            typing,
            mentions,
            post_form: PostForm::default(),
            stream_status: StreamStatus::default(),
            poll_deadline: None,
            events_tx,
            events_rx,
            expiry_rx,
        }
    }

    // ===== Getters =====

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn api(&self) -> &FeedApiClient {
        &self.api
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn open_post(&self) -> Option<&str> {
        self.open_post.as_deref()
    }

    pub fn is_open(&self, post_id: &str) -> bool {
        self.open_post.as_deref() == Some(post_id)
    }

    pub fn threads(&self) -> &ThreadStore {
        &self.threads
    }

    pub fn thread(&self, post_id: &str, channel: Channel) -> &[ThreadEntry] {
        self.threads.thread(post_id, channel)
    }

    pub fn typing(&self) -> &TypingTracker {
        &self.typing
    }

    pub fn typing_label(&self, post_id: &str, channel: Channel) -> Option<String> {
        self.typing.label(post_id, channel)
    }

    pub fn mention_menu(&self) -> &MentionMenu {
        &self.mentions
    }

    pub fn post_form(&self) -> &PostForm {
        &self.post_form
    }

    pub fn post_form_mut(&mut self) -> &mut PostForm {
        &mut self.post_form
    }

    pub fn stream_status(&self) -> StreamStatus {
        self.stream_status
    }

    // ===== Posts =====

    /// Load the posts list. Failures leave an empty list behind.
    pub async fn load_posts(&mut self) {
        match self.api.list_posts().await {
            Ok(posts) => self.posts = posts,
            Err(e) => {
                warn!("Failed to load posts: {}", e);
                self.posts.clear();
            }
        }
    }

    /// Open `post_id`, or close it if it is already the open post.
    /// Opening fetches both threads right away and arms the poll.
    pub async fn toggle_open(&mut self, post_id: &str) {
        if self.is_open(post_id) {
            debug!(post_id, "Closing post");
            self.open_post = None;
            self.poll_deadline = None;
            return;
        }

        debug!(post_id, "Opening post");
        self.open_post = Some(post_id.to_string());
        self.poll_deadline = Some(Instant::now() + self.config.poll_interval);
        self.refresh_open().await;
    }

    // ===== Threads =====

    pub async fn fetch_comments(&mut self, post_id: &str) {
        self.fetch_thread(post_id, Channel::Comment).await;
    }

    pub async fn fetch_chat(&mut self, post_id: &str) {
        self.fetch_thread(post_id, Channel::Chat).await;
    }

    /// Full-replace fetch of one thread. Failures keep the cached thread.
    pub async fn fetch_thread(&mut self, post_id: &str, channel: Channel) {
        match self.api.fetch_thread(post_id, channel).await {
            Ok(entries) => {
                trace!(post_id, %channel, count = entries.len(), "Thread fetched");
                self.threads.replace_thread(post_id, channel, entries);
            }
            Err(e) => warn!(post_id, %channel, "Failed to fetch thread: {}", e),
        }
    }

    /// Re-fetch both threads of the open post, if any
    pub async fn refresh_open(&mut self) {
        if let Some(post_id) = self.open_post.clone() {
            self.fetch_comments(&post_id).await;
            self.fetch_chat(&post_id).await;
        }
    }

    async fn refresh_if_open(&mut self, post_id: &str, channel: Channel) {
        if self.is_open(post_id) {
            self.fetch_thread(post_id, channel).await;
        }
    }

    // ===== Compose =====

    /// Set the compose body without the side effects of [`Self::on_input_change`]
    pub fn set_body(&mut self, post_id: &str, channel: Channel, body: &str) {
        self.threads.set_body(post_id, channel, body);
    }

    pub fn set_author(&mut self, post_id: &str, channel: Channel, author: &str) {
        self.threads.set_author(post_id, channel, author);
    }

    pub fn set_attachment(&mut self, post_id: &str, channel: Channel, url: &str) {
        self.threads.set_attachment(post_id, channel, url);
    }

    pub fn push_emoji(&mut self, post_id: &str, channel: Channel, emoji: &str) {
        self.threads.push_emoji(post_id, channel, emoji);
    }

    /// A keystroke in a compose field: store the value, run mention
    /// detection and tell other viewers we are typing.
    pub fn on_input_change(&mut self, post_id: &str, channel: Channel, value: &str) {
        self.threads.set_body(post_id, channel, value);

        match current_mention_query(value) {
            Some(query) => self.spawn_mention_lookup(post_id, channel, query),
            None => self.mentions.close(),
        }

        let author = self
            .threads
            .draft(post_id, channel)
            .map(|d| d.author_or_default().to_string())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
        self.spawn_typing_notice(post_id, channel, author);
    }

    fn spawn_mention_lookup(&mut self, post_id: &str, channel: Channel, query: &str) {
        let ticket = self.mentions.begin_lookup();
        let target = MentionTarget {
            post_id: post_id.to_string(),
            channel,
        };
        let api = self.api.clone();
        let query = query.to_string();
        let limit = self.config.mention_limit;
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let result = api.lookup_mentions(&query, limit).await;
            let _ = events_tx.send(FeedEvent::MentionResults {
                ticket,
                target,
                result,
            });
        });
    }

    fn spawn_typing_notice(&self, post_id: &str, channel: Channel, author: String) {
        let api = self.api.clone();
        let post_id = post_id.to_string();

        tokio::spawn(async move {
            if let Err(e) = api.send_typing(&post_id, channel, &author).await {
                debug!(post_id, %channel, "Typing notification failed: {}", e);
            }
        });
    }

    /// Replace the trailing `@token` of the compose field with `handle`
    pub fn insert_mention(&mut self, post_id: &str, channel: Channel, handle: &str) {
        let draft = self.threads.draft_mut(post_id, channel);
        draft.body = replace_mention_token(&draft.body, handle);
        self.mentions.close();
    }

    /// Pick the `index`th candidate of the visible menu
    pub fn select_mention(&mut self, index: usize) -> bool {
        let picked = match (self.mentions.target(), self.mentions.items().get(index)) {
            (Some(target), Some(candidate)) => Some((target.clone(), candidate.handle.clone())),
            _ => None,
        };

        match picked {
            Some((target, handle)) => {
                self.insert_mention(&target.post_id, target.channel, &handle);
                true
            }
            None => false,
        }
    }

    pub async fn add_comment(&mut self, post_id: &str) -> Result<()> {
        self.submit(post_id, Channel::Comment).await
    }

    pub async fn add_chat_message(&mut self, post_id: &str) -> Result<()> {
        self.submit(post_id, Channel::Chat).await
    }

    /// Send the compose field. Blank bodies never reach the network.
    pub async fn submit(&mut self, post_id: &str, channel: Channel) -> Result<()> {
        let draft = self
            .threads
            .draft(post_id, channel)
            .cloned()
            .unwrap_or_default();

        let body = draft.body.trim();
        if body.is_empty() {
            return Err(FeedError::BlankBody { channel });
        }

        if let Err(e) = self
            .api
            .create_entry(post_id, channel, body, draft.author_or_default(), draft.attachment())
            .await
        {
            error!(post_id, %channel, "Failed to send: {}", e);
            return Err(e);
        }

        self.threads.clear_compose(post_id, channel);
        self.refresh_if_open(post_id, channel).await;
        Ok(())
    }

    // ===== Edits =====

    /// Snapshot an entry for editing. Returns false if the entry is unknown.
    pub fn start_edit(&mut self, post_id: &str, channel: Channel, entry_id: &str) -> bool {
        match self.threads.entry(post_id, channel, entry_id).cloned() {
            Some(entry) => {
                self.threads.start_edit(post_id, channel, &entry);
                true
            }
            None => false,
        }
    }

    pub fn set_edit_body(&mut self, post_id: &str, channel: Channel, body: &str) {
        if let Some(edit) = self.threads.edit_mut(post_id, channel) {
            edit.body = body.to_string();
        }
    }

    pub fn set_edit_attachment(&mut self, post_id: &str, channel: Channel, url: &str) {
        if let Some(edit) = self.threads.edit_mut(post_id, channel) {
            edit.attachment_url = url.to_string();
        }
    }

    pub fn cancel_edit(&mut self, post_id: &str, channel: Channel) {
        self.threads.cancel_edit(post_id, channel);
    }

    /// PATCH the edit in progress. Without one this is a no-op. On failure
    /// the edit stays in place so it can be retried.
    pub async fn save_edit(&mut self, post_id: &str, channel: Channel) -> Result<()> {
        let Some(edit) = self.threads.take_edit(post_id, channel) else {
            return Ok(());
        };

        if let Err(e) = self
            .api
            .update_entry(post_id, channel, &edit.id, &edit.body, edit.attachment())
            .await
        {
            error!(post_id, %channel, entry_id = %edit.id, "Failed to save edit: {}", e);
            self.threads.restore_edit(post_id, channel, edit);
            return Err(e);
        }

        self.refresh_if_open(post_id, channel).await;
        Ok(())
    }

    pub async fn delete_comment(&mut self, post_id: &str, entry_id: &str) -> Result<()> {
        self.delete_entry(post_id, Channel::Comment, entry_id).await
    }

    pub async fn delete_chat(&mut self, post_id: &str, entry_id: &str) -> Result<()> {
        self.delete_entry(post_id, Channel::Chat, entry_id).await
    }

    pub async fn delete_entry(&mut self, post_id: &str, channel: Channel, entry_id: &str) -> Result<()> {
        if let Err(e) = self.api.delete_entry(post_id, channel, entry_id).await {
            error!(post_id, %channel, entry_id, "Failed to delete: {}", e);
            return Err(e);
        }
        self.refresh_if_open(post_id, channel).await;
        Ok(())
    }

    // ===== Post composer =====

    /// Pre-fill the post form from a handoff draft
    pub fn apply_draft(&mut self, draft: &PostDraft) {
        self.post_form = PostForm::from_draft(draft);
    }

    /// Queue the post form on the backend
    pub async fn create_post(&mut self) -> Result<Value> {
        let post = self.post_form.to_new_post()?;
        match self.api.create_post(&post).await {
            Ok(resp) => {
                info!(platform = %post.platform, "Post queued");
                Ok(resp)
            }
            Err(e) => {
                error!("Failed to queue post: {}", e);
                Err(e)
            }
        }
    }

    // ===== Event handling =====

    pub async fn handle_stream_update(&mut self, update: StreamUpdate) {
        match update {
            StreamUpdate::Connecting { attempt } => {
                self.stream_status = StreamStatus::Connecting { attempt };
            }
            StreamUpdate::Connected => self.stream_status = StreamStatus::Connected,
            StreamUpdate::Disconnected { .. } => self.stream_status = StreamStatus::Disconnected,
            StreamUpdate::Envelope(envelope) => self.handle_envelope(envelope).await,
        }
    }

    /// React to a push event. Only events naming the open post count;
    /// nothing is buffered for other posts.
    pub async fn handle_envelope(&mut self, envelope: StreamEnvelope) {
        let Some(open) = self.open_post.clone() else {
            return;
        };
        if !envelope.targets(&open) {
            trace!(kind = %envelope.kind, "Ignoring event for another post");
            return;
        }

        match envelope.kind() {
            EnvelopeKind::CommentChange => self.fetch_comments(&open).await,
            EnvelopeKind::ChatChange => self.fetch_chat(&open).await,
            EnvelopeKind::Typing => self.typing.record(
                &open,
                envelope.typing_channel(),
                envelope.author.as_deref(),
                envelope.expires_at.as_deref(),
            ),
            EnvelopeKind::Other => {}
        }
    }

    pub fn handle_typing_expiry(&mut self, expiry: TypingExpiry) -> bool {
        self.typing.expire(expiry)
    }

    pub fn handle_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::MentionResults {
                ticket,
                target,
                result,
            } => match result {
                Ok(items) => {
                    if !self.mentions.apply_results(ticket, target, items) {
                        debug!("Dropped stale mention lookup");
                    }
                }
                Err(e) => {
                    warn!("Mention lookup failed: {}", e);
                    self.mentions.apply_failure(ticket);
                }
            },
        }
    }

    async fn poll_open(&mut self) {
        self.refresh_open().await;
        self.poll_deadline = self
            .open_post
            .as_ref()
            .map(|_| Instant::now() + self.config.poll_interval);
    }

    /// Drive the controller until `shutdown` resolves. `on_change` runs once
    /// up front and after every handled event.
    pub async fn run<F, C>(
        &mut self,
        stream_rx: &mut mpsc::Receiver<StreamUpdate>,
        shutdown: F,
        mut on_change: C,
    ) where
        F: Future<Output = ()>,
        C: FnMut(&FeedController),
    {
        tokio::pin!(shutdown);
        on_change(self);

        loop {
            let poll_deadline = self.poll_deadline;

            tokio::select! {
                _ = &mut shutdown => break,
                Some(update) = stream_rx.recv() => self.handle_stream_update(update).await,
                Some(expiry) = self.expiry_rx.recv() => {
                    self.handle_typing_expiry(expiry);
                }
                Some(event) = self.events_rx.recv() => self.handle_feed_event(event),
                _ = wait_for(poll_deadline) => self.poll_open().await,
            }

            on_change(self);
        }
    }

    /// Release everything tied to the view, cached threads included
    pub fn teardown(&mut self) {
        self.typing.clear();
        self.threads.clear();
        self.mentions.close();
        self.poll_deadline = None;
        self.open_post = None;
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
