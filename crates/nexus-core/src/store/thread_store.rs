use std::collections::HashMap;

use crate::models::{Channel, ComposeDraft, EditDraft, ThreadEntry};

type Slot = (String, Channel);

fn slot(post_id: &str, channel: Channel) -> Slot {
    (post_id.to_string(), channel)
}

/// Sub-store for per-post comment and chat threads, compose fields and
/// edit snapshots. Every collection is keyed by (post id, channel).
#[derive(Debug, Default)]
pub struct ThreadStore {
    threads: HashMap<Slot, Vec<ThreadEntry>>,
    drafts: HashMap<Slot, ComposeDraft>,
    edits: HashMap<Slot, EditDraft>,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.threads.clear();
        self.drafts.clear();
        self.edits.clear();
    }

    // ===== Threads =====

    pub fn thread(&self, post_id: &str, channel: Channel) -> &[ThreadEntry] {
        self.threads
            .get(&slot(post_id, channel))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn entry(&self, post_id: &str, channel: Channel, entry_id: &str) -> Option<&ThreadEntry> {
        self.thread(post_id, channel).iter().find(|e| e.id == entry_id)
    }

    /// Full replace of the cached thread; no merging
    pub fn replace_thread(&mut self, post_id: &str, channel: Channel, entries: Vec<ThreadEntry>) {
        self.threads.insert(slot(post_id, channel), entries);
    }

    // ===== Compose fields =====

    pub fn draft(&self, post_id: &str, channel: Channel) -> Option<&ComposeDraft> {
        self.drafts.get(&slot(post_id, channel))
    }

    pub fn draft_mut(&mut self, post_id: &str, channel: Channel) -> &mut ComposeDraft {
        self.drafts.entry(slot(post_id, channel)).or_default()
    }

    pub fn set_body(&mut self, post_id: &str, channel: Channel, body: &str) {
        self.draft_mut(post_id, channel).body = body.to_string();
    }

    pub fn set_author(&mut self, post_id: &str, channel: Channel, author: &str) {
        self.draft_mut(post_id, channel).author = author.to_string();
    }

    pub fn set_attachment(&mut self, post_id: &str, channel: Channel, url: &str) {
        self.draft_mut(post_id, channel).attachment_url = url.to_string();
    }

    pub fn push_emoji(&mut self, post_id: &str, channel: Channel, emoji: &str) {
        self.draft_mut(post_id, channel).push_emoji(emoji);
    }

    /// Empty body and attachment after a send, keeping the author
    pub fn clear_compose(&mut self, post_id: &str, channel: Channel) {
        self.draft_mut(post_id, channel).clear();
    }

    // ===== Edit snapshots =====

    pub fn edit(&self, post_id: &str, channel: Channel) -> Option<&EditDraft> {
        self.edits.get(&slot(post_id, channel))
    }

    pub fn edit_mut(&mut self, post_id: &str, channel: Channel) -> Option<&mut EditDraft> {
        self.edits.get_mut(&slot(post_id, channel))
    }

    /// Snapshot an entry for editing, replacing any edit already in progress
    /// for this post and channel
    pub fn start_edit(&mut self, post_id: &str, channel: Channel, entry: &ThreadEntry) {
        self.edits
            .insert(slot(post_id, channel), EditDraft::from_entry(entry));
    }

    pub fn cancel_edit(&mut self, post_id: &str, channel: Channel) {
        self.edits.remove(&slot(post_id, channel));
    }

    /// Remove the edit in progress so it can be saved
    pub fn take_edit(&mut self, post_id: &str, channel: Channel) -> Option<EditDraft> {
        self.edits.remove(&slot(post_id, channel))
    }

    /// Put back an edit whose save failed
    pub fn restore_edit(&mut self, post_id: &str, channel: Channel, edit: EditDraft) {
        self.edits.insert(slot(post_id, channel), edit);
    }
}
