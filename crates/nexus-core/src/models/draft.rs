use crate::constants::DEFAULT_AUTHOR;

use super::ThreadEntry;

/// In-progress compose field for one (post, channel)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeDraft {
    pub author: String,
    pub body: String,
    pub attachment_url: String,
}

impl ComposeDraft {
    /// Author to send, falling back to "Anon" when the field is blank
    pub fn author_or_default(&self) -> &str {
        if self.author.is_empty() {
            DEFAULT_AUTHOR
        } else {
            &self.author
        }
    }

    /// Attachment to send on create; empty means "omit"
    pub fn attachment(&self) -> Option<&str> {
        Some(self.attachment_url.as_str()).filter(|u| !u.is_empty())
    }

    /// Reset after a successful send. The author survives.
    pub fn clear(&mut self) {
        self.author = self.author_or_default().to_string();
        self.body.clear();
        self.attachment_url.clear();
    }

    /// Append an emoji separated by a space, trimming the result
    pub fn push_emoji(&mut self, emoji: &str) {
        self.body = format!("{} {}", self.body, emoji).trim().to_string();
    }
}

/// Snapshot of an entry being edited, held apart from the live thread
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub id: String,
    pub body: String,
    pub attachment_url: String,
}

impl EditDraft {
    pub fn from_entry(entry: &ThreadEntry) -> Self {
        Self {
            id: entry.id.clone(),
            body: entry.body.clone(),
            attachment_url: entry.attachment_url.clone().unwrap_or_default(),
        }
    }

    /// Attachment to PATCH; empty becomes an explicit null
    pub fn attachment(&self) -> Option<&str> {
        Some(self.attachment_url.as_str()).filter(|u| !u.is_empty())
    }
}
