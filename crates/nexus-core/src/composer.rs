//! Post creation form and the one-shot draft handoff file.
//!
//! A draft producer (the AI writer) drops a single JSON draft into the data
//! dir; the composer reads it once when the view mounts. Reading is best
//! effort: a missing or malformed file simply means there is no draft.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::POST_DRAFT_FILE;
use crate::error::{FeedError, Result};
use crate::models::{NewPost, Platform};

/// Draft handed from a producer to the post composer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media_url: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

pub fn draft_path(data_dir: &Path) -> PathBuf {
    data_dir.join(POST_DRAFT_FILE)
}

/// Read the handoff draft, if a readable one exists
pub fn load_draft(data_dir: &Path) -> Option<PostDraft> {
    let path = draft_path(data_dir);
    match fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(draft) => Some(draft),
            Err(e) => {
                warn!(path = %path.display(), "Ignoring malformed post draft: {}", e);
                None
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), "Failed to read post draft: {}", e);
            None
        }
    }
}

/// Write the handoff draft, replacing any previous one
pub fn save_draft(data_dir: &Path, draft: &PostDraft) -> io::Result<()> {
    fs::create_dir_all(data_dir)?;
    let json = serde_json::to_string_pretty(draft).map_err(io::Error::other)?;
    fs::write(draft_path(data_dir), json)?;
    debug!(dir = %data_dir.display(), "Saved post draft");
    Ok(())
}

/// Editable post form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostForm {
    pub platform: Platform,
    pub content: String,
    pub media_url: String,
    /// Comma separated, as typed
    pub hashtags: String,
    /// RFC 3339 schedule time, empty for "publish when processed"
    pub scheduled_at: String,
}

impl PostForm {
    /// Pre-fill a form from a handoff draft
    pub fn from_draft(draft: &PostDraft) -> Self {
        Self {
            platform: draft.platform.unwrap_or_default(),
            content: draft.content.clone(),
            media_url: draft.media_url.clone(),
            hashtags: draft.hashtags.join(", "),
            scheduled_at: String::new(),
        }
    }

    pub fn hashtag_list(&self) -> Vec<String> {
        self.hashtags
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Validate and build the request body
    pub fn to_new_post(&self) -> Result<NewPost> {
        if self.content.trim().is_empty() {
            return Err(FeedError::BlankContent);
        }
        let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());

        Ok(NewPost {
            platform: self.platform,
            content: self.content.clone(),
            media_url: non_empty(&self.media_url),
            hashtags: self.hashtag_list(),
            scheduled_at: non_empty(&self.scheduled_at),
        })
    }
}
