//! `@handle` detection, substitution and highlighting.
//!
//! Detection looks only at the end of the whole buffer; the cursor position is
//! not tracked.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::config::MentionOrdering;
use crate::models::{Channel, MentionCandidate};

static TRAILING_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)(@[A-Za-z0-9_]{1,24})$").expect("valid mention regex"));

static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("valid mention regex"));

/// The in-progress `@token` at the end of `value`, without the `@`
pub fn current_mention_query(value: &str) -> Option<&str> {
    TRAILING_MENTION
        .captures(value)
        .and_then(|caps| caps.get(2))
        .map(|m| &m.as_str()[1..])
}

/// Replace the trailing `@token` with `handle` plus one space.
/// Values without a trailing token come back unchanged.
pub fn replace_mention_token(value: &str, handle: &str) -> String {
    TRAILING_MENTION
        .replace(value, |caps: &Captures| format!("{}{} ", &caps[1], handle))
        .into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSegment<'a> {
    Plain(&'a str),
    Mention(&'a str),
}

/// Split text into plain and `@mention` runs for distinct rendering
pub fn highlight_mentions(text: &str) -> Vec<TextSegment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in MENTION.find_iter(text) {
        if m.start() > last {
            segments.push(TextSegment::Plain(&text[last..m.start()]));
        }
        segments.push(TextSegment::Mention(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        segments.push(TextSegment::Plain(&text[last..]));
    }
    segments
}

/// The compose field a mention menu belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionTarget {
    pub post_id: String,
    pub channel: Channel,
}

/// Ticket handed out per lookup so late responses can be recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket(u64);

/// The single autocomplete menu shown under one compose field
#[derive(Debug, Default)]
pub struct MentionMenu {
    target: Option<MentionTarget>,
    items: Vec<MentionCandidate>,
    latest: u64,
    ordering: MentionOrdering,
}

impl MentionMenu {
    pub fn new(ordering: MentionOrdering) -> Self {
        Self {
            ordering,
            ..Self::default()
        }
    }

    pub fn is_visible(&self) -> bool {
        self.target.is_some() && !self.items.is_empty()
    }

    pub fn target(&self) -> Option<&MentionTarget> {
        self.target.as_ref()
    }

    pub fn items(&self) -> &[MentionCandidate] {
        &self.items
    }

    /// Note that a lookup is starting and get its ticket
    pub fn begin_lookup(&mut self) -> LookupTicket {
        self.latest += 1;
        LookupTicket(self.latest)
    }

    /// Show lookup results for `target`, replacing any previous menu.
    /// Returns false when the response is stale and was dropped.
    pub fn apply_results(
        &mut self,
        ticket: LookupTicket,
        target: MentionTarget,
        items: Vec<MentionCandidate>,
    ) -> bool {
        if self.is_stale(ticket) {
            return false;
        }
        self.target = Some(target);
        self.items = items;
        true
    }

    /// A lookup failed: close the menu unless a newer lookup owns it
    pub fn apply_failure(&mut self, ticket: LookupTicket) {
        if !self.is_stale(ticket) {
            self.close();
        }
    }

    /// Hide the menu. In-flight lookups issued before this are now stale.
    pub fn close(&mut self) {
        self.target = None;
        self.items.clear();
        self.latest += 1;
    }

    fn is_stale(&self, ticket: LookupTicket) -> bool {
        self.ordering == MentionOrdering::LatestWins && ticket.0 != self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(handle: &str) -> MentionCandidate {
        MentionCandidate {
            handle: handle.to_string(),
            display_name: String::new(),
        }
    }

    fn target() -> MentionTarget {
        MentionTarget {
            post_id: "p1".to_string(),
            channel: Channel::Comment,
        }
    }

    #[test]
    fn test_detects_trailing_token() {
        assert_eq!(current_mention_query("@ne"), Some("ne"));
        assert_eq!(current_mention_query("hello @nexus_1"), Some("nexus_1"));
        assert_eq!(current_mention_query("hello\t@a"), Some("a"));
        assert_eq!(current_mention_query("hello @"), None);
        assert_eq!(current_mention_query("mail@nexus"), None);
        assert_eq!(current_mention_query("@nexus hi"), None);
        assert_eq!(current_mention_query("@nexus "), None);
        assert_eq!(current_mention_query(""), None);
    }

    #[test]
    fn test_token_length_limit() {
        let ok = format!("@{}", "a".repeat(24));
        let too_long = format!("@{}", "a".repeat(25));
        assert!(current_mention_query(&ok).is_some());
        assert!(current_mention_query(&too_long).is_none());
    }

    #[test]
    fn test_replace_keeps_prefix() {
        assert_eq!(replace_mention_token("hello @ne", "@nexus"), "hello @nexus ");
        assert_eq!(replace_mention_token("@ne", "@nexus"), "@nexus ");
        assert_eq!(replace_mention_token("a\n@x", "@xavier"), "a\n@xavier ");
        assert_eq!(replace_mention_token("no token", "@nexus"), "no token");
    }

    #[test]
    fn test_replace_handle_with_dollar_is_literal() {
        assert_eq!(replace_mention_token("hi @a", "$1"), "hi $1 ");
    }

    #[test]
    fn test_highlight_segments() {
        assert_eq!(
            highlight_mentions("hello @nexus"),
            vec![TextSegment::Plain("hello "), TextSegment::Mention("@nexus")]
        );
        assert_eq!(
            highlight_mentions("@a and @b!"),
            vec![
                TextSegment::Mention("@a"),
                TextSegment::Plain(" and "),
                TextSegment::Mention("@b"),
                TextSegment::Plain("!"),
            ]
        );
        assert!(highlight_mentions("").is_empty());
        assert_eq!(highlight_mentions("plain"), vec![TextSegment::Plain("plain")]);
    }

    #[test]
    fn test_latest_wins_drops_stale_response() {
        let mut menu = MentionMenu::new(MentionOrdering::LatestWins);
        let first = menu.begin_lookup();
        let second = menu.begin_lookup();

        assert!(menu.apply_results(second, target(), vec![candidate("@nexus")]));
        // The slower, older response arrives last and is dropped
        assert!(!menu.apply_results(first, target(), vec![candidate("@ne")]));
        assert_eq!(menu.items()[0].handle, "@nexus");
        assert!(menu.is_visible());
    }

    #[test]
    fn test_arrival_order_lets_stale_response_win() {
        let mut menu = MentionMenu::new(MentionOrdering::ArrivalOrder);
        let first = menu.begin_lookup();
        let second = menu.begin_lookup();

        assert!(menu.apply_results(second, target(), vec![candidate("@nexus")]));
        assert!(menu.apply_results(first, target(), vec![candidate("@ne")]));
        assert_eq!(menu.items()[0].handle, "@ne");
    }

    #[test]
    fn test_close_invalidates_in_flight_lookup() {
        let mut menu = MentionMenu::new(MentionOrdering::LatestWins);
        let ticket = menu.begin_lookup();
        menu.close();
        assert!(!menu.apply_results(ticket, target(), vec![candidate("@nexus")]));
        assert!(!menu.is_visible());
    }

    #[test]
    fn test_empty_results_keep_menu_hidden() {
        let mut menu = MentionMenu::new(MentionOrdering::LatestWins);
        let ticket = menu.begin_lookup();
        assert!(menu.apply_results(ticket, target(), Vec::new()));
        assert!(!menu.is_visible());
        assert_eq!(menu.target(), Some(&target()));
    }
}
