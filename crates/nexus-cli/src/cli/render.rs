//! Plain-terminal rendering of threads and the watch view.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use nexus_core::mentions::{highlight_mentions, TextSegment};
use nexus_core::models::{Channel, Platform, ThreadEntry};
use nexus_core::{FeedController, StreamStatus};

/// Entry body with `@mentions` highlighted
pub fn styled_body(body: &str) -> String {
    highlight_mentions(body)
        .into_iter()
        .map(|segment| match segment {
            TextSegment::Plain(text) => text.to_string(),
            TextSegment::Mention(handle) => handle.cyan().bold().to_string(),
        })
        .collect()
}

pub fn render_entry<W: Write>(out: &mut W, entry: &ThreadEntry) -> io::Result<()> {
    let timestamp = entry.display_timestamp();
    write!(out, "{} #{}", entry.display_author().bold(), entry.id)?;
    if !timestamp.is_empty() {
        write!(out, " {}", timestamp.dark_grey())?;
    }
    writeln!(out)?;
    writeln!(out, "  {}", styled_body(&entry.body))?;

    if let Some(url) = entry.attachment() {
        let kind = if entry.has_image_attachment() { "image" } else { "link" };
        writeln!(out, "  [{}] {}", kind, url.underlined())?;
    }
    Ok(())
}

pub fn render_thread<W: Write>(
    out: &mut W,
    channel: Channel,
    entries: &[ThreadEntry],
    typing: Option<&str>,
) -> io::Result<()> {
    let title = match channel {
        Channel::Comment => "Comments",
        Channel::Chat => "Chat",
    };
    writeln!(out, "{} ({})", title.bold().underlined(), entries.len())?;

    if entries.is_empty() {
        writeln!(out, "  {}", "Nothing here yet".dark_grey())?;
    }
    for entry in entries {
        render_entry(out, entry)?;
    }
    if let Some(label) = typing {
        writeln!(out, "  {}", label.italic().dark_grey())?;
    }
    Ok(())
}

/// Display name for a platform key, or the key itself when unknown
fn platform_label(key: &str) -> String {
    key.parse::<Platform>()
        .map(|p| p.label().to_string())
        .unwrap_or_else(|_| key.to_string())
}

fn status_line(status: StreamStatus) -> String {
    match status {
        StreamStatus::Idle => "idle".dark_grey().to_string(),
        StreamStatus::Connecting { attempt } => format!("connecting (attempt {})", attempt)
            .yellow()
            .to_string(),
        StreamStatus::Connected => "live".green().to_string(),
        StreamStatus::Disconnected => "reconnecting".red().to_string(),
    }
}

/// Redraw the whole watch screen for `post_id`
pub fn render_watch<W: Write>(out: &mut W, feed: &FeedController, post_id: &str) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    let heading = feed
        .posts()
        .iter()
        .find(|p| p.id == post_id)
        .map(|p| format!("{} [{}] {}", platform_label(&p.platform), p.status, p.content))
        .unwrap_or_else(|| format!("Post {}", post_id));
    writeln!(out, "{}  {}", heading.bold(), status_line(feed.stream_status()))?;
    writeln!(out)?;

    for channel in [Channel::Comment, Channel::Chat] {
        let typing = feed.typing_label(post_id, channel);
        render_thread(out, channel, feed.thread(post_id, channel), typing.as_deref())?;
        writeln!(out)?;
    }

    writeln!(out, "{}", "Ctrl-C to quit".dark_grey())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(body: &str, attachment: Option<&str>) -> ThreadEntry {
        ThreadEntry {
            id: "1".to_string(),
            channel: Channel::Comment,
            author: Some("Ada".to_string()),
            body: body.to_string(),
            attachment_url: attachment.map(str::to_string),
            created_at: None,
        }
    }

    fn rendered(entry: &ThreadEntry) -> String {
        let mut out = Vec::new();
        render_entry(&mut out, entry).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_mention_body_keeps_text() {
        let body = styled_body("hello @nexus");
        assert!(body.starts_with("hello "));
        assert!(body.contains("@nexus"));
    }

    #[test]
    fn test_attachment_kinds() {
        assert!(rendered(&entry("pic", Some("https://cdn.test/a.PNG"))).contains("[image]"));
        assert!(rendered(&entry("doc", Some("https://cdn.test/a.pdf"))).contains("[link]"));
        let plain = rendered(&entry("none", None));
        assert!(!plain.contains("[image]") && !plain.contains("[link]"));
    }

    #[test]
    fn test_platform_label() {
        assert_eq!(platform_label("twitter"), "Twitter/X");
        assert_eq!(platform_label("mastodon"), "mastodon");
    }

    #[test]
    fn test_thread_with_typing_label() {
        let mut out = Vec::new();
        render_thread(
            &mut out,
            Channel::Chat,
            &[entry("hi", None)],
            Some("Bo is typing…"),
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(1)"));
        assert!(text.contains("Bo is typing…"));
    }
}
