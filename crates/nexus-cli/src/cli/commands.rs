use std::io;

use anyhow::{anyhow, bail, Context, Result};
use nexus_core::composer::{self, PostDraft, PostForm};
use nexus_core::models::{Channel, Platform};
use nexus_core::{FeedApiClient, FeedConfig, FeedController, FeedSession};
use serde_json::{json, Value};
use tracing::warn;

use super::render;

/// Post form fields given on the command line
#[derive(Debug, Clone, Default)]
pub struct PostArgs {
    pub platform: Option<Platform>,
    pub content: Option<String>,
    pub media_url: Option<String>,
    /// Comma separated
    pub hashtags: Option<String>,
    pub scheduled_at: Option<String>,
}

impl PostArgs {
    /// Overlay the given fields on `form`
    fn apply(self, form: &mut PostForm) {
        if let Some(platform) = self.platform {
            form.platform = platform;
        }
        if let Some(content) = self.content {
            form.content = content;
        }
        if let Some(media_url) = self.media_url {
            form.media_url = media_url;
        }
        if let Some(hashtags) = self.hashtags {
            form.hashtags = hashtags;
        }
        if let Some(scheduled_at) = self.scheduled_at {
            form.scheduled_at = scheduled_at;
        }
    }
}

#[derive(Debug, Clone)]
pub enum CliCommand {
    ListPosts,
    ListThread {
        post_id: String,
        channel: Channel,
    },
    Send {
        post_id: String,
        channel: Channel,
        body: String,
        author: Option<String>,
        attachment: Option<String>,
        /// Indexes into the channel's quick-insert emoji
        emojis: Vec<usize>,
    },
    Edit {
        post_id: String,
        channel: Channel,
        entry_id: String,
        body: String,
        /// `None` keeps the current attachment, an empty string removes it
        attachment: Option<String>,
    },
    Delete {
        post_id: String,
        channel: Channel,
        entry_id: String,
    },
    Mentions {
        query: String,
        limit: usize,
    },
    Typing {
        post_id: String,
        channel: Channel,
        author: Option<String>,
    },
    CreatePost {
        fields: PostArgs,
        from_draft: bool,
    },
    SaveDraft {
        fields: PostArgs,
    },
    Watch {
        post_id: String,
    },
}

/// Run one command against the backend. `default_author` comes from the
/// config file and is used when a command does not name one.
pub async fn execute(
    command: CliCommand,
    config: FeedConfig,
    default_author: Option<String>,
    pretty: bool,
) -> Result<()> {
    match command {
        CliCommand::ListPosts => {
            let posts = FeedApiClient::new(&config).list_posts().await?;
            print_json(&json!({ "items": posts }), pretty)
        }

        CliCommand::ListThread { post_id, channel } => {
            let mut feed = FeedController::new(config);
            feed.toggle_open(&post_id).await;
            let typing = feed.typing_label(&post_id, channel);
            render::render_thread(
                &mut io::stdout().lock(),
                channel,
                feed.thread(&post_id, channel),
                typing.as_deref(),
            )?;
            Ok(())
        }

        CliCommand::Send {
            post_id,
            channel,
            body,
            author,
            attachment,
            emojis,
        } => {
            let mut feed = FeedController::new(config);
            feed.toggle_open(&post_id).await;

            if let Some(author) = author.or(default_author) {
                feed.set_author(&post_id, channel, &author);
            }
            if let Some(url) = attachment {
                feed.set_attachment(&post_id, channel, &url);
            }
            feed.set_body(&post_id, channel, &body);
            for index in emojis {
                let emoji = channel
                    .quick_emojis()
                    .get(index)
                    .ok_or_else(|| anyhow!("No quick emoji #{} for {}", index, channel))?;
                feed.push_emoji(&post_id, channel, emoji);
            }

            feed.submit(&post_id, channel)
                .await
                .with_context(|| format!("Failed to send {} on post {}", channel, post_id))?;
            print_json(
                &json!({
                    "post_id": post_id,
                    "channel": channel,
                    "count": feed.thread(&post_id, channel).len(),
                }),
                pretty,
            )
        }

        CliCommand::Edit {
            post_id,
            channel,
            entry_id,
            body,
            attachment,
        } => {
            let mut feed = FeedController::new(config);
            feed.toggle_open(&post_id).await;

            if !feed.start_edit(&post_id, channel, &entry_id) {
                bail!("No {} with id {} on post {}", channel, entry_id, post_id);
            }
            feed.set_edit_body(&post_id, channel, &body);
            if let Some(url) = attachment {
                feed.set_edit_attachment(&post_id, channel, &url);
            }

            feed.save_edit(&post_id, channel)
                .await
                .with_context(|| format!("Failed to update {} {}", channel, entry_id))?;
            print_json(&json!({ "updated": entry_id, "channel": channel }), pretty)
        }

        CliCommand::Delete {
            post_id,
            channel,
            entry_id,
        } => {
            let mut feed = FeedController::new(config);
            feed.delete_entry(&post_id, channel, &entry_id)
                .await
                .with_context(|| format!("Failed to delete {} {}", channel, entry_id))?;
            print_json(&json!({ "deleted": entry_id, "channel": channel }), pretty)
        }

        CliCommand::Mentions { query, limit } => {
            let items = FeedApiClient::new(&config)
                .lookup_mentions(query.trim_start_matches('@'), limit)
                .await?;
            print_json(&json!({ "items": items }), pretty)
        }

        CliCommand::Typing {
            post_id,
            channel,
            author,
        } => {
            let author = author
                .or(default_author)
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| nexus_core::constants::DEFAULT_AUTHOR.to_string());
            FeedApiClient::new(&config)
                .send_typing(&post_id, channel, &author)
                .await?;
            print_json(&json!({ "post_id": post_id, "channel": channel, "author": author }), pretty)
        }

        CliCommand::CreatePost { fields, from_draft } => {
            let mut form = if from_draft {
                let draft = composer::load_draft(&config.data_dir).ok_or_else(|| {
                    anyhow!(
                        "No post draft in {}",
                        composer::draft_path(&config.data_dir).display()
                    )
                })?;
                PostForm::from_draft(&draft)
            } else {
                PostForm::default()
            };
            fields.apply(&mut form);

            let mut feed = FeedController::new(config);
            *feed.post_form_mut() = form;
            let response = feed.create_post().await.context("Failed to queue post")?;
            print_json(&response, pretty)
        }

        CliCommand::SaveDraft { fields } => {
            let mut form = PostForm::default();
            fields.apply(&mut form);
            let draft = PostDraft {
                platform: Some(form.platform),
                content: form.content.clone(),
                media_url: form.media_url.clone(),
                hashtags: form.hashtag_list(),
            };
            composer::save_draft(&config.data_dir, &draft).with_context(|| {
                format!("Failed to write draft to {}", config.data_dir.display())
            })?;
            let path = composer::draft_path(&config.data_dir);
            print_json(&json!({ "saved": path.display().to_string() }), pretty)
        }

        CliCommand::Watch { post_id } => watch(config, &post_id).await,
    }
}

async fn watch(config: FeedConfig, post_id: &str) -> Result<()> {
    let mut session = FeedSession::mount(config).await;
    session.controller_mut().toggle_open(post_id).await;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    session
        .run_until(shutdown, |feed| {
            if let Err(e) = render::render_watch(&mut io::stdout().lock(), feed, post_id) {
                warn!("Failed to render: {}", e);
            }
        })
        .await;

    session.unmount().await;
    Ok(())
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}
