use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use nexus_cli::cli::{execute, CliCommand, CliConfig, PostArgs};
use nexus_core::models::{Channel, Platform};
use nexus_core::tracing_setup::init_tracing;
use nexus_core::{constants::MENTION_LOOKUP_LIMIT, FeedConfig};

#[derive(Parser)]
#[command(name = "nexus-cli")]
#[command(about = "Comments, chat and live activity for queued posts")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    /// Path to JSON config file (contains backendUrl, author, dataDir)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Backend base URL, overrides config and NEXUS_BACKEND_URL
    #[arg(long, short = 'b')]
    backend: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelArg {
    Comment,
    Chat,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Comment => Channel::Comment,
            ChannelArg::Chat => Channel::Chat,
        }
    }
}

#[derive(clap::Args)]
struct PostFields {
    /// facebook, instagram, twitter, linkedin or tiktok
    #[arg(long)]
    platform: Option<Platform>,
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    media_url: Option<String>,
    /// Comma separated hashtags
    #[arg(long)]
    hashtags: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all posts
    ListPosts,

    /// Show the comment thread of a post
    ListComments { post_id: String },

    /// Show the chat thread of a post
    ListChat { post_id: String },

    /// Add a comment to a post
    Comment {
        post_id: String,
        text: String,
        #[arg(long, short = 'a')]
        author: Option<String>,
        /// Attachment URL
        #[arg(long)]
        attachment: Option<String>,
        /// Append a quick-insert emoji by index (can be repeated)
        #[arg(long)]
        emoji: Vec<usize>,
    },

    /// Send a chat message on a post
    Chat {
        post_id: String,
        message: String,
        #[arg(long, short = 'a')]
        author: Option<String>,
        #[arg(long)]
        attachment: Option<String>,
        #[arg(long)]
        emoji: Vec<usize>,
    },

    /// Edit a comment. An empty --attachment removes the attachment.
    EditComment {
        post_id: String,
        id: String,
        text: String,
        #[arg(long)]
        attachment: Option<String>,
    },

    /// Edit a chat message. An empty --attachment removes the attachment.
    EditChat {
        post_id: String,
        id: String,
        message: String,
        #[arg(long)]
        attachment: Option<String>,
    },

    DeleteComment { post_id: String, id: String },

    DeleteChat { post_id: String, id: String },

    /// Look up mention candidates
    Mentions {
        query: String,
        #[arg(long, default_value_t = MENTION_LOOKUP_LIMIT)]
        limit: usize,
    },

    /// Send a typing notification
    Typing {
        post_id: String,
        #[arg(value_enum)]
        channel: ChannelArg,
        #[arg(long, short = 'a')]
        author: Option<String>,
    },

    /// Queue a new post
    CreatePost {
        #[command(flatten)]
        fields: PostFields,
        /// RFC 3339 publish time
        #[arg(long)]
        scheduled_at: Option<String>,
        /// Start from the saved post draft
        #[arg(long)]
        from_draft: bool,
    },

    /// Save a post draft for the post composer to pick up
    SaveDraft {
        #[command(flatten)]
        fields: PostFields,
    },

    /// Follow a post's threads and typing activity live
    Watch { post_id: String },
}

impl PostFields {
    fn into_args(self, scheduled_at: Option<String>) -> PostArgs {
        PostArgs {
            platform: self.platform,
            content: self.content,
            media_url: self.media_url,
            hashtags: self.hashtags,
            scheduled_at,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Warning: Failed to set up logging: {}", e);
    }

    let file_config = load_config(&cli);
    let mut config = file_config.apply(FeedConfig::from_env());
    if let Some(ref backend) = cli.backend {
        config.backend_url = FeedConfig::new(backend.as_str()).backend_url;
    }

    let command = match cli.command {
        Some(Commands::ListPosts) => CliCommand::ListPosts,
        Some(Commands::ListComments { post_id }) => CliCommand::ListThread {
            post_id,
            channel: Channel::Comment,
        },
        Some(Commands::ListChat { post_id }) => CliCommand::ListThread {
            post_id,
            channel: Channel::Chat,
        },
        Some(Commands::Comment {
            post_id,
            text,
            author,
            attachment,
            emoji,
        }) => CliCommand::Send {
            post_id,
            channel: Channel::Comment,
            body: text,
            author,
            attachment,
            emojis: emoji,
        },
        Some(Commands::Chat {
            post_id,
            message,
            author,
            attachment,
            emoji,
        }) => CliCommand::Send {
            post_id,
            channel: Channel::Chat,
            body: message,
            author,
            attachment,
            emojis: emoji,
        },
        Some(Commands::EditComment {
            post_id,
            id,
            text,
            attachment,
        }) => CliCommand::Edit {
            post_id,
            channel: Channel::Comment,
            entry_id: id,
            body: text,
            attachment,
        },
        Some(Commands::EditChat {
            post_id,
            id,
            message,
            attachment,
        }) => CliCommand::Edit {
            post_id,
            channel: Channel::Chat,
            entry_id: id,
            body: message,
            attachment,
        },
        Some(Commands::DeleteComment { post_id, id }) => CliCommand::Delete {
            post_id,
            channel: Channel::Comment,
            entry_id: id,
        },
        Some(Commands::DeleteChat { post_id, id }) => CliCommand::Delete {
            post_id,
            channel: Channel::Chat,
            entry_id: id,
        },
        Some(Commands::Mentions { query, limit }) => CliCommand::Mentions { query, limit },
        Some(Commands::Typing {
            post_id,
            channel,
            author,
        }) => CliCommand::Typing {
            post_id,
            channel: channel.into(),
            author,
        },
        Some(Commands::CreatePost {
            fields,
            scheduled_at,
            from_draft,
        }) => CliCommand::CreatePost {
            fields: fields.into_args(scheduled_at),
            from_draft,
        },
        Some(Commands::SaveDraft { fields }) => CliCommand::SaveDraft {
            fields: fields.into_args(None),
        },
        Some(Commands::Watch { post_id }) => CliCommand::Watch { post_id },
        None => {
            eprintln!("No command specified. Use --help for usage.");
            std::process::exit(1);
        }
    };

    if let Err(e) = execute(command, config, file_config.author, cli.pretty).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Load the config file named by --config, or an empty config
fn load_config(cli: &Cli) -> CliConfig {
    match cli.config {
        Some(ref path) => match CliConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        },
        None => CliConfig::default(),
    }
}
