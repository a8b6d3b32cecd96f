//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// social-scheduler: draft, schedule and publish social media posts kept in dstask
#[derive(Parser, Debug)]
#[command(name = "social-scheduler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Task store backend
    #[arg(long, global = true, value_enum, default_value_t = StoreKind::Dstask)]
    pub store: StoreKind,

    /// Use stub publishers instead of driving the browser
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// The dstask command-line tool
    Dstask,
    /// A process-local store that starts empty
    Memory,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a draft post
    Draft(DraftArgs),

    /// Schedule a post (date format: 2026-01-15T14:00)
    Schedule {
        id: String,
        date: String,
    },

    /// Publish a post immediately
    Publish {
        id: String,
    },

    /// List posts
    List(ListArgs),

    /// Show posts scheduled in the next N hours
    Upcoming(UpcomingArgs),

    /// Cancel a scheduled post (moves it back to drafts)
    Cancel {
        id: String,
    },

    /// Delete a post permanently
    Delete {
        id: String,
    },

    /// Handle a tool call given as a JSON object
    Tool(ToolArgs),

    /// Handle an RPC call such as `social.list`
    Rpc(RpcArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct DraftArgs {
    /// Post content; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub content: Vec<String>,

    /// Comma-separated platforms (twitter,linkedin,mastodon,bluesky)
    #[arg(short, long, default_value = "twitter")]
    pub platforms: String,

    /// Campaign/series name
    #[arg(short, long)]
    pub campaign: Option<String>,

    /// Due date (e.g. 2026-01-15T14:00)
    #[arg(long)]
    pub due: Option<String>,

    /// Store priority (P0-P3)
    #[arg(long)]
    pub priority: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Status filter (draft, scheduled, published, failed)
    pub status: Option<String>,

    /// Filter by platform
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Filter by campaign
    #[arg(short, long)]
    pub campaign: Option<String>,

    /// Show at most this many posts
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UpcomingArgs {
    /// Window size in hours
    #[arg(default_value_t = 24)]
    pub hours: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ToolArgs {
    /// Tool call parameters as JSON
    #[arg(conflicts_with = "file")]
    pub params: Option<String>,

    /// File containing the parameters (use - for stdin)
    #[arg(long, conflicts_with = "params")]
    pub file: Option<PathBuf>,

    /// Print the tool definition instead of handling a call
    #[arg(long, conflicts_with_all = ["params", "file"])]
    pub schema: bool,
}

#[derive(Args, Debug)]
pub struct RpcArgs {
    /// Method name, e.g. social.draft
    pub method: String,

    /// Parameters as JSON
    #[arg(default_value = "{}")]
    pub params: String,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./social.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
