//! `verbnav` command line: session management, user listing and taxonomy
//! tree rendering over the REST backend.

pub mod commands;
pub mod config;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use verbnav_core::{NavigationMode, NodeKey};

pub use commands::run;
pub use config::{AppConfig, ConfigError};

/// Browse the verb taxonomy from the terminal
#[derive(Debug, Parser)]
#[command(name = "verbnav", version, about)]
pub struct Cli {
    /// Config file (default: $VERBNAV_CONFIG or ~/.config/verbnav/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override `backend.base_url`
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session token
    Login(LoginArgs),
    /// Create an account and store the session token
    Register(RegisterArgs),
    /// End the session and forget the stored token
    Logout,
    /// Show the logged-in user
    Whoami(OutputArgs),
    /// List users, show one with --id, or edit one
    Users(UsersArgs),
    /// Show one verb
    Verb(VerbArgs),
    /// Print the taxonomy tree as sunburst JSON
    Tree(TreeArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "VERBNAV_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    /// Access level requested for the account
    #[arg(long, default_value = "1")]
    pub level: String,

    #[arg(long, env = "VERBNAV_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: Option<UsersAction>,

    #[arg(long)]
    pub id: Option<i64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Subcommand)]
pub enum UsersAction {
    /// Change a user's name, email or level
    Update(UpdateUserArgs),
}

#[derive(Debug, Args)]
pub struct UpdateUserArgs {
    pub id: i64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub level: Option<i64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct VerbArgs {
    pub id: i64,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// drill-down, selective or overview (default: `navigator.mode`)
    #[arg(long)]
    pub mode: Option<NavigationMode>,

    /// Drill into a node, e.g. `group:1` (drill-down, repeatable, in order)
    #[arg(long = "select", value_name = "KEY")]
    pub select: Vec<NodeKey>,

    /// Expand a node, e.g. `family:11` (selective, repeatable, in order)
    #[arg(long = "expand", value_name = "KEY")]
    pub expand: Vec<NodeKey>,

    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}
