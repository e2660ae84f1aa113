//! CLI command definitions for the `tianyi` binary.

pub mod auth;
pub mod chat;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with Luo Tianyi from the terminal.
#[derive(Parser)]
#[command(name = "tianyi", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Keep session state in memory only; nothing is written to disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in. Without --remember the session ends with this process.
    Login {
        /// Account name (prompted when omitted).
        #[arg(short, long)]
        username: Option<String>,

        /// Password (prompted with hidden input when omitted).
        #[arg(long, env = "TIANYI_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Remember the credentials and log in automatically next time.
        #[arg(long)]
        remember: bool,
    },

    /// Create an account with an invite code.
    Register {
        #[arg(short, long)]
        username: Option<String>,

        #[arg(long, env = "TIANYI_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Invite code (prompted when omitted).
        #[arg(long)]
        invite_code: Option<String>,
    },

    /// Log out. Remembered credentials are kept.
    Logout,

    /// Show session status and storage location.
    Status,

    /// Start an interactive chat.
    Chat,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
