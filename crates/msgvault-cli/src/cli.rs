use clap::{Args, Parser, Subcommand};

use msgvault_core::VERSION;

/// msgvault - Encrypted messages with time locks, passphrases and self-destruct
#[derive(Parser)]
#[command(name = "msgvault")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the vault database
    #[arg(long, global = true, env = "MSGVAULT_DB")]
    pub db: Option<String>,

    /// Session token from `msgvault login`
    #[arg(long, global = true, env = "MSGVAULT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for the `register` command
#[derive(Args)]
pub struct RegisterArgs {
    /// Account username
    #[arg(long)]
    pub username: String,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Disable interactive prompts (password comes from MSGVAULT_PASSWORD)
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `login` command
#[derive(Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts (password comes from MSGVAULT_PASSWORD)
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `create` command
#[derive(Args)]
pub struct CreateArgs {
    /// Entry title (stored unencrypted)
    #[arg(value_name = "TITLE")]
    pub title: String,

    /// Entry content (read from stdin when omitted)
    #[arg(long)]
    pub content: Option<String>,

    /// Protect the entry with a passphrase (from MSGVAULT_PASSPHRASE or a prompt)
    #[arg(long)]
    pub protect: bool,

    /// Refuse unlocking before this time (ISO-8601 or YYYY-MM-DD)
    #[arg(long, value_name = "TIME", conflicts_with = "unlock_in")]
    pub unlock_after: Option<String>,

    /// Refuse unlocking for this long (e.g. "30m", "2h", "7d")
    #[arg(long, value_name = "DURATION")]
    pub unlock_in: Option<String>,

    /// Delete the entry after it is first unlocked
    #[arg(long)]
    pub self_destruct: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `unlock` command
#[derive(Args)]
pub struct UnlockArgs {
    /// Entry ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts (passphrase comes from MSGVAULT_PASSPHRASE)
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `reset-password` command
#[derive(Args)]
pub struct ResetPasswordArgs {
    /// Account email
    #[arg(long)]
    pub email: String,
}

/// Arguments for the `confirm-reset` command
#[derive(Args)]
pub struct ConfirmResetArgs {
    /// User identifier from the reset link
    #[arg(value_name = "UID")]
    pub uid: String,

    /// Token from the reset link
    #[arg(value_name = "TOKEN")]
    pub reset_token: String,

    /// Disable interactive prompts (password comes from MSGVAULT_PASSWORD)
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Register(RegisterArgs),

    /// Log in and print a session token
    Login(LoginArgs),

    /// Encrypt and store a new entry
    Create(CreateArgs),

    /// List your entries, newest first
    List(ListArgs),

    /// Decrypt an entry
    Unlock(UnlockArgs),

    /// Mail a password reset link
    ResetPassword(ResetPasswordArgs),

    /// Set a new password from a reset link
    ConfirmReset(ConfirmResetArgs),
}
