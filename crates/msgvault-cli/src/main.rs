//! msgvault CLI - encrypted messages with time locks, passphrases and self-destruct
//!
//! This is the command-line interface for msgvault. It provides a user-friendly
//! interface to the core library functionality.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod mailer;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{account, entries};
use crate::constants::{env_vars, DEFAULT_LOG_FILTER};

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let ctx = AppContext::new(&cli);
    if let Err(e) = run(&ctx, &cli) {
        errors::exit_with(&e);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(env_vars::LOG)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Register(args) => account::handle_register(ctx, args),
        Commands::Login(args) => account::handle_login(ctx, args),
        Commands::Create(args) => entries::handle_create(ctx, args),
        Commands::List(args) => entries::handle_list(ctx, args),
        Commands::Unlock(args) => entries::handle_unlock(ctx, args),
        Commands::ResetPassword(args) => account::handle_reset_password(ctx, args),
        Commands::ConfirmReset(args) => account::handle_confirm_reset(ctx, args),
    }
}
