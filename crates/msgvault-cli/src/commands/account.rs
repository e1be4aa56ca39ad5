//! Account commands: register, login, password reset.

use secrecy::ExposeSecret;

use crate::app::AppContext;
use crate::cli::{ConfirmResetArgs, LoginArgs, RegisterArgs, ResetPasswordArgs};
use crate::constants::env_vars;
use crate::helpers::{is_interactive, require_new_secret, require_secret};
use crate::output::print_login;

pub fn handle_register(ctx: &AppContext, args: &RegisterArgs) -> anyhow::Result<()> {
    let password = require_new_secret(
        env_vars::PASSWORD,
        "Password",
        is_interactive(args.no_input),
    )?;
    let principal = ctx
        .accounts()?
        .register(&args.username, &args.email, password.expose_secret())?;

    if !ctx.quiet() {
        println!("Registered {} <{}>", principal.username, principal.email);
    }
    Ok(())
}

pub fn handle_login(ctx: &AppContext, args: &LoginArgs) -> anyhow::Result<()> {
    let password = require_secret(env_vars::PASSWORD, "Password", is_interactive(args.no_input))?;
    let response = ctx.accounts()?.login(&args.email, password.expose_secret())?;
    print_login(&response, args.json)
}

pub fn handle_reset_password(ctx: &AppContext, args: &ResetPasswordArgs) -> anyhow::Result<()> {
    ctx.accounts()?.request_password_reset(&args.email)?;
    if !ctx.quiet() {
        println!("Password reset link sent to {}", args.email.trim());
    }
    Ok(())
}

pub fn handle_confirm_reset(ctx: &AppContext, args: &ConfirmResetArgs) -> anyhow::Result<()> {
    let password = require_new_secret(
        env_vars::PASSWORD,
        "New password",
        is_interactive(args.no_input),
    )?;
    ctx.accounts()?
        .confirm_password_reset(&args.uid, &args.reset_token, password.expose_secret())?;
    if !ctx.quiet() {
        println!("Password has been reset.");
    }
    Ok(())
}
