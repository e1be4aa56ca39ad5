//! Entry commands: create, list, unlock.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};

use msgvault_core::{CreateEntryRequest, EntryStore, VaultError};

use crate::app::AppContext;
use crate::cli::{CreateArgs, ListArgs, UnlockArgs};
use crate::constants::env_vars;
use crate::errors::CliError;
use crate::helpers::{
    is_interactive, parse_datetime, parse_duration, parse_entry_id, read_content, read_secret,
    require_new_secret,
};
use crate::output::{print_summaries, print_unlocked, summary_json, unlock_path};

pub fn handle_create(ctx: &AppContext, args: &CreateArgs) -> anyhow::Result<()> {
    let principal = ctx.principal()?;
    let interactive = is_interactive(args.no_input);

    let unlock_after = match (&args.unlock_after, &args.unlock_in) {
        (Some(at), _) => Some(parse_datetime(at)?),
        (None, Some(within)) => {
            let duration = parse_duration(within)?;
            let at = Utc::now().checked_add_signed(duration).ok_or_else(|| {
                CliError::invalid_input(format!("Unlock time out of range: {}", within))
            })?;
            Some(at)
        }
        (None, None) => None,
    };

    let content = read_content(args.no_input, args.content.clone())?;
    let passphrase: Option<SecretString> = if args.protect {
        Some(require_new_secret(env_vars::PASSPHRASE, "Passphrase", interactive)?)
    } else {
        None
    };

    let vault = ctx.vault()?;
    let id = vault.create_entry(
        &principal.id,
        &CreateEntryRequest {
            title: args.title.clone(),
            content,
            passphrase: passphrase.map(|p| p.expose_secret().to_string()),
            unlock_after,
            self_destruct: args.self_destruct,
        },
    )?;

    if args.json {
        let summary = vault
            .list_entries(&principal.id)?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| anyhow::anyhow!("Created entry {} is missing", id))?;
        println!("{}", serde_json::to_string_pretty(&summary_json(&summary))?);
    } else if ctx.quiet() {
        println!("{}", id);
    } else {
        println!("Created entry {}", id);
        println!("Unlock path: {}", unlock_path(&id));
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let principal = ctx.principal()?;
    let summaries = ctx.storage()?.list_entries(&principal.id)?;
    print_summaries(&summaries, args.json, ctx.quiet())
}

pub fn handle_unlock(ctx: &AppContext, args: &UnlockArgs) -> anyhow::Result<()> {
    let principal = ctx.principal()?;
    let id = parse_entry_id(&args.id)?;
    let interactive = is_interactive(args.no_input);
    let vault = ctx.vault()?;

    let passphrase = read_secret(env_vars::PASSPHRASE, "Passphrase", false)?;
    let result = vault.unlock_entry(
        &principal.id,
        &id,
        passphrase.as_ref().map(|p| p.expose_secret()),
    );

    // Without a supplied passphrase, a protected entry fails authentication
    // and leaves no trace; ask for the passphrase and try once more.
    let entry = match result {
        Err(VaultError::AuthenticationFailed) if passphrase.is_none() && interactive => {
            let prompted = read_secret(env_vars::PASSPHRASE, "Passphrase", true)?;
            vault.unlock_entry(
                &principal.id,
                &id,
                prompted.as_ref().map(|p| p.expose_secret()),
            )?
        }
        other => other?,
    };

    print_unlocked(&entry, args.json, ctx.quiet())
}
