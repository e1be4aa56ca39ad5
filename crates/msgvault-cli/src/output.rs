//! Output formatting helpers for the CLI.

use msgvault_core::{EntrySummary, LoginResponse, UnlockedEntry};
use uuid::Uuid;

/// Unlock path a front end would route to for an entry.
pub fn unlock_path(id: &Uuid) -> String {
    format!("/api/messages/{}/unlock/", id)
}

/// Convert an entry summary to JSON for output.
pub fn summary_json(summary: &EntrySummary) -> serde_json::Value {
    serde_json::json!({
        "id": summary.id,
        "title": summary.title,
        "created_at": summary.created_at,
        "unlock_path": unlock_path(&summary.id),
    })
}

/// Print entry summaries as JSON or plain lines.
pub fn print_summaries(summaries: &[EntrySummary], json: bool, quiet: bool) -> anyhow::Result<()> {
    if json {
        let values: Vec<_> = summaries.iter().map(summary_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    if summaries.is_empty() {
        if !quiet {
            println!("No entries.");
        }
        return Ok(());
    }

    for summary in summaries {
        println!(
            "{}  {}  {}",
            summary.id,
            summary.created_at.format("%Y-%m-%d %H:%M:%S"),
            summary.title
        );
    }
    Ok(())
}

/// Print an unlocked entry.
pub fn print_unlocked(entry: &UnlockedEntry, json: bool, quiet: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entry)?);
        return Ok(());
    }
    if !quiet {
        println!("Title: {}", entry.title);
        println!();
    }
    println!("{}", entry.content);
    Ok(())
}

/// Print a login result. Plain output is only the token, for `$(...)` use.
pub fn print_login(response: &LoginResponse, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        println!("{}", response.access);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_summary_json_has_no_content() {
        let summary = EntrySummary {
            id: Uuid::new_v4(),
            title: "note".to_string(),
            created_at: Utc::now(),
        };
        let value = summary_json(&summary);
        assert_eq!(value["title"], "note");
        assert_eq!(
            value["unlock_path"],
            format!("/api/messages/{}/unlock/", summary.id)
        );
        assert!(value.get("content").is_none());
    }
}
