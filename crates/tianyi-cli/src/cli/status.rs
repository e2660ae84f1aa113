//! Session status command.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use tianyi_core::storage::kv_store::KvStore;
use tianyi_types::credential::{
    AUTH_TOKEN_KEY, AUTO_LOGIN_KEY, SAVED_PASSWORD_KEY, SAVED_USERNAME_KEY,
};
use tianyi_types::session::Session;

use crate::state::AppState;

/// Show the session after the startup check, plus which credential entries
/// are stored. Values are never printed.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    state.sessions.initialize().await;
    let session: Session = state.sessions.snapshot();

    let store = state.sessions.store();
    let mut entries = Vec::new();
    for key in [
        AUTH_TOKEN_KEY,
        AUTO_LOGIN_KEY,
        SAVED_USERNAME_KEY,
        SAVED_PASSWORD_KEY,
    ] {
        let present = match store.get(key).await {
            Ok(value) => Some(value.is_some()),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read credential entry");
                None
            }
        };
        entries.push((key, present));
    }

    if json {
        let stored: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(key, present)| (key.to_string(), serde_json::json!(present)))
            .collect();
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "store": store.kind(),
            "session": session,
            "stored": stored,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Tianyi v{}",
        style("♪").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
    if session.is_logged_in {
        println!(
            "  Session:  {} as {}",
            style("logged in").green(),
            style(&session.username).bold()
        );
    } else {
        println!("  Session:  {}", style("logged out").yellow());
    }
    println!(
        "  Storage:  {} ({})",
        state.data_dir.display(),
        store.kind()
    );
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Entry").fg(Color::White),
        Cell::new("Stored").fg(Color::White),
    ]);
    for (key, present) in &entries {
        let cell = match present {
            Some(true) => Cell::new("yes").fg(Color::Green),
            Some(false) => Cell::new("no").fg(Color::DarkGrey),
            None => Cell::new("unreadable").fg(Color::Red),
        };
        table.add_row(vec![Cell::new(key), cell]);
    }
    println!("{table}");
    println!();

    Ok(())
}
