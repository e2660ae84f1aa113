//! Authentication commands: login, register, logout.

use std::future::Future;
use std::time::Duration;

use anyhow::{Result, bail};
use console::style;
use dialoguer::{Confirm, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use tianyi_types::session::AuthOutcome;

use crate::state::AppState;

/// Output switches shared by the auth commands.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

/// Log in, prompting for anything not given on the command line.
pub async fn login(
    state: &AppState,
    username: Option<String>,
    password: Option<String>,
    remember: bool,
    out: Output,
) -> Result<()> {
    let interactive = username.is_none() || password.is_none();
    let username = match username {
        Some(u) => u,
        None => prompt_text("Username")?,
    };
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };
    let remember = if interactive && !remember && !out.json {
        Confirm::new()
            .with_prompt("Log in automatically next time?")
            .default(false)
            .interact()?
    } else {
        remember
    };

    let result = with_spinner(
        "Logging in...",
        out,
        state.sessions.login(&username, &password, remember),
    )
    .await;

    report(AuthOutcome::from(result), out)
}

/// Register a new account. The session is unchanged; log in afterwards.
pub async fn register(
    state: &AppState,
    username: Option<String>,
    password: Option<String>,
    invite_code: Option<String>,
    out: Output,
) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt_text("Username")?,
    };
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };
    let invite_code = match invite_code {
        Some(c) => c,
        None => prompt_text("Invite code")?,
    };

    let result = with_spinner(
        "Registering...",
        out,
        state.sessions.register(&username, &password, &invite_code),
    )
    .await;

    report(AuthOutcome::from(result), out)
}

/// Log out, keeping remembered credentials.
pub async fn logout(state: &AppState, out: Output) -> Result<()> {
    let was = state.sessions.initialize().await;
    state.sessions.logout().await;

    if out.json {
        println!(
            "{}",
            serde_json::json!({
                "logged_out": true,
                "was_logged_in": was.is_logged_in(),
            })
        );
    } else if !out.quiet {
        println!("  {} Logged out", style("✓").green().bold());
    }
    Ok(())
}

/// Prompt for credentials until a login succeeds or the user gives up.
///
/// Returns false when the user declines to retry.
pub async fn interactive_login(state: &AppState) -> Result<bool> {
    let out = Output {
        json: false,
        quiet: false,
    };
    loop {
        let username = prompt_text("Username")?;
        let password = prompt_password()?;
        let remember = Confirm::new()
            .with_prompt("Log in automatically next time?")
            .default(false)
            .interact()?;

        let outcome = AuthOutcome::from(
            with_spinner(
                "Logging in...",
                out,
                state.sessions.login(&username, &password, remember),
            )
            .await,
        );
        print_outcome(&outcome);
        if outcome.success {
            return Ok(true);
        }

        let again = Confirm::new()
            .with_prompt("Try again?")
            .default(true)
            .interact()?;
        if !again {
            return Ok(false);
        }
    }
}

fn prompt_text(label: &str) -> Result<String> {
    Ok(Input::<String>::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()?)
}

fn prompt_password() -> Result<String> {
    Ok(Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()?)
}

async fn with_spinner<F, T>(message: &str, out: Output, fut: F) -> T
where
    F: Future<Output = T>,
{
    if out.json || out.quiet {
        return fut.await;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = fut.await;
    spinner.finish_and_clear();
    result
}

fn print_outcome(outcome: &AuthOutcome) {
    if outcome.success {
        println!("  {} {}", style("✓").green().bold(), outcome.message);
    } else {
        eprintln!("  {} {}", style("✗").red().bold(), outcome.message);
    }
}

fn report(outcome: AuthOutcome, out: Output) -> Result<()> {
    if out.json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else if !out.quiet || !outcome.success {
        print_outcome(&outcome);
    }

    if !outcome.success {
        bail!(outcome.message);
    }
    Ok(())
}
