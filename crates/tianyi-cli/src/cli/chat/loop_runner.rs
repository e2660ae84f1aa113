//! Interactive chat loop.
//!
//! Ensures a logged-in session, then reads lines and forwards them to the
//! chat session. Replies arrive asynchronously and are printed by a
//! renderer task through readline's shared writer, so they never clobber
//! the prompt.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use console::style;
use rustyline_async::{Readline, ReadlineEvent, SharedWriter};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::cli::auth;
use crate::state::AppState;

use super::commands::{self, ChatCommand, HELP};
use super::renderer::ChatRenderer;

const ASSISTANT_NAME: &str = "Tianyi";

/// Run the chat until the user quits, logs out, or closes input.
pub async fn run_chat_loop(state: &AppState) -> Result<()> {
    let session = state.sessions.initialize().await;
    if !session.is_logged_in() {
        println!("  {} Please log in to chat.", style("i").blue().bold());
        if !auth::interactive_login(state).await? {
            return Ok(());
        }
    }
    let username = state.sessions.snapshot().username;
    let chat = state.open_chat(&username).await;
    info!(%username, source = chat.source_name(), "chat started");

    let (mut rl, writer) = Readline::new(format!("{} ", style(format!("{username}>")).green()))?;
    print_banner(writer.clone(), &username);

    let mut renderer = ChatRenderer::new(writer.clone(), ASSISTANT_NAME);
    for message in chat.messages() {
        renderer.transcript(&message);
    }
    let (stop_renderer, shutdown) = oneshot::channel();
    let render_task = tokio::spawn(renderer.run(chat.subscribe(), shutdown));

    let mut notices = ChatRenderer::new(writer.clone(), ASSISTANT_NAME);
    loop {
        let line = match rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => line,
            Ok(ReadlineEvent::Eof) | Ok(ReadlineEvent::Interrupted) => break,
            Err(e) => {
                warn!(error = %e, "readline failed");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        rl.add_history_entry(line.to_string());

        match commands::parse(line) {
            None => {
                chat.set_draft(line);
                if !chat.can_send() || !chat.send_draft() {
                    notices.notice(&format!(
                        "{ASSISTANT_NAME} is still replying, please wait."
                    ));
                }
            }
            Some(ChatCommand::Image(path)) => {
                if !tokio::fs::try_exists(Path::new(&path)).await.unwrap_or(false) {
                    notices.notice(&format!("no such file: {path}"));
                } else if !chat.can_send_image() || !chat.append_user_image(&path) {
                    notices.notice(&format!(
                        "{ASSISTANT_NAME} is still replying, please wait."
                    ));
                }
            }
            Some(ChatCommand::Retry) => {
                if !chat.retry() {
                    notices.notice("nothing to retry");
                }
            }
            Some(ChatCommand::History) => match chat.load_older().await {
                Ok(page) if page.is_empty() => notices.notice("no earlier messages"),
                Ok(page) => {
                    notices.notice(&format!("{} earlier messages:", page.len()));
                    for message in &page {
                        notices.transcript(message);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to load chat history");
                    notices.notice("could not load earlier messages");
                }
            },
            Some(ChatCommand::Help) => print_help(writer.clone()),
            Some(ChatCommand::Logout) => {
                state.sessions.logout().await;
                notices.notice("logged out");
                break;
            }
            Some(ChatCommand::Quit) => break,
            Some(ChatCommand::Unknown(message)) => notices.notice(&message),
        }
    }

    if chat.send_in_flight() {
        notices.notice("waiting for the last reply...");
        chat.wait_idle().await;
    }
    // The renderer prints whatever is still queued before it stops.
    let _ = stop_renderer.send(());
    if let Err(e) = render_task.await {
        warn!(error = %e, "chat renderer failed");
    }
    rl.flush()?;
    info!(%username, "chat ended");
    Ok(())
}

fn print_banner(mut out: SharedWriter, username: &str) {
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {} Chatting with {} as {}",
        style("♪").cyan().bold(),
        style(ASSISTANT_NAME).cyan().bold(),
        style(username).bold()
    );
    let _ = writeln!(
        out,
        "  {}",
        style("/help for commands, Ctrl+D to leave").dim()
    );
    let _ = writeln!(out);
}

fn print_help(mut out: SharedWriter) {
    let _ = writeln!(out);
    for (command, description) in HELP {
        let _ = writeln!(out, "  {:<16}{description}", style(command).cyan());
    }
    let _ = writeln!(out);
}
