//! Slash command parsing for the chat loop.

/// In-chat commands. Anything not starting with `/` is a message.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    /// Send the image at this path.
    Image(String),
    /// Resend the message whose reply failed.
    Retry,
    /// Show the page of recorded messages before the oldest one shown.
    History,
    /// Log out and leave the chat.
    Logout,
    Quit,
    /// Unknown command or missing argument; carries the message to show.
    Unknown(String),
}

/// Parse input as a slash command. Returns `None` for ordinary text.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (trimmed, ""),
    };

    let command = match cmd.to_lowercase().as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/image" | "/img" => {
            if arg.is_empty() {
                ChatCommand::Unknown("/image requires a file path".to_string())
            } else {
                ChatCommand::Image(arg.to_string())
            }
        }
        "/retry" | "/r" => ChatCommand::Retry,
        "/history" => ChatCommand::History,
        "/logout" => ChatCommand::Logout,
        "/quit" | "/exit" | "/q" => ChatCommand::Quit,
        other => ChatCommand::Unknown(format!("unknown command: {other}")),
    };
    Some(command)
}

/// Help text, one `(command, description)` pair per line.
pub const HELP: &[(&str, &str)] = &[
    ("/image <path>", "Send an image"),
    ("/retry", "Resend the message whose reply failed"),
    ("/history", "Show earlier messages"),
    ("/logout", "Log out and leave the chat"),
    ("/quit", "Leave the chat"),
    ("/help", "Show this help"),
];
