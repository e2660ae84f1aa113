//! Tianyi terminal client entry point.
//!
//! Binary name: `tianyi`
//!
//! Parses arguments, loads config, initializes tracing and services, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::auth::Output;
use cli::{Cli, Commands};
use state::AppState;
use tianyi_infra::config::{load_client_config, resolve_data_dir};
use tianyi_observe::tracing_setup::{init_tracing, resolve_directive, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "tianyi", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    let config = load_client_config(&data_dir).await;

    let directive = resolve_directive(&config.logging, cli.verbose, cli.quiet);
    if let Err(e) = init_tracing(&config.logging, &directive) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let state = AppState::init(data_dir, config, cli.ephemeral).await?;
    let out = Output {
        json: cli.json,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Login {
            username,
            password,
            remember,
        } => cli::auth::login(&state, username, password, remember, out).await,

        Commands::Register {
            username,
            password,
            invite_code,
        } => cli::auth::register(&state, username, password, invite_code, out).await,

        Commands::Logout => cli::auth::logout(&state, out).await,

        Commands::Status => cli::status::status(&state, cli.json).await,

        Commands::Chat => cli::chat::loop_runner::run_chat_loop(&state).await,

        Commands::Completions { .. } => unreachable!("handled above"),
    };

    state.shutdown().await;
    shutdown_tracing();
    result
}
