use anyhow::{Context, Result};
use backend::{Cli, MoveCommitController};
use clap::Parser;
use engine::ShakmatyEngine;
use remote::HttpMoveServer;
use terminal_ui::TerminalBoard;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Log to stderr, so the board on stdout stays readable
///
/// Set `RUST_LOG` to `info` or `debug` to see what the controller is doing.
fn setup_logger() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt::Subscriber::builder()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .finish()
        .init();
}

fn main() -> Result<()> {
    setup_logger();
    let cli = Cli::parse();
    let config = cli.game_config().context("Failed to load the game record")?;
    let server = HttpMoveServer::new(cli.server(), cli.timeout());
    tracing::info!(endpoint = server.endpoint(), "using game server");

    let mut controller = MoveCommitController::new(
        config,
        ShakmatyEngine::new(),
        TerminalBoard::stdio(),
        server,
    )
    .context("Failed to set up the game")?;
    controller.run();
    Ok(())
}
