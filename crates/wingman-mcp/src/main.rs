//! # mcp-ssh-wingman
//!
//! Read-only Model Context Protocol server that lets an AI assistant watch
//! a tmux or GNU screen session.
//!
//! ## Overview
//!
//! The server speaks newline-delimited JSON-RPC on stdin/stdout and exposes:
//! - Tools: read_terminal, read_scrollback, get_terminal_info, list_windows,
//!   set_window
//! - Resources: terminal://current, terminal://info
//!
//! It never sends input to the observed terminal. Logs go to stderr so
//! stdout stays a clean protocol channel.
//!
//! ## Architecture
//!
//! This is Layer 2 - the server binary that ties together:
//! - wingman-core: Configuration, errors and value types
//! - wingman-session: tmux and screen backends

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wingman_core::{BackendKind, WingmanConfig};
use wingman_mcp::{ServerIdentity, WingmanServer};
use wingman_session::create_backend;

#[derive(Parser, Debug)]
#[command(name = "mcp-ssh-wingman")]
#[command(about = "Read-only MCP server for observing a tmux or screen session")]
#[command(version)]
struct Cli {
    /// Session name to observe (created when missing)
    #[arg(long)]
    session: Option<String>,

    /// Terminal multiplexer: tmux or screen
    #[arg(long)]
    terminal: Option<BackendKind>,

    /// Window/pane to observe instead of the current one
    #[arg(long)]
    window: Option<String>,

    /// YAML configuration file
    #[arg(short, long, env = "WINGMAN_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the multiplexer's sessions and exit
    #[arg(long, conflicts_with = "kill_session")]
    list_sessions: bool,

    /// Kill the configured session and exit
    #[arg(long)]
    kill_session: bool,
}

/// Defaults, then the config file, then command-line flags.
fn load_config(cli: &Cli) -> anyhow::Result<WingmanConfig> {
    let mut config = match &cli.config {
        Some(path) => WingmanConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => WingmanConfig::default(),
    };

    if let Some(session) = &cli.session {
        config.session.name = session.clone();
    }
    if let Some(terminal) = cli.terminal {
        config.session.terminal = terminal;
    }
    if let Some(window) = &cli.window {
        config.session.window = Some(window.clone());
    }
    if let Some(level) = &cli.log_level {
        config.server.log_level = level.clone();
    }

    config.normalize();
    config.validate()?;
    Ok(config)
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_tracing(&config.server.log_level);

    let version = env!("CARGO_PKG_VERSION");
    info!(
        "mcp-ssh-wingman v{} starting ({} session '{}')",
        version, config.session.terminal, config.session.name
    );

    let backend = create_backend(&config);

    if cli.list_sessions {
        for name in backend.list_sessions().await? {
            println!("{name}");
        }
        return Ok(());
    }

    if cli.kill_session {
        backend.kill_session().await?;
        info!("Killed session '{}'", config.session.name);
        return Ok(());
    }

    let mut server = WingmanServer::new(backend, ServerIdentity::new(version));
    server
        .start(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    info!("mcp-ssh-wingman shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::try_parse_from(["mcp-ssh-wingman"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.session.name, "mcp-wingman");
        assert_eq!(config.session.terminal, BackendKind::Tmux);
        assert_eq!(config.session.window, None);
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wingman.yaml");
        std::fs::write(
            &path,
            "session:\n  name: from-file\n  terminal: tmux\nserver:\n  log_level: warn\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "mcp-ssh-wingman",
            "--config",
            path.to_str().unwrap(),
            "--terminal",
            "screen",
            "--window",
            "2",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(config.session.name, "from-file");
        assert_eq!(config.session.terminal, BackendKind::Screen);
        assert_eq!(config.session.window.as_deref(), Some("2"));
        assert_eq!(config.server.log_level, "warn");
    }

    #[test]
    fn test_blank_session_flag_uses_default() {
        let cli = Cli::try_parse_from(["mcp-ssh-wingman", "--session", ""]).unwrap();
        assert_eq!(load_config(&cli).unwrap().session.name, "mcp-wingman");
    }

    #[test]
    fn test_invalid_terminal_rejected() {
        assert!(Cli::try_parse_from(["mcp-ssh-wingman", "--terminal", "zellij"]).is_err());
    }

    #[test]
    fn test_list_and_kill_conflict() {
        assert!(
            Cli::try_parse_from(["mcp-ssh-wingman", "--list-sessions", "--kill-session"]).is_err()
        );
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::try_parse_from(["mcp-ssh-wingman", "--config", "/nonexistent/wingman.yaml"])
            .unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("failed to load config"));
    }
}
