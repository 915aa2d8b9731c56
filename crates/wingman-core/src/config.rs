//! Configuration types for terminal wingman.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{BackendKind, Error, DEFAULT_SESSION_NAME};

/// Server configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WingmanConfig {
    /// Which session to observe
    pub session: SessionSettings,
    /// Server settings
    pub server: ServerSettings,
    /// tmux backend settings
    pub tmux: TmuxSettings,
    /// screen backend settings
    pub screen: ScreenSettings,
}

impl WingmanConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let mut config: WingmanConfig = serde_yaml::from_str(yaml)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Fill in defaults for values that are present but blank.
    pub fn normalize(&mut self) {
        if self.session.name.trim().is_empty() {
            self.session.name = DEFAULT_SESSION_NAME.to_string();
        }
        if self
            .session
            .window
            .as_deref()
            .is_some_and(|w| w.trim().is_empty())
        {
            self.session.window = None;
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.session.name.trim().is_empty() {
            return Err(Error::Config("session.name must not be empty".to_string()));
        }

        if self.server.command_timeout_ms == 0 {
            return Err(Error::Config(
                "server.command_timeout_ms must be > 0".to_string(),
            ));
        }

        if self.tmux.program.trim().is_empty() {
            return Err(Error::Config("tmux.program must not be empty".to_string()));
        }

        if self.screen.program.trim().is_empty() {
            return Err(Error::Config(
                "screen.program must not be empty".to_string(),
            ));
        }

        if self.screen.default_scrollback == 0 {
            return Err(Error::Config(
                "screen.default_scrollback must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Session selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Session name to attach to (created when missing)
    pub name: String,
    /// Multiplexer type
    pub terminal: BackendKind,
    /// Window/pane to scope reads to (None = current window)
    pub window: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_SESSION_NAME.to_string(),
            terminal: BackendKind::default(),
            window: None,
        }
    }
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    pub log_level: String,
    /// Upper bound for any single multiplexer invocation
    pub command_timeout_ms: u64,
}

impl ServerSettings {
    /// Command timeout as a [`Duration`].
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            command_timeout_ms: 10_000,
        }
    }
}

/// tmux backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmuxSettings {
    /// tmux executable
    pub program: String,
    /// Server socket name, passed as `-L <name>`
    pub socket_name: Option<String>,
}

impl Default for TmuxSettings {
    fn default() -> Self {
        Self {
            program: "tmux".to_string(),
            socket_name: None,
        }
    }
}

/// screen backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSettings {
    /// screen executable
    pub program: String,
    /// screenrc to read `defscrollback` from (None = ~/.screenrc)
    pub screenrc: Option<PathBuf>,
    /// Scrollback assumed when the screenrc does not set one
    pub default_scrollback: usize,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            program: "screen".to_string(),
            screenrc: None,
            default_scrollback: 1000,
        }
    }
}
