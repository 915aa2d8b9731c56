//! Terminal multiplexer descriptions shared by backends and the MCP layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Session name used when none is configured.
pub const DEFAULT_SESSION_NAME: &str = "mcp-wingman";

/// Width reported when the multiplexer cannot tell us.
pub const DEFAULT_WIDTH: u16 = 80;

/// Height reported when the multiplexer cannot tell us.
pub const DEFAULT_HEIGHT: u16 = 24;

/// Path reported when the multiplexer does not track the working directory.
pub const UNKNOWN_PATH: &str = "unknown";

/// Which terminal multiplexer backs the observed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// tmux
    #[default]
    Tmux,
    /// GNU screen
    Screen,
}

impl BackendKind {
    /// Name as used on the command line and in user-facing text.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Tmux => "tmux",
            BackendKind::Screen => "screen",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tmux" => Ok(BackendKind::Tmux),
            "screen" => Ok(BackendKind::Screen),
            other => Err(Error::InvalidInput(format!(
                "invalid terminal type '{other}', must be 'tmux' or 'screen'"
            ))),
        }
    }
}

/// Metadata about the pane (tmux) or window (screen) being observed.
///
/// Backends that cannot introspect everything fill in [`DEFAULT_WIDTH`],
/// [`DEFAULT_HEIGHT`] and [`UNKNOWN_PATH`], so consumers must tolerate
/// placeholder values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneInfo {
    /// Columns
    pub width: u16,
    /// Rows
    pub height: u16,
    /// Working directory of the foreground process
    pub current_path: String,
    /// Pane index (tmux) or window number (screen)
    pub index: String,
    /// Lines of history the multiplexer keeps, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrollback_limit: Option<usize>,
    /// Raw backend-specific details, when the backend has any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl PaneInfo {
    /// Placeholder info for backends that cannot report dimensions.
    pub fn placeholder(index: impl Into<String>) -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            current_path: UNKNOWN_PATH.to_string(),
            index: index.into(),
            scrollback_limit: None,
            details: None,
        }
    }
}

/// One window (screen) or window index (tmux) inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    /// Identifier accepted by `set_window`
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Whether the multiplexer marks this window as the current one
    #[serde(default)]
    pub active: bool,
}

impl WindowInfo {
    /// Create a window description.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: false,
        }
    }

    /// Mark the window as active.
    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    /// Entry returned when a backend cannot enumerate windows.
    pub fn fallback() -> Self {
        Self::new("0", "default")
    }
}
