//! The capability set the MCP layer consumes from a terminal multiplexer.

use async_trait::async_trait;
use wingman_core::{BackendKind, PaneInfo, Result, WindowInfo};

/// Read-only access to one named multiplexer session.
///
/// Implementations shell out to the multiplexer for every call and parse
/// its text output. Parsing is defensive: where output is missing or
/// unrecognised, implementations fall back to documented placeholder
/// values instead of failing.
///
/// The window/pane scope set with [`set_window`](Self::set_window) is plain
/// in-memory state; it is not verified against the multiplexer.
#[async_trait]
pub trait TerminalBackend: Send + Sync {
    /// Which multiplexer this backend drives.
    fn kind(&self) -> BackendKind;

    /// Name of the observed session.
    fn session_name(&self) -> &str;

    /// Create the session if it does not exist yet. Idempotent.
    ///
    /// Fails with `BackendUnavailable` when the multiplexer binary is
    /// missing and `SessionCreateFailed` when creation fails.
    async fn ensure_session(&self) -> Result<()>;

    /// Whether the session exists.
    ///
    /// "No such session" is `Ok(false)`; anything else unexpected is an
    /// error.
    async fn session_exists(&self) -> Result<bool>;

    /// Text currently visible in the scoped pane/window.
    async fn capture_pane(&self) -> Result<String>;

    /// Dimensions and metadata of the scoped pane/window.
    async fn get_pane_info(&self) -> Result<PaneInfo>;

    /// Up to `lines` lines of buffered output.
    ///
    /// What `lines` counts is backend specific: tmux reads that many lines of
    /// history *above* the visible pane, screen returns that many trailing
    /// lines of its full hardcopy. `lines` must be at least 1.
    async fn get_scrollback_history(&self, lines: usize) -> Result<String>;

    /// Kill the session (best-effort).
    async fn kill_session(&self) -> Result<()>;

    /// Windows in the session, never empty.
    ///
    /// When enumeration fails or yields nothing a single
    /// [`WindowInfo::fallback`] entry is returned.
    async fn list_windows(&self) -> Result<Vec<WindowInfo>>;

    /// Scope subsequent reads to `window_id` (empty = current window).
    fn set_window(&mut self, window_id: &str);

    /// Current window/pane scope, empty when unset.
    fn get_window(&self) -> &str;

    /// Names of all sessions the multiplexer knows about.
    async fn list_sessions(&self) -> Result<Vec<String>>;
}

/// Session name to use for a possibly-blank configured name.
pub(crate) fn session_name_or_default(name: &str) -> String {
    if name.trim().is_empty() {
        wingman_core::DEFAULT_SESSION_NAME.to_string()
    } else {
        name.to_string()
    }
}
