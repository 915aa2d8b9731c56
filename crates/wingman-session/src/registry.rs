//! Backend selection from configuration.

use tracing::info;
use wingman_core::{BackendKind, WingmanConfig};

use crate::backend::TerminalBackend;
use crate::screen::ScreenBackend;
use crate::tmux::TmuxBackend;

/// Build the backend described by `config`, scoped to the configured window.
///
/// No multiplexer command is run here; call
/// [`TerminalBackend::ensure_session`] before serving.
pub fn create_backend(config: &WingmanConfig) -> Box<dyn TerminalBackend> {
    let timeout = config.server.command_timeout();
    let name = config.session.name.as_str();

    let mut backend: Box<dyn TerminalBackend> = match config.session.terminal {
        BackendKind::Tmux => Box::new(TmuxBackend::from_settings(&config.tmux, name, timeout)),
        BackendKind::Screen => {
            Box::new(ScreenBackend::from_settings(&config.screen, name, timeout))
        }
    };

    if let Some(window) = config.session.window.as_deref() {
        backend.set_window(window);
    }

    info!(
        "Using {} backend for session '{}'",
        backend.kind(),
        backend.session_name()
    );
    backend
}
