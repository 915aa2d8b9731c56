//! tmux-backed terminal observation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};
use wingman_core::{BackendKind, Error, PaneInfo, Result, TmuxSettings, WindowInfo};

use crate::backend::{session_name_or_default, TerminalBackend};
use crate::command::{CommandError, Program};

/// `display-message` format for [`parse_pane_info`]. Tab separated because
/// paths may contain commas.
pub const PANE_INFO_FORMAT: &str =
    "#{pane_width}\t#{pane_height}\t#{pane_current_path}\t#{pane_index}\t#{history_limit}";

/// `list-windows` format for [`parse_window_list`].
pub const WINDOW_LIST_FORMAT: &str = "#{window_index}\t#{window_name}\t#{window_active}";

/// Backend driving a tmux session.
#[derive(Debug, Clone)]
pub struct TmuxBackend {
    program: Program,
    session_name: String,
    window: String,
}

impl TmuxBackend {
    /// Backend for `session_name` using `tmux` from PATH.
    pub fn new(session_name: impl AsRef<str>) -> Self {
        Self::with_program(Program::new("tmux"), session_name)
    }

    /// Backend using a specific tmux invocation.
    pub fn with_program(program: Program, session_name: impl AsRef<str>) -> Self {
        Self {
            program,
            session_name: session_name_or_default(session_name.as_ref()),
            window: String::new(),
        }
    }

    /// Backend built from configuration.
    pub fn from_settings(settings: &TmuxSettings, session_name: &str, timeout: Duration) -> Self {
        let mut program = Program::new(settings.program.clone()).with_timeout(timeout);
        if let Some(socket) = &settings.socket_name {
            program = program.leading_arg("-L").leading_arg(socket.clone());
        }
        Self::with_program(program, session_name)
    }

    /// Session target that only matches this exact name.
    ///
    /// A bare `-t work` falls back to prefix matching and would resolve to
    /// `work2` when `work` does not exist.
    pub fn session_target(&self) -> String {
        format!("={}", self.session_name)
    }

    /// Target for pane-scoped commands.
    ///
    /// Pane ids (`%3`) are global in tmux and are used as-is; anything else
    /// is resolved inside the session.
    pub fn target(&self) -> String {
        if self.window.starts_with('%') {
            self.window.clone()
        } else {
            format!("{}:{}", self.session_target(), self.window)
        }
    }

    async fn create_session(&self) -> Result<()> {
        let output = self
            .program
            .run(&["new-session", "-d", "-s", &self.session_name])
            .await
            .map_err(|e| unavailable_or(e, Error::SessionCreateFailed))?;

        if !output.success() {
            return Err(Error::SessionCreateFailed(output.describe()));
        }

        info!("Created tmux session '{}'", self.session_name);
        Ok(())
    }
}

#[async_trait]
impl TerminalBackend for TmuxBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Tmux
    }

    fn session_name(&self) -> &str {
        &self.session_name
    }

    #[instrument(skip(self), fields(session = %self.session_name))]
    async fn ensure_session(&self) -> Result<()> {
        if self.session_exists().await? {
            debug!("tmux session already exists");
            return Ok(());
        }
        self.create_session().await
    }

    async fn session_exists(&self) -> Result<bool> {
        let output = self
            .program
            .run(&["has-session", "-t", &self.session_target()])
            .await
            .map_err(|e| unavailable_or(e, Error::QueryFailed))?;

        match output.code {
            Some(0) => Ok(true),
            // Also what tmux reports when no server is running.
            Some(1) => Ok(false),
            _ => Err(Error::QueryFailed(output.describe())),
        }
    }

    async fn capture_pane(&self) -> Result<String> {
        let target = self.target();
        let output = self
            .program
            .run(&["capture-pane", "-p", "-t", &target])
            .await
            .map_err(|e| Error::CaptureFailed(e.to_string()))?;

        if !output.success() {
            return Err(Error::CaptureFailed(output.describe()));
        }
        Ok(output.stdout)
    }

    async fn get_pane_info(&self) -> Result<PaneInfo> {
        let target = self.target();
        let output = self
            .program
            .run(&["display-message", "-p", "-t", &target, PANE_INFO_FORMAT])
            .await
            .map_err(|e| Error::InfoFailed(e.to_string()))?;

        if !output.success() {
            return Err(Error::InfoFailed(output.describe()));
        }

        parse_pane_info(&output.stdout).ok_or_else(|| {
            Error::InfoFailed(format!(
                "unexpected pane info format: {}",
                output.stdout.trim()
            ))
        })
    }

    async fn get_scrollback_history(&self, lines: usize) -> Result<String> {
        if lines == 0 {
            return Err(Error::InvalidInput(
                "scrollback line count must be at least 1".to_string(),
            ));
        }

        let target = self.target();
        let start = format!("-{lines}");
        let output = self
            .program
            .run(&["capture-pane", "-p", "-t", &target, "-S", &start])
            .await
            .map_err(|e| Error::ScrollbackFailed(e.to_string()))?;

        if !output.success() {
            return Err(Error::ScrollbackFailed(output.describe()));
        }
        Ok(output.stdout)
    }

    #[instrument(skip(self), fields(session = %self.session_name))]
    async fn kill_session(&self) -> Result<()> {
        let output = self
            .program
            .run(&["kill-session", "-t", &self.session_target()])
            .await
            .map_err(|e| Error::KillFailed(e.to_string()))?;

        if !output.success() {
            return Err(Error::KillFailed(output.describe()));
        }
        info!("Killed tmux session '{}'", self.session_name);
        Ok(())
    }

    async fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        let session = self.session_target();
        let windows = match self
            .program
            .run(&["list-windows", "-t", &session, "-F", WINDOW_LIST_FORMAT])
            .await
        {
            Ok(output) if output.success() => parse_window_list(&output.stdout),
            Ok(output) => {
                warn!("tmux list-windows failed: {}", output.describe());
                Vec::new()
            }
            Err(e) => {
                warn!("tmux list-windows failed: {}", e);
                Vec::new()
            }
        };

        if windows.is_empty() {
            return Ok(vec![WindowInfo::fallback()]);
        }
        Ok(windows)
    }

    fn set_window(&mut self, window_id: &str) {
        debug!("Scoping tmux reads to window '{}'", window_id);
        self.window = window_id.to_string();
    }

    fn get_window(&self) -> &str {
        &self.window
    }

    async fn list_sessions(&self) -> Result<Vec<String>> {
        let output = self
            .program
            .run(&["list-sessions", "-F", "#{session_name}"])
            .await
            .map_err(|e| Error::ListFailed(e.to_string()))?;

        match output.code {
            Some(0) => Ok(parse_session_list(&output.stdout)),
            // "no server running" means no sessions.
            Some(1) => Ok(Vec::new()),
            _ => Err(Error::ListFailed(output.describe())),
        }
    }
}

/// Map a missing binary to `BackendUnavailable`, anything else through `wrap`.
fn unavailable_or(err: CommandError, wrap: fn(String) -> Error) -> Error {
    if err.is_not_found() {
        Error::BackendUnavailable(err.to_string())
    } else {
        wrap(err.to_string())
    }
}

/// Parse `display-message` output produced with [`PANE_INFO_FORMAT`].
///
/// The first four fields are required; `history_limit` is optional so older
/// format strings still parse.
pub fn parse_pane_info(output: &str) -> Option<PaneInfo> {
    let line = output.trim_end_matches(['\r', '\n']);
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 4 {
        return None;
    }

    Some(PaneInfo {
        width: parts[0].trim().parse().ok()?,
        height: parts[1].trim().parse().ok()?,
        current_path: parts[2].to_string(),
        index: parts[3].trim().to_string(),
        scrollback_limit: parts.get(4).and_then(|v| v.trim().parse().ok()),
        details: None,
    })
}

/// Parse `list-windows` output produced with [`WINDOW_LIST_FORMAT`].
pub fn parse_window_list(output: &str) -> Vec<WindowInfo> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut fields = line.splitn(3, '\t');
            let id = fields.next().unwrap_or_default().trim();
            let name = fields.next().map(str::trim).unwrap_or(id);
            let window = WindowInfo::new(id, name);
            if fields.next().map(str::trim) == Some("1") {
                window.active()
            } else {
                window
            }
        })
        .collect()
}

/// Parse `list-sessions -F '#{session_name}'` output.
pub fn parse_session_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_session_name_defaults() {
        let backend = TmuxBackend::new("");
        assert_eq!(backend.session_name(), "mcp-wingman");
        assert_eq!(backend.kind(), BackendKind::Tmux);
    }

    #[test]
    fn test_target_resolution() {
        let mut backend = TmuxBackend::new("work");
        assert_eq!(backend.session_target(), "=work");
        assert_eq!(backend.target(), "=work:");

        backend.set_window("2");
        assert_eq!(backend.target(), "=work:2");
        assert_eq!(backend.get_window(), "2");

        backend.set_window("%7");
        assert_eq!(backend.target(), "%7");

        backend.set_window("");
        assert_eq!(backend.target(), "=work:");
    }

    #[test]
    fn test_from_settings_socket() {
        let settings = TmuxSettings {
            program: "tmux".to_string(),
            socket_name: Some("wingman".to_string()),
        };
        let backend = TmuxBackend::from_settings(&settings, "s", Duration::from_secs(1));
        assert_eq!(
            backend.program,
            Program::new("tmux")
                .leading_arg("-L")
                .leading_arg("wingman")
                .with_timeout(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_parse_pane_info() {
        let info = parse_pane_info("120\t40\t/home/dev/my,project\t1\t2000\n").unwrap();
        assert_eq!(info.width, 120);
        assert_eq!(info.height, 40);
        assert_eq!(info.current_path, "/home/dev/my,project");
        assert_eq!(info.index, "1");
        assert_eq!(info.scrollback_limit, Some(2000));
    }

    #[test]
    fn test_parse_pane_info_without_history() {
        let info = parse_pane_info("80\t24\t/tmp\t0").unwrap();
        assert_eq!(info.scrollback_limit, None);
    }

    #[test]
    fn test_parse_pane_info_invalid() {
        assert!(parse_pane_info("").is_none());
        assert!(parse_pane_info("80,24,/tmp,0").is_none());
        assert!(parse_pane_info("wide\t24\t/tmp\t0").is_none());
    }

    #[test]
    fn test_parse_window_list() {
        let windows = parse_window_list("0\tbash\t0\n1\tvim\t1\n\n2\tlogs\t0\n");
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0], WindowInfo::new("0", "bash"));
        assert_eq!(windows[1], WindowInfo::new("1", "vim").active());
        assert_eq!(windows[2].name, "logs");
    }

    #[test]
    fn test_parse_window_list_without_name() {
        let windows = parse_window_list("3\n");
        assert_eq!(windows, vec![WindowInfo::new("3", "3")]);
    }

    #[test]
    fn test_parse_session_list() {
        assert_eq!(
            parse_session_list("main\nmcp-wingman\n\n"),
            vec!["main".to_string(), "mcp-wingman".to_string()]
        );
        assert!(parse_session_list("").is_empty());
    }
}
