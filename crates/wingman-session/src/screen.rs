//! GNU screen-backed terminal observation.
//!
//! screen has no "print pane to stdout" command, so captures go through
//! `hardcopy` into a per-call temporary file that is read back and removed.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use wingman_core::{BackendKind, Error, PaneInfo, Result, ScreenSettings, WindowInfo};

use crate::backend::{session_name_or_default, TerminalBackend};
use crate::command::{CommandOutput, Program};
use crate::screenrc;

lazy_static! {
    /// `12345.name<TAB>(date)<TAB>(Detached)` lines of `screen -ls`.
    static ref SESSION_LINE: Regex = Regex::new(r"^\d+\.(\S+)").unwrap();

    /// Window number token of `screen -Q windows`, flags attached (`1-$`, `2*`).
    static ref WINDOW_TOKEN: Regex = Regex::new(r"^(\d+)([*\-$!@&Z]*)$").unwrap();

    /// `(x,y)/(cols,rows)+history` prefix of `screen -Q info`.
    static ref INFO_DIMENSIONS: Regex =
        Regex::new(r"\(\d+,\s*\d+\)/\((\d+),\s*(\d+)\)(?:\+(\d+))?").unwrap();
}

/// Environment for `-Q windows`; screen truncates the list to COLUMNS.
const WIDE_TERMINAL_ENV: [(&str, &str); 2] = [("COLUMNS", "500"), ("LINES", "50")];

/// Backend driving a screen session.
#[derive(Debug, Clone)]
pub struct ScreenBackend {
    program: Program,
    session_name: String,
    window: String,
    scrollback_limit: usize,
}

impl ScreenBackend {
    /// Backend for `session_name` using `screen` from PATH.
    pub fn new(session_name: impl AsRef<str>) -> Self {
        let settings = ScreenSettings::default();
        Self::with_program(
            Program::new(settings.program.clone()),
            session_name,
            screenrc::scrollback_limit(&settings),
        )
    }

    /// Backend using a specific screen invocation and known scrollback size.
    pub fn with_program(
        program: Program,
        session_name: impl AsRef<str>,
        scrollback_limit: usize,
    ) -> Self {
        Self {
            program,
            session_name: session_name_or_default(session_name.as_ref()),
            window: String::new(),
            scrollback_limit,
        }
    }

    /// Backend built from configuration, reading the screenrc once.
    pub fn from_settings(
        settings: &ScreenSettings,
        session_name: &str,
        timeout: Duration,
    ) -> Self {
        Self::with_program(
            Program::new(settings.program.clone()).with_timeout(timeout),
            session_name,
            screenrc::scrollback_limit(settings),
        )
    }

    /// Scrollback lines screen is configured to keep.
    pub fn scrollback_limit(&self) -> usize {
        self.scrollback_limit
    }

    /// `-S session [-p window]` prefix for window-scoped commands.
    fn window_args(&self) -> Vec<&str> {
        let mut args = vec!["-S", self.session_name.as_str()];
        if !self.window.is_empty() {
            args.push("-p");
            args.push(self.window.as_str());
        }
        args
    }

    /// Run `screen -ls`, returning the parsed names.
    ///
    /// Some screen versions exit 1 even when sessions exist, so exit codes
    /// 0 and 1 both mean "output is a listing".
    async fn query_sessions(&self) -> std::result::Result<Vec<String>, QueryError> {
        let output = self.program.run(&["-ls"]).await.map_err(|e| {
            if e.is_not_found() {
                QueryError::Unavailable(e.to_string())
            } else {
                QueryError::Failed(e.to_string())
            }
        })?;

        match output.code {
            Some(0) | Some(1) => Ok(parse_session_list(&output.stdout)),
            _ => Err(QueryError::Failed(output.describe())),
        }
    }

    /// Dump the scoped window into a temporary file and read it back.
    async fn hardcopy(&self, with_history: bool) -> std::result::Result<String, String> {
        let path = hardcopy_path();
        let path_arg = path.to_string_lossy().into_owned();

        let mut args = self.window_args();
        args.extend(["-X", "hardcopy"]);
        if with_history {
            args.push("-h");
        }
        args.push(&path_arg);

        let result = match self.program.run(&args).await {
            Ok(output) if output.success() => tokio::fs::read(&path)
                .await
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .map_err(|e| format!("failed to read captured content: {e}")),
            Ok(output) => Err(output.describe()),
            Err(e) => Err(e.to_string()),
        };

        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove hardcopy file {:?}: {}", path, e);
            }
        }

        result
    }

    async fn create_session(&self) -> Result<()> {
        let output = self
            .program
            .run(&["-dmS", &self.session_name])
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    Error::BackendUnavailable(e.to_string())
                } else {
                    Error::SessionCreateFailed(e.to_string())
                }
            })?;

        if !output.success() {
            return Err(Error::SessionCreateFailed(output.describe()));
        }

        info!("Created screen session '{}'", self.session_name);
        Ok(())
    }
}

/// Failure modes of `screen -ls`, mapped differently per operation.
enum QueryError {
    Unavailable(String),
    Failed(String),
}

#[async_trait]
impl TerminalBackend for ScreenBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Screen
    }

    fn session_name(&self) -> &str {
        &self.session_name
    }

    #[instrument(skip(self), fields(session = %self.session_name))]
    async fn ensure_session(&self) -> Result<()> {
        if self.session_exists().await? {
            debug!("screen session already exists");
            return Ok(());
        }
        self.create_session().await
    }

    async fn session_exists(&self) -> Result<bool> {
        match self.query_sessions().await {
            Ok(sessions) => Ok(sessions.iter().any(|s| s == &self.session_name)),
            Err(QueryError::Unavailable(msg)) => Err(Error::BackendUnavailable(msg)),
            Err(QueryError::Failed(msg)) => Err(Error::QueryFailed(msg)),
        }
    }

    async fn capture_pane(&self) -> Result<String> {
        self.hardcopy(false).await.map_err(Error::CaptureFailed)
    }

    async fn get_pane_info(&self) -> Result<PaneInfo> {
        let mut args = self.window_args();
        args.extend(["-Q", "info"]);

        let mut info = match self.program.run(&args).await {
            Ok(output) if output.success() => parse_info(&output, &self.window),
            Ok(output) => {
                debug!("screen -Q info unsupported: {}", output.describe());
                PaneInfo::placeholder(self.window.clone())
            }
            Err(e) => {
                debug!("screen -Q info failed: {}", e);
                PaneInfo::placeholder(self.window.clone())
            }
        };

        if info.scrollback_limit.is_none() {
            info.scrollback_limit = Some(self.scrollback_limit);
        }
        Ok(info)
    }

    async fn get_scrollback_history(&self, lines: usize) -> Result<String> {
        if lines == 0 {
            return Err(Error::InvalidInput(
                "scrollback line count must be at least 1".to_string(),
            ));
        }

        let content = self
            .hardcopy(true)
            .await
            .map_err(Error::ScrollbackFailed)?;
        Ok(tail_lines(&content, lines))
    }

    #[instrument(skip(self), fields(session = %self.session_name))]
    async fn kill_session(&self) -> Result<()> {
        let output = self
            .program
            .run(&["-S", &self.session_name, "-X", "quit"])
            .await
            .map_err(|e| Error::KillFailed(e.to_string()))?;

        if !output.success() {
            return Err(Error::KillFailed(output.describe()));
        }
        info!("Killed screen session '{}'", self.session_name);
        Ok(())
    }

    async fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        let windows = match self
            .program
            .run_with_env(&["-S", &self.session_name, "-Q", "windows"], &WIDE_TERMINAL_ENV)
            .await
        {
            Ok(output) if output.success() => parse_window_list(&output.stdout),
            Ok(output) => {
                warn!("screen -Q windows failed: {}", output.describe());
                Vec::new()
            }
            Err(e) => {
                warn!("screen -Q windows failed: {}", e);
                Vec::new()
            }
        };

        if windows.is_empty() {
            return Ok(vec![WindowInfo::fallback()]);
        }
        Ok(windows)
    }

    fn set_window(&mut self, window_id: &str) {
        debug!("Scoping screen reads to window '{}'", window_id);
        self.window = window_id.to_string();
    }

    fn get_window(&self) -> &str {
        &self.window
    }

    async fn list_sessions(&self) -> Result<Vec<String>> {
        self.query_sessions().await.map_err(|e| match e {
            QueryError::Unavailable(msg) | QueryError::Failed(msg) => Error::ListFailed(msg),
        })
    }
}

/// Unique temporary path for one hardcopy.
fn hardcopy_path() -> PathBuf {
    std::env::temp_dir().join(format!("wingman-hardcopy-{}", Uuid::new_v4()))
}

/// Build pane info from a successful `-Q info` run.
fn parse_info(output: &CommandOutput, window: &str) -> PaneInfo {
    let details = output.stdout.trim().to_string();
    let mut info = PaneInfo::placeholder(window);

    if let Some((width, height, history)) = parse_info_dimensions(&details) {
        info.width = width;
        info.height = height;
        info.scrollback_limit = history;
    }
    if !details.is_empty() {
        info.details = Some(details);
    }
    info
}

/// Extract `(cols, rows, history)` from `screen -Q info` output such as
/// `(1,5)/(80,24)+1000 +flow UTF-8 0(bash)`.
pub fn parse_info_dimensions(info: &str) -> Option<(u16, u16, Option<usize>)> {
    let caps = INFO_DIMENSIONS.captures(info)?;
    let width = caps.get(1)?.as_str().parse().ok()?;
    let height = caps.get(2)?.as_str().parse().ok()?;
    let history = caps.get(3).and_then(|m| m.as_str().parse().ok());
    Some((width, height, history))
}

/// Parse `screen -ls` output into session names.
pub fn parse_session_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.contains("Attached") || line.contains("Detached"))
        .filter_map(|line| SESSION_LINE.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Parse `screen -Q windows` output such as `0 bash  1-$ vim  2*$ top`.
///
/// A numeric token (optionally followed by screen's flag characters) starts
/// a new window; following tokens form its title. `*` marks the current
/// window. Result is sorted by window number.
pub fn parse_window_list(output: &str) -> Vec<WindowInfo> {
    let mut windows: Vec<(u32, WindowInfo)> = Vec::new();

    for token in output.split_whitespace() {
        if let Some(caps) = WINDOW_TOKEN.captures(token) {
            let number: u32 = match caps[1].parse() {
                Ok(n) => n,
                Err(_) => continue,
            };
            let mut window = WindowInfo::new(number.to_string(), "");
            window.active = caps[2].contains('*');
            windows.push((number, window));
        } else if let Some((_, window)) = windows.last_mut() {
            if !window.name.is_empty() {
                window.name.push(' ');
            }
            window.name.push_str(token);
        }
    }

    windows.sort_by_key(|(number, _)| *number);
    windows.dedup_by_key(|(number, _)| *number);
    windows
        .into_iter()
        .map(|(_, mut window)| {
            if window.name.is_empty() {
                window.name = window.id.clone();
            }
            window
        })
        .collect()
}

/// Last `n` lines of `text`, like `tail -n`.
pub fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    let tail = &lines[start..];
    if tail.is_empty() {
        return String::new();
    }
    let mut out = tail.join("\n");
    out.push('\n');
    out
}
