//! In-memory backend for exercising consumers without a multiplexer.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use wingman_core::{BackendKind, Error, PaneInfo, Result, WindowInfo};

use crate::backend::{session_name_or_default, TerminalBackend};

/// Backend operation that a [`FakeBackend`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `ensure_session`
    EnsureSession,
    /// `capture_pane`
    Capture,
    /// `get_pane_info`
    Info,
    /// `get_scrollback_history`
    Scrollback,
    /// `kill_session`
    Kill,
    /// `list_sessions`
    ListSessions,
}

#[derive(Debug, Default)]
struct FakeState {
    sessions: Vec<String>,
    failures: HashSet<Operation>,
    scrollback_requests: Vec<usize>,
    windows_requested: Vec<String>,
}

/// Scriptable [`TerminalBackend`].
///
/// Clones share call records and the session list, so a test can keep one
/// clone for inspection after handing another to the code under test.
#[derive(Debug, Clone)]
pub struct FakeBackend {
    kind: BackendKind,
    session_name: String,
    window: String,
    pane_text: String,
    scrollback_text: String,
    pane_info: PaneInfo,
    windows: Vec<WindowInfo>,
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    /// Fake tmux backend observing `session_name`.
    pub fn new(session_name: impl AsRef<str>) -> Self {
        Self {
            kind: BackendKind::Tmux,
            session_name: session_name_or_default(session_name.as_ref()),
            window: String::new(),
            pane_text: String::new(),
            scrollback_text: String::new(),
            pane_info: PaneInfo::placeholder("0"),
            windows: Vec::new(),
            state: Arc::default(),
        }
    }

    /// Report a different multiplexer kind.
    pub fn with_kind(mut self, kind: BackendKind) -> Self {
        self.kind = kind;
        self
    }

    /// Text returned by `capture_pane`.
    pub fn with_pane_text(mut self, text: impl Into<String>) -> Self {
        self.pane_text = text.into();
        self
    }

    /// Text returned by `get_scrollback_history`, regardless of line count.
    pub fn with_scrollback(mut self, text: impl Into<String>) -> Self {
        self.scrollback_text = text.into();
        self
    }

    /// Info returned by `get_pane_info`. Its index is replaced by the
    /// current window when one is set.
    pub fn with_pane_info(mut self, info: PaneInfo) -> Self {
        self.pane_info = info;
        self
    }

    /// Windows returned by `list_windows`.
    pub fn with_windows(mut self, windows: Vec<WindowInfo>) -> Self {
        self.windows = windows;
        self
    }

    /// Sessions that already exist.
    pub fn with_sessions<I, S>(self, sessions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().sessions = sessions.into_iter().map(Into::into).collect();
        self
    }

    /// Make `op` fail from now on.
    pub fn fail(self, op: Operation) -> Self {
        self.state().failures.insert(op);
        self
    }

    /// Line counts passed to `get_scrollback_history`, in call order.
    pub fn scrollback_requests(&self) -> Vec<usize> {
        self.state().scrollback_requests.clone()
    }

    /// Windows each `get_pane_info` call was scoped to, in call order.
    pub fn info_windows(&self) -> Vec<String> {
        self.state().windows_requested.clone()
    }

    /// Current sessions, including any created by `ensure_session`.
    pub fn sessions(&self) -> Vec<String> {
        self.state().sessions.clone()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, op: Operation) -> Result<()> {
        if !self.state().failures.contains(&op) {
            return Ok(());
        }
        let msg = format!("simulated {op:?} failure");
        Err(match op {
            Operation::EnsureSession => Error::SessionCreateFailed(msg),
            Operation::Capture => Error::CaptureFailed(msg),
            Operation::Info => Error::InfoFailed(msg),
            Operation::Scrollback => Error::ScrollbackFailed(msg),
            Operation::Kill => Error::KillFailed(msg),
            Operation::ListSessions => Error::ListFailed(msg),
        })
    }
}

#[async_trait]
impl TerminalBackend for FakeBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn session_name(&self) -> &str {
        &self.session_name
    }

    async fn ensure_session(&self) -> Result<()> {
        self.check(Operation::EnsureSession)?;
        let mut state = self.state();
        if !state.sessions.contains(&self.session_name) {
            state.sessions.push(self.session_name.clone());
        }
        Ok(())
    }

    async fn session_exists(&self) -> Result<bool> {
        Ok(self.state().sessions.contains(&self.session_name))
    }

    async fn capture_pane(&self) -> Result<String> {
        self.check(Operation::Capture)?;
        Ok(self.pane_text.clone())
    }

    async fn get_pane_info(&self) -> Result<PaneInfo> {
        self.check(Operation::Info)?;
        self.state().windows_requested.push(self.window.clone());
        let mut info = self.pane_info.clone();
        if !self.window.is_empty() {
            info.index = self.window.clone();
        }
        Ok(info)
    }

    async fn get_scrollback_history(&self, lines: usize) -> Result<String> {
        self.check(Operation::Scrollback)?;
        if lines == 0 {
            return Err(Error::InvalidInput(
                "scrollback line count must be at least 1".to_string(),
            ));
        }
        self.state().scrollback_requests.push(lines);
        Ok(self.scrollback_text.clone())
    }

    async fn kill_session(&self) -> Result<()> {
        self.check(Operation::Kill)?;
        let name = self.session_name.clone();
        self.state().sessions.retain(|s| s != &name);
        Ok(())
    }

    async fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        if self.windows.is_empty() {
            return Ok(vec![WindowInfo::fallback()]);
        }
        Ok(self.windows.clone())
    }

    fn set_window(&mut self, window_id: &str) {
        self.window = window_id.to_string();
    }

    fn get_window(&self) -> &str {
        &self.window
    }

    async fn list_sessions(&self) -> Result<Vec<String>> {
        self.check(Operation::ListSessions)?;
        Ok(self.sessions())
    }
}
