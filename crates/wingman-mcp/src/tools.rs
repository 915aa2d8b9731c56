//! MCP tool catalog, argument validation and result text.
//!
//! Tools are read-only views of the observed session. Argument problems a
//! caller can fix (a bad `lines` or `window_id`) are reported as tool
//! results with `isError`, an unknown tool name as an RPC error.

use std::fmt::Write as _;

use serde_json::{Map, Value};
use thiserror::Error;
use wingman_core::{BackendKind, PaneInfo, WindowInfo};

use crate::protocol::types::{CallToolParams, InputSchema, Property, Tool};

/// Scrollback lines returned when `lines` is not given
pub const DEFAULT_SCROLLBACK_LINES: usize = 100;

/// Visible pane content
pub const READ_TERMINAL: &str = "read_terminal";
/// Scrollback history
pub const READ_SCROLLBACK: &str = "read_scrollback";
/// Pane dimensions and metadata
pub const GET_TERMINAL_INFO: &str = "get_terminal_info";
/// Windows in the session
pub const LIST_WINDOWS: &str = "list_windows";
/// Change the observed window/pane
pub const SET_WINDOW: &str = "set_window";

// =============================================================================
// Catalog
// =============================================================================

/// Every tool this server offers, described for `kind`.
pub fn tool_catalog(kind: BackendKind) -> Vec<Tool> {
    vec![
        Tool {
            name: READ_TERMINAL.to_string(),
            description: format!("Read the current terminal content from the {kind} session"),
            input_schema: InputSchema::empty(),
        },
        Tool {
            name: READ_SCROLLBACK.to_string(),
            description: format!("Read scrollback history from the {kind} session"),
            input_schema: InputSchema::empty().property(
                "lines",
                Property::new(
                    "number",
                    "Number of lines of scrollback history to retrieve (default: 100)",
                ),
            ),
        },
        Tool {
            name: GET_TERMINAL_INFO.to_string(),
            description: "Get information about the terminal (dimensions, current path, etc.)"
                .to_string(),
            input_schema: InputSchema::empty(),
        },
        Tool {
            name: LIST_WINDOWS.to_string(),
            description: format!("List all windows/panes in the {kind} session"),
            input_schema: InputSchema::empty(),
        },
        Tool {
            name: SET_WINDOW.to_string(),
            description: format!("Set the active window/pane in the {kind} session"),
            input_schema: InputSchema::empty().required_property(
                "window_id",
                Property::new("string", "The window/pane ID to switch to"),
            ),
        },
    ]
}

// =============================================================================
// Calls
// =============================================================================

/// A validated tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    /// Capture the visible pane
    ReadTerminal,
    /// Capture scrollback
    ReadScrollback {
        /// Line count, at least 1
        lines: usize,
    },
    /// Report pane metadata
    GetTerminalInfo,
    /// List windows in the session
    ListWindows,
    /// Change the window/pane scope
    SetWindow {
        /// New scope
        window_id: String,
    },
}

/// Why a `tools/call` could not be turned into a [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolCallError {
    /// No tool has this name
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// `set_window` without a string `window_id`
    #[error("window_id must be a string")]
    WindowIdNotString,

    /// `lines` truncated to a value below 1
    #[error("lines must be at least 1, got {0}")]
    LinesOutOfRange(i64),
}

impl ToolCallError {
    /// Whether this is reported as an RPC error rather than a tool result.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, ToolCallError::UnknownTool(_))
    }
}

impl ToolCall {
    /// Validate decoded `tools/call` parameters.
    pub fn parse(params: &CallToolParams) -> Result<Self, ToolCallError> {
        let empty = Map::new();
        let args = params.arguments.as_ref().unwrap_or(&empty);

        match params.name.as_str() {
            READ_TERMINAL => Ok(ToolCall::ReadTerminal),
            READ_SCROLLBACK => Ok(ToolCall::ReadScrollback {
                lines: scrollback_lines(args.get("lines"))?,
            }),
            GET_TERMINAL_INFO => Ok(ToolCall::GetTerminalInfo),
            LIST_WINDOWS => Ok(ToolCall::ListWindows),
            SET_WINDOW => match args.get("window_id") {
                Some(Value::String(id)) => Ok(ToolCall::SetWindow {
                    window_id: id.clone(),
                }),
                _ => Err(ToolCallError::WindowIdNotString),
            },
            other => Err(ToolCallError::UnknownTool(other.to_string())),
        }
    }

    /// Tool name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::ReadTerminal => READ_TERMINAL,
            ToolCall::ReadScrollback { .. } => READ_SCROLLBACK,
            ToolCall::GetTerminalInfo => GET_TERMINAL_INFO,
            ToolCall::ListWindows => LIST_WINDOWS,
            ToolCall::SetWindow { .. } => SET_WINDOW,
        }
    }
}

/// Resolve the `lines` argument.
///
/// Integers and floats are both accepted (floats truncate toward zero, so
/// `100` and `100.0` are the same request). Anything that is not a number
/// means "use the default".
pub fn scrollback_lines(value: Option<&Value>) -> Result<usize, ToolCallError> {
    let requested = match value {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i
            } else if n.as_u64().is_some() {
                i64::MAX
            } else {
                // Saturating cast.
                n.as_f64().map_or(0, |f| f.trunc() as i64)
            }
        }
        _ => return Ok(DEFAULT_SCROLLBACK_LINES),
    };

    if requested < 1 {
        return Err(ToolCallError::LinesOutOfRange(requested));
    }
    Ok(usize::try_from(requested).unwrap_or(usize::MAX))
}

// =============================================================================
// Result text
// =============================================================================

/// Text of `get_terminal_info`. An unscoped backend reports an empty window.
pub fn format_terminal_info(kind: BackendKind, info: &PaneInfo, window: &str) -> String {
    let mut text = format!(
        "Terminal Info ({kind}):\n- Width: {}\n- Height: {}\n- Current Path: {}\n- Window/Pane ID: {}",
        info.width,
        info.height,
        info.current_path,
        window
    );
    if let Some(limit) = info.scrollback_limit {
        let _ = write!(text, "\n- Scrollback Limit: {limit} lines");
    }
    text
}

/// Text of `list_windows`.
pub fn format_window_list(kind: BackendKind, windows: &[WindowInfo]) -> String {
    let mut text = format!("Available windows/panes in {kind} session:\n");
    for window in windows {
        let _ = write!(text, "- ID: {}, Name: {}", window.id, window.name);
        if window.active {
            text.push_str(" (active)");
        }
        text.push('\n');
    }
    text
}

/// Text of a successful `set_window`.
pub fn format_window_switched(window_id: &str) -> String {
    format!("Switched to window/pane: {window_id}")
}
