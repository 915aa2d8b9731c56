//! MCP resources: the current pane and its metadata as `terminal://` URIs.

use wingman_core::{BackendKind, PaneInfo};

use crate::protocol::types::{Resource, TEXT_MIME_TYPE};

/// URI of the visible pane content
pub const CURRENT_URI: &str = "terminal://current";

/// URI of the pane metadata
pub const INFO_URI: &str = "terminal://info";

/// A resource this server can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalResource {
    /// `terminal://current`
    Current,
    /// `terminal://info`
    Info,
}

impl TerminalResource {
    /// Exact URI match; no normalisation.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            CURRENT_URI => Some(TerminalResource::Current),
            INFO_URI => Some(TerminalResource::Info),
            _ => None,
        }
    }

    /// URI of the resource.
    pub fn uri(&self) -> &'static str {
        match self {
            TerminalResource::Current => CURRENT_URI,
            TerminalResource::Info => INFO_URI,
        }
    }
}

/// Every resource this server offers.
pub fn resource_catalog() -> Vec<Resource> {
    vec![
        Resource {
            uri: CURRENT_URI.to_string(),
            name: "Current Terminal".to_string(),
            description: "Current terminal content".to_string(),
            mime_type: TEXT_MIME_TYPE.to_string(),
        },
        Resource {
            uri: INFO_URI.to_string(),
            name: "Terminal Information".to_string(),
            description: "Terminal dimensions and metadata".to_string(),
            mime_type: TEXT_MIME_TYPE.to_string(),
        },
    ]
}

/// Text of `terminal://info`.
pub fn format_resource_info(kind: BackendKind, info: &PaneInfo, window: &str) -> String {
    format!(
        "Terminal Information ({kind}):\n\nDimensions: {}x{}\nCurrent Path: {}\nWindow/Pane ID: {}",
        info.width,
        info.height,
        info.current_path,
        window
    )
}
