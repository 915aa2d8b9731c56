//! Terminal Wingman MCP Server Library
//!
//! This library contains the MCP protocol layer, the tool and resource
//! catalogs, and the request dispatcher. The server binary is in main.rs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod protocol;
pub mod resources;
pub mod tools;

// Re-export commonly used types
pub use protocol::{Method, Request, RequestId, Response, RpcError, ServerIdentity, WingmanServer};
pub use resources::TerminalResource;
pub use tools::{ToolCall, ToolCallError};
