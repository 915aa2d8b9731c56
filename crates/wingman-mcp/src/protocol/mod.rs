//! MCP Protocol Layer
//!
//! Newline-delimited JSON-RPC 2.0 over any async reader/writer pair, plus the
//! MCP request and result shapes the server exchanges.

pub mod jsonrpc;
pub mod server;
pub mod types;

pub use jsonrpc::{ErrorObject, Request, RequestId, Response, RpcError};
pub use server::{Method, ServerIdentity, WingmanServer};
