//! # wingman-session
//!
//! Terminal multiplexer backends for terminal wingman.
//!
//! This crate provides:
//! - The [`TerminalBackend`] capability set
//! - tmux and GNU screen implementations that shell out to the binaries
//! - Backend selection from configuration
//! - An in-memory [`testing::FakeBackend`] for consumers' tests
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on wingman-core only.
//! Backends never write to the observed terminal; they capture and query.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod command;
pub mod registry;
pub mod screen;
pub mod screenrc;
pub mod testing;
pub mod tmux;

// Re-export commonly used types
pub use backend::TerminalBackend;
pub use command::{CommandError, CommandOutput, Program, DEFAULT_COMMAND_TIMEOUT};
pub use registry::create_backend;
pub use screen::ScreenBackend;
pub use tmux::TmuxBackend;
