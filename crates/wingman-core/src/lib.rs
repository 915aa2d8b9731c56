//! # wingman-core
//!
//! Core types for terminal wingman.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other wingman crates. It provides:
//!
//! - Backend kind, pane and window descriptions
//! - Configuration loaded from YAML
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other wingman crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod terminal;

// Re-export commonly used types
pub use config::{ScreenSettings, ServerSettings, SessionSettings, TmuxSettings, WingmanConfig};
pub use error::{Error, Result};
pub use terminal::{
    BackendKind, PaneInfo, WindowInfo, DEFAULT_HEIGHT, DEFAULT_SESSION_NAME, DEFAULT_WIDTH,
    UNKNOWN_PATH,
};
