//! Error types for terminal wingman.

use thiserror::Error;

/// Main error type for terminal wingman operations.
///
/// Every backend variant carries a description of the failing external
/// call, so the message alone tells which operation failed and why.
#[derive(Debug, Error)]
pub enum Error {
    /// The multiplexer binary could not be found or started
    #[error("terminal multiplexer unavailable: {0}")]
    BackendUnavailable(String),

    /// The session did not exist and could not be created
    #[error("failed to create session: {0}")]
    SessionCreateFailed(String),

    /// Querying session state failed for a reason other than "no session"
    #[error("failed to query session: {0}")]
    QueryFailed(String),

    /// Capturing visible pane content failed
    #[error("failed to capture pane: {0}")]
    CaptureFailed(String),

    /// Reading pane metadata failed
    #[error("failed to get pane info: {0}")]
    InfoFailed(String),

    /// Reading scrollback history failed
    #[error("failed to capture scrollback: {0}")]
    ScrollbackFailed(String),

    /// Killing the session failed
    #[error("failed to kill session: {0}")]
    KillFailed(String),

    /// Listing sessions failed
    #[error("failed to list sessions: {0}")]
    ListFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input or parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration parse errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_unavailable_error() {
        let err = Error::BackendUnavailable("tmux: not found in PATH".to_string());
        assert_eq!(
            err.to_string(),
            "terminal multiplexer unavailable: tmux: not found in PATH"
        );
    }

    #[test]
    fn test_capture_failed_error() {
        let err = Error::CaptureFailed("can't find session: work".to_string());
        assert_eq!(
            err.to_string(),
            "failed to capture pane: can't find session: work"
        );
    }

    #[test]
    fn test_scrollback_failed_error() {
        let err = Error::ScrollbackFailed("exit status 1".to_string());
        assert_eq!(err.to_string(), "failed to capture scrollback: exit status 1");
    }

    #[test]
    fn test_session_create_failed_error() {
        let err = Error::SessionCreateFailed("duplicate session".to_string());
        assert_eq!(err.to_string(), "failed to create session: duplicate session");
    }

    #[test]
    fn test_list_failed_error() {
        let err = Error::ListFailed("exit status 2".to_string());
        assert_eq!(err.to_string(), "failed to list sessions: exit status 2");
    }

    #[test]
    fn test_config_error() {
        let err = Error::Config("session.name must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: session.name must not be empty"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<Vec<u8>>("{not: [a list").unwrap_err();
        let err: Error = yaml_err.into();
        assert!(matches!(err, Error::Yaml(_)));
    }
}
