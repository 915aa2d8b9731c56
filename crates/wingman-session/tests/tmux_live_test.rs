//! Tests against a real tmux server.
//!
//! Each test uses its own `-L` socket so it never touches the user's
//! sessions. Run with `cargo test -- --ignored` on a machine with tmux.

use std::time::Duration;

use wingman_core::TmuxSettings;
use wingman_session::{TerminalBackend, TmuxBackend};

fn isolated_backend(label: &str) -> TmuxBackend {
    isolated_session(label, "wingman-live")
}

fn isolated_session(label: &str, session: &str) -> TmuxBackend {
    let settings = TmuxSettings {
        program: "tmux".to_string(),
        socket_name: Some(format!("wingman-test-{}-{}", label, std::process::id())),
    };
    TmuxBackend::from_settings(&settings, session, Duration::from_secs(5))
}

#[tokio::test]
#[ignore = "requires tmux"]
async fn test_ensure_session_is_idempotent() {
    let backend = isolated_backend("ensure");

    backend.ensure_session().await.unwrap();
    backend.ensure_session().await.unwrap();
    assert!(backend.session_exists().await.unwrap());

    let sessions = backend.list_sessions().await.unwrap();
    assert_eq!(
        sessions.iter().filter(|s| *s == "wingman-live").count(),
        1
    );

    backend.kill_session().await.unwrap();
    assert!(!backend.session_exists().await.unwrap());
}

#[tokio::test]
#[ignore = "requires tmux"]
async fn test_capture_and_info() {
    let backend = isolated_backend("capture");
    backend.ensure_session().await.unwrap();

    let info = backend.get_pane_info().await.unwrap();
    assert!(info.width > 0);
    assert!(info.height > 0);
    assert!(!info.current_path.is_empty());

    let content = backend.capture_pane().await.unwrap();
    assert!(content.lines().count() <= usize::from(info.height));
    backend.get_scrollback_history(10).await.unwrap();

    let windows = backend.list_windows().await.unwrap();
    assert!(!windows.is_empty());
    assert!(windows.iter().any(|w| w.active));

    backend.kill_session().await.unwrap();
}

#[tokio::test]
#[ignore = "requires tmux"]
async fn test_prefix_sharing_session_is_distinct() {
    let longer = isolated_session("prefix", "wingman-live2");
    let backend = isolated_session("prefix", "wingman-live");
    longer.ensure_session().await.unwrap();

    assert!(!backend.session_exists().await.unwrap());
    backend.ensure_session().await.unwrap();

    let mut sessions = backend.list_sessions().await.unwrap();
    sessions.sort();
    assert_eq!(sessions, vec!["wingman-live", "wingman-live2"]);

    backend.kill_session().await.unwrap();
    assert!(longer.session_exists().await.unwrap());
    longer.kill_session().await.unwrap();
}
