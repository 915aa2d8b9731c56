//! Scrollback size discovery from a screenrc file.

use std::path::{Path, PathBuf};

use tracing::debug;
use wingman_core::ScreenSettings;

/// `~/.screenrc`, when a home directory is known.
pub fn default_screenrc_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".screenrc"))
}

/// Value of the last `defscrollback N` line, as screen applies them in order.
pub fn parse_defscrollback(content: &str) -> Option<usize> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match fields.next() {
                Some("defscrollback") => fields.next()?.parse().ok(),
                _ => None,
            }
        })
        .last()
}

/// Read `defscrollback` from a screenrc; None when unreadable or unset.
pub fn read_defscrollback(path: &Path) -> Option<usize> {
    let content = std::fs::read_to_string(path).ok()?;
    parse_defscrollback(&content)
}

/// Scrollback limit screen is expected to honour for new windows.
pub fn scrollback_limit(settings: &ScreenSettings) -> usize {
    let path = settings.screenrc.clone().or_else(default_screenrc_path);
    match path.as_deref().and_then(read_defscrollback) {
        Some(lines) => {
            debug!("Using defscrollback {} from {:?}", lines, path);
            lines
        }
        None => settings.default_scrollback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defscrollback() {
        let content = "startup_message off\ndefscrollback 5000\nvbell off\n";
        assert_eq!(parse_defscrollback(content), Some(5000));
    }

    #[test]
    fn test_parse_defscrollback_last_wins() {
        let content = "defscrollback 100\n  defscrollback   20000  \n";
        assert_eq!(parse_defscrollback(content), Some(20000));
    }

    #[test]
    fn test_parse_defscrollback_ignores_noise() {
        assert_eq!(parse_defscrollback(""), None);
        assert_eq!(parse_defscrollback("# defscrollback 10\n"), None);
        assert_eq!(parse_defscrollback("defscrollback lots\n"), None);
        assert_eq!(parse_defscrollback("defscrollbackx 10\n"), None);
    }

    #[test]
    fn test_scrollback_limit_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screenrc");
        std::fs::write(&path, "defscrollback 3000\n").unwrap();

        let settings = ScreenSettings {
            screenrc: Some(path),
            ..ScreenSettings::default()
        };
        assert_eq!(scrollback_limit(&settings), 3000);
    }

    #[test]
    fn test_scrollback_limit_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ScreenSettings {
            screenrc: Some(dir.path().join("missing")),
            default_scrollback: 1234,
            ..ScreenSettings::default()
        };
        assert_eq!(scrollback_limit(&settings), 1234);
    }
}
