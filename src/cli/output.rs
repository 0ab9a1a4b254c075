//! Terminal output helpers shared by the CLI commands.
//!
//! Global flags arrive through environment variables set in `main` so
//! every module can check them without threading state around.

use std::io::IsTerminal;

/// Whether `--json` was passed (machine-readable output).
pub fn is_json() -> bool {
    std::env::var_os("METALENS_JSON").is_some()
}

/// Whether `--quiet` was passed (suppress non-essential output).
pub fn is_quiet() -> bool {
    std::env::var_os("METALENS_QUIET").is_some()
}

/// Whether `--verbose` was passed (debug logging).
pub fn is_verbose() -> bool {
    std::env::var_os("METALENS_VERBOSE").is_some()
}

/// Print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// ANSI styling that degrades to plain text when colors are off.
///
/// Colors are disabled by `--no-color`, the `NO_COLOR` convention,
/// `--quiet`, or when stderr is not a terminal.
pub struct Styled {
    enabled: bool,
}

impl Styled {
    pub fn new() -> Styled {
        let disabled = std::env::var_os("METALENS_NO_COLOR").is_some()
            || std::env::var_os("NO_COLOR").is_some()
            || std::env::var_os("METALENS_QUIET").is_some()
            || !std::io::stderr().is_terminal();
        Styled { enabled: !disabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn red(&self, text: &str) -> String {
        self.paint("31", text)
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint("33", text)
    }

    pub fn blue(&self, text: &str) -> String {
        self.paint("34", text)
    }

    pub fn magenta(&self, text: &str) -> String {
        self.paint("35", text)
    }

    pub fn cyan(&self, text: &str) -> String {
        self.paint("36", text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    /// Success marker.
    pub fn ok_sym(&self) -> String {
        self.paint("32", "✓")
    }

    /// Warning marker.
    pub fn warn_sym(&self) -> String {
        self.paint("33", "!")
    }

    /// Failure marker.
    pub fn err_sym(&self) -> String {
        self.paint("31", "✗")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_styling_is_plain() {
        let s = Styled { enabled: false };
        assert_eq!(s.red("boom"), "boom");
        assert_eq!(s.ok_sym(), "✓");
    }

    #[test]
    fn test_enabled_styling_wraps_with_reset() {
        let s = Styled { enabled: true };
        assert_eq!(s.red("boom"), "\x1b[31mboom\x1b[0m");
        assert!(s.err_sym().ends_with("\x1b[0m"));
    }
}
