//! Terminal coloring of text fragments.

use console::Style;

/// Wraps `text` in an 8-bit ANSI foreground color (`ESC[38;5;<code>m`) followed by a
/// reset.
///
/// Styling is forced on: whether the output is a terminal is decided once, when a bar
/// is constructed, not per fragment.
#[must_use]
pub fn colorize(text: &str, code: u8) -> String {
    Style::new()
        .color256(code)
        .force_styling(true)
        .apply_to(text)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::colorize;

    /// Colorize
    /// Verifies that text is wrapped in a 256-color foreground code and a reset.
    #[test]
    fn test_colorize_wraps_and_resets() {
        let out = colorize("build", 82);
        assert!(out.starts_with("\x1b[38;5;82m"));
        assert!(out.ends_with("\x1b[0m"));
        assert_eq!(console::strip_ansi_codes(&out), "build");
    }
}
