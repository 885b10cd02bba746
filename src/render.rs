//! The redraw driver.
//!
//! A frame is composed completely before anything is written, so a frame that fails
//! (terminal too small) leaves the screen and the fleet flags untouched. Frame layout:
//!
//! ```text
//! [ESC[?25l "\n" title]           first frame of a session only
//! ESC[2K line                     one per bar, in registry order
//! ESC[2K "\n"                     one per row left over from a longer previous frame
//! ESC[<rows>A                     fleet still running: back to the first bar row
//! "\n" closing "\n\n" ESC[?25h    fleet finished: banner, cursor back, freeze
//! ```

use tracing::{debug, trace, warn};

use crate::{
    config::Config,
    error::RenderError,
    layout::{self, Columns},
    registry::Fleet,
    term::{self, CLEAR_LINE, HIDE_CURSOR, SHOW_CURSOR},
};

/// Repaints every bar in `fleet`, taking banners from `config`.
pub(crate) fn redraw(fleet: &mut Fleet, config: &Config) -> Result<(), RenderError> {
    if fleet.bars.is_empty() && fleet.rows_drawn == 0 {
        return Ok(());
    }

    let width = fleet.terminal.width();
    let columns = Columns::measure(&fleet.bars);
    let lines = fleet
        .bars
        .iter()
        .map(|bar| layout::compose_with(bar, columns, width))
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|err| {
            warn!(width, rows = fleet.bars.len(), "cannot draw frame: {err}");
        })?;

    let mut frame = String::new();
    if !fleet.title_printed {
        frame.push_str(HIDE_CURSOR);
        frame.push('\n');
        frame.push_str(&config.string.title);
        if !config.string.title.ends_with(['\n', '\r']) {
            frame.push('\n');
        }
    }

    for line in &lines {
        frame.push_str(CLEAR_LINE);
        frame.push_str(line);
    }
    let stale = fleet.rows_drawn.saturating_sub(lines.len());
    for _ in 0..stale {
        frame.push_str(CLEAR_LINE);
        frame.push('\n');
    }

    let finished = fleet.all_finished();
    if finished {
        frame.push('\n');
        frame.push_str(&config.string.closing);
        frame.push_str("\n\n");
        frame.push_str(SHOW_CURSOR);
    } else if lines.len() + stale > 0 {
        frame.push_str(&term::cursor_up(lines.len() + stale));
    }

    fleet.terminal.write_frame(&frame)?;
    trace!(rows = lines.len(), stale, width, "frame drawn");

    fleet.title_printed = true;
    fleet.rows_drawn = lines.len();
    if finished {
        fleet.completed = true;
        debug!(bars = fleet.bars.len(), "fleet completed");
    }

    Ok(())
}

/// Leaves the bar block, prints the abort banner and freezes the fleet.
pub(crate) fn abort_fleet(fleet: &mut Fleet, config: &Config) -> Result<(), RenderError> {
    if fleet.completed {
        return Ok(());
    }

    let mut frame = String::new();
    if fleet.rows_drawn > 0 {
        frame.push_str(&term::cursor_down(fleet.rows_drawn));
    }
    frame.push('\n');
    frame.push_str(&config.string.abort);
    frame.push_str("\n\n");
    frame.push_str(SHOW_CURSOR);

    fleet.terminal.write_frame(&frame)?;

    fleet.completed = true;
    debug!(bars = fleet.bars.len(), "fleet aborted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use console::strip_ansi_codes;

    use crate::{
        bar::Bar,
        config::{ConfigOverride, StringsOverride},
        registry::Registry,
        term::{BufferTerminal, CLEAR_LINE, HIDE_CURSOR, SHOW_CURSOR},
    };

    fn titled(title: &str) -> ConfigOverride {
        ConfigOverride {
            string: Some(StringsOverride {
                title: Some(title.into()),
                closing: Some("all done".into()),
                abort: None,
            }),
            ..Default::default()
        }
    }

    /// First Frame
    /// Verifies that the first frame hides the cursor, prints the title with a line
    /// break, draws the row and moves back up onto it.
    #[test]
    fn test_first_frame_protocol() {
        let term = BufferTerminal::new(80);
        let registry = Registry::new(term.clone());
        let _bar = Bar::builder("job", 0u64, 10u64)
            .config_override(&titled("Tasks:"))
            .build(&registry)
            .unwrap();

        let out = term.take();
        assert!(out.starts_with(&format!("{HIDE_CURSOR}\nTasks:\n{CLEAR_LINE}")));
        assert!(out.ends_with("\n\x1b[1A"));
        assert_eq!(out.matches(CLEAR_LINE).count(), 1);
    }

    /// Redraw Block
    /// Verifies that later frames redraw every row, with no title, and return to the top.
    #[test]
    fn test_redraw_rewrites_block() {
        let term = BufferTerminal::new(80);
        let registry = Registry::new(term.clone());
        let mut a = Bar::new(&registry, "a", 0u64, 10u64).unwrap();
        let _b = Bar::new(&registry, "b", 0u64, 10u64).unwrap();
        let _ = term.take();

        a.inc(5u64).unwrap();
        let out = term.take();

        assert!(!out.contains(HIDE_CURSOR));
        assert!(!out.contains("PROGRESS:"));
        assert!(out.starts_with(CLEAR_LINE));
        assert_eq!(out.matches(CLEAR_LINE).count(), 2);
        assert!(out.ends_with("\x1b[2A"));

        let plain = strip_ansi_codes(&out);
        let rows: Vec<_> = plain.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains(" 50% (05/10)"));
        assert!(rows[1].contains("  0% (00/10)"));
    }

    /// Title Once
    /// Verifies that the title is printed once per session, and again after a reset.
    #[test]
    fn test_title_once_per_session() {
        let term = BufferTerminal::new(80);
        let registry = Registry::new(term.clone());

        let mut a = Bar::new(&registry, "a", 0u64, 2u64).unwrap();
        let mut b = Bar::new(&registry, "b", 0u64, 2u64).unwrap();
        a.inc(1u64).unwrap();
        a.inc(1u64).unwrap();
        b.inc(2u64).unwrap();
        assert_eq!(term.contents().matches("PROGRESS:").count(), 1);
        assert_eq!(term.contents().matches(HIDE_CURSOR).count(), 1);

        registry.reset().unwrap();
        let _c = Bar::new(&registry, "c", 0u64, 2u64).unwrap();
        assert_eq!(term.contents().matches("PROGRESS:").count(), 2);
    }

    /// Closing Frame
    /// Verifies that the final frame ends with the closing banner and shows the cursor.
    #[test]
    fn test_closing_frame() {
        let term = BufferTerminal::new(80);
        let registry = Registry::new(term.clone());
        let mut bar = Bar::builder("job", 0u64, 1u64)
            .config_override(&titled("T"))
            .build(&registry)
            .unwrap();
        let _ = term.take();

        bar.inc(1u64).unwrap();
        let out = term.take();

        assert!(out.ends_with(&format!("\nall done\n\n{SHOW_CURSOR}")));
        assert!(!out.contains("\x1b[1A"));
    }

    /// Stale Row
    /// Verifies that deleting a row clears the line it leaves behind.
    #[test]
    fn test_delete_clears_stale_row() {
        let term = BufferTerminal::new(80);
        let registry = Registry::new(term.clone());
        let _a = Bar::new(&registry, "a", 0u64, 10u64).unwrap();
        let b = Bar::new(&registry, "b", 0u64, 10u64).unwrap();
        let _ = term.take();

        b.delete().unwrap();
        let out = term.take();

        assert_eq!(out.matches(CLEAR_LINE).count(), 2);
        assert!(out.ends_with(&format!("{CLEAR_LINE}\n\x1b[2A")));
        assert_eq!(registry.len(), 1);
    }

    /// Abort All Frame
    /// Verifies that abort-all moves below the block before printing its banner.
    #[test]
    fn test_abort_all_frame() {
        let term = BufferTerminal::new(80);
        let registry = Registry::new(term.clone());
        let _a = Bar::new(&registry, "a", 0u64, 10u64).unwrap();
        let b = Bar::new(&registry, "b", 0u64, 10u64).unwrap();
        let _ = term.take();

        b.abort_all().unwrap();
        let out = term.take();

        assert_eq!(
            out,
            format!("\x1b[2B\nAborting the progress bar\n\n{SHOW_CURSOR}")
        );
    }

    /// Title Line Break
    /// Verifies that a title that already ends in a line break is not given a second one.
    #[test]
    fn test_title_line_break_kept() {
        let term = BufferTerminal::new(80);
        let registry = Registry::new(term.clone());
        let _bar = Bar::new(&registry, "job", 0u64, 10u64).unwrap();

        let expected = format!("{HIDE_CURSOR}\nPROGRESS:\n{CLEAR_LINE}");
        assert!(term.contents().starts_with(&expected));
    }
}
