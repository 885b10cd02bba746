//! Per-frame line layout.
//!
//! Every line is laid out against [`Columns`] measured over the whole fleet, so rows
//! of different bars line up even though their names and ranges differ. The print
//! margin (terminal width minus the name and percentage columns) then picks one of four
//! [`Template`]s, from `name pct%` up to `name bar20 pct% (now/end) comment`.

use std::{borrow::Cow, iter};

use unicode_width::{UnicodeWidthChar as _, UnicodeWidthStr as _};

use crate::{bar::BarSnapshot, color::colorize, error::RenderError, glyph::generate_bar};

/// Digits reserved for the percentage even when every bar is below 100%.
pub const PERCENT_DIGITS: usize = 3;

/// Columns taken by the short bar plus its separator.
pub const BAR10_WIDTH: usize = 11;

/// Columns taken by the long bar plus its separator.
pub const BAR20_WIDTH: usize = 21;

/// Marker appended to a truncated comment.
pub const ELLIPSIS: &str = "...";

/// Column widths shared by every row of a frame.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Columns {
    /// Widest bar name.
    pub name: usize,
    /// Most decimal digits in any bar's `end` or `now`.
    pub step: usize,
    /// Most digits in any bar's percentage, at least [`PERCENT_DIGITS`].
    pub percent: usize,
}

impl Columns {
    /// Measures the shared columns over `bars`.
    ///
    /// Positions and percentages that overshoot their range widen the columns, so
    /// an overshooting bar never pushes its row past the width the template was
    /// chosen for.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use fleet_progress::{BarSnapshot, Config, layout::Columns};
    ///
    /// let config = Arc::new(Config::default());
    /// let bars = [
    ///     BarSnapshot::new(1, "a", 0, 10, "", config.clone()),
    ///     BarSnapshot::new(2, "bb", 0, 100, "", config),
    /// ];
    ///
    /// let columns = Columns::measure(&bars);
    /// assert_eq!((columns.name, columns.step), (2, 3));
    /// ```
    pub fn measure<'a, I>(bars: I) -> Self
    where
        I: IntoIterator<Item = &'a BarSnapshot>,
    {
        let seed = Self {
            percent: PERCENT_DIGITS,
            ..Self::default()
        };
        bars.into_iter().fold(seed, |acc, bar| Self {
            name: acc.name.max(bar.name().width()),
            step: acc.step.max(digits(bar.end())).max(digits(bar.now())),
            percent: acc.percent.max(digits(bar.percent())),
        })
    }

    /// Width of `(now/end)` plus its separator.
    #[must_use]
    pub const fn chunk(&self) -> usize {
        self.step * 2 + 4
    }

    /// Narrowest terminal that can hold the smallest template: the name, a
    /// separator, the percentage and its `%`.
    #[must_use]
    pub const fn min_width(&self) -> usize {
        self.name + 1 + self.percent + 1
    }
}

/// The four line layouts, narrowest first.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Template {
    /// `name pct%`
    Percent,
    /// `name pct% (now/end)`
    Steps,
    /// `name bar10 pct% (now/end)`
    ShortBar,
    /// `name bar20 pct% (now/end) comment`
    Full,
}

impl Template {
    /// Picks the widest template that fits in `print_margin`.
    #[must_use]
    pub const fn select(print_margin: usize, columns: Columns) -> Self {
        let chunk = columns.chunk();
        if print_margin < chunk {
            Self::Percent
        } else if print_margin < chunk + BAR10_WIDTH {
            Self::Steps
        } else if print_margin < chunk + BAR20_WIDTH {
            Self::ShortBar
        } else {
            Self::Full
        }
    }
}

/// Lays out one newline-terminated line for `bar`, aligned against every bar in
/// `fleet`.
///
/// # Parameters
///
/// * `bar`: The bar to lay out. It is measured along with `fleet`, so it need not be
///   part of it.
/// * `fleet`: Every bar sharing the frame.
/// * `terminal_width`: Columns available on the line.
///
/// # Errors
///
/// Returns [`RenderError::TerminalTooSmall`] if not even `name pct%` fits.
pub fn compose_line(
    bar: &BarSnapshot,
    fleet: &[BarSnapshot],
    terminal_width: usize,
) -> Result<String, RenderError> {
    let columns = Columns::measure(fleet.iter().chain(iter::once(bar)));
    compose_with(bar, columns, terminal_width)
}

/// Lays out one line for `bar` using precomputed `columns`.
///
/// # Errors
///
/// Returns [`RenderError::TerminalTooSmall`] if not even `name pct%` fits.
pub fn compose_with(
    bar: &BarSnapshot,
    columns: Columns,
    terminal_width: usize,
) -> Result<String, RenderError> {
    let print_margin = terminal_width.checked_sub(columns.min_width()).ok_or(
        RenderError::TerminalTooSmall {
            width: terminal_width,
            required: columns.min_width(),
        },
    )?;

    let config = bar.config();
    let text_color = config.color.text.pick(bar.status());
    let bar_color = config.color.bar.pick(bar.status());
    let shape = config.bar_shape;

    let name = pad_left(bar.name(), columns.name);
    let pct = format!("{:>w$}%", bar.percent(), w = columns.percent);
    let steps = format!("({:0w$}/{:0w$})", bar.now(), bar.end(), w = columns.step);

    let glyphs = |length| {
        let glyphs = generate_bar(length, bar.percent(), shape.filled, shape.blank);
        colorize(&glyphs, bar_color)
    };
    let (name_c, pct_c, steps_c) = (
        colorize(&name, text_color),
        colorize(&pct, text_color),
        colorize(&steps, text_color),
    );

    let mut line = match Template::select(print_margin, columns) {
        Template::Percent => format!("{name_c} {pct_c}"),
        Template::Steps => format!("{name_c} {pct_c} {steps_c}"),
        Template::ShortBar => format!("{name_c} {} {pct_c} {steps_c}", glyphs(10)),
        Template::Full => {
            let mut line = format!("{name_c} {} {pct_c} {steps_c}", glyphs(20));

            let used = name.width() + 1 + 20 + 1 + pct.len() + 1 + steps.len();
            // One more column for the separator before the comment.
            let budget = terminal_width.saturating_sub(used + 1);
            let comment = fit_comment(bar.comment(), budget);
            if !comment.is_empty() {
                line.push(' ');
                line.push_str(&colorize(&comment, text_color));
            }
            line
        }
    };
    line.push('\n');

    Ok(line)
}

/// Cuts `comment` to at most `budget` columns.
///
/// Control characters (line breaks, tabs) are replaced by spaces first, so a comment
/// can never add a row to the block. A comment that does not fit is shortened and
/// suffixed with [`ELLIPSIS`] so that the result fills `budget` exactly (short of a
/// wide character straddling the cut).
///
/// # Parameters
///
/// * `comment`: The bar's comment, as given by the caller.
/// * `budget`: Columns left on the line after the separator.
///
/// # Examples
///
/// ```
/// use fleet_progress::layout::fit_comment;
///
/// assert_eq!(fit_comment("copying", 10), "copying");
/// assert_eq!(fit_comment("copying files", 10), "copying...");
/// assert_eq!(fit_comment("line\nbreak", 20), "line break");
/// ```
#[must_use]
pub fn fit_comment(comment: &str, budget: usize) -> Cow<'_, str> {
    let comment: Cow<'_, str> = if comment.contains(char::is_control) {
        Cow::Owned(
            comment
                .chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(comment)
    };

    if comment.width() <= budget {
        return comment;
    }
    if budget <= ELLIPSIS.len() {
        return Cow::Borrowed(&ELLIPSIS[..budget]);
    }

    let keep = budget - ELLIPSIS.len();
    let mut used = 0;
    let mut out = String::with_capacity(budget);
    for c in comment.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > keep {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(ELLIPSIS);

    Cow::Owned(out)
}

fn pad_left(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    let mut out = String::with_capacity(pad + text.len());
    out.extend(iter::repeat_n(' ', pad));
    out.push_str(text);
    out
}

const fn digits(n: u64) -> usize {
    match n.checked_ilog10() {
        Some(d) => d as usize + 1,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use console::strip_ansi_codes;
    use unicode_width::UnicodeWidthStr as _;

    use super::{Columns, RenderError, Template, compose_line, digits, fit_comment};
    use crate::{
        bar::{BarSnapshot, Status},
        config::Config,
    };

    fn snap(name: &str, now: u64, end: u64, comment: &str) -> BarSnapshot {
        BarSnapshot::new(1, name, now, end, comment, Arc::new(Config::default()))
    }

    fn plain(line: &str) -> String {
        strip_ansi_codes(line).into_owned()
    }

    /// Digit Count
    /// Verifies the decimal width used for the step column.
    #[test]
    fn test_digits() {
        assert_eq!(digits(0), 1);
        assert_eq!(digits(9), 1);
        assert_eq!(digits(10), 2);
        assert_eq!(digits(100), 3);
    }

    /// Column Measure
    /// Verifies that shared widths come from the widest name and the longest `end`.
    #[test]
    fn test_columns_measure() {
        let fleet = [snap("a", 0, 10, ""), snap("bb", 0, 100, "")];
        let cols = Columns::measure(&fleet);

        assert_eq!(
            cols,
            Columns {
                name: 2,
                step: 3,
                percent: 3
            }
        );
        assert_eq!(cols.chunk(), 10);
        assert_eq!(cols.min_width(), 7);
    }

    /// Name Alignment
    /// Verifies that names are right-aligned to the widest name on every row.
    #[test]
    fn test_name_column_alignment() {
        let fleet = [snap("A", 1, 2, ""), snap("Longname", 1, 2, "")];

        for bar in &fleet {
            let line = plain(&compose_line(bar, &fleet, 80).unwrap());
            let name_col = &line[..8];
            assert_eq!(name_col.trim_start(), bar.name());
            assert_eq!(name_col.len(), 8);
            assert_eq!(&line[8..9], " ");
        }
    }

    /// Template Tiers
    /// Verifies that each width band selects the matching template.
    #[test]
    fn test_template_tiers() {
        let bar = snap("job", 5, 10, "note");
        let fleet = [bar.clone()];
        // name 3 + 5 => margin = width - 8; chunk = 2*2 + 4 = 8.
        let at = |width| plain(&compose_line(&bar, &fleet, width).unwrap());

        assert_eq!(at(8), "job  50%\n");
        assert_eq!(at(15), "job  50%\n");
        assert_eq!(at(16), "job  50% (05/10)\n");
        assert_eq!(at(26), "job  50% (05/10)\n");
        assert_eq!(at(27), "job ━━━━━       50% (05/10)\n");
        assert_eq!(at(36), "job ━━━━━       50% (05/10)\n");
        assert_eq!(at(37), "job ━━━━━━━━━━            50% (05/10)\n");
        assert_eq!(at(80), "job ━━━━━━━━━━            50% (05/10) note\n");

        let columns = Columns {
            name: 3,
            step: 2,
            percent: 3,
        };
        assert_eq!(Template::select(0, columns), Template::Percent);
        assert_eq!(Template::select(29, columns), Template::Full);
    }

    /// Width Bound
    /// Verifies that no template ever prints wider than the terminal, including bars
    /// whose position or percentage overshoots its range.
    #[test]
    fn test_lines_never_exceed_width() {
        let fleets = [
            vec![snap("worker", 37, 250, "copying a rather long file name into place")],
            vec![snap("j", 10, 9, "over"), snap("k", 0, 9, "")],
            vec![snap("big", 1500, 10, "way over"), snap("small", 3, 10, "")],
        ];

        for fleet in &fleets {
            let columns = Columns::measure(fleet);
            for width in columns.min_width()..120 {
                for bar in fleet {
                    let line = plain(&compose_line(bar, fleet, width).unwrap());
                    assert!(
                        line.trim_end_matches('\n').width() <= width,
                        "width {width}: {line:?}"
                    );
                }
            }
        }
    }

    /// Overshoot Alignment
    /// Verifies that a bar past its end widens the shared columns for every row.
    #[test]
    fn test_overshoot_widens_columns() {
        let fleet = [snap("j", 10, 9, ""), snap("k", 0, 9, "")];
        let columns = Columns::measure(&fleet);
        assert_eq!(columns.step, 2);

        let rows: Vec<_> = fleet
            .iter()
            .map(|bar| plain(&compose_line(bar, &fleet, 23).unwrap()))
            .collect();
        assert_eq!(rows[0], "j 111% (10/09)\n");
        assert_eq!(rows[1], "k   0% (00/09)\n");

        let big = snap("big", 1500, 10, "");
        let columns = Columns::measure([&big]);
        assert_eq!(columns.percent, 5);
        assert_eq!(columns.min_width(), 10);
        assert_eq!(plain(&compose_line(&big, &[], 10).unwrap()), "big 15000%\n");
    }

    /// Too Small
    /// Verifies that a terminal narrower than `name pct%` is reported with both widths.
    #[test]
    fn test_terminal_too_small() {
        let bar = snap("job", 0, 10, "");
        let err = compose_line(&bar, &[bar.clone()], 7).unwrap_err();

        assert!(matches!(
            err,
            RenderError::TerminalTooSmall {
                width: 7,
                required: 8
            }
        ));
    }

    /// Comment Truncation
    /// Verifies that a long comment is cut so that the fragment fills the space exactly.
    #[test]
    fn test_comment_truncation() {
        assert_eq!(fit_comment("short", 10), "short");
        assert_eq!(fit_comment("exactly10!", 10), "exactly10!");
        assert_eq!(fit_comment("a much longer comment", 10), "a much ...");
        assert_eq!(fit_comment("a much longer comment", 10).len(), 10);
        assert_eq!(fit_comment("abcdef", 2), "..");
        assert_eq!(fit_comment("abcdef", 0), "");
        assert_eq!(fit_comment("two\nlines\r\ttab", 20), "two lines  tab");

        let bar = snap("job", 1, 10, "x".repeat(100).as_str());
        let line = plain(&compose_line(&bar, &[bar.clone()], 60).unwrap());
        let line = line.trim_end_matches('\n');
        assert_eq!(line.width(), 60);
        assert!(line.ends_with("x..."));
    }

    /// Single Row Comment
    /// Verifies that line breaks in a comment are flattened so the bar keeps one row.
    #[test]
    fn test_comment_control_chars() {
        let bar = snap("job", 1, 10, "first\nsecond\r\x1b");
        let line = plain(&compose_line(&bar, &[bar.clone()], 80).unwrap());

        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with("first second  \n"));
    }

    /// Status Colors
    /// Verifies that fragments are colored by status.
    #[test]
    fn test_status_colors() {
        let config = Config::default();
        let mut bar = snap("job", 10, 10, "");
        assert_eq!(bar.status(), Status::Completed);

        let line = compose_line(&bar, &[bar.clone()], 80).unwrap();
        assert!(line.contains(&format!("\x1b[38;5;{}m", config.color.text.completed)));
        assert!(line.contains(&format!("\x1b[38;5;{}m", config.color.bar.completed)));

        bar = snap("job", 3, 10, "");
        let line = compose_line(&bar, &[bar.clone()], 80).unwrap();
        assert!(line.contains(&format!("\x1b[38;5;{}m", config.color.text.default)));
    }

    /// Overshoot Glyphs
    /// Verifies that overshooting `now` still renders a full bar.
    #[test]
    fn test_overshoot_renders() {
        let bar = snap("job", 15, 10, "");
        let line = plain(&compose_line(&bar, &[bar.clone()], 80).unwrap());
        assert!(line.contains("━━━━━━━━━━━━━━━━━━━━ 150% (15/10)"));
    }
}
