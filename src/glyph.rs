//! Bar glyph generation and the half-up rounding shared by every numeric site.
//!
//! Rounding is done in integer arithmetic so that percentages and glyph splits are
//! identical on every platform.

/// Integer division of `num / den` rounded half-up.
///
/// `den` must be non-zero.
pub(crate) const fn div_round(num: u128, den: u128) -> u128 {
    (num * 2 + den) / (den * 2)
}

/// Completion percentage of `now` over `end`, rounded half-up.
///
/// A zero-length range (`end == 0`) counts as complete and yields `100`.
/// Values of `now` beyond `end` yield percentages above `100`.
#[must_use]
pub fn percent(now: u64, end: u64) -> u64 {
    if end == 0 {
        return 100;
    }
    let pct = div_round(u128::from(now) * 100, u128::from(end));
    u64::try_from(pct).unwrap_or(u64::MAX)
}

/// Number of filled glyphs out of `length` for the given percentage.
///
/// Each glyph stands for `round(100 / length)` percent (at least one). The result is
/// clamped to `length`, so overshooting percentages fill the bar instead of
/// producing a negative blank count.
#[must_use]
pub fn filled_count(length: usize, percent: u64) -> usize {
    if length == 0 {
        return 0;
    }
    let per_glyph = div_round(100, length as u128).max(1);
    let filled = div_round(u128::from(percent), per_glyph);
    usize::try_from(filled).map_or(length, |f| f.min(length))
}

/// Builds a bar of exactly `length` glyphs: `filled` repeated for the completed share,
/// then `blank` for the rest.
///
/// # Parameters
///
/// * `length`: Number of glyphs in the bar.
/// * `percent`: Completion percentage. Values above 100 fill the bar.
/// * `filled`: Glyph for the completed share.
/// * `blank`: Glyph for the remainder.
///
/// # Examples
///
/// ```
/// use fleet_progress::glyph::generate_bar;
///
/// assert_eq!(generate_bar(10, 50, '#', '.'), "#####.....");
/// assert_eq!(generate_bar(4, 250, '#', '.'), "####");
/// ```
#[must_use]
pub fn generate_bar(length: usize, percent: u64, filled: char, blank: char) -> String {
    let filled_len = filled_count(length, percent);

    let mut bar = String::with_capacity(length * filled.len_utf8().max(blank.len_utf8()));
    bar.extend(std::iter::repeat_n(filled, filled_len));
    bar.extend(std::iter::repeat_n(blank, length - filled_len));
    bar
}
