//! Per-bar rendering configuration.
//!
//! A [`Config`] is fully resolved: every color and glyph has a value. Partial user
//! settings are expressed as a [`ConfigOverride`] and overlaid onto a base config with
//! [`Config::merged`]; a leaf present in the override replaces the base value, absent
//! leaves keep it.
//!
//! Value domains are enforced by the types: colors are 8-bit ANSI indices (`u8`) and
//! bar glyphs are a single `char`.

use compact_str::CompactString;

use crate::bar::Status;

/// A fully resolved rendering configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Config {
    /// Colors for the bar glyphs and the text fragments.
    pub color: ColorConfig,
    /// Glyphs used to draw the bar.
    pub bar_shape: BarShape,
    /// Banner strings.
    pub string: Strings,
}

/// Color palettes for the two kinds of fragment.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorConfig {
    /// Palette applied to the bar glyphs.
    pub bar: Palette,
    /// Palette applied to name, percentage, step count and comment.
    #[cfg_attr(feature = "serde", serde(rename = "str"))]
    pub text: Palette,
}

/// One 8-bit ANSI color per bar status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    /// Color while the bar is active.
    pub default: u8,
    /// Color once the bar has completed.
    pub completed: u8,
    /// Color once the bar has been aborted.
    pub aborted: u8,
}

/// The filled and blank bar glyphs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarShape {
    /// Glyph for the completed share of the bar.
    pub filled: char,
    /// Glyph for the remaining share of the bar.
    pub blank: char,
}

/// Text printed around the bar block.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Strings {
    /// Printed once above the bars when a session starts.
    pub title: CompactString,
    /// Printed below the bars once every bar has finished.
    pub closing: CompactString,
    /// Printed below the bars when the whole fleet is aborted.
    pub abort: CompactString,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            bar: Palette {
                default: 82,
                completed: 64,
                aborted: 178,
            },
            text: Palette {
                default: 231,
                completed: 247,
                aborted: 214,
            },
        }
    }
}

impl Default for BarShape {
    fn default() -> Self {
        Self {
            filled: '━',
            blank: ' ',
        }
    }
}

impl Default for Strings {
    fn default() -> Self {
        Self {
            title: "PROGRESS:\n".into(),
            closing: "Completed all tasks.  Exiting program.".into(),
            abort: "Aborting the progress bar".into(),
        }
    }
}

impl Palette {
    /// Returns the color for `status`.
    #[must_use]
    pub const fn pick(&self, status: Status) -> u8 {
        match status {
            Status::Active => self.default,
            Status::Completed => self.completed,
            Status::Aborted => self.aborted,
        }
    }
}

impl Config {
    /// Returns a copy of `self` with every leaf set in `overrides` replaced.
    #[must_use]
    pub fn merged(&self, overrides: &ConfigOverride) -> Self {
        let mut out = self.clone();
        out.apply(overrides);
        out
    }

    /// Overlays `overrides` onto `self` in place.
    pub fn apply(&mut self, overrides: &ConfigOverride) {
        if let Some(color) = &overrides.color {
            if let Some(bar) = &color.bar {
                self.color.bar.apply(bar);
            }
            if let Some(text) = &color.text {
                self.color.text.apply(text);
            }
        }
        if let Some(shape) = &overrides.bar_shape {
            set(&mut self.bar_shape.filled, shape.filled);
            set(&mut self.bar_shape.blank, shape.blank);
        }
        if let Some(string) = &overrides.string {
            set(&mut self.string.title, string.title.clone());
            set(&mut self.string.closing, string.closing.clone());
            set(&mut self.string.abort, string.abort.clone());
        }
    }
}

impl Palette {
    fn apply(&mut self, overrides: &PaletteOverride) {
        set(&mut self.default, overrides.default);
        set(&mut self.completed, overrides.completed);
        set(&mut self.aborted, overrides.aborted);
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// A partial [`Config`]: every leaf is optional.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ConfigOverride {
    /// Color overrides.
    pub color: Option<ColorOverride>,
    /// Glyph overrides.
    pub bar_shape: Option<BarShapeOverride>,
    /// Banner overrides.
    pub string: Option<StringsOverride>,
}

/// Partial [`ColorConfig`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColorOverride {
    /// Bar palette overrides.
    pub bar: Option<PaletteOverride>,
    /// Text palette overrides.
    #[cfg_attr(feature = "serde", serde(rename = "str"))]
    pub text: Option<PaletteOverride>,
}

/// Partial [`Palette`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PaletteOverride {
    /// Active color.
    pub default: Option<u8>,
    /// Completed color.
    pub completed: Option<u8>,
    /// Aborted color.
    pub aborted: Option<u8>,
}

/// Partial [`BarShape`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BarShapeOverride {
    /// Filled glyph.
    pub filled: Option<char>,
    /// Blank glyph.
    pub blank: Option<char>,
}

/// Partial [`Strings`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StringsOverride {
    /// Title banner.
    pub title: Option<CompactString>,
    /// Closing banner.
    pub closing: Option<CompactString>,
    /// Abort banner.
    pub abort: Option<CompactString>,
}
