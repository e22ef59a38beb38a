//! Column budgeting for glyph runs.
//!
//! The glyph run is whatever the terminal line has left once the decorator
//! fragments are placed. Widths are always display columns, measured with
//! `unicode-width` after skipping terminal escape sequences, never bytes.
//!
//! # Alignment policy
//!
//! When several auto-width bars opt into alignment, they share one glyph run
//! width: the terminal width minus the *widest* prefix and the *widest*
//! suffix among them. Every bar is then padded up to those widest fragments,
//! so all glyph runs start and end on the same columns. A bar whose fragments
//! are narrower than the widest ones never gets a longer run; it gets spaces.

use unicode_width::UnicodeWidthChar;

use crate::decorator::Fragment;

/// Smallest glyph run ever rendered, end caps included.
///
/// Any narrower request is raised to this width, even if the line then
/// overflows the terminal.
pub const MINIMUM_WIDTH: usize = 12;

/// How a bar picks the width of its glyph run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WidthMode {
    /// Fill whatever the terminal line leaves after the decorators.
    #[default]
    Auto,
    /// Always this many columns (floored to [`MINIMUM_WIDTH`]).
    Fixed(usize),
}

impl WidthMode {
    /// Maps the conventional `0 = automatic` width to a mode.
    #[must_use]
    pub const fn from_columns(columns: usize) -> Self {
        if columns == 0 {
            Self::Auto
        } else {
            Self::Fixed(columns)
        }
    }

    /// Whether the width follows the terminal.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// Where alignment padding goes relative to one decorator group.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PadSide {
    /// Away from the glyph run: left of the prefix, right of the suffix.
    #[default]
    Outer,
    /// Against the glyph run: right of the prefix, left of the suffix.
    Inner,
}

/// Padding placement for the prefix and suffix groups of an aligned bar.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Padding {
    /// Placement for the prepend fragment.
    pub prefix: PadSide,
    /// Placement for the append fragment.
    pub suffix: PadSide,
}

impl Padding {
    /// Pads on the outside, which centers the glyph runs as a block.
    pub const EXTERNAL: Self = Self {
        prefix: PadSide::Outer,
        suffix: PadSide::Outer,
    };

    /// Pads against the glyph run, keeping decorators flush with the line
    /// edges.
    pub const INTERNAL: Self = Self {
        prefix: PadSide::Inner,
        suffix: PadSide::Inner,
    };

    /// Returns the prefix and suffix padded to the widths of `alignment`.
    #[must_use]
    pub fn apply(
        self,
        prefix: &Fragment,
        suffix: &Fragment,
        alignment: &Alignment,
    ) -> (String, String) {
        let prefix_pad = " ".repeat(alignment.prefix.saturating_sub(prefix.width));
        let suffix_pad = " ".repeat(alignment.suffix.saturating_sub(suffix.width));

        let prefix = match self.prefix {
            PadSide::Outer => prefix_pad + &prefix.text,
            PadSide::Inner => prefix.text.clone() + &prefix_pad,
        };
        let suffix = match self.suffix {
            PadSide::Outer => suffix.text.clone() + &suffix_pad,
            PadSide::Inner => suffix_pad + &suffix.text,
        };
        (prefix, suffix)
    }
}

/// The shared layout of aligned bars for one frame.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Alignment {
    /// Widest prefix among the aligned bars.
    pub prefix: usize,
    /// Widest suffix among the aligned bars.
    pub suffix: usize,
    /// Glyph run width shared by every aligned bar.
    pub run: usize,
}

impl Alignment {
    /// Computes the governing layout from each bar's `(prefix, suffix)` widths.
    #[must_use]
    pub fn compute(columns: usize, widths: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let (prefix, suffix) = widths
            .into_iter()
            .fold((0, 0), |(p, s), (bp, bs)| (p.max(bp), s.max(bs)));
        Self {
            prefix,
            suffix,
            run: resolve(WidthMode::Auto, columns, prefix, suffix),
        }
    }
}

/// Resolves the glyph run width of a single bar.
///
/// Fixed widths are floored to [`MINIMUM_WIDTH`]. Auto widths take what the
/// line leaves after the fragments, falling back to [`MINIMUM_WIDTH`] when
/// that is too narrow.
#[must_use]
pub fn resolve(mode: WidthMode, columns: usize, prefix: usize, suffix: usize) -> usize {
    match mode {
        WidthMode::Fixed(width) => width.max(MINIMUM_WIDTH),
        WidthMode::Auto => {
            let available = columns.saturating_sub(prefix + suffix);
            if available < MINIMUM_WIDTH {
                tracing::debug!(
                    target: "live_progress",
                    columns, prefix, suffix,
                    "auto width below minimum, falling back to {MINIMUM_WIDTH}"
                );
                MINIMUM_WIDTH
            } else {
                available
            }
        }
    }
}

/// Display width of `text` in terminal columns.
///
/// Escape sequences of any form (CSI, OSC, charset selection and the rest)
/// are stripped first, so styled fragments measure like plain ones.
#[must_use]
pub fn text_width(text: &str) -> usize {
    strip_ansi_escapes::strip_str(text)
        .chars()
        .map(|c| c.width().unwrap_or(0))
        .sum()
}
