//! The visual skeleton of a bar: two optional end caps around fill, head and
//! empty glyphs.
//!
//! Widths are measured once, when the [`GlyphSet`] is built, with
//! East-Asian-width rules from `unicode-width`. A glyph is a short string
//! rather than a `char` so that multi-code-point sequences (a base character
//! plus a variation selector, for instance) are accepted as one cell group.

use compact_str::CompactString;
use unicode_width::UnicodeWidthStr;

use crate::error::{Error, Result};

/// One glyph with its precomputed terminal width.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Glyph {
    text: CompactString,
    width: usize,
}

impl Glyph {
    /// Measures `text` and wraps it.
    #[must_use]
    pub fn new(text: impl Into<CompactString>) -> Self {
        let text = text.into();
        let width = UnicodeWidthStr::width(text.as_str());
        Self { text, width }
    }

    /// The glyph text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Terminal columns the glyph occupies.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Encoded length in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.text.len()
    }
}

impl From<char> for Glyph {
    fn from(c: char) -> Self {
        let mut buf = [0u8; 4];
        Self::new(&*c.encode_utf8(&mut buf))
    }
}

impl From<&str> for Glyph {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A validated set of bar glyphs.
///
/// `fill`, `head` and `empty` are mandatory and must be one or two columns
/// wide. The end caps are optional and may be zero to two columns wide.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GlyphSet {
    left_end: Option<Glyph>,
    fill: Glyph,
    head: Glyph,
    empty: Glyph,
    right_end: Option<Glyph>,
}

impl Default for GlyphSet {
    fn default() -> Self {
        Self::ascii()
    }
}

impl GlyphSet {
    /// Builds and validates a glyph set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGlyph`] naming the first glyph whose width is
    /// out of range for its role.
    pub fn new(
        left_end: Option<impl Into<Glyph>>,
        fill: impl Into<Glyph>,
        head: impl Into<Glyph>,
        empty: impl Into<Glyph>,
        right_end: Option<impl Into<Glyph>>,
    ) -> Result<Self> {
        let set = Self {
            left_end: left_end.map(Into::into),
            fill: fill.into(),
            head: head.into(),
            empty: empty.into(),
            right_end: right_end.map(Into::into),
        };
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> Result<()> {
        check("fill", &self.fill, 1)?;
        check("head", &self.head, 1)?;
        check("empty", &self.empty, 1)?;
        if let Some(left) = &self.left_end {
            check("left end", left, 0)?;
        }
        if let Some(right) = &self.right_end {
            check("right end", right, 0)?;
        }
        Ok(())
    }

    /// `[====>----]`
    #[must_use]
    pub fn ascii() -> Self {
        Self::preset(Some('['), '=', '>', '-', Some(']'))
    }

    /// `◂⎯⎯⎯→    ▸`
    #[must_use]
    pub fn utf8_arrows() -> Self {
        Self::preset(Some('◂'), '⎯', '→', ' ', Some('▸'))
    }

    /// `│━━━╸────│`
    #[must_use]
    pub fn unicode_light() -> Self {
        Self::preset(Some('│'), '━', '╸', '─', Some('│'))
    }

    /// `████▌░░░░` without end caps.
    #[must_use]
    pub fn plain() -> Self {
        Self::preset(None, '█', '▌', '░', None)
    }

    fn preset(
        left_end: Option<char>,
        fill: char,
        head: char,
        empty: char,
        right_end: Option<char>,
    ) -> Self {
        Self {
            left_end: left_end.map(Glyph::from),
            fill: fill.into(),
            head: head.into(),
            empty: empty.into(),
            right_end: right_end.map(Glyph::from),
        }
    }

    /// The left end cap, if any.
    #[must_use]
    pub const fn left_end(&self) -> Option<&Glyph> {
        self.left_end.as_ref()
    }

    /// The glyph repeated over the completed portion.
    #[must_use]
    pub const fn fill(&self) -> &Glyph {
        &self.fill
    }

    /// The glyph marking the leading edge of progress.
    #[must_use]
    pub const fn head(&self) -> &Glyph {
        &self.head
    }

    /// The glyph repeated over the remaining portion.
    #[must_use]
    pub const fn empty(&self) -> &Glyph {
        &self.empty
    }

    /// The right end cap, if any.
    #[must_use]
    pub const fn right_end(&self) -> Option<&Glyph> {
        self.right_end.as_ref()
    }

    /// Combined width of both end caps.
    #[must_use]
    pub fn enclosure_width(&self) -> usize {
        self.left_end.as_ref().map_or(0, Glyph::width)
            + self.right_end.as_ref().map_or(0, Glyph::width)
    }
}

fn check(role: &'static str, glyph: &Glyph, min: usize) -> Result<()> {
    const MAX: usize = 2;
    if (min..=MAX).contains(&glyph.width) {
        Ok(())
    } else {
        Err(Error::InvalidGlyph {
            role,
            glyph: glyph.text.clone(),
            width: glyph.width,
            min,
            max: MAX,
        })
    }
}
