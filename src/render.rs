//! Glyph run rendering.
//!
//! Turns a progress ratio and a resolved width into the bar's glyph string.
//! Completion is `round(p * W)` interior columns; the head glyph is dropped
//! rather than clipped when it does not fit, and at full completion only
//! fill glyphs are drawn. Whatever the glyph widths, the produced run is
//! exactly as wide as requested: columns that no whole empty glyph can cover
//! are padded with spaces.

use crate::{decorator::Stylize, glyph::GlyphSet};

/// Renders the interior of a bar, between the end caps, `width` columns wide.
///
/// `ratio` is clamped to `[0, 1]`; `NaN` counts as no progress.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn interior(glyphs: &GlyphSet, width: usize, ratio: f64) -> String {
    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
    let completion = ((ratio * width as f64).round() as usize).min(width);

    let fill = glyphs.fill();
    let head = glyphs.head();
    let empty = glyphs.empty();

    let mut out = String::with_capacity(width * fill.byte_len().max(empty.byte_len()));
    let mut used = 0;

    if ratio >= 1.0 {
        let count = completion / fill.width();
        push_repeated(&mut out, fill.as_str(), count);
        used += count * fill.width();
    } else if completion >= head.width() {
        let count = (completion - head.width()) / fill.width();
        push_repeated(&mut out, fill.as_str(), count);
        out.push_str(head.as_str());
        used += count * fill.width() + head.width();
    }

    let remaining = width.saturating_sub(used);
    push_repeated(&mut out, empty.as_str(), remaining / empty.width());
    push_repeated(&mut out, " ", remaining % empty.width());

    out
}

/// Renders the full glyph run (end caps included) `run_width` columns wide
/// and wraps it with `stylize`, if given.
///
/// The end caps are drawn even when `run_width` cannot hold them; callers
/// resolve widths through [`crate::width`] which never goes below
/// [`crate::width::MINIMUM_WIDTH`].
#[must_use]
pub fn glyph_run(
    glyphs: &GlyphSet,
    run_width: usize,
    ratio: f64,
    stylize: Option<&Stylize>,
) -> String {
    let interior_width = run_width.saturating_sub(glyphs.enclosure_width());

    let mut run = String::new();
    if let Some(left) = glyphs.left_end() {
        run.push_str(left.as_str());
    }
    run.push_str(&interior(glyphs, interior_width, ratio));
    if let Some(right) = glyphs.right_end() {
        run.push_str(right.as_str());
    }

    match stylize {
        Some(stylize) => stylize(&run),
        None => run,
    }
}

fn push_repeated(out: &mut String, s: &str, count: usize) {
    for _ in 0..count {
        out.push_str(s);
    }
}
