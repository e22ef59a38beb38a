//! Fluent construction of [`Bar`] instances.
//!
//! Every option has a default, so `BarBuilder::new(total).build()` gives an
//! auto-width ASCII bar that aligns with its neighbours. Validation happens
//! once, in [`BarBuilder::build`]: a zero total is rejected and no handle is
//! produced.
//!
//! # Key Features
//!
//! * **Shared State:** An existing `Arc<AtomicU64>` can back the bar's
//!   position, so a counter owned elsewhere (a byte counter in a download
//!   worker, say) drives the display directly.
//! * **Time Travel:** The start time can be set explicitly, which is what the
//!   elapsed and remaining decorators measure from.

use std::sync::{Arc, atomic::AtomicU64};

use parking_lot::RwLock;
use web_time::Instant;

use crate::{
    bar::{Bar, Layout},
    counter::Counter,
    decorator::{self, Decorator, Decorators, Side, Stylize},
    error::Result,
    glyph::GlyphSet,
    width::{Padding, WidthMode},
};

/// Configuration for a new [`Bar`].
pub struct BarBuilder {
    total: u64,
    width: WidthMode,
    glyphs: GlyphSet,
    stylize: Option<Stylize>,
    align: bool,
    padding: Padding,
    start: Option<Instant>,
    atomic_current: Option<Arc<AtomicU64>>,
    decorators: Decorators,
}

impl BarBuilder {
    /// Starts a bar that completes at `total`.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total,
            width: WidthMode::Auto,
            glyphs: GlyphSet::default(),
            stylize: None,
            align: true,
            padding: Padding::EXTERNAL,
            start: None,
            atomic_current: None,
            decorators: Decorators::default(),
        }
    }

    /// Fixed glyph run width in columns; `0` means automatic.
    #[must_use]
    pub const fn width(mut self, columns: usize) -> Self {
        self.width = WidthMode::from_columns(columns);
        self
    }

    /// Sets the width mode directly.
    #[must_use]
    pub const fn width_mode(mut self, mode: WidthMode) -> Self {
        self.width = mode;
        self
    }

    /// Uses `glyphs` for the bar skeleton.
    #[must_use]
    pub fn glyphs(mut self, glyphs: GlyphSet) -> Self {
        self.glyphs = glyphs;
        self
    }

    /// `[===>---]`, the default.
    #[must_use]
    pub fn ascii_style(self) -> Self {
        self.glyphs(GlyphSet::ascii())
    }

    /// `◂⎯⎯→  ▸`
    #[must_use]
    pub fn utf8_arrows_style(self) -> Self {
        self.glyphs(GlyphSet::utf8_arrows())
    }

    /// `│━━╸───│`
    #[must_use]
    pub fn unicode_light_style(self) -> Self {
        self.glyphs(GlyphSet::unicode_light())
    }

    /// `███▌░░░` without end caps.
    #[must_use]
    pub fn plain_style(self) -> Self {
        self.glyphs(GlyphSet::plain())
    }

    /// Styles the glyph run (not the decorators) with `stylize`.
    #[must_use]
    pub fn stylize(mut self, stylize: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.stylize = Some(Arc::new(stylize));
        self
    }

    /// Whether an auto-width bar shares its run width with other aligned
    /// auto-width bars. Defaults to `true`.
    #[must_use]
    pub const fn align(mut self, align: bool) -> Self {
        self.align = align;
        self
    }

    /// Where alignment padding goes. Defaults to [`Padding::EXTERNAL`].
    #[must_use]
    pub const fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Shorthand for [`Padding::INTERNAL`].
    #[must_use]
    pub const fn internal_padding(self) -> Self {
        self.padding(Padding::INTERNAL)
    }

    /// Sets the start time explicitly.
    #[must_use]
    pub const fn with_start_time(mut self, start: Instant) -> Self {
        self.start = Some(start);
        self
    }

    /// Backs the position with a pre-existing atomic.
    #[must_use]
    pub fn with_atomic_current(mut self, current: Arc<AtomicU64>) -> Self {
        self.atomic_current = Some(current);
        self
    }

    /// Adds a decorator before the glyph run.
    #[must_use]
    pub fn prepend(self, decorator: impl Fn(&Bar) -> String + Send + Sync + 'static) -> Self {
        self.decorator(Side::Prepend, Arc::new(decorator))
    }

    /// Adds a decorator after the glyph run.
    #[must_use]
    pub fn append(self, decorator: impl Fn(&Bar) -> String + Send + Sync + 'static) -> Self {
        self.decorator(Side::Append, Arc::new(decorator))
    }

    /// Adds a shared decorator on `side`.
    #[must_use]
    pub fn decorator(mut self, side: Side, decorator: Decorator) -> Self {
        self.decorators.push(side, decorator);
        self
    }

    /// `" 42% "` before the run.
    #[must_use]
    pub fn prepend_percent(self) -> Self {
        self.decorator(Side::Prepend, decorator::percent(Side::Prepend))
    }

    /// `"  42%"` after the run.
    #[must_use]
    pub fn append_percent(self) -> Self {
        self.decorator(Side::Append, decorator::percent(Side::Append))
    }

    /// Elapsed time before the run.
    #[must_use]
    pub fn prepend_elapsed(self) -> Self {
        self.decorator(Side::Prepend, decorator::elapsed(Side::Prepend))
    }

    /// Elapsed time after the run.
    #[must_use]
    pub fn append_elapsed(self) -> Self {
        self.decorator(Side::Append, decorator::elapsed(Side::Append))
    }

    /// Remaining time before the run.
    #[must_use]
    pub fn prepend_remaining(self) -> Self {
        self.decorator(Side::Prepend, decorator::remaining(Side::Prepend))
    }

    /// Remaining time after the run.
    #[must_use]
    pub fn append_remaining(self) -> Self {
        self.decorator(Side::Append, decorator::remaining(Side::Append))
    }

    /// Validates the configuration and creates the bar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroTotal`](crate::Error::ZeroTotal) when the total is zero.
    pub fn build(self) -> Result<Bar> {
        let current = self
            .atomic_current
            .unwrap_or_else(|| Arc::new(AtomicU64::new(0)));
        let counter = Counter::with_shared(current, self.total).inspect_err(|err| {
            tracing::debug!(target: "live_progress", "bar rejected: {err}");
        })?;

        Ok(Bar {
            counter,
            start: self.start.unwrap_or_else(Instant::now),
            layout: Layout {
                width: self.width,
                align: self.align,
                padding: self.padding,
                stylize: self.stylize,
            },
            style: Arc::new(RwLock::new(self.glyphs)),
            decorators: Arc::new(RwLock::new(self.decorators)),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, atomic::AtomicU64};

    use super::BarBuilder;
    use crate::{
        error::Error,
        glyph::GlyphSet,
        width::{Padding, WidthMode},
    };

    #[test]
    fn test_defaults() {
        let bar = BarBuilder::new(10).build().unwrap();
        assert_eq!(bar.total(), 10);
        assert_eq!(bar.current(), 0);
        assert_eq!(bar.width_mode(), WidthMode::Auto);
        assert!(bar.is_aligned());
        assert_eq!(bar.padding(), Padding::EXTERNAL);
        assert_eq!(bar.glyphs(), GlyphSet::ascii());
    }

    #[test]
    fn test_zero_total_produces_no_handle() {
        assert!(matches!(
            BarBuilder::new(0).build(),
            Err(Error::ZeroTotal)
        ));
    }

    #[test]
    fn test_options_are_applied() {
        let bar = BarBuilder::new(3)
            .width(40)
            .utf8_arrows_style()
            .align(false)
            .internal_padding()
            .build()
            .unwrap();
        assert_eq!(bar.width_mode(), WidthMode::Fixed(40));
        assert_eq!(bar.glyphs(), GlyphSet::utf8_arrows());
        assert!(!bar.is_aligned());
        assert_eq!(bar.padding(), Padding::INTERNAL);

        let auto = BarBuilder::new(3).width(40).width(0).build().unwrap();
        assert!(auto.width_mode().is_auto());
    }

    /// Two bars backed by one atomic see each other's updates.
    #[test]
    fn test_shared_atomics() {
        let shared = Arc::new(AtomicU64::new(0));
        let a = BarBuilder::new(100)
            .with_atomic_current(shared.clone())
            .build()
            .unwrap();
        let b = BarBuilder::new(50)
            .with_atomic_current(shared)
            .build()
            .unwrap();

        a.add(10);
        assert_eq!(b.current(), 10);
        assert!((b.ratio() - 0.2).abs() < f64::EPSILON);
    }
}
