//! The progress bar handle.
//!
//! A [`Bar`] combines a lock-free [`Counter`] (the hot path, touched by
//! producers) with rendering configuration (the cold path, read by the
//! redraw). Style and decorators sit behind [`RwLock`](parking_lot::RwLock)s
//! so they can be changed while the bar is displayed.
//!
//! Rendering comes in two shapes:
//!
//! * [`Bar::render`] resolves its own width and draws the whole line.
//! * [`Bar::decorations`] followed by [`Bar::render_aligned`] is the two-pass
//!   form the registry uses to give several auto-width bars one shared run
//!   width.

use std::{
    fmt,
    sync::{Arc, atomic::AtomicU64},
    time::Duration,
};

use parking_lot::RwLock;
use web_time::Instant;

use crate::{
    counter::Counter,
    decorator::{Decorator, Decorators, Fragment, Side, Stylize},
    glyph::GlyphSet,
    render,
    width::{self, Alignment, Padding, WidthMode},
};

/// A thread-safe, cloneable handle to one progress bar.
///
/// Clones share the same counter, style and decorators.
#[derive(Clone)]
pub struct Bar {
    pub(crate) counter: Counter,
    pub(crate) start: Instant,
    pub(crate) layout: Layout,
    pub(crate) style: Arc<RwLock<GlyphSet>>,
    pub(crate) decorators: Arc<RwLock<Decorators>>,
}

/// Immutable layout settings chosen at creation.
#[derive(Clone)]
pub(crate) struct Layout {
    pub(crate) width: WidthMode,
    pub(crate) align: bool,
    pub(crate) padding: Padding,
    pub(crate) stylize: Option<Stylize>,
}

impl fmt::Debug for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bar")
            .field("current", &self.current())
            .field("total", &self.total())
            .field("width", &self.layout.width)
            .field("align", &self.layout.align)
            .finish_non_exhaustive()
    }
}

impl Bar {
    // ========================================================================
    // Counter (hot path)
    // ========================================================================

    /// Adds `delta` to the position.
    pub fn add(&self, delta: u64) {
        self.counter.add(delta);
    }

    /// Adds one to the position.
    pub fn increment(&self) {
        self.counter.increment();
    }

    /// Sets the absolute position.
    pub fn set(&self, value: u64) {
        self.counter.set(value);
    }

    /// Sets the position and returns the previous one.
    pub fn swap(&self, value: u64) -> u64 {
        self.counter.swap(value)
    }

    /// Sets the position to `new` if it still equals `expected`.
    pub fn compare_and_swap(&self, expected: u64, new: u64) -> bool {
        self.counter.compare_and_swap(expected, new)
    }

    /// Current position.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.counter.get()
    }

    /// Total fixed at creation.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.counter.total()
    }

    /// `current / total`, not clamped.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.counter.ratio()
    }

    /// The underlying counter.
    #[must_use]
    pub const fn counter(&self) -> &Counter {
        &self.counter
    }

    /// Shared handle to the atomic position, for code that only counts.
    #[must_use]
    pub fn atomic_current(&self) -> Arc<AtomicU64> {
        self.counter.atomic()
    }

    /// Time since the bar was created (or its configured start time).
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Copies the observable state at this instant.
    #[must_use]
    pub fn snapshot(&self) -> BarSnapshot {
        BarSnapshot {
            current: self.current(),
            total: self.total(),
            elapsed: self.elapsed(),
        }
    }

    // ========================================================================
    // Configuration (cold path)
    // ========================================================================

    /// Appends a decorator before the glyph run.
    pub fn add_prepend(&self, decorator: impl Fn(&Bar) -> String + Send + Sync + 'static) {
        self.add_decorator(Side::Prepend, Arc::new(decorator));
    }

    /// Appends a decorator after the glyph run.
    pub fn add_append(&self, decorator: impl Fn(&Bar) -> String + Send + Sync + 'static) {
        self.add_decorator(Side::Append, Arc::new(decorator));
    }

    /// Appends an already shared decorator on `side`.
    pub fn add_decorator(&self, side: Side, decorator: Decorator) {
        self.decorators.write().push(side, decorator);
    }

    /// Replaces the glyph set. Takes effect on the next render.
    pub fn set_glyphs(&self, glyphs: GlyphSet) {
        *self.style.write() = glyphs;
    }

    /// The current glyph set.
    #[must_use]
    pub fn glyphs(&self) -> GlyphSet {
        self.style.read().clone()
    }

    /// Width mode chosen at creation.
    #[must_use]
    pub const fn width_mode(&self) -> WidthMode {
        self.layout.width
    }

    /// Whether this bar takes part in cross-bar width alignment.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.layout.align
    }

    /// Padding placement used when aligned.
    #[must_use]
    pub const fn padding(&self) -> Padding {
        self.layout.padding
    }

    /// Whether both handles point to the same bar.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.decorators, &other.decorators)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Whether the registry should include this bar in the alignment pass.
    pub(crate) fn wants_alignment(&self) -> bool {
        self.layout.align && self.layout.width.is_auto()
    }

    /// First pass: renders the prepend and append fragments only.
    #[must_use]
    pub fn decorations(&self) -> (Fragment, Fragment) {
        // Decorators run outside the lock so one may safely inspect the bar.
        let decorators = self.decorators.read().clone();
        (
            decorators.render(Side::Prepend, self),
            decorators.render(Side::Append, self),
        )
    }

    /// Renders the full line for a terminal `columns` wide.
    #[must_use]
    pub fn render(&self, columns: usize) -> String {
        let (prefix, suffix) = self.decorations();
        let run_width = width::resolve(self.layout.width, columns, prefix.width, suffix.width);
        self.assemble(&prefix.text, run_width, &suffix.text)
    }

    /// Second pass: renders the line with previously computed fragments,
    /// padded to the shared `alignment`.
    #[must_use]
    pub fn render_aligned(
        &self,
        prefix: &Fragment,
        suffix: &Fragment,
        alignment: &Alignment,
    ) -> String {
        let (prefix, suffix) = self.layout.padding.apply(prefix, suffix, alignment);
        self.assemble(&prefix, alignment.run, &suffix)
    }

    fn assemble(&self, prefix: &str, run_width: usize, suffix: &str) -> String {
        let run = render::glyph_run(
            &self.style.read(),
            run_width,
            self.ratio(),
            self.layout.stylize.as_ref(),
        );

        let mut line = String::with_capacity(prefix.len() + run.len() + suffix.len());
        line.push_str(prefix);
        line.push_str(&run);
        line.push_str(suffix);
        line
    }
}

/// Plain-data copy of a bar's observable state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "rkyv", rkyv(derive(Debug, Eq, PartialEq)))]
pub struct BarSnapshot {
    /// Position at snapshot time.
    pub current: u64,
    /// Total of the bar.
    pub total: u64,
    /// Time since the bar started.
    pub elapsed: Duration,
}

impl BarSnapshot {
    /// `current / total`, not clamped. Zero for a zero total.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }

    /// Whole percentage as shown by the percent decorator.
    #[must_use]
    pub fn percent(&self) -> u64 {
        crate::decorator::percent_value(self.ratio())
    }

    /// Remaining time: `(1 - ratio) * elapsed / ratio`.
    ///
    /// `None` while no progress has been made. Zero once the total is reached.
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        let ratio = self.ratio();
        if ratio <= 0.0 {
            return None;
        }
        if ratio >= 1.0 {
            return Some(Duration::ZERO);
        }
        let secs = (1.0 - ratio) * self.elapsed.as_secs_f64() / ratio;
        Duration::try_from_secs_f64(secs).ok()
    }

    /// Average items per second since start.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.current as f64 / secs
        } else {
            0.0
        }
    }
}
