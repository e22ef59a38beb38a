//! The ordered set of lines that make up a frame.
//!
//! The [`Registry`] is the central collection for multi-line displays: bars
//! and custom lines in insertion order, plus one optional *main* item that is
//! always rendered last.
//!
//! # Synchronization Strategy
//!
//! A single [`Mutex`](parking_lot::Mutex) guards both the collection and the
//! act of rendering it. Producers never take it: bar updates are atomic
//! stores. Structural changes (add, remove, clear) and frame production
//! serialize on it, so a removal lands entirely before or entirely after a
//! frame and no frame ever shows half of a change.
//!
//! # Frames
//!
//! When alignment is enabled and at least two aligned auto-width bars are
//! registered (the main item counts), a frame is rendered in two passes:
//! first every aligned bar's decorators, then every line, aligned bars using
//! the shared layout from [`Alignment::compute`]. Otherwise each item
//! renders itself in one pass.

use std::{fmt, sync::Arc};

use parking_lot::Mutex;

use crate::{
    bar::Bar,
    builder::BarBuilder,
    config::Config,
    decorator::Fragment,
    error::Result,
    line::{CustomLine, DisplayItem},
    width::Alignment,
};

#[derive(Default)]
struct Items {
    lines: Vec<DisplayItem>,
    main: Option<DisplayItem>,
}

impl Items {
    fn contains(&self, item: &DisplayItem) -> bool {
        self.lines.iter().any(|line| line.ptr_eq(item))
            || self.main.as_ref().is_some_and(|main| main.ptr_eq(item))
    }

    /// Every item in display order.
    fn ordered(&self) -> impl Iterator<Item = &DisplayItem> {
        self.lines.iter().chain(self.main.as_ref())
    }
}

/// A thread-safe, shared-clonable collection of display items.
///
/// Cloning is cheap and every clone refers to the same collection.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Mutex<Items>>,
    align_auto_bars: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.inner.lock();
        f.debug_struct("Registry")
            .field("lines", &items.lines.len())
            .field("main", &items.main.is_some())
            .field("align_auto_bars", &self.align_auto_bars)
            .finish()
    }
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use live_progress::Registry;
    ///
    /// let registry = Registry::new();
    /// assert!(registry.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Creates an empty registry following `config`.
    #[must_use]
    pub fn with_config(config: &Config) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Items::default())),
            align_auto_bars: config.align_auto_bars,
        }
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Appends an item. Returns `false`, leaving the registry unchanged, if
    /// that instance is already registered (as a line or as the main item).
    pub fn add(&self, item: impl Into<DisplayItem>) -> bool {
        let item = item.into();
        let mut items = self.inner.lock();
        if items.contains(&item) {
            return false;
        }
        items.lines.push(item);
        true
    }

    /// Makes `item` the main item, replacing any previous one. If the item was
    /// registered as a regular line, it moves.
    pub fn set_main(&self, item: impl Into<DisplayItem>) {
        let item = item.into();
        let mut items = self.inner.lock();
        items.lines.retain(|line| !line.ptr_eq(&item));
        items.main = Some(item);
    }

    /// Removes an item wherever it is. Removing an item that is not
    /// registered is a no-op; returns whether something was removed.
    pub fn remove(&self, item: impl Into<DisplayItem>) -> bool {
        let item = item.into();
        let mut items = self.inner.lock();
        if items.main.as_ref().is_some_and(|main| main.ptr_eq(&item)) {
            items.main = None;
            return true;
        }
        match items.lines.iter().position(|line| line.ptr_eq(&item)) {
            Some(index) => {
                items.lines.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops every item and the main slot.
    pub fn clear(&self) {
        let mut items = self.inner.lock();
        items.lines.clear();
        items.main = None;
    }

    /// Builds a bar, registers it and returns its handle.
    ///
    /// # Errors
    ///
    /// Propagates [`BarBuilder::build`] failures; nothing is registered then.
    pub fn add_bar(&self, builder: BarBuilder) -> Result<Bar> {
        let bar = builder.build()?;
        self.add(&bar);
        Ok(bar)
    }

    /// Builds a bar and makes it the main item.
    ///
    /// # Errors
    ///
    /// Propagates [`BarBuilder::build`] failures; the main item is untouched then.
    pub fn set_main_bar(&self, builder: BarBuilder) -> Result<Bar> {
        let bar = builder.build()?;
        self.set_main(&bar);
        Ok(bar)
    }

    /// Registers a custom line and returns its handle.
    pub fn add_custom_line(
        &self,
        generator: impl Fn() -> String + Send + Sync + 'static,
    ) -> CustomLine {
        let line = CustomLine::new(generator);
        self.add(&line);
        line
    }

    /// Makes a new custom line the main item.
    pub fn set_main_line(
        &self,
        generator: impl Fn() -> String + Send + Sync + 'static,
    ) -> CustomLine {
        let line = CustomLine::new(generator);
        self.set_main(&line);
        line
    }

    /// Handles to the regular items, in display order.
    #[must_use]
    pub fn items(&self) -> Vec<DisplayItem> {
        self.inner.lock().lines.clone()
    }

    /// Handle to the main item, if set.
    #[must_use]
    pub fn main(&self) -> Option<DisplayItem> {
        self.inner.lock().main.clone()
    }

    /// Number of items, the main item included.
    #[must_use]
    pub fn len(&self) -> usize {
        let items = self.inner.lock();
        items.lines.len() + usize::from(items.main.is_some())
    }

    /// Whether there is nothing to display.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// Renders every item for a terminal `columns` wide, main item last.
    #[must_use]
    pub fn render_lines(&self, columns: usize) -> Vec<String> {
        let items = self.inner.lock();
        self.lines_locked(&items, columns)
    }

    /// Renders the frame as one newline-joined string, without a trailing
    /// newline.
    #[must_use]
    pub fn render_frame(&self, columns: usize) -> String {
        self.render_frame_with(columns, str::to_owned)
    }

    /// Renders the frame and hands it to `consume` before releasing the lock,
    /// so whatever `consume` does (typically writing to the terminal) cannot
    /// interleave with a structural change.
    pub fn render_frame_with<R>(&self, columns: usize, consume: impl FnOnce(&str) -> R) -> R {
        let items = self.inner.lock();
        let frame = self.lines_locked(&items, columns).join("\n");
        tracing::trace!(
            target: "live_progress",
            lines = items.lines.len() + usize::from(items.main.is_some()),
            columns,
            "frame rendered"
        );
        consume(&frame)
    }

    fn lines_locked(&self, items: &Items, columns: usize) -> Vec<String> {
        let aligned = if self.align_auto_bars {
            items.ordered().filter_map(DisplayItem::aligned_bar).count()
        } else {
            0
        };

        if aligned < 2 {
            return items.ordered().map(|item| item.render(columns)).collect();
        }

        // Pass 1: decorators of the aligned bars only.
        let fragments: Vec<Option<(Fragment, Fragment)>> = items
            .ordered()
            .map(|item| item.aligned_bar().map(Bar::decorations))
            .collect();
        let alignment = Alignment::compute(
            columns,
            fragments
                .iter()
                .flatten()
                .map(|(prefix, suffix)| (prefix.width, suffix.width)),
        );

        // Pass 2: every line, aligned bars at the shared run width.
        items
            .ordered()
            .zip(&fragments)
            .map(|(item, fragments)| match (item.aligned_bar(), fragments) {
                (Some(bar), Some((prefix, suffix))) => {
                    bar.render_aligned(prefix, suffix, &alignment)
                }
                _ => item.render(columns),
            })
            .collect()
    }
}
