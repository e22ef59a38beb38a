//! Renderable lines: progress bars and free-form custom lines.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::bar::Bar;

/// A line whose text comes from a generator called on every render.
#[derive(Clone)]
pub struct CustomLine {
    generator: Arc<dyn Fn() -> String + Send + Sync>,
}

impl fmt::Debug for CustomLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomLine").finish_non_exhaustive()
    }
}

impl CustomLine {
    /// Wraps `generator`.
    pub fn new(generator: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// Produces the current text.
    #[must_use]
    pub fn render(&self) -> String {
        (self.generator)()
    }

    /// Whether both handles point to the same line.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.generator, &other.generator)
    }
}

/// Anything the registry can display.
#[derive(Clone, Debug)]
pub enum DisplayItem {
    /// A progress bar.
    Bar(Bar),
    /// A custom text line.
    Line(CustomLine),
}

impl DisplayItem {
    /// Renders the item on its own for a terminal `columns` wide.
    #[must_use]
    pub fn render(&self, columns: usize) -> String {
        match self {
            Self::Bar(bar) => bar.render(columns),
            Self::Line(line) => line.render(),
        }
    }

    /// Whether both items are the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bar(a), Self::Bar(b)) => a.ptr_eq(b),
            (Self::Line(a), Self::Line(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// The bar, if this item is one.
    #[must_use]
    pub const fn as_bar(&self) -> Option<&Bar> {
        match self {
            Self::Bar(bar) => Some(bar),
            Self::Line(_) => None,
        }
    }

    /// The bar if it takes part in the alignment pass.
    pub(crate) fn aligned_bar(&self) -> Option<&Bar> {
        self.as_bar().filter(|bar| bar.wants_alignment())
    }
}

impl From<Bar> for DisplayItem {
    fn from(bar: Bar) -> Self {
        Self::Bar(bar)
    }
}

impl From<&Bar> for DisplayItem {
    fn from(bar: &Bar) -> Self {
        Self::Bar(bar.clone())
    }
}

impl From<CustomLine> for DisplayItem {
    fn from(line: CustomLine) -> Self {
        Self::Line(line)
    }
}

impl From<&CustomLine> for DisplayItem {
    fn from(line: &CustomLine) -> Self {
        Self::Line(line.clone())
    }
}

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// A braille spinner, advanced one frame per call to [`Spinner::next_frame`].
///
/// Shareable across threads; typically driven by a custom line so it moves
/// once per redraw.
#[derive(Debug, Default)]
pub struct Spinner {
    state: AtomicUsize,
}

impl Spinner {
    /// Creates a spinner on its first frame.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicUsize::new(0),
        }
    }

    /// Advances and returns the new frame.
    pub fn next_frame(&self) -> char {
        let next = self.state.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        SPINNER_FRAMES[next % SPINNER_FRAMES.len()]
    }

    /// Returns the current frame without advancing.
    #[must_use]
    pub fn current(&self) -> char {
        SPINNER_FRAMES[self.state.load(Ordering::Relaxed) % SPINNER_FRAMES.len()]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use super::{CustomLine, DisplayItem, Spinner};
    use crate::builder::BarBuilder;

    #[test]
    fn test_custom_line_calls_generator_each_render() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let line = CustomLine::new(move || format!("tick {}", seen.fetch_add(1, Ordering::Relaxed)));
        assert_eq!(line.render(), "tick 0");
        assert_eq!(DisplayItem::from(&line).render(80), "tick 1");
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_item_identity() {
        let bar = BarBuilder::new(1).build().unwrap();
        let line = CustomLine::new(String::new);
        let a = DisplayItem::from(&bar);
        assert!(a.ptr_eq(&DisplayItem::from(bar.clone())));
        assert!(!a.ptr_eq(&DisplayItem::from(&line)));
        assert!(!DisplayItem::from(&line).ptr_eq(&CustomLine::new(String::new).into()));
        assert!(a.as_bar().is_some());
    }

    #[test]
    fn test_aligned_bar_filter() {
        let auto = DisplayItem::from(BarBuilder::new(1).build().unwrap());
        let fixed = DisplayItem::from(BarBuilder::new(1).width(20).build().unwrap());
        let opted_out = DisplayItem::from(BarBuilder::new(1).align(false).build().unwrap());
        assert!(auto.aligned_bar().is_some());
        assert!(fixed.aligned_bar().is_none());
        assert!(opted_out.aligned_bar().is_none());
        assert!(DisplayItem::from(CustomLine::new(String::new)).aligned_bar().is_none());
    }

    #[test]
    fn test_spinner_cycles() {
        let spinner = Spinner::new();
        assert_eq!(spinner.current(), '⠋');
        assert_eq!(spinner.next_frame(), '⠙');
        for _ in 0..10 {
            spinner.next_frame();
        }
        assert_eq!(spinner.current(), '⠙');
    }
}
