//! Iterator adapters that advance a bar per item.
//!
//! [`ProgressIteratorExt`] is implemented for every [`Iterator`]:
//!
//! * [`progress_with`](ProgressIteratorExt::progress_with) drives an existing bar.
//! * [`progress_in`](ProgressIteratorExt::progress_in) creates a bar sized from
//!   [`Iterator::size_hint`] and registers it.
//!
//! ```
//! use live_progress::{ProgressIteratorExt, Registry};
//!
//! let registry = Registry::new();
//! let iter = vec![1, 2, 3].into_iter().progress_in(&registry)?;
//! let bar = iter.bar().clone();
//! assert_eq!(iter.sum::<i32>(), 6);
//! assert_eq!(bar.current(), 3);
//! # Ok::<(), live_progress::Error>(())
//! ```

use crate::{
    bar::Bar,
    builder::BarBuilder,
    error::{Error, Result},
    registry::Registry,
};

/// Wraps an iterator and increments a bar on every yielded item.
#[derive(Debug)]
pub struct BarIter<I> {
    iter: I,
    bar: Bar,
}

impl<I> BarIter<I> {
    /// Wraps `iter`, reporting to `bar`.
    ///
    /// Usually built through [`ProgressIteratorExt`].
    pub const fn new(iter: I, bar: Bar) -> Self {
        Self { iter, bar }
    }

    /// The bar being advanced.
    pub const fn bar(&self) -> &Bar {
        &self.bar
    }
}

impl<I: Iterator> Iterator for BarIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.iter.next();
        if item.is_some() {
            self.bar.increment();
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<I: ExactSizeIterator> ExactSizeIterator for BarIter<I> {}

/// Extension trait attaching a progress bar to any iterator.
pub trait ProgressIteratorExt: Iterator + Sized {
    /// Advances `bar` once per item.
    fn progress_with(self, bar: Bar) -> BarIter<Self> {
        BarIter::new(self, bar)
    }

    /// Creates a default bar sized to the iterator's exact length, adds it to
    /// `registry` and advances it once per item.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownLength`] when the length is not known exactly, or is
    /// zero; no bar is registered then.
    fn progress_in(self, registry: &Registry) -> Result<BarIter<Self>> {
        let total = match self.size_hint() {
            (lower, Some(upper)) if lower == upper && lower > 0 => lower as u64,
            _ => return Err(Error::UnknownLength),
        };
        let bar = registry.add_bar(BarBuilder::new(total))?;
        Ok(BarIter::new(self, bar))
    }
}

impl<I: Iterator> ProgressIteratorExt for I {}

#[cfg(test)]
mod tests {
    use super::ProgressIteratorExt as _;
    use crate::{builder::BarBuilder, error::Error, registry::Registry};

    /// Iterator Integration
    /// The total is inferred from the exact length and the bar is registered.
    #[test]
    fn test_progress_in_registers_sized_bar() {
        let registry = Registry::new();
        let iter = [1, 2, 3, 4, 5].iter().progress_in(&registry).unwrap();
        let bar = iter.bar().clone();
        assert_eq!(registry.len(), 1);
        assert_eq!(bar.total(), 5);

        assert_eq!(iter.count(), 5);
        assert_eq!(bar.current(), 5);
    }

    #[test]
    fn test_progress_in_rejects_unknown_length() {
        let registry = Registry::new();
        let filtered = (0..10).filter(|n| n % 2 == 0);
        assert!(matches!(
            filtered.progress_in(&registry),
            Err(Error::UnknownLength)
        ));
        assert!(matches!(
            std::iter::empty::<u8>().progress_in(&registry),
            Err(Error::UnknownLength)
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_progress_with_existing_bar() {
        let bar = BarBuilder::new(100).build().unwrap();
        let mut iter = (0..10).progress_with(bar.clone());
        assert_eq!(iter.len(), 10);
        iter.next();
        iter.next();
        assert_eq!(bar.current(), 2);
        iter.for_each(drop);
        assert_eq!(bar.current(), 10);
    }
}
