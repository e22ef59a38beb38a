//! Lock-free progress value owned by a bar.
//!
//! The current position lives in an [`AtomicU64`] so any number of producer
//! threads can push updates without a lock. The total is fixed at construction
//! and validated to be non-zero there, so [`Counter::ratio`] never divides by
//! zero.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::error::{Error, Result};

/// A current/total pair where `current` is updated atomically.
///
/// Cloning is cheap (Arc bump) and the clone observes the same position.
#[derive(Clone, Debug)]
pub struct Counter {
    current: Arc<AtomicU64>,
    total: u64,
}

impl Counter {
    /// Creates a counter starting at zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroTotal`] when `total` is zero.
    pub fn new(total: u64) -> Result<Self> {
        Self::with_shared(Arc::new(AtomicU64::new(0)), total)
    }

    /// Creates a counter on top of an existing atomic, so external code can
    /// drive or observe the same position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroTotal`] when `total` is zero.
    pub fn with_shared(current: Arc<AtomicU64>, total: u64) -> Result<Self> {
        if total == 0 {
            return Err(Error::ZeroTotal);
        }
        Ok(Self { current, total })
    }

    /// Adds `delta` to the current position.
    pub fn add(&self, delta: u64) {
        self.current.fetch_add(delta, Ordering::Relaxed);
    }

    /// Adds one to the current position.
    pub fn increment(&self) {
        self.add(1);
    }

    /// Stores an absolute position.
    pub fn set(&self, value: u64) {
        self.current.store(value, Ordering::Relaxed);
    }

    /// Stores `value` and returns the previous position.
    pub fn swap(&self, value: u64) -> u64 {
        self.current.swap(value, Ordering::Relaxed)
    }

    /// Stores `new` only if the position still equals `expected`.
    ///
    /// Returns `true` when the store happened.
    pub fn compare_and_swap(&self, expected: u64, new: u64) -> bool {
        self.current
            .compare_exchange(expected, new, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    /// Reads the current position.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    /// Returns the fixed total.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Returns `current / total`, unclamped: it exceeds `1.0` when the
    /// position overshoots the total.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.get() as f64 / self.total as f64
    }

    /// Returns a shared reference to the atomic position.
    #[must_use]
    pub fn atomic(&self) -> Arc<AtomicU64> {
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, atomic::AtomicU64},
        thread,
    };

    use super::Counter;
    use crate::error::Error;

    #[test]
    fn test_zero_total_rejected() {
        assert!(matches!(Counter::new(0), Err(Error::ZeroTotal)));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_basic_updates() {
        let c = Counter::new(200).unwrap();
        assert_eq!(c.get(), 0);
        assert_eq!(c.ratio(), 0.0);

        c.add(50);
        c.increment();
        assert_eq!(c.get(), 51);

        c.set(100);
        assert_eq!(c.ratio(), 0.5);

        assert_eq!(c.swap(10), 100);
        assert!(c.compare_and_swap(10, 20));
        assert!(!c.compare_and_swap(10, 30));
        assert_eq!(c.get(), 20);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_overshoot_is_not_clamped() {
        let c = Counter::new(10).unwrap();
        c.set(15);
        assert_eq!(c.ratio(), 1.5);
    }

    /// Many producers, no lost updates.
    #[test]
    fn test_concurrent_adds_are_lossless() {
        let c = Counter::new(1).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = c.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        c.add(1);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(c.get(), 8 * 1000);
    }

    #[test]
    fn test_shared_atomic() {
        let shared = Arc::new(AtomicU64::new(5));
        let a = Counter::with_shared(shared.clone(), 10).unwrap();
        let b = Counter::with_shared(shared, 10).unwrap();
        a.add(2);
        assert_eq!(b.get(), 7);
    }
}
