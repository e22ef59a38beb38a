//! Display-wide settings.
//!
//! Everything here has a default; construct with struct update syntax:
//!
//! ```
//! use std::time::Duration;
//! use live_progress::Config;
//!
//! let config = Config {
//!     refresh_interval: Duration::from_millis(50),
//!     ..Config::default()
//! };
//! assert!(config.align_auto_bars);
//! ```

use std::time::Duration;

/// Settings shared by a registry and its refresh driver.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Time between two redraws. Lower values flicker and cost CPU.
    pub refresh_interval: Duration,
    /// Gives every aligned auto-width bar the same glyph run width.
    pub align_auto_bars: bool,
    /// Hides the cursor while the display is live.
    pub hide_cursor: bool,
    /// Column count assumed when the terminal cannot be measured.
    pub fallback_columns: usize,
    /// Refuses to start on an output that is not a terminal instead of
    /// degrading to bypass-only output.
    pub require_terminal: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(100),
            align_auto_bars: true,
            hide_cursor: true,
            fallback_columns: 80,
            require_terminal: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Config;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.refresh_interval, Duration::from_millis(100));
        assert!(config.align_auto_bars);
        assert!(config.hide_cursor);
        assert_eq!(config.fallback_columns, 80);
        assert!(!config.require_terminal);
    }
}
