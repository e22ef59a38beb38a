//! Error types for bar construction and the refresh driver.
//!
//! Rendering never fails: a bad width degrades to the minimum, an undefined
//! ETA renders a sentinel. Errors only surface where a caller can act on them.

use compact_str::CompactString;
use thiserror::Error;

/// Errors reported by `live_progress`.
#[derive(Debug, Error)]
pub enum Error {
    /// A bar was requested with a total of zero.
    #[error("bar total must be greater than zero")]
    ZeroTotal,

    /// A glyph does not fit the column budget of its role.
    #[error("invalid {role} glyph {glyph:?}: width {width} is outside {min}..={max}")]
    InvalidGlyph {
        /// Which part of the glyph set was rejected.
        role: &'static str,
        /// The offending glyph text.
        glyph: CompactString,
        /// Its measured terminal width.
        width: usize,
        /// Smallest accepted width for this role.
        min: usize,
        /// Largest accepted width for this role.
        max: usize,
    },

    /// An iterator without an exact, non-zero length was attached to a registry.
    #[error("iterator length is unknown or zero")]
    UnknownLength,

    /// The refresh driver was started on an output that is not a terminal.
    #[error("output is not a terminal")]
    NotATerminal,

    /// Terminal I/O failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results carrying [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
