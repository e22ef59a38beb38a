//! Text fragments shown before and after a bar's glyph run.
//!
//! A [`Decorator`] is a pure function of the bar's observable state. Prepend
//! decorators are concatenated left to right before the glyph run, append
//! decorators after it, in registration order, on every render. Decorators run
//! inside the registry's frame lock: they must not block and must not touch
//! the registry.
//!
//! Built-ins cover percent, elapsed time and remaining time, each in a prepend
//! and an append flavour that differ only by which side carries the separating
//! space.

use std::{sync::Arc, time::Duration};

use crate::{bar::Bar, width::text_width};

/// A text fragment producer, consulted on every render.
pub type Decorator = Arc<dyn Fn(&Bar) -> String + Send + Sync>;

/// Wraps text in terminal styling. The crate never emits colors itself.
pub type Stylize = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Shown by [`remaining`] while no progress has been made.
pub const REMAINING_UNKNOWN: &str = "∞";

/// Which side of the glyph run a built-in decorator is placed on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    /// Before the glyph run; the fragment ends with a space.
    Prepend,
    /// After the glyph run; the fragment starts with a space.
    Append,
}

/// Rendered decorator output with its measured terminal width.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Fragment {
    /// Concatenated text, styling included.
    pub text: String,
    /// Display columns, escape sequences excluded.
    pub width: usize,
}

/// The ordered prepend and append decorators of one bar.
#[derive(Clone, Default)]
pub struct Decorators {
    prepend: Vec<Decorator>,
    append: Vec<Decorator>,
}

impl Decorators {
    /// Adds a decorator on the given side, after the existing ones.
    pub fn push(&mut self, side: Side, decorator: Decorator) {
        match side {
            Side::Prepend => self.prepend.push(decorator),
            Side::Append => self.append.push(decorator),
        }
    }

    /// Number of decorators on `side`.
    #[must_use]
    pub fn len(&self, side: Side) -> usize {
        match side {
            Side::Prepend => self.prepend.len(),
            Side::Append => self.append.len(),
        }
    }

    /// Runs the decorators of `side` in order and joins their output.
    #[must_use]
    pub fn render(&self, side: Side, bar: &Bar) -> Fragment {
        let decorators = match side {
            Side::Prepend => &self.prepend,
            Side::Append => &self.append,
        };

        let mut text = String::new();
        for decorator in decorators {
            text.push_str(&decorator(bar));
        }
        let width = text_width(&text);
        Fragment { text, width }
    }
}

/// Wraps a decorator so its output goes through `stylize`.
#[must_use]
pub fn styled(decorator: Decorator, stylize: Stylize) -> Decorator {
    Arc::new(move |bar: &Bar| stylize(&decorator(bar)))
}

/// Completion as a whole percentage. 100 is only shown when the position is
/// exactly the total; overshoot past it rounds as usual (150 stays 150).
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]
#[must_use]
pub fn percent_value(ratio: f64) -> u64 {
    if ratio.is_nan() || ratio <= 0.0 {
        return 0;
    }
    let rounded = (ratio * 100.0).round() as u64;
    if rounded == 100 && ratio != 1.0 { 99 } else { rounded }
}

/// `" 42%"` / `"42% "`, right-aligned on three digits.
#[must_use]
pub fn percent(side: Side) -> Decorator {
    Arc::new(move |bar: &Bar| {
        let value = percent_value(bar.ratio());
        match side {
            Side::Prepend => format!("{value:3}% "),
            Side::Append => format!(" {value:3}%"),
        }
    })
}

/// Time since the bar was created, rounded to the second.
#[must_use]
pub fn elapsed(side: Side) -> Decorator {
    Arc::new(move |bar: &Bar| {
        let text = format_duration(bar.elapsed());
        match side {
            Side::Prepend => format!("{text} "),
            Side::Append => format!(" {text}"),
        }
    })
}

/// Estimated time left, extrapolated from the average rate so far.
///
/// Renders [`REMAINING_UNKNOWN`] until the first unit of progress.
#[must_use]
pub fn remaining(side: Side) -> Decorator {
    Arc::new(move |bar: &Bar| {
        let text = bar
            .snapshot()
            .eta()
            .map_or_else(|| REMAINING_UNKNOWN.to_owned(), format_duration);
        match side {
            Side::Prepend => format!("{text} "),
            Side::Append => format!(" ~{text}"),
        }
    })
}

/// Formats a duration rounded to the nearest second: `0s`, `42s`, `3m7s`,
/// `1h0m5s`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64().round() as u64;
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
