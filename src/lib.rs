//! # `live_progress`
//!
//! Live-updating, multi-line terminal progress bars fed by lock-free counters.
//!
//! `live_progress` keeps any number of progress bars and free-form lines on
//! screen, redrawn in place on a timer while worker threads push updates. It
//! is designed to be:
//!
//! * **Concurrent**: [`Bar`] handles are cheap to clone ([`Arc`](std::sync::Arc)-based).
//!   Updating a position is a single atomic operation; the redraw never blocks
//!   a producer.
//! * **Width-aware**: Widths are measured in terminal columns with
//!   `unicode-width`, so CJK text, emoji and styled (ANSI) fragments line up.
//! * **Aligned**: Auto-width bars share one glyph run width, so their runs
//!   start and end on the same columns whatever their decorators.
//!
//! ## Modules
//!
//! * [`builder`]: Fluent construction of [`Bar`] instances.
//! * [`bar`]: The bar handle, its rendering and [`BarSnapshot`].
//! * [`registry`]: The ordered set of displayed lines and frame rendering.
//! * [`refresh`]: The background redraw loop and the [`Bypass`] writer.
//! * [`decorator`]: Text fragments around the glyph run, built-ins included.
//! * [`glyph`] / [`render`]: Glyph sets and the glyph run renderer.
//! * [`width`]: Column budgeting and the alignment policy.
//! * [`io`] / [`iter`]: Adapters that advance a bar from readers, writers and iterators.
//!
//! ## Example
//!
//! ```no_run
//! use std::io::Write;
//! use live_progress::{BarBuilder, Config, Refresher, Registry, StdoutTerminal};
//!
//! let config = Config::default();
//! let registry = Registry::with_config(&config);
//! let bar = registry.add_bar(BarBuilder::new(1000).prepend(|_| "download ".to_owned()).append_percent())?;
//! let refresher = Refresher::start(registry, StdoutTerminal::new(), &config)?;
//!
//! for _ in 0..1000 {
//!     bar.increment();
//! }
//! writeln!(refresher.bypass(), "done")?;
//! refresher.stop(false)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bar;
pub mod builder;
pub mod config;
pub mod counter;
pub mod decorator;
pub mod error;
pub mod glyph;
pub mod io;
pub mod iter;
pub mod line;
pub mod refresh;
pub mod registry;
pub mod render;
pub mod terminal;
pub mod width;

pub use bar::{Bar, BarSnapshot};
pub use builder::BarBuilder;
pub use config::Config;
pub use counter::Counter;
pub use decorator::{Decorator, Side, Stylize};
pub use error::{Error, Result};
pub use glyph::{Glyph, GlyphSet};
pub use iter::{BarIter, ProgressIteratorExt};
pub use line::{CustomLine, DisplayItem, Spinner};
pub use refresh::{Bypass, Refresher};
pub use registry::Registry;
pub use terminal::{StderrTerminal, StdoutTerminal, Terminal};
pub use width::{MINIMUM_WIDTH, PadSide, Padding, WidthMode};
