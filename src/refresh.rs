//! The background redraw loop.
//!
//! A [`Refresher`] owns one thread that wakes every
//! [`Config::refresh_interval`], renders the registry and rewrites the live
//! area of the terminal in place. Permanent output goes through a [`Bypass`]
//! writer, which erases the live area, prints complete lines above it and
//! lets the next tick redraw the frame underneath.
//!
//! # Locking
//!
//! Two locks are involved: the registry's and the screen's (which guards the
//! terminal and the size of the live area). They are always taken in that
//! order. Bypass writes only need the screen.
//!
//! # Lifecycle
//!
//! [`Refresher::stop`] wakes the thread and joins it, so a render in flight
//! completes before the final frame is written. Dropping a running refresher
//! stops it without clearing.

use std::{
    io::{self, Write},
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{RecvTimeoutError, Sender};
use crossterm::{
    cursor::{Hide, MoveToColumn, MoveUp, Show},
    queue,
    terminal::{Clear, ClearType},
};
use parking_lot::Mutex;

use crate::{
    config::Config,
    error::{Error, Result},
    registry::Registry,
    terminal::Terminal,
    width::text_width,
};

/// Terminal rows occupied by `frame` once long lines wrap.
fn physical_rows(frame: &str, columns: usize) -> usize {
    if frame.is_empty() {
        return 0;
    }
    let columns = columns.max(1);
    frame
        .split('\n')
        .map(|line| text_width(line).div_ceil(columns).max(1))
        .sum()
}

/// The terminal plus what is currently drawn on it.
struct Screen {
    terminal: Box<dyn Terminal>,
    /// Live frames are drawn; otherwise only bypass output is written.
    live: bool,
    /// Rows of the last frame. The cursor sits at the end of its last line.
    rows: usize,
    /// Bypass bytes not yet terminated by a newline.
    pending: Vec<u8>,
    cursor_hidden: bool,
    fallback_columns: usize,
}

impl Screen {
    fn columns(&self) -> usize {
        self.terminal.columns().unwrap_or(self.fallback_columns)
    }

    fn erase(&mut self) -> io::Result<()> {
        if self.rows == 0 {
            return Ok(());
        }
        queue!(self.terminal, MoveToColumn(0))?;
        if self.rows > 1 {
            let up = u16::try_from(self.rows - 1).unwrap_or(u16::MAX);
            queue!(self.terminal, MoveUp(up))?;
        }
        queue!(self.terminal, Clear(ClearType::FromCursorDown))?;
        self.rows = 0;
        Ok(())
    }

    fn draw(&mut self, frame: &str, columns: usize) -> io::Result<()> {
        self.erase()?;
        self.terminal.write_all(frame.as_bytes())?;
        self.rows = physical_rows(frame, columns);
        self.terminal.flush()
    }

    fn write_permanent(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.live {
            self.erase()?;
        }
        self.terminal.write_all(bytes)?;
        self.terminal.flush()
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        if self.cursor_hidden {
            queue!(self.terminal, Show)?;
            self.terminal.flush()?;
            self.cursor_hidden = false;
        }
        Ok(())
    }

    /// Writes a pending partial bypass line, terminating it when a frame
    /// will follow.
    fn flush_pending(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut pending = std::mem::take(&mut self.pending);
        if self.live {
            pending.push(b'\n');
        }
        self.write_permanent(&pending)
    }
}

/// Draws one frame now.
fn redraw(registry: &Registry, screen: &Mutex<Screen>) -> io::Result<()> {
    let columns = screen.lock().columns();
    registry.render_frame_with(columns, |frame| {
        let mut screen = screen.lock();
        if screen.live {
            screen.draw(frame, columns)
        } else {
            Ok(())
        }
    })
}

/// Drives live redraws of a [`Registry`] on a terminal.
pub struct Refresher {
    registry: Registry,
    screen: Arc<Mutex<Screen>>,
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
    stopped: bool,
}

impl Refresher {
    /// Starts redrawing `registry` on `terminal`.
    ///
    /// On an output that is not a terminal no frames are drawn, but
    /// [`Bypass`] writes still go through, unless
    /// [`Config::require_terminal`] asks for an error instead.
    ///
    /// # Errors
    ///
    /// * [`Error::NotATerminal`] when required and the output is no terminal.
    /// * [`Error::Io`] when hiding the cursor or spawning the thread fails.
    pub fn start(
        registry: Registry,
        terminal: impl Terminal + 'static,
        config: &Config,
    ) -> Result<Self> {
        let live = terminal.is_terminal();
        if !live {
            if config.require_terminal {
                return Err(Error::NotATerminal);
            }
            tracing::info!(
                target: "live_progress",
                "output is not a terminal, live display disabled; bypass writes still printed"
            );
        }

        let mut screen = Screen {
            terminal: Box::new(terminal),
            live,
            rows: 0,
            pending: Vec::new(),
            cursor_hidden: false,
            fallback_columns: config.fallback_columns,
        };
        if live && config.hide_cursor {
            queue!(screen.terminal, Hide)?;
            screen.terminal.flush()?;
            screen.cursor_hidden = true;
        }
        let screen = Arc::new(Mutex::new(screen));

        let (stop, worker) = if live {
            let (tx, rx) = crossbeam_channel::bounded::<()>(1);
            let interval = config.refresh_interval;
            let screen_for_errors = screen.clone();
            let worker = {
                let registry = registry.clone();
                let screen = screen.clone();
                let spawned = thread::Builder::new()
                    .name("live-progress".to_owned())
                    .spawn(move || run(&registry, &screen, &rx, interval));
                match spawned {
                    Ok(worker) => worker,
                    Err(err) => {
                        if let Err(show) = screen_for_errors.lock().show_cursor() {
                            tracing::warn!(target: "live_progress", "restoring cursor failed: {show}");
                        }
                        return Err(err.into());
                    }
                }
            };
            (Some(tx), Some(worker))
        } else {
            (None, None)
        };

        tracing::info!(
            target: "live_progress",
            live,
            interval_ms = u64::try_from(config.refresh_interval.as_millis()).unwrap_or(u64::MAX),
            "refresher started"
        );

        Ok(Self {
            registry,
            screen,
            stop,
            worker,
            stopped: false,
        })
    }

    /// The registry being displayed.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Whether live frames are being drawn.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.screen.lock().live
    }

    /// A writer for permanent output that must not be overwritten by the next
    /// redraw. Writes are line buffered: nothing appears until a newline.
    #[must_use]
    pub fn bypass(&self) -> Bypass {
        Bypass {
            screen: self.screen.clone(),
        }
    }

    /// Redraws immediately instead of waiting for the next tick.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when the terminal write fails.
    pub fn redraw(&self) -> Result<()> {
        Ok(redraw(&self.registry, &self.screen)?)
    }

    /// Stops the loop, waiting for an in-flight render to complete.
    ///
    /// With `clear`, the live area is erased; otherwise the final frame stays
    /// on screen followed by a newline. The cursor is restored and the
    /// registry emptied either way.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when writing the final output fails.
    pub fn stop(mut self, clear: bool) -> Result<()> {
        self.finish(clear)
    }

    fn finish(&mut self, clear: bool) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;

        drop(self.stop.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!(target: "live_progress", "refresh thread panicked");
            }
        }

        let live = {
            let mut screen = self.screen.lock();
            screen.flush_pending()?;
            screen.live
        };
        if live {
            if clear {
                self.screen.lock().erase()?;
            } else {
                redraw(&self.registry, &self.screen)?;
            }
            let mut screen = self.screen.lock();
            if screen.rows > 0 {
                screen.terminal.write_all(b"\n")?;
                screen.rows = 0;
            }
            screen.show_cursor()?;
            screen.live = false;
        }
        self.screen.lock().terminal.flush()?;

        self.registry.clear();
        tracing::info!(target: "live_progress", clear, "refresher stopped");
        Ok(())
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        if let Err(err) = self.finish(false) {
            tracing::warn!(target: "live_progress", "stopping refresher on drop failed: {err}");
        }
    }
}

fn run(
    registry: &Registry,
    screen: &Mutex<Screen>,
    stop: &crossbeam_channel::Receiver<()>,
    interval: Duration,
) {
    loop {
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                if let Err(err) = redraw(registry, screen) {
                    tracing::warn!(target: "live_progress", "redraw failed: {err}");
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Line-buffered writer that prints above the live area.
///
/// Cloneable and usable from any thread; each complete line lands on screen
/// in one piece. After the refresher stops, writes pass straight through.
#[derive(Clone)]
pub struct Bypass {
    screen: Arc<Mutex<Screen>>,
}

impl Write for Bypass {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut screen = self.screen.lock();
        screen.pending.extend_from_slice(buf);
        if let Some(end) = screen.pending.iter().rposition(|&b| b == b'\n') {
            let lines: Vec<u8> = screen.pending.drain(..=end).collect();
            screen.write_permanent(&lines)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.screen.lock().terminal.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write as _,
        thread,
        time::{Duration, Instant},
    };

    use super::{Refresher, Screen, physical_rows};
    use crate::{
        builder::BarBuilder, config::Config, error::Error, registry::Registry,
        terminal::testing::MemoryTerminal,
    };

    const HIDE: &str = "\x1b[?25l";
    const SHOW: &str = "\x1b[?25h";
    /// Back to column one, up one row, clear to the end of the screen.
    const ERASE_TWO_ROWS: &str = "\x1b[1G\x1b[1A\x1b[J";

    fn manual() -> Config {
        Config {
            refresh_interval: Duration::from_secs(3600),
            ..Config::default()
        }
    }

    #[test]
    fn test_physical_rows() {
        assert_eq!(physical_rows("", 80), 0);
        assert_eq!(physical_rows("abc", 80), 1);
        assert_eq!(physical_rows("a\n\nb", 80), 3);
        assert_eq!(physical_rows(&"x".repeat(10), 10), 1);
        assert_eq!(physical_rows(&"x".repeat(25), 10), 3);
        assert_eq!(physical_rows("\x1b[1mab\x1b[0m", 1), 2);
    }

    /// Cursor Restore
    /// Showing the cursor is written once, and only if it was hidden.
    #[test]
    fn test_show_cursor_only_when_hidden() {
        let term = MemoryTerminal::tty(40);
        let mut screen = Screen {
            terminal: Box::new(term.clone()),
            live: true,
            rows: 0,
            pending: Vec::new(),
            cursor_hidden: false,
            fallback_columns: 80,
        };
        screen.show_cursor().unwrap();
        assert_eq!(term.contents(), "");

        screen.cursor_hidden = true;
        screen.show_cursor().unwrap();
        screen.show_cursor().unwrap();
        assert_eq!(term.contents(), SHOW);
        assert!(!screen.cursor_hidden);
    }

    #[test]
    fn test_require_terminal_refuses_pipe() {
        let config = Config {
            require_terminal: true,
            ..Config::default()
        };
        let result = Refresher::start(Registry::new(), MemoryTerminal::pipe(), &config);
        assert!(matches!(result, Err(Error::NotATerminal)));
    }

    #[test]
    fn test_pipe_degrades_to_bypass_only() {
        let term = MemoryTerminal::pipe();
        let registry = Registry::new();
        registry.add_custom_line(|| "never shown".to_owned());
        let refresher = Refresher::start(registry.clone(), term.clone(), &manual()).unwrap();
        assert!(!refresher.is_live());

        refresher.redraw().unwrap();
        let mut bypass = refresher.bypass();
        writeln!(bypass, "log line").unwrap();
        write!(bypass, "partial").unwrap();
        assert_eq!(term.contents(), "log line\n");

        refresher.stop(true).unwrap();
        assert_eq!(term.contents(), "log line\npartial");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_redraw_replaces_previous_frame() {
        let term = MemoryTerminal::tty(40);
        let registry = Registry::new();
        registry.add_custom_line(|| "first".to_owned());
        registry.add_custom_line(|| "second".to_owned());
        let refresher = Refresher::start(registry, term.clone(), &manual()).unwrap();
        assert!(refresher.is_live());

        refresher.redraw().unwrap();
        assert_eq!(term.contents(), format!("{HIDE}first\nsecond"));

        refresher.redraw().unwrap();
        assert_eq!(
            term.contents(),
            format!("{HIDE}first\nsecond{ERASE_TWO_ROWS}first\nsecond")
        );
        refresher.stop(true).unwrap();
    }

    #[test]
    fn test_hide_cursor_is_optional() {
        let term = MemoryTerminal::tty(40);
        let config = Config {
            hide_cursor: false,
            ..manual()
        };
        let registry = Registry::new();
        registry.add_custom_line(|| "x".to_owned());
        let refresher = Refresher::start(registry, term.clone(), &config).unwrap();
        refresher.stop(false).unwrap();
        assert_eq!(term.contents(), "x\n");
    }

    #[test]
    fn test_bypass_prints_above_frame() {
        let term = MemoryTerminal::tty(40);
        let registry = Registry::new();
        registry.add_custom_line(|| "live 1".to_owned());
        registry.add_custom_line(|| "live 2".to_owned());
        let refresher = Refresher::start(registry, term.clone(), &manual()).unwrap();
        refresher.redraw().unwrap();

        let mut bypass = refresher.bypass();
        write!(bypass, "hello\nwor").unwrap();
        assert!(term.contents().ends_with(&format!("{ERASE_TWO_ROWS}hello\n")));

        write!(bypass, "ld\n").unwrap();
        // The frame is already gone; nothing left to erase.
        assert!(term.contents().ends_with("hello\nworld\n"));

        refresher.redraw().unwrap();
        assert!(term.contents().ends_with("world\nlive 1\nlive 2"));
        refresher.stop(false).unwrap();
    }

    #[test]
    fn test_stop_keeps_final_frame() {
        let term = MemoryTerminal::tty(40);
        let registry = Registry::new();
        let bar = registry
            .add_bar(BarBuilder::new(2).width(12).append(|b| format!(" {}/{}", b.current(), b.total())))
            .unwrap();
        let refresher = Refresher::start(registry.clone(), term.clone(), &manual()).unwrap();
        refresher.redraw().unwrap();
        bar.set(2);

        refresher.stop(false).unwrap();
        assert!(term.contents().ends_with(&format!("[==========] 2/2\n{SHOW}")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_stop_with_clear_erases() {
        let term = MemoryTerminal::tty(40);
        let registry = Registry::new();
        registry.add_custom_line(|| "a".to_owned());
        registry.add_custom_line(|| "b".to_owned());
        let refresher = Refresher::start(registry, term.clone(), &manual()).unwrap();
        refresher.redraw().unwrap();

        refresher.stop(true).unwrap();
        assert_eq!(
            term.contents(),
            format!("{HIDE}a\nb{ERASE_TWO_ROWS}{SHOW}")
        );
    }

    #[test]
    fn test_stop_flushes_partial_bypass_line() {
        let term = MemoryTerminal::tty(40);
        let registry = Registry::new();
        registry.add_custom_line(|| "frame".to_owned());
        let refresher = Refresher::start(registry, term.clone(), &manual()).unwrap();
        let mut bypass = refresher.bypass();
        write!(bypass, "tail").unwrap();

        refresher.stop(false).unwrap();
        assert_eq!(term.contents(), format!("{HIDE}tail\nframe\n{SHOW}"));

        // Bypass outlives the refresher and writes straight through.
        writeln!(bypass, "after").unwrap();
        assert!(term.contents().ends_with(&format!("{SHOW}after\n")));
    }

    #[test]
    fn test_drop_stops_thread() {
        let term = MemoryTerminal::tty(40);
        let registry = Registry::new();
        registry.add_custom_line(|| "bye".to_owned());
        drop(Refresher::start(registry.clone(), term.clone(), &manual()).unwrap());
        assert!(term.contents().ends_with(&format!("bye\n{SHOW}")));
        assert!(registry.is_empty());
    }

    /// The background thread redraws while producers update.
    #[test]
    fn test_ticks_redraw_in_background() {
        let term = MemoryTerminal::tty(60);
        let config = Config {
            refresh_interval: Duration::from_millis(5),
            ..Config::default()
        };
        let registry = Registry::new();
        let bar = registry.add_bar(BarBuilder::new(100).append_percent()).unwrap();
        let refresher = Refresher::start(registry, term.clone(), &config).unwrap();

        let producer = {
            let bar = bar.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    bar.increment();
                }
            })
        };
        producer.join().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !term.contents().contains("100%") && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(term.contents().contains("100%"));
        refresher.stop(false).unwrap();
    }
}
