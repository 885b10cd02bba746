//! The output side of the renderer.
//!
//! Frames are composed in memory and handed to a [`Terminal`] in one piece, so a
//! terminal only has to report whether it is interactive, how wide it is, and accept
//! a string.
//!
//! Two implementations ship with the crate:
//!
//! * [`console::Term`]: the real stdout/stderr.
//! * [`BufferTerminal`]: an in-memory terminal with a settable width, for headless
//!   runs and tests.

use std::{
    fmt,
    io,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use parking_lot::Mutex;

/// Hides the cursor.
pub const HIDE_CURSOR: &str = "\x1b[?25l";

/// Shows the cursor.
pub const SHOW_CURSOR: &str = "\x1b[?25h";

/// Clears the entire current line without moving the cursor.
pub const CLEAR_LINE: &str = "\x1b[2K";

/// Moves the cursor up by `rows`.
#[must_use]
pub fn cursor_up(rows: usize) -> String {
    format!("\x1b[{rows}A")
}

/// Moves the cursor down by `rows`.
#[must_use]
pub fn cursor_down(rows: usize) -> String {
    format!("\x1b[{rows}B")
}

/// A destination for rendered frames.
pub trait Terminal: Send {
    /// Whether the output is an interactive terminal.
    fn is_interactive(&self) -> bool;

    /// Current width in columns. Queried once per frame.
    fn width(&self) -> usize;

    /// Writes a complete frame and flushes it.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying stream.
    fn write_frame(&mut self, frame: &str) -> io::Result<()>;
}

impl Terminal for console::Term {
    fn is_interactive(&self) -> bool {
        self.is_term()
    }

    fn width(&self) -> usize {
        usize::from(self.size().1)
    }

    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        self.write_str(frame)?;
        self.flush()
    }
}

/// An in-memory [`Terminal`].
///
/// Clones share the same buffer and width, so a caller can keep one clone to inspect
/// what the registry wrote through another.
///
/// # Examples
///
/// ```
/// use fleet_progress::{Bar, BufferTerminal, Registry};
///
/// let term = BufferTerminal::new(80);
/// let registry = Registry::new(term.clone());
///
/// let mut bar = Bar::new(&registry, "build", 0u64, 4u64).unwrap();
/// bar.inc(1u64).unwrap();
///
/// assert!(console::strip_ansi_codes(&term.contents()).contains("build"));
/// ```
#[derive(Clone)]
pub struct BufferTerminal {
    interactive: bool,
    width: Arc<AtomicUsize>,
    output: Arc<Mutex<String>>,
}

impl fmt::Debug for BufferTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferTerminal")
            .field("interactive", &self.interactive)
            .field("width", &self.width.load(Ordering::Relaxed))
            .field("bytes", &self.output.lock().len())
            .finish()
    }
}

impl BufferTerminal {
    /// Creates an interactive buffer terminal `width` columns wide.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            interactive: true,
            width: Arc::new(AtomicUsize::new(width)),
            output: Arc::new(Mutex::new(String::new())),
        }
    }

    /// Creates a buffer terminal that reports itself as non-interactive, like a pipe.
    #[must_use]
    pub fn non_interactive(width: usize) -> Self {
        Self {
            interactive: false,
            ..Self::new(width)
        }
    }

    /// Changes the reported width, as if the terminal had been resized.
    pub fn set_width(&self, width: usize) {
        self.width.store(width, Ordering::Relaxed);
    }

    /// Returns everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.output.lock().clone()
    }

    /// Returns everything written so far and clears the buffer.
    #[must_use]
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.output.lock())
    }
}

impl Terminal for BufferTerminal {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn width(&self) -> usize {
        self.width.load(Ordering::Relaxed)
    }

    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        self.output.lock().push_str(frame);
        Ok(())
    }
}

/// Lets any `Write` sink act as a fixed-width terminal, e.g. a file for
/// recording a session.
pub struct WriterTerminal<W> {
    inner: W,
    width: usize,
    interactive: bool,
}

impl<W> WriterTerminal<W> {
    /// Wraps `inner`, reporting `width` columns and the given interactivity.
    pub const fn new(inner: W, width: usize, interactive: bool) -> Self {
        Self {
            inner,
            width,
            interactive,
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write + Send> Terminal for WriterTerminal<W> {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn width(&self) -> usize {
        self.width
    }

    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        self.inner.write_all(frame.as_bytes())?;
        self.inner.flush()
    }
}
