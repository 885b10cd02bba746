//! I/O wrappers that advance a bar by the bytes transferred.
//!
//! [`BarReader`] and [`BarWriter`] own a [`Bar`] and increment it after every
//! successful `read`/`write`, redrawing the fleet as they go.
//!
//! Once the inner stream has transferred bytes they are reported as transferred, even
//! if the frame that follows cannot be drawn: an `Err` from `read`/`write` must mean
//! nothing was consumed. Render failures are logged and the most recent one is kept,
//! see [`BarWriter::take_render_error`].

use std::io::{self, Read, Write};

use tracing::warn;

use crate::{Bar, RenderError};

/// Advances `bar` by `n` bytes, returning the render failure instead of raising it.
fn advance(bar: &mut Bar, n: usize) -> Option<RenderError> {
    if n == 0 {
        return None;
    }
    let err = bar.inc(n as u64).err()?;
    warn!(id = bar.id(), name = bar.name(), "progress frame not drawn: {err}");
    Some(err)
}

/// A wrapper around [`Read`] that advances a [`Bar`] by the bytes read.
#[derive(Debug)]
pub struct BarReader<R> {
    inner: R,
    bar: Bar,
    render_error: Option<RenderError>,
}

impl<R> BarReader<R> {
    /// Wraps `inner`, advancing `bar` as data is read.
    pub const fn new(inner: R, bar: Bar) -> Self {
        Self {
            inner,
            bar,
            render_error: None,
        }
    }

    /// The bar being advanced.
    pub const fn bar(&self) -> &Bar {
        &self.bar
    }

    /// Returns the most recent render failure, if any, and clears it.
    pub fn take_render_error(&mut self) -> Option<RenderError> {
        self.render_error.take()
    }

    /// Returns the wrapped reader and the bar.
    pub fn into_inner(self) -> (R, Bar) {
        (self.inner, self.bar)
    }
}

impl<R: Read> Read for BarReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if let Some(err) = advance(&mut self.bar, n) {
            self.render_error = Some(err);
        }
        Ok(n)
    }
}

/// A wrapper around [`Write`] that advances a [`Bar`] by the bytes written.
#[derive(Debug)]
pub struct BarWriter<W> {
    inner: W,
    bar: Bar,
    render_error: Option<RenderError>,
}

impl<W> BarWriter<W> {
    /// Wraps `inner`, advancing `bar` as data is written.
    pub const fn new(inner: W, bar: Bar) -> Self {
        Self {
            inner,
            bar,
            render_error: None,
        }
    }

    /// The bar being advanced.
    pub const fn bar(&self) -> &Bar {
        &self.bar
    }

    /// Returns the most recent render failure, if any, and clears it.
    pub fn take_render_error(&mut self) -> Option<RenderError> {
        self.render_error.take()
    }

    /// Returns the wrapped writer and the bar.
    pub fn into_inner(self) -> (W, Bar) {
        (self.inner, self.bar)
    }
}

impl<W: Write> Write for BarWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        if let Some(err) = advance(&mut self.bar, n) {
            self.render_error = Some(err);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read as _, Write as _};

    use super::{BarReader, BarWriter};
    use crate::{Bar, BufferTerminal, Registry, RenderError, Status};

    /// Reader
    /// Verifies that bytes read are counted.
    #[test]
    fn test_reader() {
        let registry = Registry::new(BufferTerminal::new(80));
        let bar = Bar::new(&registry, "read", 0u64, 100u64).unwrap();
        let data = vec![0u8; 100];
        let mut reader = BarReader::new(Cursor::new(&data), bar);

        let mut buf = [0u8; 10];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(reader.bar().now(), 10);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        let (_, bar) = reader.into_inner();
        assert_eq!(bar.status(), Status::Completed);
        assert!(registry.is_fleet_completed());
    }

    /// Writer
    /// Verifies that bytes written are counted.
    #[test]
    fn test_writer() {
        let registry = Registry::new(BufferTerminal::new(80));
        let bar = Bar::new(&registry, "write", 0u64, 50u64).unwrap();
        let mut writer = BarWriter::new(Vec::new(), bar);

        writer.write_all(&[1, 2, 3, 4, 5]).unwrap();

        assert_eq!(writer.bar().now(), 5);
        assert_eq!(writer.bar().percent(), 10);
    }

    /// Render Failure
    /// Verifies that bytes the inner writer accepted are reported as written even when
    /// the frame cannot be drawn, and that the failure is kept for the caller.
    #[test]
    fn test_render_failure_keeps_bytes() {
        let term = BufferTerminal::new(80);
        let registry = Registry::new(term.clone());
        let bar = Bar::new(&registry, "write", 0u64, 50u64).unwrap();
        let mut writer = BarWriter::new(Vec::new(), bar);

        term.set_width(1);
        assert_eq!(writer.write(&[1, 2, 3]).unwrap(), 3);
        writer.write_all(&[4, 5]).unwrap();
        assert!(matches!(
            writer.take_render_error(),
            Some(RenderError::TerminalTooSmall { width: 1, .. })
        ));
        assert!(writer.take_render_error().is_none());

        term.set_width(80);
        writer.write_all(&[6]).unwrap();
        assert!(writer.take_render_error().is_none());

        let (inner, bar) = writer.into_inner();
        assert_eq!(inner, [1, 2, 3, 4, 5, 6]);
        assert_eq!(bar.now(), 6);
    }
}
