//! Error taxonomy.
//!
//! Failures fall into three closed groups so callers can tell a fatal setup problem
//! from a frame that could not be drawn:
//!
//! * [`BuildError`]: a bar could not be constructed.
//! * [`RenderError`]: a frame could not be drawn (terminal too narrow, I/O failure).
//! * [`LifecycleError`]: a fleet-level operation was called in the wrong state.
//!
//! [`Error`] wraps all three for callers that only want one type to propagate.

use std::io;

use thiserror::Error;

/// Failure to construct a [`Bar`](crate::Bar).
#[derive(Debug, Error)]
pub enum BuildError {
    /// The registry's output is not an interactive terminal.
    #[error("progress bars require an interactive terminal")]
    NotATerminal,

    /// `end` lies below `start`, so increments can never reach it.
    #[error("end ({end}) is not reachable from start ({start})")]
    UnreachableEnd {
        /// Requested start value.
        start: u64,
        /// Requested end value.
        end: u64,
    },

    /// The fleet is in a state that does not accept new bars.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The initial frame could not be drawn; the bar was not registered.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Failure to draw a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Not even the narrowest line layout fits.
    #[error("terminal too small: {width} columns available, {required} required")]
    TerminalTooSmall {
        /// Current terminal width in columns.
        width: usize,
        /// Minimum width needed for the narrowest layout.
        required: usize,
    },

    /// Writing to the terminal failed.
    #[error("failed to write to terminal: {0}")]
    Io(#[from] io::Error),
}

/// A fleet-level operation was called in a state that forbids it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// `reset` was called while at least one bar is still live.
    #[error("existing bars are still running")]
    FleetRunning,

    /// A bar was constructed on a frozen fleet that has not been reset.
    #[error("the fleet has finished; reset it before adding bars")]
    FleetFrozen,
}

/// Any error produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// See [`BuildError`].
    #[error(transparent)]
    Build(#[from] BuildError),
    /// See [`RenderError`].
    #[error(transparent)]
    Render(#[from] RenderError),
    /// See [`LifecycleError`].
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}
