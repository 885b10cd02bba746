//! The shared registry of bars on screen.
//!
//! A [`Registry`] is the single coordinator for one block of bars: it holds the ordered
//! snapshots (insertion order is row order), the session flags, and the terminal the
//! block is drawn to. Bars keep a clone of the handle they were built against; there
//! is no process-wide registry.
//!
//! # Synchronization Strategy
//!
//! All state sits behind one [`Mutex`](parking_lot::Mutex). Each publish holds the
//! lock across the snapshot update *and* the redraw, so no caller ever observes, or
//! draws, a half-updated fleet.
//!
//! # Sessions
//!
//! Once every bar has finished (or [`abort_all`](Registry::abort_all) is called) the
//! fleet is frozen. [`reset`](Registry::reset) clears it and starts a new session;
//! bars from an earlier session are ignored from then on.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    bar::BarSnapshot,
    config::Config,
    error::{BuildError, LifecycleError, RenderError},
    render,
    term::Terminal,
};

/// Source of bar ids. Ids are never reused within a process.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Everything guarded by the registry lock.
pub(crate) struct Fleet {
    pub(crate) bars: Vec<BarSnapshot>,
    pub(crate) title_printed: bool,
    pub(crate) completed: bool,
    /// Rows the previous frame left on screen.
    pub(crate) rows_drawn: usize,
    pub(crate) session: u64,
    /// Config of the bar that opened the session; used by [`Registry::abort_all`].
    pub(crate) opener: Option<Arc<Config>>,
    pub(crate) terminal: Box<dyn Terminal>,
}

impl Fleet {
    /// True once the fleet holds bars and all of them have finished.
    pub(crate) fn all_finished(&self) -> bool {
        !self.bars.is_empty() && self.bars.iter().all(|bar| bar.status().is_terminal())
    }

    fn accepts(&self, session: u64) -> bool {
        !self.completed && self.session == session
    }
}

/// A cloneable handle to one fleet of bars and the terminal they are drawn on.
///
/// # Examples
///
/// ```
/// use fleet_progress::{Bar, BufferTerminal, Registry};
///
/// let registry = Registry::new(BufferTerminal::new(80));
/// let mut a = Bar::new(&registry, "a", 0u64, 10u64).unwrap();
/// let mut b = Bar::new(&registry, "bb", 0u64, 100u64).unwrap();
///
/// a.inc(10u64).unwrap();
/// b.abort("gave up").unwrap();
///
/// assert!(registry.is_fleet_completed());
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Mutex<Fleet>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fleet = self.inner.lock();
        f.debug_struct("Registry")
            .field("count", &fleet.bars.len())
            .field("session", &fleet.session)
            .field("completed", &fleet.completed)
            .finish_non_exhaustive()
    }
}

impl Default for Registry {
    /// A registry drawing to standard output.
    fn default() -> Self {
        Self::stdout()
    }
}

impl Registry {
    /// Creates an empty registry drawing to `terminal`.
    #[must_use]
    pub fn new(terminal: impl Terminal + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Fleet {
                bars: Vec::new(),
                title_printed: false,
                completed: false,
                rows_drawn: 0,
                session: 0,
                opener: None,
                terminal: Box::new(terminal),
            })),
        }
    }

    /// Creates an empty registry drawing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(console::Term::stdout())
    }

    /// Creates an empty registry drawing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(console::Term::stderr())
    }

    /// Whether the terminal is interactive. Bars can only be built when it is.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.inner.lock().terminal.is_interactive()
    }

    /// Number of bars in the current session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().bars.len()
    }

    /// Returns `true` if the current session has no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().bars.is_empty()
    }

    /// Whether the title banner has been printed this session.
    #[must_use]
    pub fn is_title_printed(&self) -> bool {
        self.inner.lock().title_printed
    }

    /// Whether the fleet is frozen: every bar finished, or the fleet was aborted.
    #[must_use]
    pub fn is_fleet_completed(&self) -> bool {
        self.inner.lock().completed
    }

    /// Returns an owned copy of every bar's last published state, in row order.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let fleet = self.inner.lock();
        RegistrySnapshot {
            bars: fleet.bars.clone(),
            title_printed: fleet.title_printed,
            fleet_completed: fleet.completed,
        }
    }

    /// Clears the registry and starts a new session.
    ///
    /// If every bar has finished but the closing frame could not be drawn at the time,
    /// the closing frame is drawn first.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::FleetRunning`] unless the fleet is frozen; resetting
    /// a live block would corrupt the rows still being drawn.
    pub fn reset(&self) -> Result<(), LifecycleError> {
        let mut fleet = self.inner.lock();
        if !fleet.completed && fleet.all_finished() {
            let config = fleet.opener.clone().unwrap_or_default();
            if let Err(err) = render::redraw(&mut fleet, &config) {
                debug!("closing frame still cannot be drawn: {err}");
            }
        }
        if !fleet.completed {
            return Err(LifecycleError::FleetRunning);
        }

        fleet.bars.clear();
        fleet.title_printed = false;
        fleet.completed = false;
        fleet.rows_drawn = 0;
        fleet.opener = None;
        fleet.session += 1;
        debug!(session = fleet.session, "registry reset");
        Ok(())
    }

    /// Aborts the whole fleet regardless of bar states: moves below the block, prints
    /// the abort banner, shows the cursor and freezes. No-op once frozen.
    ///
    /// The banner comes from the configuration of the bar that opened the session.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if the terminal write fails.
    pub fn abort_all(&self) -> Result<(), RenderError> {
        let mut fleet = self.inner.lock();
        let config = fleet.opener.clone().unwrap_or_default();
        render::abort_fleet(&mut fleet, &config)
    }

    pub(crate) fn abort_all_with(&self, config: &Config) -> Result<(), RenderError> {
        render::abort_fleet(&mut self.inner.lock(), config)
    }

    /// Adds a new bar and draws the first frame that includes it.
    ///
    /// Returns the session the bar belongs to. If the frame cannot be drawn the bar is
    /// removed again.
    pub(crate) fn register(&self, bar: BarSnapshot) -> Result<u64, BuildError> {
        let mut fleet = self.inner.lock();
        if fleet.completed {
            return Err(LifecycleError::FleetFrozen.into());
        }

        let config = bar.shared_config();
        debug!(id = bar.id(), name = bar.name(), end = bar.end(), "registering bar");
        fleet.bars.push(bar);

        if let Err(err) = render::redraw(&mut fleet, &config) {
            fleet.bars.pop();
            return Err(err.into());
        }
        fleet.opener.get_or_insert(config);

        Ok(fleet.session)
    }

    /// Replaces a bar's snapshot and redraws.
    ///
    /// Returns `None` without touching anything if the fleet is frozen, `session` is
    /// stale, or the bar is no longer registered. Otherwise the snapshot is stored and
    /// the result of the redraw returned.
    pub(crate) fn publish(
        &self,
        session: u64,
        bar: &BarSnapshot,
    ) -> Option<Result<(), RenderError>> {
        let mut fleet = self.inner.lock();
        if !fleet.accepts(session) {
            return None;
        }

        let slot = fleet.bars.iter_mut().find(|entry| entry.id() == bar.id())?;
        *slot = bar.clone();

        Some(render::redraw(&mut fleet, bar.config()))
    }

    /// Draws the closing frame if every bar has finished but the frame that should have
    /// closed the fleet failed. Otherwise does nothing.
    pub(crate) fn close_pending(&self, session: u64, config: &Config) -> Result<(), RenderError> {
        let mut fleet = self.inner.lock();
        if !fleet.accepts(session) || !fleet.all_finished() {
            return Ok(());
        }

        debug!("retrying closing frame");
        render::redraw(&mut fleet, config)
    }

    /// Drops a bar's row and redraws the rest.
    pub(crate) fn remove(&self, session: u64, id: u64, config: &Config) -> Result<(), RenderError> {
        let mut fleet = self.inner.lock();
        if !fleet.accepts(session) {
            return Ok(());
        }

        let Some(index) = fleet.bars.iter().position(|entry| entry.id() == id) else {
            return Ok(());
        };
        fleet.bars.remove(index);

        render::redraw(&mut fleet, config)
    }
}

/// A point-in-time copy of a [`Registry`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegistrySnapshot {
    bars: Vec<BarSnapshot>,
    title_printed: bool,
    fleet_completed: bool,
}

impl RegistrySnapshot {
    /// Bar snapshots in row order.
    #[must_use]
    pub fn bars(&self) -> &[BarSnapshot] {
        &self.bars
    }

    /// Whether the title banner had been printed.
    #[must_use]
    pub const fn title_printed(&self) -> bool {
        self.title_printed
    }

    /// Whether the fleet was frozen.
    #[must_use]
    pub const fn fleet_completed(&self) -> bool {
        self.fleet_completed
    }
}
