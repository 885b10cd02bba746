//! The bar entity and its state machine.
//!
//! A [`Bar`] owns one task's progress. Every accepted mutation produces a fresh
//! [`BarSnapshot`], publishes it into the bar's [`Registry`] and redraws the whole
//! fleet before returning.
//!
//! # States
//!
//! ```text
//!            increment (percent < 100)
//!              ┌──────┐
//!              ▼      │
//!  build ──► Active ──┴── increment (percent >= 100) ──► Completed
//!              │
//!              └───────── abort ───────────────────────► Aborted
//! ```
//!
//! `Completed` and `Aborted` are terminal: further `increment`/`abort` calls return
//! `Ok(())` without touching state or the terminal. The same holds once the fleet is
//! frozen, or once the registry has been reset under the bar.
//!
//! The one exception is a fleet whose closing frame failed to draw (for example on a
//! terminal that was too narrow at the time): the next call on any of its bars draws
//! that frame again.

use std::sync::Arc;

use compact_str::CompactString;
use tracing::debug;

use crate::{
    builder::BarBuilder,
    config::Config,
    error::{BuildError, LifecycleError, RenderError},
    glyph,
    registry::Registry,
};

/// Lifecycle state of a bar.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Status {
    /// Still accepting increments.
    #[default]
    Active,
    /// Reached 100%.
    Completed,
    /// Explicitly aborted.
    Aborted,
}

impl Status {
    /// Whether no further mutation is accepted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

/// An owned copy of a bar's displayable state at its last update.
///
/// The registry only ever stores snapshots, so a frame that has been drawn cannot be
/// changed by later updates to the bar it came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BarSnapshot {
    id: u64,
    name: CompactString,
    start: u64,
    end: u64,
    now: u64,
    percent: u64,
    comment: CompactString,
    status: Status,
    config: Arc<Config>,
}

impl BarSnapshot {
    /// Builds the initial snapshot of a bar positioned at `start`.
    ///
    /// A range that is already complete (including `end == 0`) starts out
    /// [`Completed`](Status::Completed).
    #[must_use]
    pub fn new(
        id: u64,
        name: impl Into<CompactString>,
        start: u64,
        end: u64,
        comment: impl Into<CompactString>,
        config: Arc<Config>,
    ) -> Self {
        let mut snapshot = Self {
            id,
            name: name.into(),
            start,
            end,
            now: start,
            percent: 0,
            comment: comment.into(),
            status: Status::Active,
            config,
        };
        snapshot.settle();
        snapshot
    }

    /// Recomputes the percentage and completes the bar once it reaches 100%.
    fn settle(&mut self) {
        self.percent = glyph::percent(self.now, self.end);
        if self.status == Status::Active && self.percent >= 100 {
            self.status = Status::Completed;
        }
    }

    /// Unique id of the bar.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Display label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start of the range.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// End of the range.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// Current position.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Completion percentage, rounded half-up. May exceed 100 on overshoot.
    #[must_use]
    pub const fn percent(&self) -> u64 {
        self.percent
    }

    /// Status comment shown at the end of the widest layout.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Rendering configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn shared_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}

/// One tracked task and its row on screen.
///
/// Created with [`Bar::new`] or [`Bar::builder`]. Construction draws the bar
/// immediately.
#[derive(Debug)]
pub struct Bar {
    registry: Registry,
    session: u64,
    state: BarSnapshot,
}

impl Bar {
    /// Creates a bar with the default configuration and no comment.
    ///
    /// # Errors
    ///
    /// See [`BarBuilder::build`].
    pub fn new(
        registry: &Registry,
        name: impl Into<CompactString>,
        start: impl Into<u64>,
        end: impl Into<u64>,
    ) -> Result<Self, BuildError> {
        BarBuilder::new(name, start, end).build(registry)
    }

    /// Starts building a bar with a comment or custom configuration.
    #[must_use]
    pub fn builder(
        name: impl Into<CompactString>,
        start: impl Into<u64>,
        end: impl Into<u64>,
    ) -> BarBuilder {
        BarBuilder::new(name, start, end)
    }

    pub(crate) fn from_parts(registry: Registry, session: u64, state: BarSnapshot) -> Self {
        Self {
            registry,
            session,
            state,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Unique id of the bar.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.state.id
    }

    /// Display label.
    #[must_use]
    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// Start of the range.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.state.start
    }

    /// End of the range.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.state.end
    }

    /// Current position.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.state.now
    }

    /// Completion percentage.
    #[must_use]
    pub const fn percent(&self) -> u64 {
        self.state.percent
    }

    /// Current comment.
    #[must_use]
    pub fn comment(&self) -> &str {
        self.state.comment()
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.state.status
    }

    /// Rendering configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        self.state.config()
    }

    /// The registry this bar draws into.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns a copy of the bar's current state.
    #[must_use]
    pub fn snapshot(&self) -> BarSnapshot {
        self.state.clone()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Advances the bar by `amount`, replacing its comment, and redraws the fleet.
    ///
    /// The bar completes once its percentage reaches 100.
    ///
    /// # Parameters
    ///
    /// * `amount`: Steps to add to the current position.
    /// * `comment`: Replaces the previous comment. Pass `""` to clear it.
    ///
    /// # Examples
    ///
    /// ```
    /// use fleet_progress::{Bar, BufferTerminal, Registry, Status};
    ///
    /// let registry = Registry::new(BufferTerminal::new(80));
    /// let mut bar = Bar::new(&registry, "fetch", 0u64, 10u64)?;
    ///
    /// bar.increment(5u64, "halfway")?;
    /// assert_eq!((bar.now(), bar.percent()), (5, 50));
    ///
    /// bar.increment(5u64, "done")?;
    /// assert_eq!(bar.status(), Status::Completed);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the frame could not be drawn. The new position is
    /// kept either way.
    pub fn increment(
        &mut self,
        amount: impl Into<u64>,
        comment: impl Into<CompactString>,
    ) -> Result<(), RenderError> {
        let amount = amount.into();
        let comment = comment.into();
        self.transition(|next| {
            next.now = next.now.saturating_add(amount);
            next.comment = comment;
            next.settle();
        })
    }

    /// Advances the bar by `amount` and clears its comment.
    ///
    /// # Errors
    ///
    /// See [`increment`](Self::increment).
    pub fn inc(&mut self, amount: impl Into<u64>) -> Result<(), RenderError> {
        self.increment(amount, CompactString::default())
    }

    /// Marks the bar as aborted and redraws the fleet.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the frame could not be drawn.
    pub fn abort(&mut self, comment: impl Into<CompactString>) -> Result<(), RenderError> {
        let comment = comment.into();
        self.transition(|next| {
            next.status = Status::Aborted;
            next.comment = comment;
        })
    }

    /// Removes the bar's row and redraws the remaining bars.
    ///
    /// Removing the last live bar completes the fleet.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the remaining rows could not be drawn.
    pub fn delete(self) -> Result<(), RenderError> {
        debug!(id = self.state.id, name = %self.state.name, "deleting bar");
        self.registry
            .remove(self.session, self.state.id, self.state.config())
    }

    /// Clears the registry for a new session. See [`Registry::reset`].
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::FleetRunning`] unless the fleet has finished.
    pub fn reset(&self) -> Result<(), LifecycleError> {
        self.registry.reset()
    }

    /// Aborts the whole fleet, printing this bar's abort banner.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the banner could not be written.
    pub fn abort_all(&self) -> Result<(), RenderError> {
        self.registry.abort_all_with(self.state.config())
    }

    fn transition(&mut self, apply: impl FnOnce(&mut BarSnapshot)) -> Result<(), RenderError> {
        if self.state.status.is_terminal() {
            // No-op unless an earlier closing frame failed to draw.
            return self.registry.close_pending(self.session, self.state.config());
        }

        let mut next = self.state.clone();
        apply(&mut next);

        let Some(rendered) = self.registry.publish(self.session, &next) else {
            return Ok(());
        };

        if next.status != self.state.status {
            debug!(
                id = next.id,
                name = %next.name,
                from = ?self.state.status,
                to = ?next.status,
                percent = next.percent,
                "bar changed state"
            );
        }
        self.state = next;

        rendered
    }
}
