//! Fluent interface for constructing [`Bar`] instances.
//!
//! [`Bar::new`] covers the common case. The [`BarBuilder`] adds an initial comment
//! and a custom configuration, either as a complete [`Config`] or as a
//! [`ConfigOverride`] overlaid onto the defaults.

use std::sync::Arc;

use compact_str::CompactString;

use crate::{
    bar::{Bar, BarSnapshot},
    config::{Config, ConfigOverride},
    error::BuildError,
    registry::{self, Registry},
};

/// A builder for [`Bar`].
#[derive(Clone, Debug)]
pub struct BarBuilder {
    name: CompactString,
    start: u64,
    end: u64,
    comment: CompactString,
    config: Config,
}

impl BarBuilder {
    /// Starts building a bar covering `start..=end`.
    ///
    /// # Parameters
    ///
    /// * `name`: Label printed in the name column.
    /// * `start`: Initial position.
    /// * `end`: Position at which the bar reads 100%.
    ///
    /// # Examples
    ///
    /// ```
    /// use fleet_progress::{BarBuilder, BufferTerminal, Registry};
    ///
    /// let registry = Registry::new(BufferTerminal::new(80));
    /// let bar = BarBuilder::new("upload", 0u64, 40u64)
    ///     .comment("connecting")
    ///     .build(&registry)?;
    ///
    /// assert_eq!(bar.comment(), "connecting");
    /// # Ok::<(), fleet_progress::BuildError>(())
    /// ```
    #[must_use]
    pub fn new(name: impl Into<CompactString>, start: impl Into<u64>, end: impl Into<u64>) -> Self {
        Self {
            name: name.into(),
            start: start.into(),
            end: end.into(),
            comment: CompactString::default(),
            config: Config::default(),
        }
    }

    /// Sets the initial comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<CompactString>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Overlays `overrides` onto the configuration set so far.
    #[must_use]
    pub fn config_override(mut self, overrides: &ConfigOverride) -> Self {
        self.config.apply(overrides);
        self
    }

    /// Registers the bar with `registry` and draws it.
    ///
    /// # Errors
    ///
    /// * [`BuildError::NotATerminal`] if the registry's output is not interactive.
    /// * [`BuildError::UnreachableEnd`] if `start > end`.
    /// * [`BuildError::Lifecycle`] if the fleet is frozen and has not been reset.
    /// * [`BuildError::Render`] if the first frame cannot be drawn; the bar is not
    ///   registered in that case.
    pub fn build(self, registry: &Registry) -> Result<Bar, BuildError> {
        if !registry.is_interactive() {
            return Err(BuildError::NotATerminal);
        }
        if self.start > self.end {
            return Err(BuildError::UnreachableEnd {
                start: self.start,
                end: self.end,
            });
        }

        let state = BarSnapshot::new(
            registry::next_id(),
            self.name,
            self.start,
            self.end,
            self.comment,
            Arc::new(self.config),
        );
        let session = registry.register(state.clone())?;

        Ok(Bar::from_parts(registry.clone(), session, state))
    }
}
