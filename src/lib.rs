//! # `fleet_progress`
//!
//! Column-aligned multi-bar progress rendering for interactive terminals.
//!
//! Several bars share one block of rows. Every update redraws the whole block in
//! place, picking per frame the most detailed layout that fits the terminal width and
//! aligning names and step counts across all bars. When every bar has completed or
//! been aborted, a closing banner is printed and the cursor restored.
//!
//! ```no_run
//! use fleet_progress::{Bar, Registry};
//!
//! # fn main() -> Result<(), fleet_progress::Error> {
//! let registry = Registry::stdout();
//! let mut fetch = Bar::new(&registry, "fetch", 0u64, 10u64)?;
//! let mut build = Bar::new(&registry, "build", 0u64, 4u64)?;
//!
//! fetch.increment(3u64, "mirror 1")?;
//! build.inc(4u64)?;
//! fetch.abort("mirror unreachable")?; // last live bar: closing banner printed
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! * [`bar`]: The [`Bar`] entity, its [`Status`] state machine and [`BarSnapshot`].
//! * [`builder`]: Fluent construction with comments and custom configuration.
//! * [`registry`]: The shared [`Registry`] of bars drawn together.
//! * [`layout`]: Column measurement, template selection and comment truncation.
//! * [`glyph`]: Bar glyph generation and half-up rounding.
//! * [`color`]: 8-bit ANSI coloring of fragments.
//! * [`config`]: Resolved [`Config`] and partial [`ConfigOverride`].
//! * [`term`]: The [`Terminal`] output seam and control sequences.
//! * [`io`]: Wrappers for [`std::io::Read`] and [`std::io::Write`] that advance a bar.
//! * [`error`]: The error taxonomy.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bar;
pub mod builder;
pub mod color;
pub mod config;
pub mod error;
pub mod glyph;
pub mod io;
pub mod layout;
pub mod registry;
mod render;
pub mod term;

pub use bar::{Bar, BarSnapshot, Status};
pub use builder::BarBuilder;
pub use config::{Config, ConfigOverride};
pub use error::{BuildError, Error, LifecycleError, RenderError};
pub use registry::{Registry, RegistrySnapshot};
pub use term::{BufferTerminal, Terminal, WriterTerminal};
