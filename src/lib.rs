//! taskline is a progress line for concurrent async programs.
//!
//! Many tokio tasks can report into one [`ProgressTracker`] at the same
//! time: increments are serialized by an async mutex so none are lost, and
//! redraws are throttled to a minimum interval so a burst of thousands of
//! updates per second does not flood the output. The final 100% frame is
//! always rendered exactly once.
//!
//! Output goes to one of two surfaces, picked when the tracker is built:
//! a terminal (one carriage-return-overwritten line, via [`console`]) or a
//! notebook-style [`DisplayHandle`] owned by the host environment. The
//! tracker itself never inspects the environment; see
//! [`HostEnvironment::detect`] for the probe and [`DrawTarget::auto`] for
//! wiring it up.
//!
//! ```no_run
//! # async fn run() -> Result<(), taskline::ProgressError> {
//! use taskline::ProgressTracker;
//!
//! let tracker = ProgressTracker::new(100)?;
//! for _ in 0..100 {
//!     // ... some unit of work ...
//!     tracker.update().await?;
//! }
//! tracker.finish().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

mod display_handle;
mod draw_target;
mod error;
mod in_memory;
mod state;
mod style;
mod term_like;
mod tracker;

pub use crate::display_handle::DisplayHandle;
pub use crate::draw_target::{DrawTarget, HostEnvironment};
pub use crate::error::{ProgressError, ProgressResult};
pub use crate::in_memory::InMemoryTerm;
pub use crate::state::Frame;
pub use crate::style::TrackerStyle;
pub use crate::term_like::TermLike;
pub use crate::tracker::{ProgressTracker, TrackerBuilder};
