//! Support for structured logging.
//!
//! # Overview
//!
//! When the `tracing` feature is activated, the simulation kernel records the
//! current simulation time before each iteration so that log events can be
//! stamped with the simulated time instead of the wall-clock time.
//!
//! The kernel itself emits events with the [`tracing`] crate regardless of
//! the feature: initialization is logged at the `info` level, state
//! transitions at the `debug` level and routed values at the `trace` level.
//!
//! # Configuration
//!
//! Using the simulation time as timestamp only requires the [`SimulationTime`]
//! timer to be installed in a `tracing-subscriber` formatter:
//!
//! ```
//! use devsim::tracing::SimulationTime;
//!
//! tracing_subscriber::fmt()
//!     .with_timer(SimulationTime::default())
//!     .with_writer(std::io::stderr)
//!     .init();
//! ```
//!
//! Events emitted outside of a simulation iteration are stamped with `t=-`.
//! The time is tracked per thread, so the timer should be used on the thread
//! that steps the simulation.
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/

use std::cell::Cell;
use std::fmt;

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

use crate::time::SimTime;

thread_local! {
    static CURRENT_TIME: Cell<Option<SimTime>> = const { Cell::new(None) };
}

/// Records the simulation time of the iteration being processed, or `None`
/// once the simulation stops.
pub(crate) fn set_current_time(time: Option<SimTime>) {
    CURRENT_TIME.with(|t| t.set(time));
}

/// A timer that formats the current simulation time.
#[derive(Copy, Clone, Debug, Default)]
pub struct SimulationTime {
    _priv: (),
}

impl SimulationTime {
    /// Creates a new timer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FormatTime for SimulationTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match CURRENT_TIME.with(Cell::get) {
            Some(time) => write!(w, "t={time}"),
            None => write!(w, "t=-"),
        }
    }
}
