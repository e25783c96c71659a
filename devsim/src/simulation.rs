//! Simulation management.
//!
//! # Setting up and running a simulation
//!
//! Once the model hierarchy is built, a [`SimInit`] builder takes ownership
//! of the root model, registers trace sinks and produces a [`Simulation`]
//! with [`SimInit::init`]. This is also where the hierarchy is validated as a
//! whole: initial elapsed times, coupling loops and port routes are all
//! checked before the first iteration.
//!
//! The simulation can then be advanced:
//!
//! * one iteration at a time with [`Simulation::step`],
//! * up to a deadline with [`Simulation::step_until`],
//! * until no event remains with [`Simulation::step_unbounded`].
//!
//! For the common case of a run from time zero to an end time that collects
//! the whole trace, [`run`] does all of the above in one call.
//!
//! # Execution semantics
//!
//! Each atomic model schedules its next internal transition at the time of
//! its last transition plus the time advance of its current state. An
//! *iteration* processes all models scheduled at the earliest such time, the
//! *imminent* models:
//!
//! 1. values scheduled with [`Simulation::schedule_input`] for that time are
//!    delivered to the atomic input ports coupled to the root input ports,
//! 2. imminent models fire one after the other. The next one to fire is found
//!    by descending the hierarchy from the root: a coupled model with a single
//!    child holding imminent models descends into that child, while a coupled
//!    model with several such children asks its select function,
//! 3. a firing model emits its outputs from its current state and the values
//!    are routed to the coupled input ports,
//! 4. finally, models that fired and received nothing perform an internal
//!    transition, models that fired and received values perform a confluent
//!    transition and models that only received values perform an external
//!    transition. All of them reset their elapsed time.
//!
//! Values emitted in an iteration are only seen by the receiving models at
//! the end of that iteration. A model that receives values and enters a state
//! with a zero time advance is processed in a subsequent iteration at the
//! same simulation time.
//!
//! # Errors
//!
//! Any error other than [`SimulationError::Halted`] aborts the iteration in
//! progress and terminates the simulation: the trace records of the aborted
//! iteration are discarded and all subsequent calls return
//! [`SimulationError::Terminated`].
//!
//! # Example
//!
//! ```
//! use devsim::model::{Atomic, AtomicModel, UnknownState};
//! use devsim::ports::{OutPort, Outputs, PortSet};
//! use devsim::simulation::{SimInit, Stop};
//! use devsim::time::{SimTime, TimeAdvance};
//! use devsim::trace::TraceBuffer;
//!
//! pub struct Blinker;
//!
//! impl Blinker {
//!     pub const LIGHT: OutPort<bool> = OutPort::new("light");
//! }
//!
//! impl Atomic for Blinker {
//!     type State = bool;
//!
//!     fn ports(&self) -> PortSet {
//!         PortSet::new().with_output(Self::LIGHT)
//!     }
//!     fn time_advance(&self, _: &bool) -> Result<TimeAdvance, UnknownState> {
//!         Ok(TimeAdvance::Finite(1.0))
//!     }
//!     fn output(&self, on: &bool, outputs: &mut Outputs) -> Result<(), UnknownState> {
//!         outputs.send(Self::LIGHT, !on);
//!         Ok(())
//!     }
//!     fn internal(&self, on: &bool) -> Result<bool, UnknownState> {
//!         Ok(!on)
//!     }
//! }
//!
//! let trace = TraceBuffer::new();
//! let mut simu = SimInit::new(AtomicModel::new("blinker", Blinker, false))
//!     .add_trace_sink(&trace)
//!     .init(SimTime::ZERO)?;
//!
//! let stop = simu.step_until(SimTime::new(3.0).unwrap())?;
//!
//! assert_eq!(stop, Stop::Deadline);
//! assert_eq!(simu.state::<bool>("blinker"), Some(&true));
//! assert_eq!(
//!     trace.map(|r| r.to_string()).collect::<Vec<_>>(),
//!     ["1 blinker.light true", "2 blinker.light false", "3 blinker.light true"]
//! );
//!
//! # Ok::<(), devsim::simulation::SimulationError>(())
//! ```
mod error;
mod model_tree;
mod sim_init;

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use error::{ConfigurationError, SimulationError, StructuralCycleError, UnknownStateError};
pub use sim_init::SimInit;

use crate::model::{Component, TransitionFn};
use crate::ports::{Direction, InPort, Inputs, Message, Outputs};
use crate::time::{SimTime, TimeAdvance};
use crate::trace::{TraceBuffer, TraceRecord, TraceSinkWriter};

use model_tree::{Destination, ModelTree};

/// The reason why [`Simulation::step_until`] returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stop {
    /// The deadline was reached and events remain scheduled after it.
    Deadline,
    /// No event remains: every model is passive and no input is scheduled.
    Quiescent,
}

/// A handle that interrupts a running simulation.
///
/// The request is checked between iterations by [`Simulation::step_until`]
/// and [`Simulation::step_unbounded`], which then return
/// [`SimulationError::Halted`]. The simulation remains usable.
#[derive(Clone, Debug)]
pub struct Halter {
    is_halted: Arc<AtomicBool>,
}

impl Halter {
    /// Requests the simulation to stop.
    pub fn halt(&self) {
        self.is_halted.store(true, Ordering::Relaxed);
    }
}

struct ScheduledInput {
    port: &'static str,
    value: Box<dyn Message>,
}

/// A discrete-event simulation of a model hierarchy.
///
/// A `Simulation` is created with [`SimInit`]. It owns the simulation clock
/// and the models, and can be moved to another thread.
pub struct Simulation {
    time: SimTime,
    tree: ModelTree,
    writers: Vec<Box<dyn TraceSinkWriter>>,
    scheduled: BTreeMap<(SimTime, u64), ScheduledInput>,
    next_seq: u64,
    is_halted: Arc<AtomicBool>,
    is_terminated: bool,
}

impl Simulation {
    pub(crate) fn new(
        tree: ModelTree,
        writers: Vec<Box<dyn TraceSinkWriter>>,
        start_time: SimTime,
    ) -> Self {
        Self {
            time: start_time,
            tree,
            writers,
            scheduled: BTreeMap::new(),
            next_seq: 0,
            is_halted: Arc::new(AtomicBool::new(false)),
            is_terminated: false,
        }
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Returns the time of the next iteration, if any.
    pub fn next_event_time(&self) -> Option<SimTime> {
        let next_transition = self.tree.atomics.iter().filter_map(|slot| slot.t_next).min();
        let next_input = self.scheduled.keys().next().map(|&(t, _)| t);

        match (next_transition, next_input) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Returns a handle that can interrupt the simulation from another
    /// thread.
    pub fn halter(&self) -> Halter {
        Halter {
            is_halted: self.is_halted.clone(),
        }
    }

    /// Processes the next iteration.
    ///
    /// Returns the simulation time of the iteration, or `None` if no event
    /// remains.
    pub fn step(&mut self) -> Result<Option<SimTime>, SimulationError> {
        self.check_terminated()?;

        match self.next_event_time() {
            Some(t) => {
                self.process(t)?;

                Ok(Some(t))
            }
            None => Ok(None),
        }
    }

    /// Processes all iterations up to and including the deadline.
    ///
    /// The simulation time is set to the deadline upon return.
    pub fn step_until(&mut self, deadline: SimTime) -> Result<Stop, SimulationError> {
        self.check_terminated()?;
        if deadline < self.time {
            return Err(ConfigurationError::TimeInPast {
                at: deadline,
                now: self.time,
            }
            .into());
        }

        loop {
            self.check_halted()?;

            match self.next_event_time() {
                Some(t) if t <= deadline => self.process(t)?,
                next => {
                    self.time = deadline;
                    tracing::debug!(deadline = %deadline, "deadline reached");

                    return Ok(match next {
                        Some(_) => Stop::Deadline,
                        None => Stop::Quiescent,
                    });
                }
            }
        }
    }

    /// Processes iterations until no event remains.
    ///
    /// This never returns if the hierarchy is never quiescent, unless it is
    /// interrupted by a [`Halter`].
    pub fn step_unbounded(&mut self) -> Result<(), SimulationError> {
        self.check_terminated()?;

        loop {
            self.check_halted()?;

            match self.next_event_time() {
                Some(t) => self.process(t)?,
                None => return Ok(()),
            }
        }
    }

    /// Schedules a value on an input port of the root model.
    ///
    /// Values scheduled for the same port and time are delivered in
    /// successive iterations at that time, in scheduling order.
    pub fn schedule_input<T: Message>(
        &mut self,
        at: SimTime,
        port: InPort<T>,
        value: T,
    ) -> Result<(), SimulationError> {
        self.check_terminated()?;
        if at < self.time {
            return Err(ConfigurationError::TimeInPast { at, now: self.time }.into());
        }

        let decl = self
            .tree
            .root_ports
            .find(port.name(), Direction::In)
            .ok_or_else(|| ConfigurationError::UndeclaredInput {
                model: self.tree.root_path.clone(),
                port: port.name(),
            })?;
        if decl.type_id != std::any::TypeId::of::<T>() {
            return Err(ConfigurationError::PortTypeMismatch {
                model: self.tree.root_path.clone(),
                port: port.name(),
                declared: decl.type_name,
                found: std::any::type_name::<T>(),
            }
            .into());
        }

        self.scheduled.insert(
            (at, self.next_seq),
            ScheduledInput {
                port: port.name(),
                value: Box::new(value),
            },
        );
        self.next_seq += 1;

        Ok(())
    }

    /// Returns the time elapsed since the last transition of an atomic
    /// model.
    pub fn elapsed(&self, path: &str) -> Option<f64> {
        self.tree
            .find(path)
            .map(|i| self.tree.atomics[i].elapsed(self.time))
    }

    /// Returns the time advance of the current state of an atomic model.
    pub fn time_advance(&self, path: &str) -> Option<TimeAdvance> {
        self.tree.find(path).map(|i| self.tree.atomics[i].time_advance)
    }

    /// Returns the current state of an atomic model, provided that it has
    /// type `S`.
    pub fn state<S: 'static>(&self, path: &str) -> Option<&S> {
        self.tree
            .find(path)
            .and_then(|i| self.tree.atomics[i].cell.state_any().downcast_ref::<S>())
    }

    /// Returns the dotted paths of all atomic models in depth-first order.
    pub fn model_paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.tree.atomics.iter().map(|slot| slot.path.as_str())
    }

    fn check_terminated(&self) -> Result<(), SimulationError> {
        if self.is_terminated {
            return Err(SimulationError::Terminated);
        }

        Ok(())
    }

    fn check_halted(&self) -> Result<(), SimulationError> {
        if self.is_halted.swap(false, Ordering::Relaxed) {
            tracing::info!(time = %self.time, "simulation halted");

            return Err(SimulationError::Halted);
        }

        Ok(())
    }

    /// Runs an iteration and commits its trace, or terminates the simulation.
    fn process(&mut self, now: SimTime) -> Result<(), SimulationError> {
        self.time = now;

        #[cfg(feature = "tracing")]
        crate::tracing::set_current_time(Some(now));

        let result = self.iterate(now);

        #[cfg(feature = "tracing")]
        crate::tracing::set_current_time(None);

        match result {
            Ok(records) => {
                for record in records {
                    for writer in &self.writers {
                        writer.write(record.clone());
                    }
                }

                Ok(())
            }
            Err(e) => {
                tracing::error!(time = %now, error = %e, "simulation terminated");
                self.is_terminated = true;

                Err(e)
            }
        }
    }

    fn iterate(&mut self, now: SimTime) -> Result<Vec<TraceRecord>, SimulationError> {
        let mut pending: BTreeMap<usize, Inputs> = BTreeMap::new();

        // Scheduled inputs, at most one per root port and iteration.
        let mut used_ports = BTreeSet::new();
        let due: Vec<_> = self
            .scheduled
            .range(..=(now, u64::MAX))
            .filter(|(_, input)| used_ports.insert(input.port))
            .map(|(&key, _)| key)
            .collect();
        for key in due {
            if let Some(input) = self.scheduled.remove(&key) {
                for &destination in self.tree.root_route(input.port) {
                    deliver(&mut pending, destination, input.value.clone());
                }
            }
        }

        // Firing.
        let mut imminent: BTreeSet<usize> = self
            .tree
            .atomics
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.t_next == Some(now))
            .map(|(i, _)| i)
            .collect();
        let mut fired = BTreeSet::new();
        let mut records = Vec::new();

        while !imminent.is_empty() {
            let index = self.tree.resolve(&imminent)?;
            imminent.remove(&index);
            fired.insert(index);

            let slot = &self.tree.atomics[index];
            let mut outputs = Outputs::new();
            slot.cell
                .output(&mut outputs)
                .map_err(|e| slot.unknown_state(TransitionFn::Output, e))?;

            for emitted in outputs.into_emitted() {
                let route = slot.route(&emitted)?;

                tracing::trace!(
                    model = %slot.path,
                    port = emitted.port,
                    value = ?emitted.value,
                    destinations = route.destinations.len(),
                    "output"
                );
                for &destination in &route.destinations {
                    deliver(&mut pending, destination, emitted.value.clone());
                }

                records.push(TraceRecord {
                    time: now,
                    model: slot.path.clone(),
                    port: emitted.port,
                    value: emitted.value,
                });
            }
        }

        // Transitions, in depth-first order.
        let touched: BTreeSet<usize> = fired.iter().chain(pending.keys()).copied().collect();
        for index in touched {
            let inputs = pending.remove(&index);
            let slot = &mut self.tree.atomics[index];

            let (function, result) = match (fired.contains(&index), inputs) {
                (true, None) => (TransitionFn::Internal, slot.cell.internal()),
                (true, Some(inputs)) => (TransitionFn::Confluent, slot.cell.confluent(&inputs)),
                (false, Some(inputs)) => {
                    let elapsed = slot.elapsed(now);
                    (TransitionFn::External, slot.cell.external(elapsed, &inputs))
                }
                (false, None) => continue,
            };
            result.map_err(|e| slot.unknown_state(function, e))?;
            slot.reschedule(now)?;

            tracing::debug!(
                model = %slot.path,
                state = ?slot.cell.state_debug(),
                time_advance = %slot.time_advance,
                "{function}"
            );
        }

        Ok(records)
    }
}

/// Adds a routed value to the inputs of an atomic model.
fn deliver(pending: &mut BTreeMap<usize, Inputs>, destination: Destination, value: Box<dyn Message>) {
    // Sinks have a single source, so a port cannot be fed twice.
    let _ = pending
        .entry(destination.atomic)
        .or_default()
        .insert(destination.port, value);
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("time", &self.time)
            .field("root", &self.tree.root_path)
            .field("next_event_time", &self.next_event_time())
            .field("is_terminated", &self.is_terminated)
            .finish_non_exhaustive()
    }
}

/// The error returned by [`run`], together with the records produced before
/// the failure.
#[derive(Clone, Debug, PartialEq)]
pub struct RunError {
    /// The trace up to the last completed iteration.
    pub trace: Vec<TraceRecord>,
    /// The error that aborted the run.
    pub error: SimulationError,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "simulation aborted after {} trace records: {}",
            self.trace.len(),
            self.error
        )
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// Simulates a hierarchy from time zero to the specified end time and
/// returns the trace.
///
/// Events scheduled exactly at the end time are processed.
pub fn run(root: impl Into<Component>, end_time: SimTime) -> Result<Vec<TraceRecord>, RunError> {
    let trace = TraceBuffer::new();

    let result = SimInit::new(root)
        .add_trace_sink(&trace)
        .init(SimTime::ZERO)
        .and_then(|mut simu| simu.step_until(end_time));

    match result {
        Ok(_) => Ok(trace.drain()),
        Err(error) => Err(RunError {
            trace: trace.drain(),
            error,
        }),
    }
}
