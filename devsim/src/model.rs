//! Model components.
//!
//!
//! # Atomic models
//!
//! An atomic model is a leaf state machine. Its behaviour is described by a
//! type implementing the [`Atomic`] trait, while its state is a separate
//! value of the associated type [`Atomic::State`]. The behaviour object is
//! only ever borrowed immutably by the simulator: each transition function
//! receives the current state and returns a brand new state, so the whole
//! memory of a model is its state value and its elapsed time.
//!
//! The contract is the classic DEVS one:
//!
//! * [`Atomic::time_advance`] gives the time until the next spontaneous
//!   transition, which may be [`TimeAdvance::Infinite`] for passive states,
//! * [`Atomic::output`] is called on the state the model is about to leave,
//!   right before an internal transition,
//! * [`Atomic::internal`] computes the state after a spontaneous transition,
//! * [`Atomic::external`] computes the state after the reception of values on
//!   input ports, given the time elapsed since the last transition,
//! * [`Atomic::confluent`] decides what happens when a model is both due for
//!   an internal transition and receives values in the same instant. The
//!   default applies the internal transition first and then the external
//!   transition with a zero elapsed time.
//!
//! A transition function that does not handle the state it is given returns
//! an [`UnknownState`] error, which aborts the simulation.
//!
//! ```
//! use devsim::model::{Atomic, UnknownState};
//! use devsim::ports::{Inputs, OutPort, Outputs, PortSet};
//! use devsim::time::TimeAdvance;
//!
//! /// Emits a tick every 2 time units.
//! pub struct Clock;
//!
//! impl Clock {
//!     pub const TICK: OutPort<()> = OutPort::new("tick");
//! }
//!
//! impl Atomic for Clock {
//!     type State = ();
//!
//!     fn ports(&self) -> PortSet {
//!         PortSet::new().with_output(Self::TICK)
//!     }
//!     fn time_advance(&self, _: &()) -> Result<TimeAdvance, UnknownState> {
//!         Ok(TimeAdvance::Finite(2.0))
//!     }
//!     fn output(&self, _: &(), outputs: &mut Outputs) -> Result<(), UnknownState> {
//!         outputs.send(Self::TICK, ());
//!         Ok(())
//!     }
//!     fn internal(&self, _: &()) -> Result<(), UnknownState> {
//!         Ok(())
//!     }
//! }
//! ```
//!
//! An [`AtomicModel`] bundles a behaviour with a name, an initial state and
//! an initial elapsed time.
//!
//!
//! # Coupled models
//!
//! A [`CoupledModel`] owns child models, atomic or coupled, and the couplings
//! between their ports and its own pass-through ports. When several of its
//! children are due at the same instant, the coupled model decides which one
//! goes first through its select function, see [`CoupledModel::set_select`].
mod atomic;
mod coupled;

pub mod select;

use std::fmt;

pub use atomic::AtomicModel;
pub use coupled::{Component, CoupledModel, ModelHandle};

pub(crate) use atomic::AtomicCell;
pub(crate) use coupled::{ComponentKind, SelectFn};

use crate::ports::{Inputs, Outputs, PortSet};
use crate::time::TimeAdvance;

/// Behaviour of an atomic model.
pub trait Atomic: Send + 'static {
    /// The state of the model.
    type State: Clone + fmt::Debug + Send + 'static;

    /// Declares the input and output ports of the model.
    fn ports(&self) -> PortSet;

    /// Returns the time until the next internal transition.
    fn time_advance(&self, state: &Self::State) -> Result<TimeAdvance, UnknownState>;

    /// Emits the output values associated with the state the model is about
    /// to leave.
    fn output(&self, state: &Self::State, outputs: &mut Outputs) -> Result<(), UnknownState>;

    /// Returns the state following an internal transition.
    fn internal(&self, state: &Self::State) -> Result<Self::State, UnknownState>;

    /// Returns the state following the reception of input values.
    ///
    /// The default implementation keeps the current state, which suits
    /// models without input ports.
    fn external(
        &self,
        state: &Self::State,
        elapsed: f64,
        inputs: &Inputs,
    ) -> Result<Self::State, UnknownState> {
        let _ = (elapsed, inputs);

        Ok(state.clone())
    }

    /// Returns the state following an internal transition that coincides
    /// with the reception of input values.
    ///
    /// The default implementation applies the internal transition, then the
    /// external transition on the intermediate state with a zero elapsed
    /// time.
    fn confluent(&self, state: &Self::State, inputs: &Inputs) -> Result<Self::State, UnknownState> {
        let intermediate = self.internal(state)?;

        self.external(&intermediate, 0.0, inputs)
    }
}

/// Error returned by a transition function that received a state it does not
/// handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownState {
    state: String,
}

impl UnknownState {
    /// Creates an error for the specified state.
    pub fn new<S: fmt::Debug>(state: &S) -> Self {
        Self {
            state: format!("{state:?}"),
        }
    }

    /// Returns a textual representation of the offending state.
    pub fn state(&self) -> &str {
        &self.state
    }
}

impl fmt::Display for UnknownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown state <{}>", self.state)
    }
}

impl std::error::Error for UnknownState {}

/// One of the functions of the atomic model contract.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransitionFn {
    /// [`Atomic::time_advance`].
    TimeAdvance,
    /// [`Atomic::output`].
    Output,
    /// [`Atomic::internal`].
    Internal,
    /// [`Atomic::external`].
    External,
    /// [`Atomic::confluent`].
    Confluent,
}

impl fmt::Display for TransitionFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TimeAdvance => "time advance",
            Self::Output => "output",
            Self::Internal => "internal transition",
            Self::External => "external transition",
            Self::Confluent => "confluent transition",
        })
    }
}
