use std::any::Any;
use std::fmt;

use crate::ports::{Inputs, Outputs, PortSet};
use crate::time::TimeAdvance;

use super::{Atomic, UnknownState};

/// An atomic model ready to be added to a coupled model or simulated on its
/// own.
pub struct AtomicModel<A: Atomic> {
    pub(crate) name: String,
    pub(crate) behaviour: A,
    pub(crate) state: A::State,
    pub(crate) elapsed: f64,
}

impl<A: Atomic> AtomicModel<A> {
    /// Creates an atomic model with the specified initial state and a zero
    /// initial elapsed time.
    pub fn new(name: impl Into<String>, behaviour: A, initial_state: A::State) -> Self {
        Self {
            name: name.into(),
            behaviour,
            state: initial_state,
            elapsed: 0.0,
        }
    }

    /// Sets the time already spent in the initial state when the simulation
    /// starts.
    ///
    /// The elapsed time must not exceed the time advance of the initial
    /// state, which is checked when the simulation is initialized.
    pub fn with_elapsed(mut self, elapsed: f64) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Returns the model name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<A: Atomic> fmt::Debug for AtomicModel<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicModel")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

/// Type-erased atomic model owned by the simulator.
pub(crate) trait AtomicCell: Send {
    fn ports(&self) -> &PortSet;

    fn time_advance(&self) -> Result<TimeAdvance, UnknownState>;

    fn output(&self, outputs: &mut Outputs) -> Result<(), UnknownState>;

    fn internal(&mut self) -> Result<(), UnknownState>;

    fn external(&mut self, elapsed: f64, inputs: &Inputs) -> Result<(), UnknownState>;

    fn confluent(&mut self, inputs: &Inputs) -> Result<(), UnknownState>;

    fn state_any(&self) -> &dyn Any;

    fn state_debug(&self) -> &dyn fmt::Debug;
}

/// Behaviour and current state of an atomic model.
pub(crate) struct Cell<A: Atomic> {
    behaviour: A,
    ports: PortSet,
    state: A::State,
}

impl<A: Atomic> Cell<A> {
    pub(crate) fn new(behaviour: A, state: A::State) -> Self {
        let ports = behaviour.ports();

        Self {
            behaviour,
            ports,
            state,
        }
    }
}

impl<A: Atomic> AtomicCell for Cell<A> {
    fn ports(&self) -> &PortSet {
        &self.ports
    }

    fn time_advance(&self) -> Result<TimeAdvance, UnknownState> {
        self.behaviour.time_advance(&self.state)
    }

    fn output(&self, outputs: &mut Outputs) -> Result<(), UnknownState> {
        self.behaviour.output(&self.state, outputs)
    }

    fn internal(&mut self) -> Result<(), UnknownState> {
        self.state = self.behaviour.internal(&self.state)?;

        Ok(())
    }

    fn external(&mut self, elapsed: f64, inputs: &Inputs) -> Result<(), UnknownState> {
        self.state = self.behaviour.external(&self.state, elapsed, inputs)?;

        Ok(())
    }

    fn confluent(&mut self, inputs: &Inputs) -> Result<(), UnknownState> {
        self.state = self.behaviour.confluent(&self.state, inputs)?;

        Ok(())
    }

    fn state_any(&self) -> &dyn Any {
        &self.state
    }

    fn state_debug(&self) -> &dyn fmt::Debug {
        &self.state
    }
}
