use std::fmt;

use crate::model::Component;
use crate::time::SimTime;
use crate::trace::{TraceSink, TraceSinkWriter};

use super::model_tree::ModelTree;
use super::{Simulation, SimulationError};

/// Builder for a [`Simulation`].
pub struct SimInit {
    root: Component,
    writers: Vec<Box<dyn TraceSinkWriter>>,
}

impl SimInit {
    /// Creates a builder for the simulation of the specified root model.
    ///
    /// The root model may be atomic or coupled.
    pub fn new(root: impl Into<Component>) -> Self {
        Self {
            root: root.into(),
            writers: Vec::new(),
        }
    }

    /// Registers a sink receiving every trace record.
    pub fn add_trace_sink<S: TraceSink>(mut self, sink: &S) -> Self {
        self.writers.push(Box::new(sink.writer()));

        self
    }

    /// Validates the model hierarchy and builds a simulation starting at the
    /// specified time.
    ///
    /// This flattens the hierarchy, checks the initial elapsed times against
    /// the initial time advances, rejects coupling loops that would carry a
    /// value back to its origin within one instant and precomputes the
    /// destinations of every output port.
    pub fn init(self, start_time: SimTime) -> Result<Simulation, SimulationError> {
        let tree = ModelTree::build(self.root, start_time)?;

        tracing::info!(
            root = %tree.root_path,
            atomic_models = tree.atomics.len(),
            start_time = %start_time,
            "simulation initialized"
        );

        Ok(Simulation::new(tree, self.writers, start_time))
    }
}

impl fmt::Debug for SimInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimInit")
            .field("root", &self.root.name())
            .field("trace_sinks", &self.writers.len())
            .finish()
    }
}
