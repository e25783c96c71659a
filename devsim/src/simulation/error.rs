use std::error::Error;
use std::fmt;

use crate::model::TransitionFn;
use crate::time::{SimTime, TimeAdvance};

/// An error returned when a simulation cannot be built or cannot proceed.
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationError {
    /// A transition function received a state it does not handle.
    UnknownState(UnknownStateError),
    /// The model hierarchy is misconfigured, or a model returned a value that
    /// violates its contract.
    Configuration(ConfigurationError),
    /// Couplings form a loop that would deliver a value back to where it
    /// came from within the same instant.
    StructuralCycle(StructuralCycleError),
    /// The simulation was interrupted by a [`Halter`](super::Halter).
    ///
    /// The simulation is left in a consistent state and can be resumed.
    Halted,
    /// The simulation was aborted by an earlier error and cannot be used
    /// anymore.
    Terminated,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownState(e) => e.fmt(f),
            Self::Configuration(e) => e.fmt(f),
            Self::StructuralCycle(e) => e.fmt(f),
            Self::Halted => f.write_str("the simulation has been halted"),
            Self::Terminated => f.write_str("the simulation has been terminated"),
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownState(e) => Some(e),
            Self::Configuration(e) => Some(e),
            Self::StructuralCycle(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UnknownStateError> for SimulationError {
    fn from(e: UnknownStateError) -> Self {
        Self::UnknownState(e)
    }
}

impl From<ConfigurationError> for SimulationError {
    fn from(e: ConfigurationError) -> Self {
        Self::Configuration(e)
    }
}

impl From<StructuralCycleError> for SimulationError {
    fn from(e: StructuralCycleError) -> Self {
        Self::StructuralCycle(e)
    }
}

/// A transition function of an atomic model was called on a state it does
/// not handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownStateError {
    /// Dotted path of the model.
    pub model: String,
    /// The offending function.
    pub function: TransitionFn,
    /// Textual representation of the state.
    pub state: String,
}

impl fmt::Display for UnknownStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the {} of model '{}' does not handle state <{}>",
            self.function, self.model, self.state
        )
    }
}

impl Error for UnknownStateError {}

/// A loop of couplings that could carry a value back to its origin within a
/// single instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuralCycleError {
    /// The dotted names of the ports along the loop, the first port being
    /// repeated at the end.
    pub ports: Vec<String>,
}

impl fmt::Display for StructuralCycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zero-delay coupling cycle: {}", self.ports.join(" -> "))
    }
}

impl Error for StructuralCycleError {}

/// A misconfiguration of the model hierarchy, or a model output that
/// violates the model contract.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigurationError {
    /// Two sibling models share the same name.
    DuplicateName {
        /// Name of the parent coupled model.
        parent: String,
        /// The duplicated name.
        name: String,
    },
    /// A model declares the same port twice in the same direction.
    DuplicatePort {
        /// Name or path of the model.
        model: String,
        /// The duplicated port.
        port: &'static str,
    },
    /// An input port was used without having been declared.
    UndeclaredInput {
        /// Name or path of the model.
        model: String,
        /// The undeclared port.
        port: &'static str,
    },
    /// An output port was used without having been declared.
    UndeclaredOutput {
        /// Name or path of the model.
        model: String,
        /// The undeclared port.
        port: &'static str,
    },
    /// A port was used with a message type that differs from its declaration.
    PortTypeMismatch {
        /// Name or path of the model.
        model: String,
        /// The port.
        port: &'static str,
        /// The declared message type.
        declared: &'static str,
        /// The message type actually used.
        found: &'static str,
    },
    /// A model handle does not refer to a child of the coupled model.
    UnknownModel {
        /// Name of the coupled model.
        parent: String,
        /// Index carried by the handle.
        index: usize,
    },
    /// The same coupling was added twice.
    DuplicateCoupling {
        /// Name of the coupled model.
        parent: String,
        /// The coupling source.
        source: String,
        /// The coupling sink.
        sink: String,
    },
    /// A sink already has a source.
    FanIn {
        /// Name of the coupled model.
        parent: String,
        /// The sink.
        sink: String,
    },
    /// An initial elapsed time is negative, not finite, or exceeds the time
    /// advance of the initial state.
    InvalidElapsed {
        /// Path of the model.
        model: String,
        /// The initial elapsed time.
        elapsed: f64,
        /// The time advance of the initial state.
        time_advance: TimeAdvance,
    },
    /// A time advance function returned a negative or NaN delay, or a delay
    /// that schedules the next transition past the largest representable
    /// time.
    InvalidTimeAdvance {
        /// Path of the model.
        model: String,
        /// Textual representation of the state.
        state: String,
        /// The returned value.
        time_advance: TimeAdvance,
    },
    /// A select function returned a model that is not one of the candidates.
    InvalidSelection {
        /// Path of the coupled model.
        model: String,
        /// Index of the selected child.
        selected: usize,
    },
    /// Several children are imminent and the coupled model cannot tell which
    /// one goes first.
    UnresolvedTie {
        /// Path of the coupled model.
        model: String,
        /// Names of the imminent children.
        candidates: Vec<String>,
    },
    /// A timestamp lies before the current simulation time.
    TimeInPast {
        /// The offending timestamp.
        at: SimTime,
        /// The current simulation time.
        now: SimTime,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { parent, name } => {
                write!(f, "model '{parent}' has several children named '{name}'")
            }
            Self::DuplicatePort { model, port } => {
                write!(f, "model '{model}' declares port '{port}' twice")
            }
            Self::UndeclaredInput { model, port } => {
                write!(f, "model '{model}' has no input port '{port}'")
            }
            Self::UndeclaredOutput { model, port } => {
                write!(f, "model '{model}' has no output port '{port}'")
            }
            Self::PortTypeMismatch {
                model,
                port,
                declared,
                found,
            } => write!(
                f,
                "port '{port}' of model '{model}' carries '{declared}', not '{found}'"
            ),
            Self::UnknownModel { parent, index } => {
                write!(f, "model '{parent}' has no child with index {index}")
            }
            Self::DuplicateCoupling {
                parent,
                source,
                sink,
            } => write!(
                f,
                "coupling '{source}' -> '{sink}' was added twice to model '{parent}'"
            ),
            Self::FanIn { parent, sink } => write!(
                f,
                "sink '{sink}' of model '{parent}' is already coupled to a source"
            ),
            Self::InvalidElapsed {
                model,
                elapsed,
                time_advance,
            } => write!(
                f,
                "initial elapsed time {elapsed} of model '{model}' is not within [0, {time_advance}]"
            ),
            Self::InvalidTimeAdvance {
                model,
                state,
                time_advance,
            } => write!(
                f,
                "model '{model}' returned invalid time advance {time_advance} in state <{state}>"
            ),
            Self::InvalidSelection { model, selected } => write!(
                f,
                "select function of model '{model}' returned child {selected}, which is not imminent"
            ),
            Self::UnresolvedTie { model, candidates } => write!(
                f,
                "model '{model}' cannot break the tie between {}",
                candidates.join(", ")
            ),
            Self::TimeInPast { at, now } => {
                write!(f, "time {at} lies before the current simulation time {now}")
            }
        }
    }
}

impl Error for ConfigurationError {}
