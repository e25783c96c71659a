use std::any;
use std::fmt;

use crate::ports::{
    Coupling, Direction, Endpoint, InPort, Message, OutPort, Owner, PortSet, Sink, Source,
};
use crate::simulation::ConfigurationError;

use super::atomic::{AtomicCell, Cell};
use super::{select, Atomic, AtomicModel};

/// Tie-break function of a coupled model.
pub(crate) type SelectFn = dyn Fn(&[ModelHandle]) -> Option<ModelHandle> + Send;

/// A handle to a direct child of a coupled model.
///
/// Handles are returned by [`CoupledModel::add_submodel`] and are only
/// meaningful for the coupled model that issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModelHandle {
    index: usize,
}

impl ModelHandle {
    pub(crate) fn new(index: usize) -> Self {
        Self { index }
    }

    /// Returns the position of the child in insertion order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns a coupling sink for an input port of this child.
    pub fn input<T: Message>(&self, port: InPort<T>) -> Sink<T> {
        Sink::new(Owner::Child(self.index), port.name())
    }

    /// Returns a coupling source for an output port of this child.
    pub fn output<T: Message>(&self, port: OutPort<T>) -> Source<T> {
        Source::new(Owner::Child(self.index), port.name())
    }
}

/// A model of any kind, as owned by its parent coupled model.
pub struct Component {
    pub(crate) kind: ComponentKind,
}

pub(crate) enum ComponentKind {
    Atomic {
        name: String,
        elapsed: f64,
        cell: Box<dyn AtomicCell>,
    },
    Coupled(CoupledModel),
}

impl Component {
    /// Returns the model name.
    pub fn name(&self) -> &str {
        match &self.kind {
            ComponentKind::Atomic { name, .. } => name,
            ComponentKind::Coupled(coupled) => &coupled.name,
        }
    }

    /// Returns `true` for an atomic model.
    pub fn is_atomic(&self) -> bool {
        matches!(self.kind, ComponentKind::Atomic { .. })
    }

    pub(crate) fn ports(&self) -> &PortSet {
        match &self.kind {
            ComponentKind::Atomic { cell, .. } => cell.ports(),
            ComponentKind::Coupled(coupled) => &coupled.ports,
        }
    }

    pub(crate) fn check_ports(&self) -> Result<(), ConfigurationError> {
        match self.ports().duplicate() {
            Some(decl) => Err(ConfigurationError::DuplicatePort {
                model: self.name().to_string(),
                port: decl.name,
            }),
            None => Ok(()),
        }
    }
}

impl<A: Atomic> From<AtomicModel<A>> for Component {
    fn from(model: AtomicModel<A>) -> Self {
        Self {
            kind: ComponentKind::Atomic {
                name: model.name,
                elapsed: model.elapsed,
                cell: Box::new(Cell::new(model.behaviour, model.state)),
            },
        }
    }
}

impl From<CoupledModel> for Component {
    fn from(model: CoupledModel) -> Self {
        Self {
            kind: ComponentKind::Coupled(model),
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ComponentKind::Atomic { name, elapsed, cell } => f
                .debug_struct("Atomic")
                .field("name", name)
                .field("state", cell.state_debug())
                .field("elapsed", elapsed)
                .finish(),
            ComponentKind::Coupled(coupled) => fmt::Debug::fmt(coupled, f),
        }
    }
}

/// A hierarchical container of models.
///
/// # Example
///
/// ```
/// use devsim::model::{Atomic, AtomicModel, CoupledModel, UnknownState};
/// use devsim::ports::{InPort, Inputs, OutPort, Outputs, PortSet};
/// use devsim::time::TimeAdvance;
///
/// /// Forwards its input after one time unit.
/// pub struct Delay;
///
/// impl Delay {
///     pub const IN: InPort<u32> = InPort::new("in");
///     pub const OUT: OutPort<u32> = OutPort::new("out");
/// }
///
/// impl Atomic for Delay {
///     type State = Option<u32>;
///
///     fn ports(&self) -> PortSet {
///         PortSet::new().with_input(Self::IN).with_output(Self::OUT)
///     }
///     fn time_advance(&self, state: &Option<u32>) -> Result<TimeAdvance, UnknownState> {
///         Ok(match state {
///             Some(_) => TimeAdvance::Finite(1.0),
///             None => TimeAdvance::Infinite,
///         })
///     }
///     fn output(&self, state: &Option<u32>, outputs: &mut Outputs) -> Result<(), UnknownState> {
///         let value = state.ok_or_else(|| UnknownState::new(state))?;
///         outputs.send(Self::OUT, value);
///         Ok(())
///     }
///     fn internal(&self, _: &Option<u32>) -> Result<Option<u32>, UnknownState> {
///         Ok(None)
///     }
///     fn external(&self, state: &Option<u32>, _: f64, inputs: &Inputs) -> Result<Option<u32>, UnknownState> {
///         Ok(inputs.get(Self::IN).copied().or(*state))
///     }
/// }
///
/// const IN: InPort<u32> = InPort::new("in");
/// const OUT: OutPort<u32> = OutPort::new("out");
///
/// let mut line = CoupledModel::new("line");
/// let input = line.add_in_port(IN)?;
/// let output = line.add_out_port(OUT)?;
/// let first = line.add_submodel(AtomicModel::new("first", Delay, None))?;
/// let second = line.add_submodel(AtomicModel::new("second", Delay, None))?;
///
/// line.connect(input, first.input(Delay::IN))?;
/// line.connect(first.output(Delay::OUT), second.input(Delay::IN))?;
/// line.connect(second.output(Delay::OUT), output)?;
/// line.set_priority(&[first, second]);
///
/// # Ok::<(), devsim::simulation::ConfigurationError>(())
/// ```
pub struct CoupledModel {
    pub(crate) name: String,
    pub(crate) ports: PortSet,
    pub(crate) children: Vec<Component>,
    pub(crate) couplings: Vec<Coupling>,
    pub(crate) select: Option<Box<SelectFn>>,
}

impl CoupledModel {
    /// Creates an empty coupled model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: PortSet::new(),
            children: Vec::new(),
            couplings: Vec::new(),
            select: None,
        }
    }

    /// Returns the model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a child model and returns its handle.
    ///
    /// Sibling models must have distinct names.
    pub fn add_submodel(
        &mut self,
        model: impl Into<Component>,
    ) -> Result<ModelHandle, ConfigurationError> {
        let model = model.into();

        if self.children.iter().any(|child| child.name() == model.name()) {
            return Err(ConfigurationError::DuplicateName {
                parent: self.name.clone(),
                name: model.name().to_string(),
            });
        }
        model.check_ports()?;

        let index = self.children.len();
        self.children.push(model);

        Ok(ModelHandle::new(index))
    }

    /// Declares a pass-through input port.
    ///
    /// Inside the coupled model, the port is the source of the couplings that
    /// forward incoming values to child models.
    pub fn add_in_port<T: Message>(
        &mut self,
        port: InPort<T>,
    ) -> Result<Source<T>, ConfigurationError> {
        self.declare::<T>(port.name(), Direction::In)?;

        Ok(Source::new(Owner::Parent, port.name()))
    }

    /// Declares a pass-through output port.
    ///
    /// Inside the coupled model, the port is the sink of the couplings that
    /// forward values emitted by child models.
    pub fn add_out_port<T: Message>(
        &mut self,
        port: OutPort<T>,
    ) -> Result<Sink<T>, ConfigurationError> {
        self.declare::<T>(port.name(), Direction::Out)?;

        Ok(Sink::new(Owner::Parent, port.name()))
    }

    /// Couples a source to a sink.
    ///
    /// Both ports must be declared by their owners with the coupled message
    /// type. A sink accepts a single source.
    pub fn connect<T: Message>(
        &mut self,
        source: Source<T>,
        sink: Sink<T>,
    ) -> Result<(), ConfigurationError> {
        let source = source.endpoint();
        let sink = sink.endpoint();

        // From the inside, a source is an input of the coupled model or an
        // output of a child, and conversely for a sink.
        self.check_endpoint::<T>(&source, Direction::In, Direction::Out)?;
        self.check_endpoint::<T>(&sink, Direction::Out, Direction::In)?;

        let coupling = Coupling { source, sink };
        if self.couplings.contains(&coupling) {
            return Err(ConfigurationError::DuplicateCoupling {
                parent: self.name.clone(),
                source: self.endpoint_name(&source),
                sink: self.endpoint_name(&sink),
            });
        }
        if self
            .couplings
            .iter()
            .any(|other| other.sink.owner == sink.owner && other.sink.port == sink.port)
        {
            return Err(ConfigurationError::FanIn {
                parent: self.name.clone(),
                sink: self.endpoint_name(&sink),
            });
        }
        self.couplings.push(coupling);

        Ok(())
    }

    /// Sets the function that picks which child goes first when several
    /// children are imminent in the same instant.
    ///
    /// The function receives the handles of the imminent children in
    /// insertion order and must return one of them. It must be
    /// deterministic. Returning `None` signals a tie that the model does not
    /// resolve, which aborts the simulation, as does the absence of a select
    /// function when a tie occurs.
    pub fn set_select<F>(&mut self, select: F)
    where
        F: Fn(&[ModelHandle]) -> Option<ModelHandle> + Send + 'static,
    {
        self.select = Some(Box::new(select));
    }

    /// Resolves ties by a fixed priority order, the first listed child having
    /// the highest priority.
    ///
    /// Ties between children that are all missing from the list are left
    /// unresolved.
    pub fn set_priority(&mut self, order: &[ModelHandle]) {
        let order = order.to_vec();

        self.set_select(move |candidates| select::priority(&order, candidates));
    }

    fn declare<T: Message>(
        &mut self,
        name: &'static str,
        direction: Direction,
    ) -> Result<(), ConfigurationError> {
        if self.ports.find(name, direction).is_some() {
            return Err(ConfigurationError::DuplicatePort {
                model: self.name.clone(),
                port: name,
            });
        }
        self.ports.push::<T>(name, direction);

        Ok(())
    }

    fn check_endpoint<T: Message>(
        &self,
        endpoint: &Endpoint,
        parent_direction: Direction,
        child_direction: Direction,
    ) -> Result<(), ConfigurationError> {
        let (model, ports, direction) = match endpoint.owner {
            Owner::Parent => (self.name.as_str(), &self.ports, parent_direction),
            Owner::Child(index) => {
                let child =
                    self.children
                        .get(index)
                        .ok_or_else(|| ConfigurationError::UnknownModel {
                            parent: self.name.clone(),
                            index,
                        })?;

                (child.name(), child.ports(), child_direction)
            }
        };

        let decl = ports.find(endpoint.port, direction).ok_or_else(|| {
            let model = model.to_string();
            let port = endpoint.port;
            match direction {
                Direction::In => ConfigurationError::UndeclaredInput { model, port },
                Direction::Out => ConfigurationError::UndeclaredOutput { model, port },
            }
        })?;

        if decl.type_id != endpoint.type_id {
            return Err(ConfigurationError::PortTypeMismatch {
                model: model.to_string(),
                port: endpoint.port,
                declared: decl.type_name,
                found: any::type_name::<T>(),
            });
        }

        Ok(())
    }

    fn endpoint_name(&self, endpoint: &Endpoint) -> String {
        match endpoint.owner {
            Owner::Parent => format!("{}.{}", self.name, endpoint.port),
            Owner::Child(index) => format!(
                "{}.{}.{}",
                self.name,
                self.children[index].name(),
                endpoint.port
            ),
        }
    }
}

impl fmt::Debug for CoupledModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoupledModel")
            .field("name", &self.name)
            .field("children", &self.children)
            .field("couplings", &self.couplings.len())
            .field("select", &self.select.is_some())
            .finish()
    }
}
