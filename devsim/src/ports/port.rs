use std::any::{self, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;

use dyn_clone::DynClone;

/// A value that can be exchanged between model ports.
///
/// This trait is implemented for any `Clone + Debug + PartialEq + Send +
/// 'static` type. It makes it possible to carry values of different types
/// through the kernel as `Box<dyn Message>` while keeping them cloneable and
/// comparable.
pub trait Message: Any + fmt::Debug + DynClone + Send {
    /// Returns the value as `&dyn Any` so it can be downcast.
    fn as_any(&self) -> &dyn Any;

    /// Compares two type-erased values; values of different types are never
    /// equal.
    fn dyn_eq(&self, other: &dyn Message) -> bool;
}

impl<T> Message for T
where
    T: Clone + fmt::Debug + PartialEq + Send + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Message) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| other == self)
    }
}

dyn_clone::clone_trait_object!(Message);

/// An input port of a model, receiving values of type `T`.
pub struct InPort<T> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> InPort<T> {
    /// Creates a port handle with the specified name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    /// Returns the port name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for InPort<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for InPort<T> {}

impl<T> fmt::Debug for InPort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InPort")
            .field("name", &self.name)
            .field("type", &any::type_name::<T>())
            .finish()
    }
}

/// An output port of a model, emitting values of type `T`.
pub struct OutPort<T> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> OutPort<T> {
    /// Creates a port handle with the specified name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    /// Returns the port name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for OutPort<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OutPort<T> {}

impl<T> fmt::Debug for OutPort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutPort")
            .field("name", &self.name)
            .field("type", &any::type_name::<T>())
            .finish()
    }
}

/// Direction of a port.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => f.write_str("input"),
            Self::Out => f.write_str("output"),
        }
    }
}

/// Declaration of a single port.
#[derive(Clone, Debug)]
pub(crate) struct PortDecl {
    pub(crate) name: &'static str,
    pub(crate) direction: Direction,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
}

/// The set of ports declared by a model.
///
/// Port names must be unique per direction.
#[derive(Clone, Debug, Default)]
pub struct PortSet {
    ports: Vec<PortDecl>,
}

impl PortSet {
    /// Creates an empty port set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an input port.
    pub fn with_input<T: Message>(mut self, port: InPort<T>) -> Self {
        self.push::<T>(port.name, Direction::In);
        self
    }

    /// Adds an output port.
    pub fn with_output<T: Message>(mut self, port: OutPort<T>) -> Self {
        self.push::<T>(port.name, Direction::Out);
        self
    }

    /// Returns the names of the input ports in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names(Direction::In)
    }

    /// Returns the names of the output ports in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names(Direction::Out)
    }

    pub(crate) fn push<T: Message>(&mut self, name: &'static str, direction: Direction) {
        self.ports.push(PortDecl {
            name,
            direction,
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
        });
    }

    pub(crate) fn find(&self, name: &str, direction: Direction) -> Option<&PortDecl> {
        self.ports
            .iter()
            .find(|decl| decl.direction == direction && decl.name == name)
    }

    /// Returns the first port declared twice with the same direction, if any.
    pub(crate) fn duplicate(&self) -> Option<&PortDecl> {
        self.ports.iter().enumerate().find_map(|(i, decl)| {
            self.ports[..i]
                .iter()
                .any(|other| other.direction == decl.direction && other.name == decl.name)
                .then_some(decl)
        })
    }

    fn names(&self, direction: Direction) -> impl Iterator<Item = &'static str> + '_ {
        self.ports
            .iter()
            .filter(move |decl| decl.direction == direction)
            .map(|decl| decl.name)
    }
}
