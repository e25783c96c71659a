use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

use super::port::Message;

/// The model owning a coupling endpoint, relative to the coupled model that
/// declares the coupling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Owner {
    /// A pass-through port of the coupled model itself.
    Parent,
    /// A port of the direct child with the specified index.
    Child(usize),
}

/// A type-erased coupling endpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub(crate) owner: Owner,
    pub(crate) port: &'static str,
    pub(crate) type_id: TypeId,
}

/// A directed edge between two endpoints of the same coupled model.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Coupling {
    pub(crate) source: Endpoint,
    pub(crate) sink: Endpoint,
}

/// The origin of a coupling: an output port of a child model or an input port
/// of the enclosing coupled model.
pub struct Source<T> {
    pub(crate) owner: Owner,
    pub(crate) port: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Message> Source<T> {
    pub(crate) fn new(owner: Owner, port: &'static str) -> Self {
        Self {
            owner,
            port,
            _phantom: PhantomData,
        }
    }

    pub(crate) fn endpoint(&self) -> Endpoint {
        Endpoint {
            owner: self.owner,
            port: self.port,
            type_id: TypeId::of::<T>(),
        }
    }
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Source<T> {}

impl<T> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("owner", &self.owner)
            .field("port", &self.port)
            .finish()
    }
}

/// The destination of a coupling: an input port of a child model or an output
/// port of the enclosing coupled model.
pub struct Sink<T> {
    pub(crate) owner: Owner,
    pub(crate) port: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Message> Sink<T> {
    pub(crate) fn new(owner: Owner, port: &'static str) -> Self {
        Self {
            owner,
            port,
            _phantom: PhantomData,
        }
    }

    pub(crate) fn endpoint(&self) -> Endpoint {
        Endpoint {
            owner: self.owner,
            port: self.port,
            type_id: TypeId::of::<T>(),
        }
    }
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Sink<T> {}

impl<T> fmt::Debug for Sink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("owner", &self.owner)
            .field("port", &self.port)
            .finish()
    }
}
