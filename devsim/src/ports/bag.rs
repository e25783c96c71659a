use std::any;
use std::fmt;

use super::port::{InPort, Message, OutPort};

/// The values received by a model on its input ports during one simulated
/// instant.
///
/// An input port holds at most one value per instant.
#[derive(Clone, Default)]
pub struct Inputs {
    values: Vec<(&'static str, Box<dyn Message>)>,
}

impl Inputs {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a bag with an additional value on the specified port, replacing
    /// any previous value on that port.
    ///
    /// This is mainly useful to exercise the transition functions of a model
    /// outside of a simulation.
    pub fn with<T: Message>(mut self, port: InPort<T>, value: T) -> Self {
        self.values.retain(|(name, _)| *name != port.name());
        self.values.push((port.name(), Box::new(value)));
        self
    }

    /// Returns the value received on the specified port, if any.
    pub fn get<T: Message>(&self, port: InPort<T>) -> Option<&T> {
        self.values
            .iter()
            .find(|(name, _)| *name == port.name())
            .and_then(|(_, value)| value.as_ref().as_any().downcast_ref::<T>())
    }

    /// Returns `true` if a value was received on the specified port.
    pub fn contains<T: Message>(&self, port: InPort<T>) -> bool {
        self.get(port).is_some()
    }

    /// Returns the number of ports that received a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no value was received.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the received values in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &dyn Message)> + '_ {
        self.values.iter().map(|(name, value)| (*name, value.as_ref()))
    }

    /// Stores a routed value.
    ///
    /// The value is handed back if the port already holds a value.
    pub(crate) fn insert(
        &mut self,
        port: &'static str,
        value: Box<dyn Message>,
    ) -> Result<(), Box<dyn Message>> {
        if self.values.iter().any(|(name, _)| *name == port) {
            return Err(value);
        }
        self.values.push((port, value));

        Ok(())
    }
}

impl fmt::Debug for Inputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A value emitted by an output function.
pub(crate) struct Emitted {
    pub(crate) port: &'static str,
    pub(crate) type_name: &'static str,
    pub(crate) value: Box<dyn Message>,
}

/// The values emitted by a model on its output ports when it is about to
/// perform an internal transition.
#[derive(Default)]
pub struct Outputs {
    values: Vec<Emitted>,
}

impl Outputs {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a value on the specified port, replacing any value previously
    /// emitted on that port.
    pub fn send<T: Message>(&mut self, port: OutPort<T>, value: T) {
        self.values.retain(|emitted| emitted.port != port.name());
        self.values.push(Emitted {
            port: port.name(),
            type_name: any::type_name::<T>(),
            value: Box::new(value),
        });
    }

    /// Returns the value emitted on the specified port, if any.
    pub fn get<T: Message>(&self, port: OutPort<T>) -> Option<&T> {
        self.values
            .iter()
            .find(|emitted| emitted.port == port.name())
            .and_then(|emitted| emitted.value.as_ref().as_any().downcast_ref::<T>())
    }

    /// Returns the number of ports with an emitted value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn into_emitted(self) -> impl Iterator<Item = Emitted> {
        self.values.into_iter()
    }
}

impl fmt::Debug for Outputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.values
                    .iter()
                    .map(|emitted| (emitted.port, emitted.value.as_ref())),
            )
            .finish()
    }
}
