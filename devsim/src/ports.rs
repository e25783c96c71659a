//! Ports and couplings.
//!
//!
//! # Ports
//!
//! A port is a named, typed endpoint of a model. Ports are plain `Copy`
//! handles made of a static name and a message type, so models usually expose
//! them as associated constants:
//!
//! ```
//! use devsim::ports::{InPort, OutPort, PortSet};
//!
//! pub struct Relay;
//!
//! impl Relay {
//!     pub const IN: InPort<u32> = InPort::new("in");
//!     pub const OUT: OutPort<u32> = OutPort::new("out");
//!
//!     pub fn ports() -> PortSet {
//!         PortSet::new().with_input(Self::IN).with_output(Self::OUT)
//!     }
//! }
//! ```
//!
//! Any `Clone + Debug + PartialEq + Send + 'static` type can be carried by a
//! port; such types automatically implement [`Message`]. Port handles only
//! name a port: the model owning the port is determined by the
//! [`ModelHandle`](crate::model::ModelHandle) used to build a coupling, and a
//! port is only usable once declared in the [`PortSet`] of its model.
//!
//! During a transition, the values received on input ports are read from an
//! [`Inputs`] bag and the values emitted by the output function are written to
//! an [`Outputs`] bag. A port with nothing to emit is simply absent from the
//! bag.
//!
//!
//! # Couplings
//!
//! Couplings are declared inside a [`CoupledModel`](crate::model::CoupledModel)
//! between a [`Source`] and a [`Sink`] carrying the same message type:
//!
//! * an output port of a child model, or an input port of the coupled model
//!   itself, is a source,
//! * an input port of a child model, or an output port of the coupled model
//!   itself, is a sink.
//!
//! Input and output ports of coupled models are pass-through ports: values
//! cross them within the same simulated instant, which is how couplings reach
//! models located at different depths of the hierarchy.
//!
//! A source may be coupled to any number of sinks, but a sink accepts a single
//! source since there is no policy to merge simultaneous values.
mod bag;
mod coupling;
mod port;

pub use bag::{Inputs, Outputs};
pub use coupling::{Sink, Source};
pub use port::{InPort, Message, OutPort, PortSet};

pub(crate) use bag::Emitted;
pub(crate) use coupling::{Coupling, Endpoint, Owner};
pub(crate) use port::Direction;
