//! A hierarchical discrete-event simulation kernel based on the DEVS
//! formalism.
//!
//! devsim executes a tree of state machines, the *models*, over a shared
//! logical timeline. Each leaf model spontaneously transitions after a delay
//! that depends on its state, and may also react to the messages produced by
//! other models. Models are assembled into larger models by coupling their
//! typed ports, and the resulting hierarchy is simulated as a whole.
//!
//! Execution is sequential and fully deterministic: when several models are
//! due at the same instant, the order in which they fire is decided by the
//! tie-break functions of the coupled models that contain them, never by
//! chance.
//!
//! # A practical overview
//!
//! Simulating a system typically involves three distinct activities:
//!
//! 1. the design of atomic models, each a small state machine,
//! 2. the assembly of coupled models from atomic and coupled models,
//!    performed by coupling model ports,
//! 3. the execution of the simulation, which advances the simulation time
//!    from one event to the next and reports every emitted value.
//!
//! ## Authoring models
//!
//! An atomic model is a type implementing the [`Atomic`](model::Atomic)
//! trait. Its state is a separate value of type
//! [`Atomic::State`](model::Atomic::State) that the transition functions
//! replace as a whole:
//!
//! * [`time_advance`](model::Atomic::time_advance) returns the time the model
//!   stays in a state before an internal transition,
//! * [`output`](model::Atomic::output) emits values on output ports just
//!   before an internal transition,
//! * [`internal`](model::Atomic::internal) and
//!   [`external`](model::Atomic::external) compute the next state after a
//!   spontaneous transition or after the reception of values on input ports,
//! * [`confluent`](model::Atomic::confluent) handles the coincidence of both.
//!
//! Ports are typed handles, [`InPort`](ports::InPort) and
//! [`OutPort`](ports::OutPort), usually declared as associated constants:
//!
//! ```
//! use devsim::model::{Atomic, UnknownState};
//! use devsim::ports::{InPort, Inputs, OutPort, Outputs, PortSet};
//! use devsim::time::TimeAdvance;
//!
//! /// Counts the items it receives and reports the count one time unit
//! /// after each reception.
//! pub struct Counter;
//!
//! impl Counter {
//!     pub const ITEM: InPort<()> = InPort::new("item");
//!     pub const COUNT: OutPort<u64> = OutPort::new("count");
//! }
//!
//! #[derive(Clone, Debug)]
//! pub struct CounterState {
//!     count: u64,
//!     reporting: bool,
//! }
//!
//! impl Atomic for Counter {
//!     type State = CounterState;
//!
//!     fn ports(&self) -> PortSet {
//!         PortSet::new().with_input(Self::ITEM).with_output(Self::COUNT)
//!     }
//!     fn time_advance(&self, state: &CounterState) -> Result<TimeAdvance, UnknownState> {
//!         Ok(if state.reporting {
//!             TimeAdvance::Finite(1.0)
//!         } else {
//!             TimeAdvance::Infinite
//!         })
//!     }
//!     fn output(&self, state: &CounterState, outputs: &mut Outputs) -> Result<(), UnknownState> {
//!         outputs.send(Self::COUNT, state.count);
//!         Ok(())
//!     }
//!     fn internal(&self, state: &CounterState) -> Result<CounterState, UnknownState> {
//!         Ok(CounterState { reporting: false, ..state.clone() })
//!     }
//!     fn external(
//!         &self,
//!         state: &CounterState,
//!         _elapsed: f64,
//!         inputs: &Inputs,
//!     ) -> Result<CounterState, UnknownState> {
//!         Ok(CounterState {
//!             count: state.count + inputs.contains(Self::ITEM) as u64,
//!             reporting: true,
//!         })
//!     }
//! }
//! ```
//!
//! A state that a transition function does not expect is reported by
//! returning an [`UnknownState`](model::UnknownState) error, which aborts the
//! simulation with the identity of the model attached.
//!
//! ## Assembling hierarchies
//!
//! A [`CoupledModel`](model::CoupledModel) owns child models and the
//! couplings between their ports. Couplings may also involve the
//! pass-through ports of the coupled model itself, so hierarchies can be
//! nested to any depth. Ports are checked for existence and type when they
//! are coupled, and a port may only be fed by a single source.
//!
//! ```
//! # mod models {
//! #     use devsim::model::{Atomic, UnknownState};
//! #     use devsim::ports::{InPort, Inputs, OutPort, Outputs, PortSet};
//! #     use devsim::time::TimeAdvance;
//! #     pub struct Ticker;
//! #     impl Ticker {
//! #         pub const TICK: OutPort<()> = OutPort::new("tick");
//! #     }
//! #     impl Atomic for Ticker {
//! #         type State = ();
//! #         fn ports(&self) -> PortSet { PortSet::new().with_output(Self::TICK) }
//! #         fn time_advance(&self, _: &()) -> Result<TimeAdvance, UnknownState> { Ok(TimeAdvance::Finite(2.0)) }
//! #         fn output(&self, _: &(), outputs: &mut Outputs) -> Result<(), UnknownState> { outputs.send(Self::TICK, ()); Ok(()) }
//! #         fn internal(&self, _: &()) -> Result<(), UnknownState> { Ok(()) }
//! #     }
//! #     pub struct Counter;
//! #     impl Counter {
//! #         pub const ITEM: InPort<()> = InPort::new("item");
//! #         pub const COUNT: OutPort<u64> = OutPort::new("count");
//! #     }
//! #     impl Atomic for Counter {
//! #         type State = (u64, bool);
//! #         fn ports(&self) -> PortSet { PortSet::new().with_input(Self::ITEM).with_output(Self::COUNT) }
//! #         fn time_advance(&self, s: &(u64, bool)) -> Result<TimeAdvance, UnknownState> {
//! #             Ok(if s.1 { TimeAdvance::Finite(1.0) } else { TimeAdvance::Infinite })
//! #         }
//! #         fn output(&self, s: &(u64, bool), outputs: &mut Outputs) -> Result<(), UnknownState> { outputs.send(Self::COUNT, s.0); Ok(()) }
//! #         fn internal(&self, s: &(u64, bool)) -> Result<(u64, bool), UnknownState> { Ok((s.0, false)) }
//! #         fn external(&self, s: &(u64, bool), _: f64, _: &Inputs) -> Result<(u64, bool), UnknownState> { Ok((s.0 + 1, true)) }
//! #     }
//! # }
//! use devsim::model::{AtomicModel, CoupledModel};
//! use devsim::ports::OutPort;
//!
//! use models::{Counter, Ticker};
//!
//! const COUNT: OutPort<u64> = OutPort::new("count");
//!
//! let mut bench = CoupledModel::new("bench");
//! let count = bench.add_out_port(COUNT)?;
//! let ticker = bench.add_submodel(AtomicModel::new("ticker", Ticker, ()))?;
//! let counter = bench.add_submodel(AtomicModel::new("counter", Counter, (0, false)))?;
//!
//! bench.connect(ticker.output(Ticker::TICK), counter.input(Counter::ITEM))?;
//! bench.connect(counter.output(Counter::COUNT), count)?;
//!
//! # Ok::<(), devsim::simulation::ConfigurationError>(())
//! ```
//!
//! When several children of a coupled model are due at the same instant, the
//! coupled model decides which one fires first with the function set by
//! [`CoupledModel::set_select`](model::CoupledModel::set_select) or
//! [`CoupledModel::set_priority`](model::CoupledModel::set_priority). A tie
//! that a coupled model cannot break is an error.
//!
//! ## Running simulations
//!
//! A simulation is built by [`SimInit`](simulation::SimInit), which takes
//! ownership of the root model, validates the hierarchy and registers the
//! sinks that receive the [`TraceRecord`](trace::TraceRecord)s, one for each
//! emitted value. The [`Simulation`](simulation::Simulation) can then be
//! advanced iteration by iteration, up to a deadline or until no event
//! remains, and inputs can be scheduled on the ports of the root model.
//!
//! ```
//! # mod models {
//! #     use devsim::model::{Atomic, UnknownState};
//! #     use devsim::ports::{InPort, Inputs, OutPort, Outputs, PortSet};
//! #     use devsim::time::TimeAdvance;
//! #     pub struct Ticker;
//! #     impl Ticker {
//! #         pub const TICK: OutPort<()> = OutPort::new("tick");
//! #     }
//! #     impl Atomic for Ticker {
//! #         type State = ();
//! #         fn ports(&self) -> PortSet { PortSet::new().with_output(Self::TICK) }
//! #         fn time_advance(&self, _: &()) -> Result<TimeAdvance, UnknownState> { Ok(TimeAdvance::Finite(2.0)) }
//! #         fn output(&self, _: &(), outputs: &mut Outputs) -> Result<(), UnknownState> { outputs.send(Self::TICK, ()); Ok(()) }
//! #         fn internal(&self, _: &()) -> Result<(), UnknownState> { Ok(()) }
//! #     }
//! #     pub struct Counter;
//! #     impl Counter {
//! #         pub const ITEM: InPort<()> = InPort::new("item");
//! #         pub const COUNT: OutPort<u64> = OutPort::new("count");
//! #     }
//! #     impl Atomic for Counter {
//! #         type State = (u64, bool);
//! #         fn ports(&self) -> PortSet { PortSet::new().with_input(Self::ITEM).with_output(Self::COUNT) }
//! #         fn time_advance(&self, s: &(u64, bool)) -> Result<TimeAdvance, UnknownState> {
//! #             Ok(if s.1 { TimeAdvance::Finite(1.0) } else { TimeAdvance::Infinite })
//! #         }
//! #         fn output(&self, s: &(u64, bool), outputs: &mut Outputs) -> Result<(), UnknownState> { outputs.send(Self::COUNT, s.0); Ok(()) }
//! #         fn internal(&self, s: &(u64, bool)) -> Result<(u64, bool), UnknownState> { Ok((s.0, false)) }
//! #         fn external(&self, s: &(u64, bool), _: f64, _: &Inputs) -> Result<(u64, bool), UnknownState> { Ok((s.0 + 1, true)) }
//! #     }
//! # }
//! # use devsim::model::{AtomicModel, CoupledModel};
//! # use models::{Counter, Ticker};
//! # let mut bench = CoupledModel::new("bench");
//! # let ticker = bench.add_submodel(AtomicModel::new("ticker", Ticker, ())).unwrap();
//! # let counter = bench.add_submodel(AtomicModel::new("counter", Counter, (0, false))).unwrap();
//! # bench.connect(ticker.output(Ticker::TICK), counter.input(Counter::ITEM)).unwrap();
//! use devsim::simulation::SimInit;
//! use devsim::time::SimTime;
//! use devsim::trace::TraceBuffer;
//!
//! let trace = TraceBuffer::new();
//! let mut simu = SimInit::new(bench).add_trace_sink(&trace).init(SimTime::ZERO)?;
//!
//! simu.step_until(SimTime::new(5.0).unwrap())?;
//!
//! assert_eq!(simu.state::<(u64, bool)>("bench.counter"), Some(&(2, false)));
//! assert_eq!(
//!     trace.map(|r| r.to_string()).collect::<Vec<_>>(),
//!     [
//!         "2 bench.ticker.tick ()",
//!         "3 bench.counter.count 1",
//!         "4 bench.ticker.tick ()",
//!         "5 bench.counter.count 2",
//!     ]
//! );
//!
//! # Ok::<(), devsim::simulation::SimulationError>(())
//! ```
//!
//! For a plain run from time zero that only needs the trace,
//! [`simulation::run`] is a shortcut for the above.
//!
//!
//! # Feature flags
//!
//! ## Tracing support
//!
//! The kernel emits [`tracing`](https://docs.rs/tracing/latest/tracing/)
//! events for initialization, transitions and routed values. The `tracing`
//! feature additionally provides a timer that stamps log lines with the
//! simulation time:
//!
//! ```toml
//! [dependencies]
//! devsim = { version = "0.1.0", features = ["tracing"] }
//! ```
//!
//! See the `tracing` module for more information.
//!
//!
//! # Other resources
//!
//! The `devsim-util` crate contains two traffic intersection hierarchies
//! built on this crate, a command-line driver and a runnable example.
//!
//! More details are available in the modules' documentation:
//!
//! * the [`model`] module describes the atomic model contract and coupled
//!   models,
//! * the [`ports`] module discusses typed ports and couplings,
//! * the [`simulation`] module details the execution semantics and error
//!   handling,
//! * the [`time`] module introduces simulation timestamps and time advances,
//! * the [`trace`] module presents the trace sinks.
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod model;
pub mod ports;
pub mod simulation;
pub mod time;
pub mod trace;

#[cfg(feature = "tracing")]
pub mod tracing;
