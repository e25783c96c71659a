//! Queue-based intersection.
//!
//! A car generator feeds a traffic light that queues the cars, while a
//! policeman lets them through one at a time:
//!
//! ```text
//! ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┓
//! ┃ G_BP                   ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┓ ┃
//! ┃                        ┃ TrafficSystem                            ┃ ┃
//! ┃ ┌──────────────┐       ┃   ┌──────────────┐OBSERVED  ┌──────────┐ ┃ ┃
//! ┃ │              │gen_   ┃   │              ├─────────►│          │ ┃ ┃
//! ┃ │ GeneratorCar ├──────►╂──►│ trafficLight │ proc_out │policeman │ ┃ ┃
//! ┃ │              │outport┃   │              │◄─────────┤          │ ┃ ┃
//! ┃ └──────────────┘       ┃   └──────────────┘DELETE-  └──────────┘ ┃ ┃
//! ┃                        ┃                   QUEUE                  ┃ ┃
//! ┃                        ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛ ┃
//! ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛
//! ```
//!
//! The generator emits a car every 5 time units. The traffic light waits in
//! yellow while its queue is empty and turns red as soon as a car is queued.
//! Whenever the policeman announces that it is ready, a red light turns green
//! for one time unit, reports whether cars are still waiting, and lets one car
//! through. A policeman told that cars are waiting is busy for 15 time units.
//!
//! When the generator and the traffic system are due at the same time, the
//! generator goes first; within the traffic system, the traffic light goes
//! before the policeman.

use devsim::model::{Atomic, AtomicModel, CoupledModel, UnknownState};
use devsim::ports::{InPort, Inputs, OutPort, Outputs, PortSet};
use devsim::simulation::ConfigurationError;
use devsim::time::TimeAdvance;

/// Delay between two cars.
pub const GENERATOR_PERIOD: f64 = 5.0;
/// Time during which a light stays green.
pub const GREEN_DURATION: f64 = 1.0;
/// Period at which an available policeman announces itself.
pub const READY_PERIOD: f64 = 1.0;
/// Time needed by the policeman to handle waiting cars.
pub const BUSY_DURATION: f64 = 15.0;

/// Busy time left below which the policeman is done.
const BUSY_TOLERANCE: f64 = BUSY_DURATION * f64::EPSILON;

/// Input port of the traffic system.
pub const TRAFFIC_SYSTEM_IN: InPort<NewCar> = InPort::new("TrafficSystem_in");

/// A car entering the intersection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NewCar;

/// Queue observation reported by a green light.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Light {
    /// Cars are still waiting.
    Red,
    /// The queue is empty.
    Green,
}

/// Availability announced by the policeman.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Ready to handle cars.
    Ready,
    /// Handling cars.
    Busy,
}

/// Car generator.
#[derive(Debug)]
pub struct Generator;

impl Generator {
    /// Car output.
    pub const GEN_OUTPORT: OutPort<NewCar> = OutPort::new("gen_outport");
}

/// State of the [`Generator`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GeneratorState {
    /// Waiting for the next car.
    #[default]
    Idle,
    /// About to emit a car.
    Generate,
}

impl Atomic for Generator {
    type State = GeneratorState;

    fn ports(&self) -> PortSet {
        PortSet::new().with_output(Self::GEN_OUTPORT)
    }

    fn time_advance(&self, state: &GeneratorState) -> Result<TimeAdvance, UnknownState> {
        Ok(match state {
            GeneratorState::Idle => TimeAdvance::Finite(GENERATOR_PERIOD),
            GeneratorState::Generate => TimeAdvance::Finite(0.0),
        })
    }

    fn output(&self, state: &GeneratorState, outputs: &mut Outputs) -> Result<(), UnknownState> {
        if *state == GeneratorState::Generate {
            outputs.send(Self::GEN_OUTPORT, NewCar);
        }

        Ok(())
    }

    fn internal(&self, state: &GeneratorState) -> Result<GeneratorState, UnknownState> {
        Ok(match state {
            GeneratorState::Idle => GeneratorState::Generate,
            GeneratorState::Generate => GeneratorState::Idle,
        })
    }
}

/// Traffic light holding a queue of cars.
#[derive(Debug)]
pub struct TrafficLight;

impl TrafficLight {
    /// Incoming cars.
    pub const ADDQUEUE: InPort<NewCar> = InPort::new("ADDQUEUE");
    /// Policeman status.
    pub const DELETEQUEUE: InPort<Status> = InPort::new("DELETEQUEUE");
    /// Queue observation.
    pub const OBSERVED: OutPort<Light> = OutPort::new("OBSERVED");
}

/// Colour of the [`TrafficLight`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    /// No car is waiting.
    Yellow,
    /// Cars are waiting for the policeman.
    Red,
    /// A car is going through.
    Green,
}

/// State of the [`TrafficLight`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrafficLightState {
    /// Current colour.
    pub color: Color,
    /// Number of waiting cars.
    pub queued: usize,
}

impl Default for TrafficLightState {
    fn default() -> Self {
        Self {
            color: Color::Yellow,
            queued: 0,
        }
    }
}

impl Atomic for TrafficLight {
    type State = TrafficLightState;

    fn ports(&self) -> PortSet {
        PortSet::new()
            .with_input(Self::ADDQUEUE)
            .with_input(Self::DELETEQUEUE)
            .with_output(Self::OBSERVED)
    }

    fn time_advance(&self, state: &TrafficLightState) -> Result<TimeAdvance, UnknownState> {
        Ok(match state.color {
            Color::Yellow | Color::Red => TimeAdvance::Infinite,
            Color::Green => TimeAdvance::Finite(GREEN_DURATION),
        })
    }

    fn output(&self, state: &TrafficLightState, outputs: &mut Outputs) -> Result<(), UnknownState> {
        if state.color == Color::Green {
            let light = if state.queued > 0 {
                Light::Red
            } else {
                Light::Green
            };
            outputs.send(Self::OBSERVED, light);
        }

        Ok(())
    }

    fn internal(&self, state: &TrafficLightState) -> Result<TrafficLightState, UnknownState> {
        Ok(match state.color {
            Color::Green if state.queued == 0 => TrafficLightState {
                color: Color::Yellow,
                queued: 0,
            },
            // One car goes through.
            Color::Green => TrafficLightState {
                color: Color::Red,
                queued: state.queued - 1,
            },
            Color::Yellow | Color::Red => *state,
        })
    }

    fn external(
        &self,
        state: &TrafficLightState,
        _elapsed: f64,
        inputs: &Inputs,
    ) -> Result<TrafficLightState, UnknownState> {
        let mut queued = state.queued;
        if inputs.contains(Self::ADDQUEUE) {
            queued += 1;
        }

        let color = match (state.color, inputs.get(Self::DELETEQUEUE)) {
            (Color::Yellow, _) if queued > 0 => Color::Red,
            (Color::Red, Some(Status::Ready)) => Color::Green,
            (color, _) => color,
        };

        Ok(TrafficLightState { color, queued })
    }
}

/// Policeman handling the queued cars.
#[derive(Debug)]
pub struct Policeman;

impl Policeman {
    /// Queue observation.
    pub const PROC_IN: InPort<Light> = InPort::new("proc_in");
    /// Status announcement.
    pub const PROC_OUT: OutPort<Status> = OutPort::new("proc_out");
}

/// State of the [`Policeman`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PolicemanState {
    /// Available, announcing itself periodically.
    Ready,
    /// Handling cars for the remaining time.
    ///
    /// Each interruption subtracts the elapsed time from the remaining time.
    /// When interruptions arrive at non-integer times, the end of the busy
    /// period therefore carries the rounding errors of these subtractions
    /// and may miss an exact tie with another model by a few ulps.
    Busy {
        /// Time left before becoming ready again.
        remaining: f64,
    },
}

impl Atomic for Policeman {
    type State = PolicemanState;

    fn ports(&self) -> PortSet {
        PortSet::new()
            .with_input(Self::PROC_IN)
            .with_output(Self::PROC_OUT)
    }

    fn time_advance(&self, state: &PolicemanState) -> Result<TimeAdvance, UnknownState> {
        Ok(match state {
            PolicemanState::Ready => TimeAdvance::Finite(READY_PERIOD),
            PolicemanState::Busy { remaining } => TimeAdvance::Finite(*remaining),
        })
    }

    fn output(&self, state: &PolicemanState, outputs: &mut Outputs) -> Result<(), UnknownState> {
        let status = match state {
            PolicemanState::Ready => Status::Ready,
            PolicemanState::Busy { .. } => Status::Busy,
        };
        outputs.send(Self::PROC_OUT, status);

        Ok(())
    }

    fn internal(&self, _: &PolicemanState) -> Result<PolicemanState, UnknownState> {
        Ok(PolicemanState::Ready)
    }

    fn external(
        &self,
        state: &PolicemanState,
        elapsed: f64,
        inputs: &Inputs,
    ) -> Result<PolicemanState, UnknownState> {
        Ok(match (state, inputs.get(Self::PROC_IN)) {
            (PolicemanState::Ready, Some(Light::Red)) => PolicemanState::Busy {
                remaining: BUSY_DURATION,
            },
            // Interruptions do not extend the busy period.
            (PolicemanState::Busy { remaining }, _) => {
                let remaining = remaining - elapsed;
                PolicemanState::Busy {
                    remaining: if remaining > BUSY_TOLERANCE {
                        remaining
                    } else {
                        0.0
                    },
                }
            }
            (PolicemanState::Ready, _) => PolicemanState::Ready,
        })
    }
}

/// Returns the car generator alone.
pub fn generator() -> AtomicModel<Generator> {
    AtomicModel::new("GeneratorCar", Generator, GeneratorState::Idle)
}

/// Builds the traffic system made of the traffic light and the policeman.
///
/// The policeman starts ready and announces itself immediately.
pub fn traffic_system() -> Result<CoupledModel, ConfigurationError> {
    let mut system = CoupledModel::new("TrafficSystem");
    let input = system.add_in_port(TRAFFIC_SYSTEM_IN)?;

    let policeman = system.add_submodel(
        AtomicModel::new("policeman", Policeman, PolicemanState::Ready).with_elapsed(READY_PERIOD),
    )?;
    let light = system.add_submodel(AtomicModel::new(
        "trafficLight",
        TrafficLight,
        TrafficLightState::default(),
    ))?;

    system.connect(input, light.input(TrafficLight::ADDQUEUE))?;
    system.connect(
        light.output(TrafficLight::OBSERVED),
        policeman.input(Policeman::PROC_IN),
    )?;
    system.connect(
        policeman.output(Policeman::PROC_OUT),
        light.input(TrafficLight::DELETEQUEUE),
    )?;
    system.set_priority(&[light, policeman]);

    Ok(system)
}

/// Builds the complete intersection: the generator feeding the traffic
/// system.
pub fn g_bp() -> Result<CoupledModel, ConfigurationError> {
    let mut top = CoupledModel::new("G_BP");

    let generator = top.add_submodel(generator())?;
    let system = top.add_submodel(traffic_system()?)?;

    top.connect(
        generator.output(Generator::GEN_OUTPORT),
        system.input(TRAFFIC_SYSTEM_IN),
    )?;
    top.set_priority(&[generator, system]);

    Ok(top)
}
