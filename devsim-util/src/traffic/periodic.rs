//! Periodic intersection with a policeman taking over the traffic light.
//!
//! ```text
//! ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┓
//! ┃ TrafficSystem                               ┃
//! ┃   ┌───────────┐         ┌──────────────┐    ┃
//! ┃   │           │   OUT   │              │    ┃
//! ┃   │ policeman ├────────►│ trafficLight │    ┃
//! ┃   │           │INTERRUPT│              │    ┃
//! ┃   └───────────┘         └──────────────┘    ┃
//! ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛
//! ```
//!
//! The traffic light cycles autonomously through red (60 time units), green
//! (50) and yellow (10). Its observer is colourblind: leaving red or yellow
//! is reported as grey, leaving green as yellow.
//!
//! The policeman alternates between idle (200 time units) and working (100).
//! When it starts working it switches the light to manual mode, in which the
//! light stays until the policeman, done working, sends it back to red.

use devsim::model::{Atomic, AtomicModel, CoupledModel, UnknownState};
use devsim::ports::{InPort, Inputs, OutPort, Outputs, PortSet};
use devsim::simulation::ConfigurationError;
use devsim::time::TimeAdvance;

/// Initial elapsed time of the traffic light.
pub const LIGHT_INITIAL_ELAPSED: f64 = 1.5;

/// Mode change requested by the policeman.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// Switch the light to manual mode.
    ToManual,
    /// Give the light back its autonomous cycle.
    ToAutonomous,
}

/// What a colourblind observer sees of a light change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Observation {
    /// Red or green.
    Grey,
    /// Yellow.
    Yellow,
}

/// Autonomous traffic light.
#[derive(Debug)]
pub struct TrafficLight;

impl TrafficLight {
    /// Mode changes.
    pub const INTERRUPT: InPort<Interrupt> = InPort::new("INTERRUPT");
    /// Observed colour changes.
    pub const OBSERVED: OutPort<Observation> = OutPort::new("OBSERVED");
}

/// State of the [`TrafficLight`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LightMode {
    /// Red, for 60 time units.
    #[default]
    Red,
    /// Green, for 50 time units.
    Green,
    /// Yellow, for 10 time units.
    Yellow,
    /// Controlled by the policeman.
    Manual,
}

impl Atomic for TrafficLight {
    type State = LightMode;

    fn ports(&self) -> PortSet {
        PortSet::new()
            .with_input(Self::INTERRUPT)
            .with_output(Self::OBSERVED)
    }

    fn time_advance(&self, mode: &LightMode) -> Result<TimeAdvance, UnknownState> {
        Ok(match mode {
            LightMode::Red => TimeAdvance::Finite(60.0),
            LightMode::Green => TimeAdvance::Finite(50.0),
            LightMode::Yellow => TimeAdvance::Finite(10.0),
            LightMode::Manual => TimeAdvance::Infinite,
        })
    }

    fn output(&self, mode: &LightMode, outputs: &mut Outputs) -> Result<(), UnknownState> {
        let observation = match mode {
            LightMode::Red | LightMode::Yellow => Observation::Grey,
            LightMode::Green => Observation::Yellow,
            LightMode::Manual => return Err(UnknownState::new(mode)),
        };
        outputs.send(Self::OBSERVED, observation);

        Ok(())
    }

    fn internal(&self, mode: &LightMode) -> Result<LightMode, UnknownState> {
        match mode {
            LightMode::Red => Ok(LightMode::Green),
            LightMode::Green => Ok(LightMode::Yellow),
            LightMode::Yellow => Ok(LightMode::Red),
            LightMode::Manual => Err(UnknownState::new(mode)),
        }
    }

    fn external(
        &self,
        mode: &LightMode,
        _elapsed: f64,
        inputs: &Inputs,
    ) -> Result<LightMode, UnknownState> {
        match (inputs.get(Self::INTERRUPT), mode) {
            (Some(Interrupt::ToManual), _) => Ok(LightMode::Manual),
            (Some(Interrupt::ToAutonomous), LightMode::Manual) => Ok(LightMode::Red),
            (Some(Interrupt::ToAutonomous), mode) => Ok(*mode),
            (None, mode) => Err(UnknownState::new(mode)),
        }
    }
}

/// Policeman periodically taking control of the light.
#[derive(Debug)]
pub struct Policeman;

impl Policeman {
    /// Mode change requests.
    pub const OUT: OutPort<Interrupt> = OutPort::new("OUT");
}

/// State of the [`Policeman`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Duty {
    /// Off duty.
    #[default]
    Idle,
    /// Controlling the light.
    Working,
}

impl Atomic for Policeman {
    type State = Duty;

    fn ports(&self) -> PortSet {
        PortSet::new().with_output(Self::OUT)
    }

    fn time_advance(&self, duty: &Duty) -> Result<TimeAdvance, UnknownState> {
        Ok(match duty {
            Duty::Idle => TimeAdvance::Finite(200.0),
            Duty::Working => TimeAdvance::Finite(100.0),
        })
    }

    fn output(&self, duty: &Duty, outputs: &mut Outputs) -> Result<(), UnknownState> {
        let interrupt = match duty {
            Duty::Idle => Interrupt::ToManual,
            Duty::Working => Interrupt::ToAutonomous,
        };
        outputs.send(Self::OUT, interrupt);

        Ok(())
    }

    fn internal(&self, duty: &Duty) -> Result<Duty, UnknownState> {
        Ok(match duty {
            Duty::Idle => Duty::Working,
            Duty::Working => Duty::Idle,
        })
    }
}

/// Builds the traffic system.
///
/// The policeman goes first when both models are due at the same time.
pub fn traffic_system() -> Result<CoupledModel, ConfigurationError> {
    let mut system = CoupledModel::new("TrafficSystem");

    let policeman = system.add_submodel(AtomicModel::new("policeman", Policeman, Duty::Idle))?;
    let light = system.add_submodel(
        AtomicModel::new("trafficLight", TrafficLight, LightMode::Red)
            .with_elapsed(LIGHT_INITIAL_ELAPSED),
    )?;

    system.connect(
        policeman.output(Policeman::OUT),
        light.input(TrafficLight::INTERRUPT),
    )?;
    system.set_select(move |candidates| {
        if candidates.contains(&policeman) {
            Some(policeman)
        } else {
            candidates.first().copied()
        }
    });

    Ok(system)
}
