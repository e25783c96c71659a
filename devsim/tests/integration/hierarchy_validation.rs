//! Checks performed when a simulation is initialized.

use devsim::model::{Atomic, AtomicModel, CoupledModel, TransitionFn, UnknownState};
use devsim::ports::{InPort, OutPort, Outputs, PortSet};
use devsim::simulation::{
    ConfigurationError, SimInit, SimulationError, StructuralCycleError, UnknownStateError,
};
use devsim::time::{SimTime, TimeAdvance};

use crate::test_models::{Counter, Echo, Ticker};

#[test]
fn pass_through_loop() {
    const X: InPort<u64> = InPort::new("x");
    const Y: OutPort<u64> = OutPort::new("y");

    let mut inner = CoupledModel::new("inner");
    let x = inner.add_in_port(X).unwrap();
    let y = inner.add_out_port(Y).unwrap();
    inner.connect(x, y).unwrap();

    let mut top = CoupledModel::new("top");
    let inner = top.add_submodel(inner).unwrap();
    top.connect(inner.output(Y), inner.input(X)).unwrap();

    let error = SimInit::new(top).init(SimTime::ZERO).unwrap_err();

    assert_eq!(
        error,
        SimulationError::StructuralCycle(StructuralCycleError {
            ports: vec![
                "top.inner.x".into(),
                "top.inner.y".into(),
                "top.inner.x".into()
            ]
        })
    );
}

#[test]
fn atomic_output_fed_back_to_itself() {
    let mut top = CoupledModel::new("top");
    let echo = top
        .add_submodel(AtomicModel::new("echo", Echo { delay: 1.0 }, None))
        .unwrap();
    top.connect(echo.output(Echo::OUT), echo.input(Echo::IN))
        .unwrap();

    let error = SimInit::new(top).init(SimTime::ZERO).unwrap_err();

    assert_eq!(
        error,
        SimulationError::StructuralCycle(StructuralCycleError {
            ports: vec![
                "top.echo.out".into(),
                "top.echo.in".into(),
                "top.echo.out".into()
            ]
        })
    );
}

#[test]
fn atomic_output_fed_back_through_hierarchy() {
    const IN: InPort<u64> = InPort::new("in");
    const OUT: OutPort<u64> = OutPort::new("out");

    let mut inner = CoupledModel::new("inner");
    let input = inner.add_in_port(IN).unwrap();
    let output = inner.add_out_port(OUT).unwrap();
    let echo = inner
        .add_submodel(AtomicModel::new("echo", Echo { delay: 1.0 }, None))
        .unwrap();
    inner.connect(input, echo.input(Echo::IN)).unwrap();
    inner.connect(echo.output(Echo::OUT), output).unwrap();

    let mut top = CoupledModel::new("top");
    let inner = top.add_submodel(inner).unwrap();
    top.connect(inner.output(OUT), inner.input(IN)).unwrap();

    let error = SimInit::new(top).init(SimTime::ZERO).unwrap_err();

    assert!(matches!(
        error,
        SimulationError::StructuralCycle(StructuralCycleError { ports }) if ports.len() == 5
    ));
}

#[test]
fn loop_between_two_atomic_models_is_allowed() {
    let mut top = CoupledModel::new("top");
    let ping = top
        .add_submodel(AtomicModel::new("ping", Echo { delay: 1.0 }, Some(0)))
        .unwrap();
    let pong = top
        .add_submodel(AtomicModel::new("pong", Echo { delay: 1.0 }, None))
        .unwrap();
    top.connect(ping.output(Echo::OUT), pong.input(Echo::IN))
        .unwrap();
    top.connect(pong.output(Echo::OUT), ping.input(Echo::IN))
        .unwrap();

    let mut simu = SimInit::new(top).init(SimTime::ZERO).unwrap();
    simu.step_until(SimTime::new(4.5).unwrap()).unwrap();

    assert_eq!(simu.state::<Option<u64>>("top.ping"), Some(&Some(0)));
    assert_eq!(simu.state::<Option<u64>>("top.pong"), Some(&None));
}

#[test]
fn elapsed_beyond_time_advance() {
    let root = AtomicModel::new("ticker", Ticker::new(2.0), 0).with_elapsed(2.5);

    assert_eq!(
        SimInit::new(root).init(SimTime::ZERO).unwrap_err(),
        SimulationError::Configuration(ConfigurationError::InvalidElapsed {
            model: "ticker".into(),
            elapsed: 2.5,
            time_advance: TimeAdvance::Finite(2.0)
        })
    );
}

#[test]
fn negative_elapsed() {
    let mut top = CoupledModel::new("top");
    top.add_submodel(AtomicModel::new("counter", Counter, 0).with_elapsed(-1.0))
        .unwrap();

    assert!(matches!(
        SimInit::new(top).init(SimTime::ZERO),
        Err(SimulationError::Configuration(
            ConfigurationError::InvalidElapsed { .. }
        ))
    ));
}

/// Only knows non-negative states.
struct Picky;

impl Atomic for Picky {
    type State = i32;

    fn ports(&self) -> PortSet {
        PortSet::new()
    }
    fn time_advance(&self, state: &i32) -> Result<TimeAdvance, UnknownState> {
        match *state {
            s if s < 0 => Err(UnknownState::new(state)),
            0 => Ok(TimeAdvance::Finite(-1.0)),
            _ => Ok(TimeAdvance::Infinite),
        }
    }
    fn output(&self, _: &i32, _: &mut Outputs) -> Result<(), UnknownState> {
        Ok(())
    }
    fn internal(&self, state: &i32) -> Result<i32, UnknownState> {
        Ok(*state)
    }
}

#[test]
fn unknown_initial_state() {
    let mut top = CoupledModel::new("top");
    top.add_submodel(AtomicModel::new("picky", Picky, -3)).unwrap();

    assert_eq!(
        SimInit::new(top).init(SimTime::ZERO).unwrap_err(),
        SimulationError::UnknownState(UnknownStateError {
            model: "top.picky".into(),
            function: TransitionFn::TimeAdvance,
            state: "-3".into()
        })
    );
}

#[test]
fn negative_time_advance() {
    assert_eq!(
        SimInit::new(AtomicModel::new("picky", Picky, 0))
            .init(SimTime::ZERO)
            .unwrap_err(),
        SimulationError::Configuration(ConfigurationError::InvalidTimeAdvance {
            model: "picky".into(),
            state: "0".into(),
            time_advance: TimeAdvance::Finite(-1.0)
        })
    );
}

#[test]
fn time_advance_overflowing_the_clock() {
    let start = SimTime::new(1e300).unwrap();

    assert_eq!(
        SimInit::new(AtomicModel::new("ticker", Ticker::new(f64::MAX), 0))
            .init(start)
            .unwrap_err(),
        SimulationError::Configuration(ConfigurationError::InvalidTimeAdvance {
            model: "ticker".into(),
            state: "0".into(),
            time_advance: TimeAdvance::Finite(f64::MAX)
        })
    );
}

/// Declares the same port twice.
struct Sloppy;

impl Atomic for Sloppy {
    type State = ();

    fn ports(&self) -> PortSet {
        PortSet::new()
            .with_input(Counter::IN)
            .with_input(Counter::IN)
    }
    fn time_advance(&self, _: &()) -> Result<TimeAdvance, UnknownState> {
        Ok(TimeAdvance::Infinite)
    }
    fn output(&self, _: &(), _: &mut Outputs) -> Result<(), UnknownState> {
        Ok(())
    }
    fn internal(&self, _: &()) -> Result<(), UnknownState> {
        Ok(())
    }
}

#[test]
fn duplicate_port_declaration() {
    let expected = ConfigurationError::DuplicatePort {
        model: "sloppy".into(),
        port: "in",
    };

    let mut top = CoupledModel::new("top");
    assert_eq!(
        top.add_submodel(AtomicModel::new("sloppy", Sloppy, ())),
        Err(expected.clone())
    );
    assert_eq!(
        SimInit::new(AtomicModel::new("sloppy", Sloppy, ()))
            .init(SimTime::ZERO)
            .unwrap_err(),
        SimulationError::Configuration(expected)
    );
}

#[test]
fn duplicate_names_and_fan_in() {
    let mut top = CoupledModel::new("top");
    let a = top
        .add_submodel(AtomicModel::new("a", Ticker::new(1.0), 0))
        .unwrap();
    let b = top
        .add_submodel(AtomicModel::new("b", Ticker::new(1.0), 0))
        .unwrap();
    let counter = top.add_submodel(AtomicModel::new("counter", Counter, 0)).unwrap();

    assert!(matches!(
        top.add_submodel(AtomicModel::new("a", Counter, 0)),
        Err(ConfigurationError::DuplicateName { .. })
    ));

    top.connect(a.output(Ticker::TICK), counter.input(Counter::IN))
        .unwrap();
    assert!(matches!(
        top.connect(a.output(Ticker::TICK), counter.input(Counter::IN)),
        Err(ConfigurationError::DuplicateCoupling { .. })
    ));
    assert!(matches!(
        top.connect(b.output(Ticker::TICK), counter.input(Counter::IN)),
        Err(ConfigurationError::FanIn { .. })
    ));
}

#[test]
fn undeclared_and_mistyped_ports() {
    const MISSING: InPort<u64> = InPort::new("missing");
    const MISTYPED: InPort<String> = InPort::new("in");
    const MISTYPED_TICK: OutPort<String> = OutPort::new("tick");

    let mut top = CoupledModel::new("top");
    let ticker = top
        .add_submodel(AtomicModel::new("ticker", Ticker::new(1.0), 0))
        .unwrap();
    let counter = top.add_submodel(AtomicModel::new("counter", Counter, 0)).unwrap();

    assert_eq!(
        top.connect(ticker.output(Ticker::TICK), counter.input(MISSING)),
        Err(ConfigurationError::UndeclaredInput {
            model: "counter".into(),
            port: "missing"
        })
    );
    assert!(matches!(
        top.connect(ticker.output(MISTYPED_TICK), counter.input(MISTYPED)),
        Err(ConfigurationError::PortTypeMismatch { port: "tick", .. })
    ));
}
