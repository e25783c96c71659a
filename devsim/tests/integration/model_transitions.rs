//! Transition ordering and timing of atomic models.

use devsim::model::{Atomic, AtomicModel, CoupledModel, UnknownState};
use devsim::ports::{InPort, Inputs, OutPort, Outputs, PortSet};
use devsim::simulation::{SimInit, Stop};
use devsim::time::{SimTime, TimeAdvance};
use devsim::trace::TraceBuffer;

use crate::test_models::{Counter, Echo, Ticker};

fn t(t: f64) -> SimTime {
    SimTime::new(t).unwrap()
}

/// Emits a single value after one time unit.
struct OneShot;

impl OneShot {
    const OUT: OutPort<i64> = OutPort::new("out");
}

impl Atomic for OneShot {
    type State = bool;

    fn ports(&self) -> PortSet {
        PortSet::new().with_output(Self::OUT)
    }
    fn time_advance(&self, done: &bool) -> Result<TimeAdvance, UnknownState> {
        Ok(if *done {
            TimeAdvance::Infinite
        } else {
            TimeAdvance::Finite(1.0)
        })
    }
    fn output(&self, _: &bool, outputs: &mut Outputs) -> Result<(), UnknownState> {
        outputs.send(Self::OUT, 1);
        Ok(())
    }
    fn internal(&self, _: &bool) -> Result<bool, UnknownState> {
        Ok(true)
    }
}

/// Doubles its value on an internal transition and adds the received value
/// on an external transition.
struct Accumulator {
    external_first: bool,
}

impl Accumulator {
    const IN: InPort<i64> = InPort::new("in");
}

#[derive(Clone, Debug, PartialEq)]
struct Acc {
    value: i64,
    armed: bool,
}

impl Atomic for Accumulator {
    type State = Acc;

    fn ports(&self) -> PortSet {
        PortSet::new().with_input(Self::IN)
    }
    fn time_advance(&self, state: &Acc) -> Result<TimeAdvance, UnknownState> {
        Ok(if state.armed {
            TimeAdvance::Finite(1.0)
        } else {
            TimeAdvance::Infinite
        })
    }
    fn output(&self, _: &Acc, _: &mut Outputs) -> Result<(), UnknownState> {
        Ok(())
    }
    fn internal(&self, state: &Acc) -> Result<Acc, UnknownState> {
        Ok(Acc {
            value: state.value * 2,
            armed: false,
        })
    }
    fn external(&self, state: &Acc, _: f64, inputs: &Inputs) -> Result<Acc, UnknownState> {
        Ok(Acc {
            value: state.value + inputs.get(Self::IN).copied().unwrap_or(0),
            ..state.clone()
        })
    }
    fn confluent(&self, state: &Acc, inputs: &Inputs) -> Result<Acc, UnknownState> {
        if self.external_first {
            let intermediate = self.external(state, 0.0, inputs)?;
            self.internal(&intermediate)
        } else {
            let intermediate = self.internal(state)?;
            self.external(&intermediate, 0.0, inputs)
        }
    }
}

fn confluent_bench(external_first: bool) -> CoupledModel {
    let mut top = CoupledModel::new("top");
    let shot = top.add_submodel(AtomicModel::new("shot", OneShot, false)).unwrap();
    let acc = top
        .add_submodel(AtomicModel::new(
            "acc",
            Accumulator { external_first },
            Acc {
                value: 3,
                armed: true,
            },
        ))
        .unwrap();
    top.connect(shot.output(OneShot::OUT), acc.input(Accumulator::IN))
        .unwrap();
    top.set_priority(&[shot, acc]);

    top
}

#[test]
fn confluent_applies_internal_then_external() {
    crate::init_logging();

    let mut simu = SimInit::new(confluent_bench(false)).init(SimTime::ZERO).unwrap();

    assert_eq!(simu.step_until(t(10.0)).unwrap(), Stop::Quiescent);
    assert_eq!(
        simu.state::<Acc>("top.acc"),
        Some(&Acc {
            value: 7,
            armed: false
        })
    );
    assert!(simu.time_advance("top.acc").unwrap().is_passive());
    assert!(simu.time_advance("top.shot").unwrap().is_passive());
}

#[test]
fn confluent_policy_is_overridable() {
    crate::init_logging();

    let mut simu = SimInit::new(confluent_bench(true)).init(SimTime::ZERO).unwrap();

    simu.step_until(t(10.0)).unwrap();

    assert_eq!(simu.state::<Acc>("top.acc").map(|acc| acc.value), Some(8));
}

#[test]
fn passive_hierarchy_is_quiescent() {
    crate::init_logging();

    let mut top = CoupledModel::new("top");
    top.add_submodel(AtomicModel::new("counter", Counter, 0)).unwrap();
    top.add_submodel(AtomicModel::new("echo", Echo { delay: 1.0 }, None))
        .unwrap();

    let trace = TraceBuffer::new();
    let mut simu = SimInit::new(top)
        .add_trace_sink(&trace)
        .init(SimTime::ZERO)
        .unwrap();

    assert_eq!(simu.next_event_time(), None);
    assert_eq!(simu.step().unwrap(), None);
    assert_eq!(simu.step_until(t(100.0)).unwrap(), Stop::Quiescent);
    assert_eq!(simu.time(), t(100.0));
    assert!(trace.is_empty());
}

/// Counts down, without delay, then stays passive.
struct Burst;

impl Burst {
    const OUT: OutPort<u32> = OutPort::new("out");
}

impl Atomic for Burst {
    type State = u32;

    fn ports(&self) -> PortSet {
        PortSet::new().with_output(Self::OUT)
    }
    fn time_advance(&self, n: &u32) -> Result<TimeAdvance, UnknownState> {
        Ok(if *n > 0 {
            TimeAdvance::Finite(0.0)
        } else {
            TimeAdvance::Infinite
        })
    }
    fn output(&self, n: &u32, outputs: &mut Outputs) -> Result<(), UnknownState> {
        outputs.send(Self::OUT, *n);
        Ok(())
    }
    fn internal(&self, n: &u32) -> Result<u32, UnknownState> {
        Ok(n - 1)
    }
}

#[test]
fn zero_time_advance_runs_successive_iterations() {
    crate::init_logging();

    let trace = TraceBuffer::new();
    let mut simu = SimInit::new(AtomicModel::new("burst", Burst, 3))
        .add_trace_sink(&trace)
        .init(t(2.0))
        .unwrap();

    assert_eq!(simu.step().unwrap(), Some(t(2.0)));
    assert_eq!(simu.step().unwrap(), Some(t(2.0)));
    assert_eq!(simu.step().unwrap(), Some(t(2.0)));
    assert_eq!(simu.step().unwrap(), None);

    let values: Vec<_> = trace.map(|r| *r.value::<u32>().unwrap()).collect();
    assert_eq!(values, vec![3, 2, 1]);
}

#[test]
fn initial_elapsed_shifts_first_event() {
    crate::init_logging();

    let trace = TraceBuffer::new();
    let mut simu = SimInit::new(AtomicModel::new("ticker", Ticker::new(10.0), 0).with_elapsed(4.0))
        .add_trace_sink(&trace)
        .init(SimTime::ZERO)
        .unwrap();

    assert_eq!(simu.elapsed("ticker"), Some(4.0));
    assert_eq!(simu.next_event_time(), Some(t(6.0)));

    simu.step_until(t(20.0)).unwrap();

    let times: Vec<_> = trace.map(|r| r.time.as_f64()).collect();
    assert_eq!(times, vec![6.0, 16.0]);
    assert_eq!(simu.elapsed("ticker"), Some(4.0));
}

#[test]
fn elapsed_never_exceeds_time_advance() {
    crate::init_logging();

    let mut top = CoupledModel::new("top");
    let ticker = top
        .add_submodel(AtomicModel::new("ticker", Ticker::new(3.0), 0))
        .unwrap();
    let echo = top
        .add_submodel(AtomicModel::new("echo", Echo { delay: 2.0 }, None))
        .unwrap();
    top.connect(ticker.output(Ticker::TICK), echo.input(Echo::IN))
        .unwrap();

    let mut simu = SimInit::new(top).init(SimTime::ZERO).unwrap();

    for step in 1..=40 {
        simu.step_until(t(step as f64 * 0.5)).unwrap();

        for path in ["top.ticker", "top.echo"] {
            let elapsed = simu.elapsed(path).unwrap();
            let time_advance = simu.time_advance(path).unwrap();

            assert!(elapsed >= 0.0);
            if let Some(d) = time_advance.finite() {
                assert!(elapsed <= d);
            }
        }
    }
}

/// Records the elapsed time seen by its external transition.
struct ElapsedRecorder;

impl ElapsedRecorder {
    const IN: InPort<u64> = InPort::new("in");
}

impl Atomic for ElapsedRecorder {
    type State = Option<f64>;

    fn ports(&self) -> PortSet {
        PortSet::new().with_input(Self::IN)
    }
    fn time_advance(&self, _: &Option<f64>) -> Result<TimeAdvance, UnknownState> {
        Ok(TimeAdvance::Infinite)
    }
    fn output(&self, _: &Option<f64>, _: &mut Outputs) -> Result<(), UnknownState> {
        Ok(())
    }
    fn internal(&self, state: &Option<f64>) -> Result<Option<f64>, UnknownState> {
        Err(UnknownState::new(state))
    }
    fn external(
        &self,
        _: &Option<f64>,
        elapsed: f64,
        _: &Inputs,
    ) -> Result<Option<f64>, UnknownState> {
        Ok(Some(elapsed))
    }
}

#[test]
fn external_transition_receives_elapsed_time() {
    crate::init_logging();

    let mut top = CoupledModel::new("top");
    let ticker = top
        .add_submodel(AtomicModel::new("ticker", Ticker::new(3.0), 0))
        .unwrap();
    let recorder = top
        .add_submodel(AtomicModel::new("recorder", ElapsedRecorder, None).with_elapsed(1.0))
        .unwrap();
    top.connect(ticker.output(Ticker::TICK), recorder.input(ElapsedRecorder::IN))
        .unwrap();

    let mut simu = SimInit::new(top).init(SimTime::ZERO).unwrap();

    simu.step().unwrap();
    assert_eq!(simu.state::<Option<f64>>("top.recorder"), Some(&Some(4.0)));
    assert_eq!(simu.elapsed("top.recorder"), Some(0.0));

    simu.step().unwrap();
    assert_eq!(simu.state::<Option<f64>>("top.recorder"), Some(&Some(3.0)));
}

#[test]
fn values_cross_pass_through_ports() {
    crate::init_logging();

    const FORWARD: InPort<u64> = InPort::new("forward");
    const RESULT: OutPort<u64> = OutPort::new("result");

    let mut inner = CoupledModel::new("inner");
    let forward = inner.add_in_port(FORWARD).unwrap();
    let result = inner.add_out_port(RESULT).unwrap();
    let echo = inner
        .add_submodel(AtomicModel::new("echo", Echo { delay: 0.5 }, None))
        .unwrap();
    inner.connect(forward, echo.input(Echo::IN)).unwrap();
    inner.connect(echo.output(Echo::OUT), result).unwrap();

    let mut top = CoupledModel::new("top");
    let ticker = top
        .add_submodel(AtomicModel::new("ticker", Ticker::new(1.0), 0))
        .unwrap();
    let inner = top.add_submodel(inner).unwrap();
    let counter = top.add_submodel(AtomicModel::new("counter", Counter, 0)).unwrap();
    top.connect(ticker.output(Ticker::TICK), inner.input(FORWARD))
        .unwrap();
    top.connect(inner.output(RESULT), counter.input(Counter::IN))
        .unwrap();

    let trace = TraceBuffer::new();
    let mut simu = SimInit::new(top)
        .add_trace_sink(&trace)
        .init(SimTime::ZERO)
        .unwrap();
    simu.step_until(t(3.0)).unwrap();

    assert_eq!(
        simu.model_paths().collect::<Vec<_>>(),
        vec!["top.ticker", "top.inner.echo", "top.counter"]
    );
    assert_eq!(simu.state::<u64>("top.counter"), Some(&2));
    assert_eq!(
        trace.map(|r| r.to_string()).collect::<Vec<_>>(),
        vec![
            "1 top.ticker.tick 1",
            "1.5 top.inner.echo.out 1",
            "2 top.ticker.tick 2",
            "2.5 top.inner.echo.out 2",
            "3 top.ticker.tick 3",
        ]
    );
}
