//! Small models shared by the integration tests.

use devsim::model::{Atomic, UnknownState};
use devsim::ports::{InPort, Inputs, OutPort, Outputs, PortSet};
use devsim::time::TimeAdvance;

/// Emits the number of ticks so far with a fixed period.
pub struct Ticker {
    pub period: f64,
}

impl Ticker {
    pub const TICK: OutPort<u64> = OutPort::new("tick");

    pub fn new(period: f64) -> Self {
        Self { period }
    }
}

impl Atomic for Ticker {
    type State = u64;

    fn ports(&self) -> PortSet {
        PortSet::new().with_output(Self::TICK)
    }
    fn time_advance(&self, _: &u64) -> Result<TimeAdvance, UnknownState> {
        Ok(self.period.into())
    }
    fn output(&self, count: &u64, outputs: &mut Outputs) -> Result<(), UnknownState> {
        outputs.send(Self::TICK, count + 1);
        Ok(())
    }
    fn internal(&self, count: &u64) -> Result<u64, UnknownState> {
        Ok(count + 1)
    }
}

/// Passive model counting the values it receives.
pub struct Counter;

impl Counter {
    pub const IN: InPort<u64> = InPort::new("in");
}

impl Atomic for Counter {
    type State = u64;

    fn ports(&self) -> PortSet {
        PortSet::new().with_input(Self::IN)
    }
    fn time_advance(&self, _: &u64) -> Result<TimeAdvance, UnknownState> {
        Ok(TimeAdvance::Infinite)
    }
    fn output(&self, count: &u64, _: &mut Outputs) -> Result<(), UnknownState> {
        Err(UnknownState::new(count))
    }
    fn internal(&self, count: &u64) -> Result<u64, UnknownState> {
        Err(UnknownState::new(count))
    }
    fn external(&self, count: &u64, _: f64, inputs: &Inputs) -> Result<u64, UnknownState> {
        Ok(count + inputs.contains(Self::IN) as u64)
    }
}

/// Forwards the value it receives after a fixed delay.
pub struct Echo {
    pub delay: f64,
}

impl Echo {
    pub const IN: InPort<u64> = InPort::new("in");
    pub const OUT: OutPort<u64> = OutPort::new("out");
}

impl Atomic for Echo {
    type State = Option<u64>;

    fn ports(&self) -> PortSet {
        PortSet::new().with_input(Self::IN).with_output(Self::OUT)
    }
    fn time_advance(&self, state: &Option<u64>) -> Result<TimeAdvance, UnknownState> {
        Ok(match state {
            Some(_) => TimeAdvance::Finite(self.delay),
            None => TimeAdvance::Infinite,
        })
    }
    fn output(&self, state: &Option<u64>, outputs: &mut Outputs) -> Result<(), UnknownState> {
        let value = state.ok_or_else(|| UnknownState::new(state))?;
        outputs.send(Self::OUT, value);
        Ok(())
    }
    fn internal(&self, _: &Option<u64>) -> Result<Option<u64>, UnknownState> {
        Ok(None)
    }
    fn external(
        &self,
        state: &Option<u64>,
        _: f64,
        inputs: &Inputs,
    ) -> Result<Option<u64>, UnknownState> {
        Ok(inputs.get(Self::IN).copied().or(*state))
    }
}
