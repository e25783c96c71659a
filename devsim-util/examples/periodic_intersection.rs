//! Example: an open-ended simulation stopped from the outside.
//!
//! This example demonstrates in particular:
//!
//! * unbounded simulation,
//! * blocking trace queue,
//! * simulation halting,
//! * typed access to trace values.
//!
//! The periodic traffic system runs without a deadline on a dedicated thread.
//! The main thread follows the light observations and halts the simulation as
//! soon as the policeman takes over the light.
//!
//! ```text
//! ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┓
//! ┃ TrafficSystem                               ┃
//! ┃   ┌───────────┐         ┌──────────────┐    ┃
//! ┃   │           │   OUT   │              │    ┃ BlockingTraceQueue
//! ┃   │ policeman ├────────►│ trafficLight ├────╂──────────────────►
//! ┃   │           │INTERRUPT│              │    ┃
//! ┃   └───────────┘         └──────────────┘    ┃
//! ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛
//! ```

use std::thread;

use devsim::simulation::{SimInit, SimulationError};
use devsim::time::SimTime;
use devsim::trace::BlockingTraceQueue;
use devsim_util::traffic::periodic::{self, Interrupt, Observation};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ---------------
    // Bench assembly.
    // ---------------

    let queue = BlockingTraceQueue::new();
    let mut simu = SimInit::new(periodic::traffic_system()?)
        .add_trace_sink(&queue)
        .init(SimTime::ZERO)?;
    let halter = simu.halter();
    let mut reader = queue.reader();

    // ----------
    // Simulation.
    // ----------

    let simulation_handle = thread::spawn(move || {
        let result = simu.step_unbounded();
        (result, simu.time())
    });

    let mut observations = Vec::new();
    for record in reader.by_ref() {
        if let Some(observation) = record.value::<Observation>() {
            println!("{} light observed as {:?}", record.time, observation);
            observations.push(*observation);
        }
        if record.value::<Interrupt>() == Some(&Interrupt::ToManual) {
            println!("{} policeman takes over", record.time);
            halter.halt();
            break;
        }
    }

    let (result, time) = simulation_handle
        .join()
        .map_err(|_| "simulation thread panicked")?;
    assert_eq!(result, Err(SimulationError::Halted));
    println!("simulation halted at t={time}");

    assert_eq!(
        observations,
        [
            Observation::Grey,
            Observation::Yellow,
            Observation::Grey,
            Observation::Grey
        ]
    );

    Ok(())
}
