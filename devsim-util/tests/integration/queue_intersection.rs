//! Queue-based intersection scenarios.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use devsim::simulation::{self, SimInit, Simulation};
use devsim::time::{SimTime, TimeAdvance};
use devsim::trace::{TraceBuffer, TraceRecord};
use devsim_util::traffic::queue::{
    self, Color, Light, NewCar, PolicemanState, TrafficLightState, TRAFFIC_SYSTEM_IN,
};

const LIGHT: &str = "TrafficSystem.trafficLight";

fn t(t: f64) -> SimTime {
    SimTime::new(t).unwrap()
}

fn lines(trace: &[TraceRecord]) -> Vec<String> {
    trace.iter().map(|r| r.to_string()).collect()
}

#[test]
fn first_car_goes_through() {
    let trace = simulation::run(queue::g_bp().unwrap(), t(8.0)).unwrap();

    assert_eq!(
        lines(&trace),
        vec![
            "0 G_BP.TrafficSystem.policeman.proc_out Ready",
            "1 G_BP.TrafficSystem.policeman.proc_out Ready",
            "2 G_BP.TrafficSystem.policeman.proc_out Ready",
            "3 G_BP.TrafficSystem.policeman.proc_out Ready",
            "4 G_BP.TrafficSystem.policeman.proc_out Ready",
            "5 G_BP.TrafficSystem.policeman.proc_out Ready",
            "5 G_BP.GeneratorCar.gen_outport NewCar",
            "6 G_BP.TrafficSystem.policeman.proc_out Ready",
            "7 G_BP.TrafficSystem.trafficLight.OBSERVED Red",
            "7 G_BP.TrafficSystem.policeman.proc_out Ready",
            "8 G_BP.TrafficSystem.trafficLight.OBSERVED Green",
        ]
    );
}

#[test]
fn busy_policeman_lets_cars_pile_up() {
    let mut simu = SimInit::new(queue::g_bp().unwrap())
        .init(SimTime::ZERO)
        .unwrap();

    simu.step_until(t(21.0)).unwrap();
    assert_eq!(
        simu.state::<PolicemanState>("G_BP.TrafficSystem.policeman"),
        Some(&PolicemanState::Busy { remaining: 14.0 })
    );
    assert_eq!(
        simu.state::<TrafficLightState>("G_BP.TrafficSystem.trafficLight"),
        Some(&TrafficLightState {
            color: Color::Red,
            queued: 3
        })
    );
    assert_eq!(simu.next_event_time(), Some(t(22.0)));

    simu.step_until(t(23.0)).unwrap();
    assert_eq!(
        simu.state::<TrafficLightState>("G_BP.TrafficSystem.trafficLight"),
        Some(&TrafficLightState {
            color: Color::Green,
            queued: 3
        })
    );
    assert_eq!(
        simu.time_advance("G_BP.TrafficSystem.trafficLight"),
        Some(TimeAdvance::Finite(1.0))
    );
}

#[test]
fn generator_is_periodic() {
    let trace = simulation::run(queue::generator(), t(20.0)).unwrap();

    assert_eq!(
        lines(&trace),
        vec![
            "5 GeneratorCar.gen_outport NewCar",
            "10 GeneratorCar.gen_outport NewCar",
            "15 GeneratorCar.gen_outport NewCar",
            "20 GeneratorCar.gen_outport NewCar",
        ]
    );
}

/// Builds a traffic system fed with cars at random times.
///
/// The arrival times are returned in increasing order.
fn random_traffic(seed: u64, trace: &TraceBuffer) -> (Simulation, Vec<SimTime>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut simu = SimInit::new(queue::traffic_system().unwrap())
        .add_trace_sink(trace)
        .init(SimTime::ZERO)
        .unwrap();

    let mut arrivals: Vec<SimTime> = (0..40)
        .map(|_| t(rng.gen_range(0.0..300.0)))
        .collect();
    arrivals.sort();
    arrivals.dedup();
    for &at in &arrivals {
        simu.schedule_input(at, TRAFFIC_SYSTEM_IN, NewCar).unwrap();
    }

    (simu, arrivals)
}

#[test]
fn queue_length_is_conserved() {
    for seed in 0..8 {
        let trace = TraceBuffer::new();
        let (mut simu, arrivals) = random_traffic(seed, &trace);
        let mut departures = 0;

        while let Some(now) = simu.step().unwrap() {
            if now > t(400.0) {
                break;
            }
            departures += trace
                .drain()
                .iter()
                .filter(|r| r.model == LIGHT && r.value::<Light>() == Some(&Light::Red))
                .count();
            let arrived = arrivals.iter().filter(|&&at| at <= now).count();

            let light = simu.state::<TrafficLightState>(LIGHT).unwrap();
            assert_eq!(light.queued + departures, arrived, "seed {seed} at t={now}");
            if light.color == Color::Yellow {
                assert_eq!(light.queued, 0, "seed {seed} at t={now}");
            }
        }
    }
}

#[test]
fn random_traffic_is_reproducible() {
    let run = |seed| {
        let trace = TraceBuffer::new();
        let (mut simu, _) = random_traffic(seed, &trace);
        simu.step_until(t(400.0)).unwrap();

        trace.drain()
    };

    let first = run(42);
    assert!(!first.is_empty());
    assert_eq!(first, run(42));
}
