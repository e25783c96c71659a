//! Periodic intersection scenarios.

use devsim::simulation::{self, SimInit};
use devsim::time::{SimTime, TimeAdvance};
use devsim_util::traffic::periodic::{self, Duty, LightMode};

fn t(t: f64) -> SimTime {
    SimTime::new(t).unwrap()
}

#[test]
fn policeman_interrupts_the_cycle() {
    let trace = simulation::run(periodic::traffic_system().unwrap(), t(500.0)).unwrap();

    assert_eq!(
        trace.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
        vec![
            "58.5 TrafficSystem.trafficLight.OBSERVED Grey",
            "108.5 TrafficSystem.trafficLight.OBSERVED Yellow",
            "118.5 TrafficSystem.trafficLight.OBSERVED Grey",
            "178.5 TrafficSystem.trafficLight.OBSERVED Grey",
            "200 TrafficSystem.policeman.OUT ToManual",
            "300 TrafficSystem.policeman.OUT ToAutonomous",
            "360 TrafficSystem.trafficLight.OBSERVED Grey",
            "410 TrafficSystem.trafficLight.OBSERVED Yellow",
            "420 TrafficSystem.trafficLight.OBSERVED Grey",
            "480 TrafficSystem.trafficLight.OBSERVED Grey",
            "500 TrafficSystem.policeman.OUT ToManual",
        ]
    );
}

#[test]
fn manual_light_waits_for_the_policeman() {
    let mut simu = SimInit::new(periodic::traffic_system().unwrap())
        .init(SimTime::ZERO)
        .unwrap();

    simu.step_until(t(250.0)).unwrap();

    assert_eq!(
        simu.state::<LightMode>("TrafficSystem.trafficLight"),
        Some(&LightMode::Manual)
    );
    assert_eq!(
        simu.time_advance("TrafficSystem.trafficLight"),
        Some(TimeAdvance::Infinite)
    );
    assert_eq!(simu.elapsed("TrafficSystem.trafficLight"), Some(50.0));
    assert_eq!(
        simu.state::<Duty>("TrafficSystem.policeman"),
        Some(&Duty::Working)
    );
    assert_eq!(simu.next_event_time(), Some(t(300.0)));
}

#[test]
fn initial_elapsed_shifts_the_first_change() {
    let simu = SimInit::new(periodic::traffic_system().unwrap())
        .init(SimTime::ZERO)
        .unwrap();

    assert_eq!(simu.elapsed("TrafficSystem.trafficLight"), Some(1.5));
    assert_eq!(simu.next_event_time(), Some(t(58.5)));
}
