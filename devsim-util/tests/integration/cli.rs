//! The `devsim` command-line driver.

use std::process::{Command, Output};

fn devsim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_devsim"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run devsim")
}

fn assert_success(output: &Output) {
    assert_eq!(
        output.status.code(),
        Some(0),
        "devsim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn trace_is_printed_on_stdout() {
    let output = devsim(&["run", "generator", "20"]);

    assert_success(&output);
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "5 GeneratorCar.gen_outport NewCar\n\
         10 GeneratorCar.gen_outport NewCar\n\
         15 GeneratorCar.gen_outport NewCar\n\
         20 GeneratorCar.gen_outport NewCar\n"
    );
}

#[test]
fn periodic_light_is_observed() {
    let output = devsim(&["run", "traffic-periodic", "120"]);

    assert_success(&output);
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "58.5 TrafficSystem.trafficLight.OBSERVED Grey\n\
         108.5 TrafficSystem.trafficLight.OBSERVED Yellow\n\
         118.5 TrafficSystem.trafficLight.OBSERVED Grey\n"
    );
}

#[test]
fn usage_errors() {
    for args in [
        &["run", "generator", "soon"][..],
        &["run", "roundabout", "20"],
        &["run", "generator"],
    ] {
        let output = devsim(args);

        assert_eq!(output.status.code(), Some(2), "{args:?}");
        assert!(output.stdout.is_empty());
        assert!(String::from_utf8(output.stderr)
            .unwrap()
            .contains("usage: devsim run"));
    }
}
