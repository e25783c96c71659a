//! Command-line driver for the reference models.
//!
//! ```text
//! devsim run <model> <end-time>
//! ```
//!
//! The trace is printed on stdout, one record per line. Logs are written to
//! stderr and filtered with the `RUST_LOG` environment variable.

use std::env;
use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::process::ExitCode;
use std::thread;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use devsim::model::Component;
use devsim::simulation::{ConfigurationError, SimInit, SimulationError, Stop};
use devsim::time::SimTime;
use devsim::trace::BlockingTraceQueue;
use devsim::tracing::SimulationTime;
use devsim_util::traffic::{periodic, queue};

const USAGE: &str = "usage: devsim run <traffic-queue|traffic-periodic|generator> <end-time>";

/// A model that can be run from the command line.
#[derive(Copy, Clone, Debug)]
enum Bench {
    TrafficQueue,
    TrafficPeriodic,
    Generator,
}

impl Bench {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "traffic-queue" => Some(Self::TrafficQueue),
            "traffic-periodic" => Some(Self::TrafficPeriodic),
            "generator" => Some(Self::Generator),
            _ => None,
        }
    }

    fn build(self) -> Result<Component, ConfigurationError> {
        Ok(match self {
            Self::TrafficQueue => queue::g_bp()?.into(),
            Self::TrafficPeriodic => periodic::traffic_system()?.into(),
            Self::Generator => queue::generator().into(),
        })
    }
}

/// An invalid command line.
#[derive(Debug)]
struct UsageError(String);

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{USAGE}", self.0)
    }
}

fn parse_args(args: &[String]) -> Result<(Bench, SimTime), UsageError> {
    match args {
        [command, model, end_time] if command == "run" => {
            let bench = Bench::parse(model)
                .ok_or_else(|| UsageError(format!("unknown model '{model}'")))?;
            let end_time = end_time
                .parse::<f64>()
                .ok()
                .and_then(SimTime::new)
                .ok_or_else(|| UsageError(format!("invalid end time '{end_time}'")))?;

            Ok((bench, end_time))
        }
        _ => Err(UsageError("invalid arguments".into())),
    }
}

/// Runs a model until the deadline and writes the trace to `out`, one record
/// per line.
fn run(
    root: Component,
    end_time: SimTime,
    out: &mut impl Write,
) -> Result<Stop, Box<dyn Error + Send + Sync>> {
    // The simulation runs on its own thread while records are written as
    // they arrive.
    let queue = BlockingTraceQueue::new();
    let bench_init = SimInit::new(root).add_trace_sink(&queue);
    let reader = queue.reader();

    let runner = thread::spawn(move || -> Result<Stop, SimulationError> {
        let mut simu = bench_init.init(SimTime::ZERO)?;
        let stop = simu.step_until(end_time)?;
        info!(?stop, "simulation completed");

        Ok(stop)
    });

    for record in reader {
        writeln!(out, "{record}")?;
    }
    out.flush()?;

    let stop = runner
        .join()
        .map_err(|_| "simulation thread panicked")??;

    Ok(stop)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_timer(SimulationTime::new())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (bench, end_time) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let root = match bench.build() {
        Ok(root) => root,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(root, end_time, &mut io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
