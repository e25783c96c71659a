//! Simulation trace.
//!
//! Every value emitted by an atomic model on one of its output ports is
//! reported as a [`TraceRecord`] to the trace sinks registered with
//! [`SimInit::add_trace_sink`](crate::simulation::SimInit::add_trace_sink).
//! Records are delivered in firing order, one simulated instant after the
//! other, and only once the iteration that produced them has completed: an
//! iteration aborted by an error leaves no record behind.
//!
//! Two sinks are provided:
//!
//! * [`TraceBuffer`], a shared in-memory buffer that can be drained from the
//!   thread that drives the simulation,
//! * [`BlockingTraceQueue`], a channel whose reader blocks on the next
//!   record, for consumers running on another thread.
//!
//! Custom sinks implement [`TraceSink`] and [`TraceSinkWriter`].

mod blocking_trace_queue;
mod trace_buffer;

use std::fmt;

pub use blocking_trace_queue::{
    BlockingTraceQueue, BlockingTraceQueueReader, BlockingTraceQueueWriter,
};
pub use trace_buffer::{TraceBuffer, TraceBufferWriter};

use crate::ports::Message;
use crate::time::SimTime;

/// A value emitted by an atomic model.
#[derive(Clone)]
pub struct TraceRecord {
    /// Simulation time of the emission.
    pub time: SimTime,
    /// Dotted path of the emitting model, starting with the root model name.
    pub model: String,
    /// Name of the output port.
    pub port: &'static str,
    /// The emitted value.
    pub value: Box<dyn Message>,
}

impl TraceRecord {
    /// Returns the emitted value if it has type `T`.
    pub fn value<T: Message>(&self) -> Option<&T> {
        self.value.as_ref().as_any().downcast_ref::<T>()
    }
}

impl PartialEq for TraceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
            && self.model == other.model
            && self.port == other.port
            && self.value.as_ref().dyn_eq(other.value.as_ref())
    }
}

impl fmt::Debug for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceRecord")
            .field("time", &self.time)
            .field("model", &self.model)
            .field("port", &self.port)
            .field("value", &self.value)
            .finish()
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{} {:?}",
            self.time, self.model, self.port, self.value
        )
    }
}

/// A sink that can receive trace records.
pub trait TraceSink {
    /// Writer handle handed over to the simulation.
    type Writer: TraceSinkWriter;

    /// Returns a writer handle.
    fn writer(&self) -> Self::Writer;
}

/// A writer handle of a trace sink.
pub trait TraceSinkWriter: Send + 'static {
    /// Writes a record.
    fn write(&self, record: TraceRecord);
}
