use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use super::{TraceRecord, TraceSink, TraceSinkWriter};

/// An unbounded in-memory trace buffer.
///
/// The buffer is shared with its writers, so records written by the
/// simulation can be drained at any time through the [`Iterator`]
/// implementation.
#[derive(Clone, Default)]
pub struct TraceBuffer {
    records: Arc<Mutex<VecDeque<TraceRecord>>>,
}

impl TraceBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of buffered records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no record is buffered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes and returns all buffered records.
    pub fn drain(&self) -> Vec<TraceRecord> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<TraceRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Iterator for TraceBuffer {
    type Item = TraceRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.lock().pop_front()
    }
}

impl TraceSink for TraceBuffer {
    type Writer = TraceBufferWriter;

    fn writer(&self) -> Self::Writer {
        TraceBufferWriter {
            records: self.records.clone(),
        }
    }
}

impl fmt::Debug for TraceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceBuffer")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// A producer handle of a [`TraceBuffer`].
pub struct TraceBufferWriter {
    records: Arc<Mutex<VecDeque<TraceRecord>>>,
}

impl TraceSinkWriter for TraceBufferWriter {
    fn write(&self, record: TraceRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(record);
    }
}

impl fmt::Debug for TraceBufferWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceBufferWriter").finish_non_exhaustive()
    }
}
