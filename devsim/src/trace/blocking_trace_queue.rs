use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use super::{TraceRecord, TraceSink, TraceSinkWriter};

/// A blocking trace queue with an unbounded size.
///
/// The queue is meant to be read from another thread than the one that runs
/// the simulation. Records are consumed through the [`Iterator`]
/// implementation of [`BlockingTraceQueueReader`], available through the
/// [`BlockingTraceQueue::reader`] method. The iterator ends once the
/// simulation, and therefore every writer, has been dropped.
pub struct BlockingTraceQueue {
    is_open: Arc<AtomicBool>,
    sender: Sender<TraceRecord>,
    receiver: Receiver<TraceRecord>,
}

impl BlockingTraceQueue {
    /// Creates an open queue.
    pub fn new() -> Self {
        Self::new_with_open_state(true)
    }

    /// Creates a closed queue, which discards records until it is opened.
    pub fn new_closed() -> Self {
        Self::new_with_open_state(false)
    }

    /// Returns the consumer handle.
    ///
    /// Writers must be requested before the queue is turned into a reader.
    pub fn reader(self) -> BlockingTraceQueueReader {
        BlockingTraceQueueReader {
            is_open: self.is_open,
            receiver: self.receiver,
        }
    }

    fn new_with_open_state(is_open: bool) -> Self {
        let (sender, receiver) = channel();

        Self {
            is_open: Arc::new(AtomicBool::new(is_open)),
            sender,
            receiver,
        }
    }
}

impl TraceSink for BlockingTraceQueue {
    type Writer = BlockingTraceQueueWriter;

    fn writer(&self) -> Self::Writer {
        BlockingTraceQueueWriter {
            is_open: self.is_open.clone(),
            sender: self.sender.clone(),
        }
    }
}

impl Default for BlockingTraceQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlockingTraceQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingTraceQueue").finish_non_exhaustive()
    }
}

/// The consumer handle of a [`BlockingTraceQueue`].
///
/// Calls to `next` block until a record is available. `None` is returned once
/// all writers are gone.
pub struct BlockingTraceQueueReader {
    is_open: Arc<AtomicBool>,
    receiver: Receiver<TraceRecord>,
}

impl BlockingTraceQueueReader {
    /// Starts accepting records.
    pub fn open(&mut self) {
        self.is_open.store(true, Ordering::Relaxed);
    }

    /// Stops accepting records; records written while closed are lost.
    pub fn close(&mut self) {
        self.is_open.store(false, Ordering::Relaxed);
    }

    /// Waits for the next record for at most `timeout`.
    ///
    /// Returns `None` on timeout or if all writers are gone.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<TraceRecord> {
        match self.receiver.recv_timeout(timeout) {
            Ok(record) => Some(record),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Iterator for BlockingTraceQueueReader {
    type Item = TraceRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}

impl FusedIterator for BlockingTraceQueueReader {}

impl fmt::Debug for BlockingTraceQueueReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingTraceQueueReader")
            .finish_non_exhaustive()
    }
}

/// A producer handle of a [`BlockingTraceQueue`].
#[derive(Clone)]
pub struct BlockingTraceQueueWriter {
    is_open: Arc<AtomicBool>,
    sender: Sender<TraceRecord>,
}

impl TraceSinkWriter for BlockingTraceQueueWriter {
    fn write(&self, record: TraceRecord) {
        if !self.is_open.load(Ordering::Relaxed) {
            return;
        }
        // The reader may have been dropped.
        let _ = self.sender.send(record);
    }
}

impl fmt::Debug for BlockingTraceQueueWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingTraceQueueWriter")
            .finish_non_exhaustive()
    }
}
