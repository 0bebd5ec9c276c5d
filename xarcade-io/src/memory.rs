//! In-memory source and sink
//!
//! `ScriptedSource` replays prepared batches; `MemorySink` records everything
//! written to it. Both hand out a shared handle so a test can keep observing
//! after the device itself has been moved into the remapper.

use crate::event::{EventKind, KeyEvent};
use crate::{DeviceError, EventSink, RawInputSource};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Something that happened to a [`MemorySink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitted {
    Event {
        code: u16,
        value: i32,
        kind: EventKind,
    },
    Settle,
    Released,
}

/// Shared view of a [`MemorySink`]'s history
#[derive(Debug, Clone, Default)]
pub struct SinkLog {
    entries: Arc<Mutex<Vec<Emitted>>>,
}

impl SinkLog {
    /// Everything recorded so far, in order
    pub fn entries(&self) -> Vec<Emitted> {
        self.entries.lock().clone()
    }

    /// Only the written events
    pub fn writes(&self) -> Vec<(u16, i32, EventKind)> {
        self.entries
            .lock()
            .iter()
            .filter_map(|e| match *e {
                Emitted::Event { code, value, kind } => Some((code, value, kind)),
                _ => None,
            })
            .collect()
    }

    pub fn release_count(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|e| matches!(e, Emitted::Released))
            .count()
    }

    fn push(&self, entry: Emitted) {
        self.entries.lock().push(entry);
    }
}

/// Sink that records instead of emitting
#[derive(Debug, Default)]
pub struct MemorySink {
    log: SinkLog,
    released: bool,
}

impl MemorySink {
    pub fn new() -> (Self, SinkLog) {
        let sink = Self::default();
        let log = sink.log.clone();
        (sink, log)
    }
}

impl EventSink for MemorySink {
    fn write(&mut self, code: u16, value: i32, kind: EventKind) -> Result<(), DeviceError> {
        if self.released {
            return Err(DeviceError::Released);
        }
        if kind == EventKind::Other {
            return Err(DeviceError::Unsupported(kind.as_str()));
        }
        self.log.push(Emitted::Event { code, value, kind });
        Ok(())
    }

    fn settle(&mut self) {
        self.log.push(Emitted::Settle);
    }

    fn release(&mut self) -> Result<(), DeviceError> {
        if self.released {
            return Err(DeviceError::Released);
        }
        self.released = true;
        self.log.push(Emitted::Released);
        Ok(())
    }
}

/// What a [`ScriptedSource`] does once its batches run out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WhenExhausted {
    Disconnect,
    Block,
}

/// Source that replays a fixed list of batches
#[derive(Debug)]
pub struct ScriptedSource {
    batches: VecDeque<Vec<KeyEvent>>,
    when_exhausted: WhenExhausted,
    releases: Arc<AtomicUsize>,
}

impl ScriptedSource {
    /// Replay `batches`, then report [`DeviceError::Disconnected`]
    pub fn new(batches: Vec<Vec<KeyEvent>>) -> Self {
        Self {
            batches: batches.into(),
            when_exhausted: WhenExhausted::Disconnect,
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replay `batches`, then wait forever like an idle device
    pub fn then_block(mut self) -> Self {
        self.when_exhausted = WhenExhausted::Block;
        self
    }

    /// Counter incremented on every successful `release`
    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }
}

#[async_trait]
impl RawInputSource for ScriptedSource {
    async fn read_batch(&mut self) -> Result<Vec<KeyEvent>, DeviceError> {
        if let Some(batch) = self.batches.pop_front() {
            return Ok(batch);
        }
        match self.when_exhausted {
            WhenExhausted::Disconnect => Err(DeviceError::Disconnected),
            WhenExhausted::Block => std::future::pending().await,
        }
    }

    fn release(&mut self) -> Result<(), DeviceError> {
        // One release per source, like a real grab
        if self
            .releases
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DeviceError::Released);
        }
        Ok(())
    }
}
