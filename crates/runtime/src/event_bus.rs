use std::collections::VecDeque;

use serde::Serialize;

/// Events kept by [`EventBus::new`] before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// One handled interaction, kept for inspection and replay.
///
/// `sequence` is the session's publication counter at the time the event was
/// recorded, so events can be lined up with the publications they produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub sequence: u64,
    pub kind: &'static str,
    pub message: String,
}

/// Bounded trace of recent events. Once full, each emit evicts the oldest.
#[derive(Debug)]
pub struct EventBus {
    events: VecDeque<Event>,
    capacity: usize,
    dropped: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn emit(&mut self, sequence: u64, kind: &'static str, message: impl Into<String>) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(Event {
            sequence,
            kind,
            message: message.into(),
        });
    }

    /// Oldest first.
    pub fn events(&self) -> &VecDeque<Event> {
        &self.events
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events evicted since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}
