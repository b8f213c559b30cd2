//! Single-consumer FIFO event queue.

use std::collections::VecDeque;

use crate::event::{Event, SignalEvent};

/// Ordered queue of pending events. Insertion order is dispatch order.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(16),
        }
    }

    /// Append an event at the back.
    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Take the oldest event.
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Drop all pending events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Write-only handle a strategy uses to emit signals.
///
/// Wraps the engine's queue for the duration of one `on_market` call and
/// accepts nothing but [`SignalEvent`]s.
pub struct SignalSink<'a> {
    queue: &'a mut EventQueue,
    emitted: usize,
}

impl<'a> SignalSink<'a> {
    pub fn new(queue: &'a mut EventQueue) -> Self {
        Self { queue, emitted: 0 }
    }

    /// Enqueue a signal behind everything already pending.
    pub fn emit(&mut self, signal: SignalEvent) {
        self.queue.push(Event::Signal(signal));
        self.emitted += 1;
    }

    /// Number of signals emitted through this sink.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, MarketEvent};
    use crate::types::Direction;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_fifo_order() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let mut queue = EventQueue::new();
        queue.push(Event::Market(MarketEvent { ts, bar_index: 0 }));

        {
            let mut sink = SignalSink::new(&mut queue);
            sink.emit(SignalEvent::new(1, "A", ts, Direction::Long, 1.0).unwrap());
            sink.emit(SignalEvent::new(1, "B", ts, Direction::Short, 1.0).unwrap());
            assert_eq!(sink.emitted(), 2);
        }

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().map(|e| e.kind()), Some(EventKind::Market));
        match queue.pop() {
            Some(Event::Signal(s)) => assert_eq!(s.symbol(), "A"),
            other => panic!("expected signal, got {other:?}"),
        }
        match queue.pop() {
            Some(Event::Signal(s)) => assert_eq!(s.symbol(), "B"),
            other => panic!("expected signal, got {other:?}"),
        }
        assert!(queue.is_empty());
    }
}
