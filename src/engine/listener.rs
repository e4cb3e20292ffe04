use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::pattern::{Cell, Pattern};

/// Receives pattern lifecycle notifications, synchronously, from inside the
/// gesture handlers.
pub trait PatternListener {
    fn on_pattern_start(&mut self) {}

    fn on_pattern_cleared(&mut self) {}

    /// Called once per committed cell, including gap-filled ones.
    fn on_pattern_cell_added(&mut self, _pattern: &[Cell]) {}

    fn on_pattern_detected(&mut self, _pattern: &[Cell]) {}
}

/// Spoken feedback the host may forward to its accessibility layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Announcement {
    PatternStart,
    PatternCleared,
    CellAdded,
    PatternDetected,
}

impl Announcement {
    pub fn message(self) -> &'static str {
        match self {
            Announcement::PatternStart => "Pattern started",
            Announcement::PatternCleared => "Pattern cleared",
            Announcement::CellAdded => "Cell added",
            Announcement::PatternDetected => "Pattern completed",
        }
    }
}

/// Device capabilities the session triggers but does not implement.
pub trait HostServices {
    fn perform_haptic_feedback(&mut self) {}

    fn announce(&mut self, _announcement: Announcement) {}
}

/// Host without haptics or accessibility output.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHost;

impl HostServices for NoHost {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternEvent {
    Started,
    Cleared,
    CellAdded(Pattern),
    Detected(Pattern),
}

/// Listener that queues every notification for the owner to drain later.
/// Clones share the queue.
#[derive(Clone, Debug, Default)]
pub struct PatternEvents {
    queue: Rc<RefCell<VecDeque<PatternEvent>>>,
}

impl PatternEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<PatternEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    fn push(&self, event: PatternEvent) {
        self.queue.borrow_mut().push_back(event);
    }
}

impl PatternListener for PatternEvents {
    fn on_pattern_start(&mut self) {
        self.push(PatternEvent::Started);
    }

    fn on_pattern_cleared(&mut self) {
        self.push(PatternEvent::Cleared);
    }

    fn on_pattern_cell_added(&mut self, pattern: &[Cell]) {
        self.push(PatternEvent::CellAdded(Pattern::from_cells(pattern)));
    }

    fn on_pattern_detected(&mut self, pattern: &[Cell]) {
        self.push(PatternEvent::Detected(Pattern::from_cells(pattern)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_shared_between_clones() {
        let events = PatternEvents::new();
        let mut listener = events.clone();
        listener.on_pattern_start();
        listener.on_pattern_cell_added(&[Cell::of(0, 0).unwrap()]);
        assert_eq!(events.len(), 2);

        let drained = events.drain();
        assert_eq!(drained[0], PatternEvent::Started);
        assert_eq!(drained[1], PatternEvent::CellAdded("1".parse().unwrap()));
        assert!(events.is_empty());
    }
}
