//! Frame-driven interpolation scheduler.
//!
//! Animations are plain data. The host advances the scheduler once per frame
//! with the current time; each running interpolation writes its value into the
//! presentation state of its own cell and nothing else. A finished
//! interpolation may chain a follow-up, which starts at the instant the first
//! one ended. Interpolations run in the order they were scheduled, so when
//! two drive the same attribute the newer one wins.

use std::collections::VecDeque;
use std::time::Duration;

use crate::animation::cell_state::CellStates;
use crate::animation::easing::Easing;
use crate::engine::geometry::Point;
use crate::pattern::Cell;

/// Identifies a scheduled interpolation for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u64);

/// Presentation attribute an interpolation drives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Property {
    DotSize { from: f32, to: f32 },
    LineEnd { from: Point, to: Point },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Interpolation {
    pub cell: Cell,
    pub property: Property,
    pub duration: Duration,
    pub easing: Easing,
    pub next: Option<Box<Interpolation>>,
}

impl Interpolation {
    pub fn new(cell: Cell, property: Property, duration: Duration, easing: Easing) -> Self {
        Self {
            cell,
            property,
            duration,
            easing,
            next: None,
        }
    }

    /// Runs `next` once this interpolation completes.
    pub fn then(mut self, next: Interpolation) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    fn apply(&self, progress: f32, states: &mut CellStates) {
        let t = self.easing.apply(progress);
        let state = &mut states[self.cell];
        match self.property {
            Property::DotSize { from, to } => state.size = from + (to - from) * t,
            Property::LineEnd { from, to } => state.line_end = Some(from.lerp(to, t)),
        }
    }

    fn complete(&self, states: &mut CellStates) {
        self.apply(1.0, states);
        if let Property::LineEnd { .. } = self.property {
            states[self.cell].line_animation = None;
        }
    }
}

/// Something that runs interpolations over time.
pub trait Scheduler {
    fn schedule(&mut self, now: Duration, interpolation: Interpolation) -> AnimationHandle;

    /// Stops a running interpolation where it is. Returns false if it had
    /// already finished.
    fn cancel(&mut self, handle: AnimationHandle) -> bool;

    /// Applies every running interpolation at time `now`. Returns true when
    /// any presentation state changed.
    fn advance(&mut self, now: Duration, states: &mut CellStates) -> bool;

    fn is_idle(&self) -> bool;
}

#[derive(Debug)]
struct Running {
    handle: AnimationHandle,
    started_at: Duration,
    interpolation: Interpolation,
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    running: Vec<Running>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn start(&mut self, handle: AnimationHandle, started_at: Duration, interpolation: Interpolation) {
        self.running.push(Running {
            handle,
            started_at,
            interpolation,
        });
    }
}

impl Scheduler for FrameScheduler {
    fn schedule(&mut self, now: Duration, interpolation: Interpolation) -> AnimationHandle {
        let handle = AnimationHandle(self.next_id);
        self.next_id += 1;
        self.start(handle, now, interpolation);
        handle
    }

    fn cancel(&mut self, handle: AnimationHandle) -> bool {
        let before = self.running.len();
        self.running.retain(|r| r.handle != handle);
        self.running.len() != before
    }

    fn advance(&mut self, now: Duration, states: &mut CellStates) -> bool {
        if self.running.is_empty() {
            return false;
        }

        let mut pending: VecDeque<Running> = std::mem::take(&mut self.running).into();
        while let Some(Running {
            handle,
            started_at,
            interpolation,
        }) = pending.pop_front()
        {
            let elapsed = now.saturating_sub(started_at);
            if elapsed < interpolation.duration {
                let progress = elapsed.as_secs_f32() / interpolation.duration.as_secs_f32();
                interpolation.apply(progress, states);
                self.start(handle, started_at, interpolation);
                continue;
            }

            interpolation.complete(states);
            if let Some(next) = interpolation.next {
                // The follow-up keeps the handle and may itself be done already.
                pending.push_front(Running {
                    handle,
                    started_at: started_at + interpolation.duration,
                    interpolation: *next,
                });
            }
        }
        true
    }

    fn is_idle(&self) -> bool {
        self.running.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::cell_state::{line_sweep, size_pulse};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_linear_sweep_progress() {
        let cell = Cell::of(0, 0).unwrap();
        let mut states = CellStates::new(10.0);
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.schedule(
            ms(0),
            line_sweep(cell, Point::new(0.0, 0.0), Point::new(100.0, 50.0)),
        );
        states[cell].line_animation = Some(handle);

        assert!(scheduler.advance(ms(50), &mut states));
        let mid = states[cell].line_end.unwrap();
        assert!((mid.x - 50.0).abs() < 1e-3 && (mid.y - 25.0).abs() < 1e-3);
        assert!(!scheduler.is_idle());

        scheduler.advance(ms(100), &mut states);
        assert_eq!(states[cell].line_end, Some(Point::new(100.0, 50.0)));
        assert_eq!(states[cell].line_animation, None);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_pulse_grows_then_returns_to_rest() {
        let cell = Cell::of(1, 2).unwrap();
        let mut states = CellStates::new(10.0);
        let mut scheduler = FrameScheduler::new();
        scheduler.schedule(ms(0), size_pulse(cell, 10.0, 20.0));

        scheduler.advance(ms(96), &mut states);
        assert_eq!(states[cell].size, 20.0);
        assert!(!scheduler.is_idle());

        scheduler.advance(ms(150), &mut states);
        assert!(states[cell].size < 20.0 && states[cell].size > 10.0);

        scheduler.advance(ms(288), &mut states);
        assert_eq!(states[cell].size, 10.0);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_late_frame_runs_whole_chain() {
        let cell = Cell::of(2, 2).unwrap();
        let mut states = CellStates::new(10.0);
        let mut scheduler = FrameScheduler::new();
        scheduler.schedule(ms(0), size_pulse(cell, 10.0, 20.0));
        scheduler.advance(ms(5_000), &mut states);
        assert_eq!(states[cell].size, 10.0);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_cancel_freezes_value() {
        let cell = Cell::of(0, 2).unwrap();
        let mut states = CellStates::new(10.0);
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.schedule(
            ms(0),
            line_sweep(cell, Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
        );
        scheduler.advance(ms(30), &mut states);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(!scheduler.advance(ms(100), &mut states));
        let frozen = states[cell].line_end.unwrap();
        assert!((frozen.x - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_newer_pulse_wins_every_frame() {
        let cell = Cell::of(1, 1).unwrap();
        let mut states = CellStates::new(12.0);
        let mut scheduler = FrameScheduler::new();
        scheduler.schedule(ms(0), size_pulse(cell, 12.0, 28.0));
        scheduler.schedule(ms(50), size_pulse(cell, 12.0, 28.0));

        let mut lone_states = CellStates::new(12.0);
        let mut lone = FrameScheduler::new();
        lone.schedule(ms(50), size_pulse(cell, 12.0, 28.0));

        // Spans the older pulse's hand-off from grow to shrink at 96 ms.
        for t in [60, 61, 62, 63, 96, 97, 150] {
            scheduler.advance(ms(t), &mut states);
            lone.advance(ms(t), &mut lone_states);
            assert_eq!(states[cell].size, lone_states[cell].size, "at {t} ms");
        }
    }

    #[test]
    fn test_animations_touch_only_their_cell() {
        let a = Cell::of(0, 0).unwrap();
        let b = Cell::of(1, 0).unwrap();
        let mut states = CellStates::new(10.0);
        let mut scheduler = FrameScheduler::new();
        scheduler.schedule(ms(0), size_pulse(a, 10.0, 30.0));
        scheduler.advance(ms(40), &mut states);
        assert!(states[a].size > 10.0);
        assert_eq!(states[b], CellStates::new(10.0)[b]);
    }
}
