//! Gesture session: turns pointer events into a pattern.
//!
//! The session owns the pattern being traced, the lookup of used cells, the
//! display mode and the per-cell presentation state. Hosts feed it
//! start/move/end/cancel events from their UI thread, advance its animations
//! once per frame, and read a [`Frame`] to paint.
//!
//! # Invariants
//!
//! 1. `lookup` marks exactly the cells in `pattern`.
//! 2. A pattern never holds a cell twice; hitting a used cell does nothing.
//! 3. Gesture events are dropped while input is disabled.
//! 4. Cancelling a gesture that had started emits exactly one cleared event.

use std::time::Duration;

use tracing::{debug, trace};

use crate::animation::cell_state::{self, CellPresentation, CellStates};
use crate::animation::clock::{Clock, SystemClock};
use crate::animation::replay::ReplayFrame;
use crate::animation::scheduler::{FrameScheduler, Scheduler};
use crate::engine::gap_fill;
use crate::engine::geometry::{Bounds, GridGeometry, Padding, Point};
use crate::engine::hit_test::{self, DEFAULT_HIT_FACTOR, HitTester};
use crate::engine::listener::{Announcement, HostServices, NoHost, PatternListener};
use crate::engine::saved_state::SavedState;
use crate::error::{PatternError, Result};
use crate::pattern::{CELL_COUNT, Cell, DisplayMode, Pattern, SelectionLookup, codec};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No gesture is running and no finished pattern is shown.
    Idle,
    /// A gesture has selected at least one cell and is still down.
    InProgress,
    /// The gesture was released, or a pattern was set programmatically.
    Completed,
}

/// Area that needs repainting. Requests made between two frames coalesce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dirty {
    Region(Bounds),
    Full,
}

impl Dirty {
    fn merge(self, other: Dirty) -> Dirty {
        match (self, other) {
            (Dirty::Region(a), Dirty::Region(b)) => Dirty::Region(a.union(b)),
            _ => Dirty::Full,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotStyle {
    pub dot_size: f32,
    pub dot_size_activated: f32,
    pub path_width: f32,
}

impl Default for DotStyle {
    fn default() -> Self {
        Self {
            dot_size: 12.0,
            dot_size_activated: 28.0,
            path_width: 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionOptions {
    pub hit_factor: f32,
    pub in_stealth_mode: bool,
    pub input_enabled: bool,
    pub haptic_feedback: bool,
    pub style: DotStyle,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            hit_factor: DEFAULT_HIT_FACTOR,
            in_stealth_mode: false,
            input_enabled: true,
            haptic_feedback: true,
            style: DotStyle::default(),
        }
    }
}

/// Color role of a dot or of the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DotColor {
    Regular,
    Error,
    Success,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotFrame {
    pub cell: Cell,
    pub center: Point,
    pub drawn_size: f32,
    pub translate_y: f32,
    pub alpha: f32,
    pub line_end: Option<Point>,
    pub part_of_pattern: bool,
    pub color: DotColor,
}

/// Line from the last drawn cell to the pointer (or replay cursor).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailingSegment {
    pub from: Point,
    pub to: Point,
    pub alpha: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathFrame {
    /// Vertices of the connecting path, in pattern order.
    pub points: Vec<Point>,
    pub trailing: Option<TrailingSegment>,
    pub color: DotColor,
}

/// Everything a renderer needs to paint one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub dots: Vec<DotFrame>,
    /// `None` in stealth mode.
    pub path: Option<PathFrame>,
    pub display_mode: DisplayMode,
}

pub struct PatternSession {
    pattern: Pattern,
    lookup: SelectionLookup,
    display_mode: DisplayMode,
    phase: SessionPhase,
    in_progress_point: Point,
    replay_started_at: Duration,
    input_enabled: bool,
    in_stealth_mode: bool,
    haptic_feedback: bool,
    hit_factor: f32,
    geometry: GridGeometry,
    style: DotStyle,
    cell_states: CellStates,
    scheduler: Box<dyn Scheduler>,
    clock: Box<dyn Clock>,
    listener: Option<Box<dyn PatternListener>>,
    host: Box<dyn HostServices>,
    dirty: Option<Dirty>,
    last_move_region: Option<Bounds>,
}

impl PatternSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            pattern: Pattern::new(),
            lookup: SelectionLookup::default(),
            display_mode: DisplayMode::Correct,
            phase: SessionPhase::Idle,
            in_progress_point: Point::default(),
            replay_started_at: Duration::ZERO,
            input_enabled: options.input_enabled,
            in_stealth_mode: options.in_stealth_mode,
            haptic_feedback: options.haptic_feedback,
            hit_factor: hit_test::clamp_hit_factor(options.hit_factor),
            geometry: GridGeometry::default(),
            style: options.style,
            cell_states: CellStates::new(options.style.dot_size),
            scheduler: Box::new(FrameScheduler::new()),
            clock: Box::new(SystemClock::new()),
            listener: None,
            host: Box::new(NoHost),
            dirty: None,
            last_move_region: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_listener(mut self, listener: impl PatternListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn with_host(mut self, host: impl HostServices + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------

    pub fn resize(&mut self, width: f32, height: f32, padding: Padding) {
        self.set_geometry(GridGeometry::from_size(width, height, padding));
    }

    pub fn set_geometry(&mut self, geometry: GridGeometry) {
        self.geometry = geometry;
        self.invalidate();
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn set_stealth_mode(&mut self, stealth: bool) {
        self.in_stealth_mode = stealth;
        self.invalidate();
    }

    pub fn is_in_stealth_mode(&self) -> bool {
        self.in_stealth_mode
    }

    pub fn set_haptic_feedback_enabled(&mut self, enabled: bool) {
        self.haptic_feedback = enabled;
    }

    pub fn is_haptic_feedback_enabled(&self) -> bool {
        self.haptic_feedback
    }

    pub fn set_hit_factor(&mut self, factor: f32) {
        self.hit_factor = hit_test::clamp_hit_factor(factor);
    }

    pub fn hit_factor(&self) -> f32 {
        self.hit_factor
    }

    pub fn set_style(&mut self, style: DotStyle) {
        self.style = style;
        self.cell_states.set_dot_size(style.dot_size);
        self.invalidate();
    }

    pub fn style(&self) -> DotStyle {
        self.style
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn lookup(&self) -> &SelectionLookup {
        &self.lookup
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase == SessionPhase::InProgress
    }

    pub fn in_progress_point(&self) -> Point {
        self.in_progress_point
    }

    pub fn cell_state(&self, cell: Cell) -> &CellPresentation {
        &self.cell_states[cell]
    }

    /// Whether frames keep changing without further input.
    pub fn is_animating(&self) -> bool {
        !self.scheduler.is_idle() || self.display_mode == DisplayMode::Animate
    }

    /// Returns and clears the pending repaint request.
    pub fn take_dirty(&mut self) -> Option<Dirty> {
        self.dirty.take()
    }

    // ---------------------------------------------------------------------
    // Gestures
    // ---------------------------------------------------------------------

    pub fn gesture_start(&mut self, point: Point) {
        if !self.input_enabled {
            return;
        }
        self.reset_pattern();
        self.last_move_region = None;
        self.in_progress_point = point;

        if self.detect_and_add_hit(point).is_some() {
            self.phase = SessionPhase::InProgress;
            self.display_mode = DisplayMode::Correct;
            self.notify_pattern_started();
        } else if self.phase == SessionPhase::InProgress {
            self.phase = SessionPhase::Idle;
            self.notify_pattern_cleared();
        } else {
            self.phase = SessionPhase::Idle;
        }
    }

    /// Processes one batch of pointer samples, oldest first. Hosts that
    /// buffer intermediate positions between frames pass them all here so a
    /// fast swipe cannot skip over cells.
    pub fn gesture_move(&mut self, samples: &[Point]) {
        if !self.input_enabled || self.phase == SessionPhase::Completed {
            return;
        }

        let radius = self.style.path_width;
        let mut region: Option<Bounds> = None;
        let mut moved = false;

        for &sample in samples {
            let hit = self.detect_and_add_hit(sample);
            if hit.is_some() && self.pattern.len() == 1 {
                self.phase = SessionPhase::InProgress;
                self.notify_pattern_started();
            }

            if sample != self.in_progress_point {
                moved = true;
            }

            if let (true, Some(last)) = (self.is_in_progress(), self.pattern.last()) {
                let mut stroke = Bounds::spanning(self.geometry.center(last), sample).inflate(radius);
                if let Some(hit) = hit {
                    stroke = stroke.union(self.geometry.cell_bounds(hit));
                }
                region = Some(region.map_or(stroke, |r| r.union(stroke)));
            }
            self.in_progress_point = sample;
        }

        if moved {
            // Repaint where the stroke was last frame too, so it gets erased.
            if let Some(now) = region {
                let area = self.last_move_region.map_or(now, |prev| prev.union(now));
                self.mark_dirty(Dirty::Region(area));
            }
            self.last_move_region = region;
        }
    }

    pub fn gesture_end(&mut self) {
        if !self.input_enabled || self.pattern.is_empty() {
            return;
        }
        self.phase = SessionPhase::Completed;
        self.cancel_line_animations();
        self.notify_pattern_detected();
        self.invalidate();
    }

    pub fn gesture_cancel(&mut self) {
        if !self.input_enabled || self.phase != SessionPhase::InProgress {
            return;
        }
        self.cancel_line_animations();
        self.reset_pattern();
        self.phase = SessionPhase::Idle;
        self.notify_pattern_cleared();
    }

    // ---------------------------------------------------------------------
    // Programmatic control
    // ---------------------------------------------------------------------

    /// Replaces the pattern without running gesture logic, e.g. to show a
    /// stored pattern or replay it. Later repeats of a cell are dropped.
    pub fn set_pattern(&mut self, mode: DisplayMode, cells: &[Cell]) -> Result<()> {
        if mode == DisplayMode::Animate && cells.is_empty() {
            return Err(PatternError::EmptyPatternAnimation);
        }
        self.pattern = Pattern::from_cells(cells);
        self.lookup = self.pattern.lookup();
        self.phase = if self.pattern.is_empty() {
            SessionPhase::Idle
        } else {
            SessionPhase::Completed
        };
        self.set_display_mode(mode)
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) -> Result<()> {
        if mode == DisplayMode::Animate {
            let first = self.pattern.cells().first().copied().ok_or(PatternError::EmptyPatternAnimation)?;
            self.replay_started_at = self.clock.now();
            self.in_progress_point = self.geometry.center(first);
        }
        debug!(mode = mode.as_str(), "display mode changed");
        self.display_mode = mode;
        self.invalidate();
        Ok(())
    }

    pub fn clear_pattern(&mut self) {
        self.reset_pattern();
        self.phase = SessionPhase::Idle;
    }

    pub fn save_state(&self) -> SavedState {
        SavedState {
            serialized_pattern: self.pattern.to_string(),
            display_mode: self.display_mode.ordinal(),
            input_enabled: self.input_enabled,
            in_stealth_mode: self.in_stealth_mode,
            haptic_feedback_enabled: self.haptic_feedback,
        }
    }

    /// Applies a saved state. Nothing changes if the state is invalid.
    pub fn restore_state(&mut self, state: &SavedState) -> Result<()> {
        let pattern = codec::decode(&state.serialized_pattern)?;
        let mode = DisplayMode::from_ordinal(state.display_mode)?;
        if mode == DisplayMode::Animate && pattern.is_empty() {
            return Err(PatternError::EmptyPatternAnimation);
        }

        self.set_pattern(DisplayMode::Correct, pattern.cells())?;
        self.set_display_mode(mode)?;
        self.input_enabled = state.input_enabled;
        self.in_stealth_mode = state.in_stealth_mode;
        self.haptic_feedback = state.haptic_feedback_enabled;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Animation and rendering
    // ---------------------------------------------------------------------

    /// Steps running animations to the current time. Returns true if the
    /// next frame will look different.
    pub fn advance_animations(&mut self) -> bool {
        let now = self.clock.now();
        let mut changed = self.scheduler.advance(now, &mut self.cell_states);
        if self.display_mode == DisplayMode::Animate {
            changed = true;
        }
        if changed {
            self.invalidate();
        }
        changed
    }

    pub fn frame(&self) -> Frame {
        let cells = self.pattern.cells();
        let replay = (self.display_mode == DisplayMode::Animate)
            .then(|| ReplayFrame::at(self.clock.now().saturating_sub(self.replay_started_at), cells.len()));

        let drawn_count = replay.map_or(cells.len(), |r| r.lit.min(cells.len()));
        let drawn = if replay.is_some() {
            SelectionLookup::from_cells(&cells[..drawn_count])
        } else {
            self.lookup
        };

        let dots = self
            .cell_states
            .iter()
            .map(|(cell, state)| DotFrame {
                cell,
                center: self.geometry.center(cell),
                drawn_size: state.drawn_size(),
                translate_y: state.translate_y,
                alpha: state.alpha,
                line_end: state.line_end,
                part_of_pattern: drawn.contains(cell),
                color: self.current_color(drawn.contains(cell)),
            })
            .collect();

        let path = (!self.in_stealth_mode).then(|| {
            let mut points = Vec::with_capacity(CELL_COUNT);
            for (i, &cell) in cells.iter().enumerate() {
                if !drawn.contains(cell) {
                    break;
                }
                let state = &self.cell_states[cell];
                let end = match (i, state.line_animation, state.line_end) {
                    (0, _, _) => self.geometry.center(cell),
                    (_, Some(_), Some(end)) => end,
                    _ => self.geometry.center(cell),
                };
                points.push(end);
            }

            let cursor = match replay {
                Some(r) if r.is_between_cells(cells.len()) => {
                    let from = self.geometry.center(cells[r.lit - 1]);
                    let to = self.geometry.center(cells[r.lit]);
                    Some(from.lerp(to, r.progress))
                }
                Some(_) => None,
                None => self.is_in_progress().then_some(self.in_progress_point),
            };
            let trailing = match (cursor, drawn_count) {
                (Some(to), n) if n > 0 => {
                    let from = self.geometry.center(cells[n - 1]);
                    Some(TrailingSegment {
                        from,
                        to,
                        alpha: self.last_segment_alpha(from, to),
                    })
                }
                _ => None,
            };

            PathFrame {
                points,
                trailing,
                color: self.current_color(true),
            }
        });

        Frame {
            dots,
            path,
            display_mode: self.display_mode,
        }
    }

    pub fn current_color(&self, part_of_pattern: bool) -> DotColor {
        if !part_of_pattern || self.in_stealth_mode || self.is_in_progress() {
            return DotColor::Regular;
        }
        match self.display_mode {
            DisplayMode::Wrong => DotColor::Error,
            DisplayMode::Correct | DisplayMode::Animate => DotColor::Success,
        }
    }

    /// Fades the pointer segment in as it leaves the last cell.
    fn last_segment_alpha(&self, from: Point, to: Point) -> f32 {
        if self.geometry.cell_width <= 0.0 {
            return 0.0;
        }
        let fraction = from.distance(to) / self.geometry.cell_width;
        ((fraction - 0.3) * 4.0).clamp(0.0, 1.0)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn hit_tester(&self) -> HitTester {
        HitTester::new(self.geometry, self.hit_factor)
    }

    fn detect_and_add_hit(&mut self, point: Point) -> Option<Cell> {
        let cell = self.hit_tester().new_hit(point, &self.lookup)?;
        if let Some(fill) = gap_fill::resolve(self.pattern.last(), cell, &self.lookup) {
            self.add_cell(fill);
        }
        self.add_cell(cell);
        if self.haptic_feedback {
            self.host.perform_haptic_feedback();
        }
        Some(cell)
    }

    fn add_cell(&mut self, cell: Cell) {
        self.lookup.mark(cell);
        self.pattern.push(cell);
        trace!(%cell, len = self.pattern.len(), "cell added");
        if !self.in_stealth_mode {
            self.start_cell_activation(cell);
        }
        self.notify_cell_added();
    }

    fn start_cell_activation(&mut self, cell: Cell) {
        let now = self.clock.now();
        let style = self.style;
        self.scheduler.schedule(
            now,
            cell_state::size_pulse(cell, style.dot_size, style.dot_size_activated),
        );
        let sweep = cell_state::line_sweep(cell, self.in_progress_point, self.geometry.center(cell));
        let handle = self.scheduler.schedule(now, sweep);
        if let Some(previous) = self.cell_states[cell].line_animation.replace(handle) {
            self.scheduler.cancel(previous);
        }
    }

    fn cancel_line_animations(&mut self) {
        for (_, state) in self.cell_states.iter_mut() {
            if let Some(handle) = state.line_animation.take() {
                self.scheduler.cancel(handle);
                state.line_end = None;
            }
        }
    }

    fn reset_pattern(&mut self) {
        self.pattern.clear();
        self.lookup.clear();
        self.display_mode = DisplayMode::Correct;
        self.invalidate();
    }

    /// Requests a full repaint.
    pub fn invalidate(&mut self) {
        self.mark_dirty(Dirty::Full);
    }

    fn mark_dirty(&mut self, dirty: Dirty) {
        self.dirty = Some(match self.dirty {
            Some(pending) => pending.merge(dirty),
            None => dirty,
        });
    }

    fn notify_pattern_started(&mut self) {
        debug!("pattern started");
        self.host.announce(Announcement::PatternStart);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_pattern_start();
        }
    }

    fn notify_pattern_cleared(&mut self) {
        debug!("pattern cleared");
        self.host.announce(Announcement::PatternCleared);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_pattern_cleared();
        }
    }

    fn notify_cell_added(&mut self) {
        self.host.announce(Announcement::CellAdded);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_pattern_cell_added(self.pattern.cells());
        }
    }

    fn notify_pattern_detected(&mut self) {
        debug!(pattern = %self.pattern, "pattern detected");
        self.host.announce(Announcement::PatternDetected);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_pattern_detected(self.pattern.cells());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clock::ManualClock;
    use crate::engine::listener::{PatternEvent, PatternEvents};

    fn c(row: i32, column: i32) -> Cell {
        Cell::of(row, column).unwrap()
    }

    /// 300x300 grid: cell (r, c) is centered at (50 + 100c, 50 + 100r).
    fn at(row: i32, column: i32) -> Point {
        Point::new(50.0 + 100.0 * column as f32, 50.0 + 100.0 * row as f32)
    }

    fn session() -> (PatternSession, PatternEvents, ManualClock) {
        let events = PatternEvents::new();
        let clock = ManualClock::new();
        let mut session = PatternSession::new(SessionOptions::default())
            .with_clock(clock.clone())
            .with_listener(events.clone());
        session.resize(300.0, 300.0, Padding::default());
        (session, events, clock)
    }

    #[test]
    fn test_start_on_cell_begins_pattern() {
        let (mut s, events, _) = session();
        s.gesture_start(at(1, 1));
        assert_eq!(s.phase(), SessionPhase::InProgress);
        assert_eq!(s.pattern().cells(), &[c(1, 1)]);
        assert_eq!(
            events.drain(),
            vec![PatternEvent::CellAdded("5".parse().unwrap()), PatternEvent::Started]
        );
    }

    #[test]
    fn test_start_off_cell_stays_idle() {
        let (mut s, events, _) = session();
        s.gesture_start(Point::new(100.0, 100.0));
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(s.pattern().is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_gestures_before_layout_select_nothing() {
        let events = PatternEvents::new();
        let mut s = PatternSession::new(SessionOptions::default())
            .with_clock(ManualClock::new())
            .with_listener(events.clone());
        s.gesture_start(Point::new(0.0, 0.0));
        s.gesture_move(&[Point::new(0.0, 0.0)]);
        assert!(s.pattern().is_empty());
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(events.is_empty());
    }

    #[test]
    fn test_move_onto_first_cell_starts_pattern() {
        let (mut s, events, _) = session();
        s.gesture_start(Point::new(100.0, 100.0));
        s.gesture_move(&[Point::new(120.0, 120.0), at(1, 1)]);
        assert!(s.is_in_progress());
        let drained = events.drain();
        assert_eq!(drained.iter().filter(|e| **e == PatternEvent::Started).count(), 1);
    }

    #[test]
    fn test_rehit_is_noop() {
        let (mut s, events, _) = session();
        s.gesture_start(at(0, 0));
        s.gesture_move(&[at(0, 1)]);
        events.drain();
        let lookup = *s.lookup();

        s.gesture_move(&[at(0, 0), at(0, 1), at(0, 0)]);
        assert_eq!(s.pattern().len(), 2);
        assert_eq!(*s.lookup(), lookup);
        assert!(events.is_empty());
    }

    #[test]
    fn test_vertical_skip_fills_gap() {
        let (mut s, _, _) = session();
        s.gesture_start(at(0, 0));
        s.gesture_move(&[at(2, 0)]);
        assert_eq!(s.pattern().cells(), &[c(0, 0), c(1, 0), c(2, 0)]);
    }

    #[test]
    fn test_gap_already_used_not_readded() {
        let (mut s, _, _) = session();
        s.gesture_start(at(1, 1));
        s.gesture_move(&[at(0, 0), at(2, 2)]);
        assert_eq!(s.pattern().cells(), &[c(1, 1), c(0, 0), c(2, 2)]);
    }

    #[test]
    fn test_move_after_completion_ignored() {
        let (mut s, _, _) = session();
        s.gesture_start(at(0, 0));
        s.gesture_end();
        s.gesture_move(&[at(0, 1)]);
        assert_eq!(s.pattern().len(), 1);
    }

    #[test]
    fn test_end_on_empty_pattern_does_nothing() {
        let (mut s, events, _) = session();
        s.gesture_start(Point::new(0.0, 0.0));
        s.gesture_end();
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(events.is_empty());
    }

    #[test]
    fn test_new_gesture_resets_wrong_mode() {
        let (mut s, _, _) = session();
        s.gesture_start(at(0, 0));
        s.gesture_end();
        s.set_display_mode(DisplayMode::Wrong).unwrap();
        s.gesture_start(at(2, 2));
        assert_eq!(s.display_mode(), DisplayMode::Correct);
        assert_eq!(s.pattern().cells(), &[c(2, 2)]);
    }

    #[test]
    fn test_start_miss_during_gesture_clears() {
        let (mut s, events, _) = session();
        s.gesture_start(at(0, 0));
        events.drain();
        s.gesture_start(Point::new(0.0, 0.0));
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert_eq!(events.drain(), vec![PatternEvent::Cleared]);
    }

    #[test]
    fn test_cancel_when_idle_emits_nothing() {
        let (mut s, events, _) = session();
        s.gesture_cancel();
        assert!(events.is_empty());
    }

    #[test]
    fn test_disabled_input_ignores_gestures() {
        let (mut s, events, _) = session();
        s.set_input_enabled(false);
        s.gesture_start(at(0, 0));
        s.gesture_move(&[at(0, 1)]);
        s.gesture_end();
        assert!(s.pattern().is_empty());
        assert!(events.is_empty());
        assert!(!s.is_input_enabled());
    }

    #[test]
    fn test_stealth_skips_animations_and_path() {
        let (mut s, events, _) = session();
        s.set_stealth_mode(true);
        s.gesture_start(at(0, 0));
        s.gesture_move(&[at(0, 1)]);
        assert_eq!(s.pattern().len(), 2);
        assert_eq!(events.len(), 3);
        assert!(!s.is_animating());
        assert_eq!(s.cell_state(c(0, 1)).line_animation, None);
        assert!(s.frame().path.is_none());
    }

    #[test]
    fn test_activation_animates_dot_size() {
        let (mut s, _, clock) = session();
        s.gesture_start(at(1, 1));
        clock.advance(Duration::from_millis(96));
        assert!(s.advance_animations());
        assert_eq!(s.cell_state(c(1, 1)).size, s.style().dot_size_activated);

        clock.advance(Duration::from_millis(400));
        s.advance_animations();
        assert_eq!(s.cell_state(c(1, 1)).size, s.style().dot_size);
        assert!(!s.is_animating());
    }

    #[test]
    fn test_end_cancels_line_sweeps_but_not_pulses() {
        let (mut s, _, clock) = session();
        s.gesture_start(at(0, 0));
        s.gesture_move(&[at(0, 1)]);
        clock.advance(Duration::from_millis(40));
        s.advance_animations();
        assert!(s.cell_state(c(0, 1)).line_end.is_some());

        s.gesture_end();
        assert_eq!(s.cell_state(c(0, 1)).line_end, None);
        assert_eq!(s.cell_state(c(0, 1)).line_animation, None);
        assert!(s.is_animating());

        clock.advance(Duration::from_secs(1));
        s.advance_animations();
        assert_eq!(s.cell_state(c(0, 1)).size, s.style().dot_size);
        assert_eq!(s.cell_state(c(0, 1)).line_end, None);
    }

    #[test]
    fn test_haptic_feedback_per_hit() {
        #[derive(Clone, Default)]
        struct Taps(std::rc::Rc<std::cell::Cell<u32>>);
        impl HostServices for Taps {
            fn perform_haptic_feedback(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let taps = Taps::default();
        let mut s = PatternSession::new(SessionOptions::default()).with_host(taps.clone());
        s.resize(300.0, 300.0, Padding::default());
        s.gesture_start(at(0, 0));
        // One hit that also fills (0,1): a single tap.
        s.gesture_move(&[at(0, 2)]);
        assert_eq!(taps.0.get(), 2);

        s.set_haptic_feedback_enabled(false);
        s.gesture_move(&[at(1, 2)]);
        assert_eq!(taps.0.get(), 2);
    }

    #[test]
    fn test_set_pattern_replaces_state() {
        let (mut s, events, _) = session();
        s.set_pattern(DisplayMode::Wrong, &[c(2, 0), c(1, 1)]).unwrap();
        assert_eq!(s.pattern().to_string(), "75");
        assert!(s.lookup().contains(c(1, 1)));
        assert_eq!(s.lookup().count(), 2);
        assert_eq!(s.display_mode(), DisplayMode::Wrong);
        assert_eq!(s.phase(), SessionPhase::Completed);
        assert!(events.is_empty());
    }

    #[test]
    fn test_set_pattern_animate_empty_fails() {
        let (mut s, _, _) = session();
        s.set_pattern(DisplayMode::Correct, &[c(0, 0)]).unwrap();
        assert_eq!(
            s.set_pattern(DisplayMode::Animate, &[]),
            Err(PatternError::EmptyPatternAnimation)
        );
        assert_eq!(s.pattern().len(), 1);
    }

    #[test]
    fn test_clear_pattern() {
        let (mut s, _, _) = session();
        s.set_pattern(DisplayMode::Wrong, &[c(0, 0)]).unwrap();
        s.clear_pattern();
        assert!(s.pattern().is_empty());
        assert_eq!(s.lookup().count(), 0);
        assert_eq!(s.display_mode(), DisplayMode::Correct);
        assert_eq!(s.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_colors_follow_mode() {
        let (mut s, _, _) = session();
        s.gesture_start(at(0, 0));
        assert_eq!(s.current_color(true), DotColor::Regular);
        s.gesture_end();
        assert_eq!(s.current_color(true), DotColor::Success);
        assert_eq!(s.current_color(false), DotColor::Regular);
        s.set_display_mode(DisplayMode::Wrong).unwrap();
        assert_eq!(s.current_color(true), DotColor::Error);
        s.set_stealth_mode(true);
        assert_eq!(s.current_color(true), DotColor::Regular);
    }

    #[test]
    fn test_frame_path_while_drawing() {
        let (mut s, _, clock) = session();
        s.gesture_start(at(0, 0));
        s.gesture_move(&[at(1, 1), Point::new(200.0, 200.0)]);
        clock.advance(Duration::from_secs(1));
        s.advance_animations();

        let frame = s.frame();
        let path = frame.path.unwrap();
        assert_eq!(path.points, vec![at(0, 0), at(1, 1)]);
        let trailing = path.trailing.unwrap();
        assert_eq!(trailing.from, at(1, 1));
        assert_eq!(trailing.to, Point::new(200.0, 200.0));
        // Distance ~70.7 over a 100-wide cell: (0.707 - 0.3) * 4 clamps to 1.
        assert_eq!(trailing.alpha, 1.0);
        assert_eq!(frame.dots.iter().filter(|d| d.part_of_pattern).count(), 2);
    }

    #[test]
    fn test_frame_trailing_fades_near_cell() {
        let (mut s, _, _) = session();
        s.gesture_start(at(0, 0));
        s.gesture_move(&[Point::new(60.0, 50.0)]);
        let trailing = s.frame().path.unwrap().trailing.unwrap();
        assert_eq!(trailing.alpha, 0.0);
    }

    #[test]
    fn test_no_trailing_after_release() {
        let (mut s, _, _) = session();
        s.gesture_start(at(0, 0));
        s.gesture_move(&[at(0, 1)]);
        s.gesture_end();
        assert!(s.frame().path.unwrap().trailing.is_none());
    }

    #[test]
    fn test_replay_lights_prefix() {
        let (mut s, _, clock) = session();
        s.set_pattern(DisplayMode::Animate, &[c(0, 0), c(0, 1), c(0, 2)]).unwrap();
        assert_eq!(s.in_progress_point(), at(0, 0));

        let lit = |s: &PatternSession| s.frame().dots.iter().filter(|d| d.part_of_pattern).count();
        assert_eq!(lit(&s), 0);

        clock.advance(Duration::from_millis(1_050));
        assert!(s.advance_animations());
        assert_eq!(lit(&s), 1);
        let path = s.frame().path.unwrap();
        assert_eq!(path.points, vec![at(0, 0)]);
        let trailing = path.trailing.unwrap();
        assert_eq!(trailing.to, Point::new(100.0, 50.0));

        clock.advance(Duration::from_millis(1_400));
        assert_eq!(lit(&s), 3);

        // Lookup keeps describing the whole pattern during replay.
        assert_eq!(s.lookup().count(), 3);

        clock.advance(Duration::from_millis(700));
        assert_eq!(lit(&s), 0);
    }

    #[test]
    fn test_dirty_requests_coalesce() {
        let (mut s, _, _) = session();
        s.take_dirty();
        s.gesture_start(at(0, 0));
        assert_eq!(s.take_dirty(), Some(Dirty::Full));
        assert_eq!(s.take_dirty(), None);

        s.gesture_move(&[Point::new(60.0, 60.0)]);
        let Some(Dirty::Region(first)) = s.take_dirty() else {
            panic!("expected a region");
        };
        assert!(first.contains(Point::new(60.0, 60.0)));

        s.gesture_move(&[Point::new(70.0, 70.0)]);
        s.gesture_move(&[Point::new(80.0, 90.0)]);
        let Some(Dirty::Region(merged)) = s.take_dirty() else {
            panic!("expected a region");
        };
        assert!(merged.contains(Point::new(70.0, 70.0)));
        assert!(merged.contains(Point::new(80.0, 90.0)));

        s.gesture_move(&[at(0, 1)]);
        s.gesture_end();
        assert_eq!(s.take_dirty(), Some(Dirty::Full));
    }

    #[test]
    fn test_save_and_restore() {
        let (mut s, _, _) = session();
        s.set_pattern(DisplayMode::Wrong, &[c(0, 0), c(1, 1), c(2, 2)]).unwrap();
        s.set_stealth_mode(true);
        s.set_haptic_feedback_enabled(false);
        let saved = s.save_state();
        assert_eq!(saved.serialized_pattern, "159");
        assert_eq!(saved.display_mode, 1);

        let (mut restored, _, _) = session();
        restored.restore_state(&saved).unwrap();
        assert_eq!(restored.save_state(), saved);
        assert_eq!(restored.pattern(), s.pattern());
        assert_eq!(*restored.lookup(), *s.lookup());
    }

    #[test]
    fn test_restore_rejects_bad_state_untouched() {
        let (mut s, _, _) = session();
        s.set_pattern(DisplayMode::Correct, &[c(0, 0)]).unwrap();

        let mut bad = s.save_state();
        bad.display_mode = 7;
        assert_eq!(s.restore_state(&bad), Err(PatternError::UnknownDisplayMode(7)));

        let mut bad = s.save_state();
        bad.serialized_pattern = "1x".to_string();
        assert!(matches!(
            s.restore_state(&bad),
            Err(PatternError::MalformedPattern { .. })
        ));

        let bad = SavedState {
            display_mode: DisplayMode::Animate.ordinal(),
            ..SavedState::default()
        };
        assert_eq!(s.restore_state(&bad), Err(PatternError::EmptyPatternAnimation));
        assert_eq!(s.pattern().to_string(), "1");
    }
}
