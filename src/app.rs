use std::cell::RefCell;
use std::rc::Rc;

use patternlock::config::Config;
use patternlock::engine::gap_fill;
use patternlock::engine::{
    Announcement, Frame, HostServices, PatternEvent, PatternEvents, PatternSession,
};
use patternlock::pattern::{CELL_COUNT, Cell, DisplayMode, Pattern};
use patternlock::store::json_store::JsonStore;
use patternlock::store::schema::LockData;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::ui::components::lock_grid::LockGrid;
use crate::ui::components::status_bar::ModeFlags;
use crate::ui::layout::{AppLayout, GridSurface};
use crate::ui::theme::Theme;

/// Shortest pattern the record screen accepts.
pub const MIN_PATTERN_CELLS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    /// Draw a new pattern.
    Record,
    /// Draw the new pattern a second time.
    Confirm,
    /// Draw the enrolled pattern.
    Unlock,
    /// Watch a pattern replay; input is off.
    Replay,
}

impl AppScreen {
    pub fn title(self) -> &'static str {
        match self {
            AppScreen::Record => "Record",
            AppScreen::Confirm => "Confirm",
            AppScreen::Unlock => "Unlock",
            AppScreen::Replay => "Replay",
        }
    }
}

#[derive(Default)]
struct HostState {
    bells: usize,
    announcement: Option<Announcement>,
}

/// Haptics become a terminal bell; announcements feed the status line.
/// Clones share state so the app can read what the session triggered.
#[derive(Clone, Default)]
pub struct TerminalHost {
    state: Rc<RefCell<HostState>>,
}

impl TerminalHost {
    /// Returns how many haptic pulses were requested since the last call.
    pub fn take_bells(&self) -> usize {
        std::mem::take(&mut self.state.borrow_mut().bells)
    }

    pub fn take_announcement(&self) -> Option<Announcement> {
        self.state.borrow_mut().announcement.take()
    }
}

impl HostServices for TerminalHost {
    fn perform_haptic_feedback(&mut self) {
        self.state.borrow_mut().bells += 1;
    }

    fn announce(&mut self, announcement: Announcement) {
        self.state.borrow_mut().announcement = Some(announcement);
    }
}

pub struct App {
    pub screen: AppScreen,
    pub theme: Theme,
    pub config: Config,
    pub session: PatternSession,
    pub events: PatternEvents,
    pub host: TerminalHost,
    pub store: Option<JsonStore>,
    pub enrolled: Option<Pattern>,
    pub draft: Option<Pattern>,
    pub status: String,
    pub surface: GridSurface,
    pub should_quit: bool,
    /// Whether input should come back on when a replay ends.
    input_before_replay: bool,
    /// Whether the current pointer press began inside the grid.
    tracking: bool,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = JsonStore::new()
            .map_err(|err| warn!(%err, "lock state will not be saved"))
            .ok();
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Option<JsonStore>) -> Self {
        let theme = Theme::load(&config.theme).unwrap_or_default();
        let events = PatternEvents::new();
        let host = TerminalHost::default();
        let mut session = PatternSession::new(config.session_options())
            .with_listener(events.clone())
            .with_host(host.clone());

        let mut enrolled = None;
        if let Some(store) = &store {
            if store.cleanup_interrupted_save() {
                warn!("removed temp file from an interrupted save");
            }
            if let Some(data) = store.load_lock_data() {
                if let Err(err) = session.restore_state(&data.view) {
                    warn!(%err, "ignoring saved view state");
                }
                enrolled = data.enrolled.filter(|p| !p.is_empty());
            }
        }
        // Replays are not resumed; the restored pattern stays visible.
        if session.display_mode() == DisplayMode::Animate {
            let _ = session.set_display_mode(DisplayMode::Correct);
        }

        let screen = if enrolled.is_some() {
            AppScreen::Unlock
        } else {
            AppScreen::Record
        };
        let input_before_replay = session.is_input_enabled();

        let mut app = Self {
            screen,
            theme,
            config,
            session,
            events,
            host,
            store,
            enrolled,
            draft: None,
            status: String::new(),
            surface: GridSurface::default(),
            should_quit: false,
            input_before_replay,
            tracking: false,
            rng: SmallRng::from_entropy(),
        };
        app.status = app.screen_prompt().to_string();
        app
    }

    fn screen_prompt(&self) -> &'static str {
        match self.screen {
            AppScreen::Record => "Draw an unlock pattern",
            AppScreen::Confirm => "Draw the pattern again to confirm",
            AppScreen::Unlock => "Draw your pattern to unlock",
            AppScreen::Replay => "Replaying pattern",
        }
    }

    pub fn flags(&self) -> ModeFlags {
        ModeFlags {
            stealth: self.session.is_in_stealth_mode(),
            input: self.session.is_input_enabled(),
            haptics: self.session.is_haptic_feedback_enabled(),
        }
    }

    pub fn frame(&self) -> Frame {
        self.session.frame()
    }

    /// Re-derives the grid geometry when the terminal area changes.
    pub fn update_surface(&mut self, area: ratatui::layout::Rect) {
        let layout = AppLayout::new(area);
        let surface = GridSurface::new(LockGrid::inner(layout.main));
        if surface != self.surface {
            self.surface = surface;
            self.session
                .set_geometry(surface.geometry(self.config.aspect, self.config.padding));
        }
    }

    // ---------------------------------------------------------------------
    // Pointer input
    // ---------------------------------------------------------------------

    pub fn pointer_down(&mut self, column: u16, row: u16) {
        self.tracking = false;
        let Some(point) = self.surface.to_point(column, row) else {
            return;
        };
        self.tracking = true;
        self.session.gesture_start(point);
        self.process_session_events();
    }

    pub fn pointer_drag(&mut self, positions: &[(u16, u16)]) {
        if !self.tracking {
            return;
        }
        let samples: Vec<_> = positions
            .iter()
            .filter_map(|&(column, row)| self.surface.to_point_clamped(column, row))
            .collect();
        if !samples.is_empty() {
            self.session.gesture_move(&samples);
        }
        self.process_session_events();
    }

    pub fn pointer_up(&mut self, column: u16, row: u16) {
        if !std::mem::take(&mut self.tracking) {
            return;
        }
        if let Some(point) = self.surface.to_point_clamped(column, row) {
            self.session.gesture_move(&[point]);
        }
        self.session.gesture_end();
        self.process_session_events();
    }

    /// Hover-driven input: entering the grid starts a gesture, moving inside
    /// it extends the gesture and leaving it ends the gesture.
    pub fn hover(&mut self, column: u16, row: u16) {
        let inside = self.surface.to_point(column, row).is_some();
        match (self.tracking, inside) {
            (false, true) => self.pointer_down(column, row),
            (true, true) => self.pointer_drag(&[(column, row)]),
            (true, false) => self.pointer_up(column, row),
            (false, false) => {}
        }
    }

    pub fn cancel_gesture(&mut self) {
        self.tracking = false;
        self.session.gesture_cancel();
        self.process_session_events();
    }

    pub fn tick(&mut self) {
        self.session.advance_animations();
    }

    fn process_session_events(&mut self) {
        if let Some(announcement) = self.host.take_announcement() {
            if announcement != Announcement::CellAdded {
                self.status = announcement.message().to_string();
            }
        }
        for event in self.events.drain() {
            match event {
                PatternEvent::Detected(pattern) => self.on_pattern_detected(pattern),
                PatternEvent::Cleared => self.status = self.screen_prompt().to_string(),
                PatternEvent::Started | PatternEvent::CellAdded(_) => {}
            }
        }
    }

    fn show_wrong(&mut self, message: &str) {
        if let Err(err) = self.session.set_display_mode(DisplayMode::Wrong) {
            warn!(%err, "could not mark pattern wrong");
        }
        self.status = message.to_string();
    }

    fn on_pattern_detected(&mut self, pattern: Pattern) {
        match self.screen {
            AppScreen::Record => {
                if pattern.len() < MIN_PATTERN_CELLS {
                    self.show_wrong(&format!("Connect at least {MIN_PATTERN_CELLS} dots"));
                    return;
                }
                self.draft = Some(pattern);
                self.screen = AppScreen::Confirm;
                self.status = self.screen_prompt().to_string();
            }
            AppScreen::Confirm => {
                if self.draft.as_ref() != Some(&pattern) {
                    self.show_wrong("Patterns did not match");
                    return;
                }
                info!(cells = pattern.len(), "pattern enrolled");
                self.enrolled = self.draft.take();
                self.screen = AppScreen::Unlock;
                self.save();
                self.status = "Pattern saved".to_string();
            }
            AppScreen::Unlock => {
                if self.enrolled.as_ref() == Some(&pattern) {
                    info!("unlocked");
                    self.status = "Unlocked".to_string();
                } else {
                    self.show_wrong("Wrong pattern");
                }
            }
            AppScreen::Replay => {}
        }
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    pub fn toggle_stealth(&mut self) {
        let stealth = !self.session.is_in_stealth_mode();
        self.session.set_stealth_mode(stealth);
    }

    pub fn toggle_input(&mut self) {
        if self.screen == AppScreen::Replay {
            return;
        }
        let enabled = !self.session.is_input_enabled();
        self.session.set_input_enabled(enabled);
    }

    pub fn toggle_haptics(&mut self) {
        let enabled = !self.session.is_haptic_feedback_enabled();
        self.session.set_haptic_feedback_enabled(enabled);
    }

    pub fn cycle_theme(&mut self) {
        let themes = Theme::available_themes();
        if themes.is_empty() {
            return;
        }
        let current = themes.iter().position(|name| *name == self.config.theme);
        let next = current.map_or(0, |i| (i + 1) % themes.len());
        if let Some(theme) = Theme::load(&themes[next]) {
            self.config.theme = themes[next].clone();
            self.theme = theme;
        }
    }

    pub fn clear(&mut self) {
        if self.screen == AppScreen::Replay {
            return;
        }
        self.session.clear_pattern();
        self.status = self.screen_prompt().to_string();
    }

    /// Starts over on the record screen.
    pub fn rerecord(&mut self) {
        self.leave_replay();
        self.draft = None;
        self.screen = AppScreen::Record;
        self.session.clear_pattern();
        self.status = self.screen_prompt().to_string();
    }

    /// Replays the enrolled pattern, or a random one if none is enrolled.
    pub fn start_replay(&mut self) {
        let pattern = match &self.enrolled {
            Some(pattern) => pattern.clone(),
            None => demo_pattern(&mut self.rng),
        };
        self.replay(&pattern);
    }

    pub fn start_demo(&mut self) {
        let pattern = demo_pattern(&mut self.rng);
        self.replay(&pattern);
    }

    fn replay(&mut self, pattern: &Pattern) {
        if self.screen != AppScreen::Replay {
            self.input_before_replay = self.session.is_input_enabled();
        }
        self.tracking = false;
        self.session.gesture_cancel();
        self.events.drain();
        match self.session.set_pattern(DisplayMode::Animate, pattern.cells()) {
            Ok(()) => {
                self.session.set_input_enabled(false);
                self.screen = AppScreen::Replay;
                self.status = format!("Replaying {pattern}");
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    pub fn leave_replay(&mut self) {
        if self.screen != AppScreen::Replay {
            return;
        }
        self.session.set_input_enabled(self.input_before_replay);
        self.session.clear_pattern();
        self.screen = if self.enrolled.is_some() {
            AppScreen::Unlock
        } else {
            AppScreen::Record
        };
        self.status = self.screen_prompt().to_string();
    }

    pub fn quit(&mut self) {
        self.leave_replay();
        self.save();
        self.should_quit = true;
    }

    fn save(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let data = LockData {
            view: self.session.save_state(),
            enrolled: self.enrolled.clone(),
            ..LockData::default()
        };
        if let Err(err) = store.save_lock_data(&data) {
            warn!(%err, "failed to save lock state");
        }
    }
}

/// Builds a random valid pattern by walking to unused cells, gap-filling the
/// way a swipe would.
pub fn demo_pattern<R: Rng>(rng: &mut R) -> Pattern {
    let target = rng.gen_range(MIN_PATTERN_CELLS..=CELL_COUNT);
    let mut pattern = Pattern::new();
    while pattern.len() < target {
        let lookup = pattern.lookup();
        let free: Vec<Cell> = Cell::ALL
            .iter()
            .copied()
            .filter(|&cell| !lookup.contains(cell))
            .collect();
        let Some(&next) = free.choose(rng) else {
            break;
        };
        if let Some(fill) = gap_fill::resolve(pattern.last(), next, &lookup) {
            pattern.push(fill);
        }
        pattern.push(next);
    }
    pattern
}
