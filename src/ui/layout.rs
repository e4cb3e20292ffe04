use patternlock::engine::{Aspect, GridGeometry, Padding, Point};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Terminal rows are roughly twice as tall as columns are wide, so the grid
/// works in a space where one row spans two units vertically. Distances in
/// that space look the same in both directions.
pub const ROW_SCALE: f32 = 2.0;

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(9),
                Constraint::Length(3),
            ])
            .split(area);

        Self {
            header: vertical[0],
            main: vertical[1],
            footer: vertical[2],
        }
    }
}

/// The inner area of the grid widget and its mapping to session space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridSurface {
    pub area: Rect,
}

impl GridSurface {
    pub fn new(area: Rect) -> Self {
        Self { area }
    }

    /// Size of the surface in session units.
    pub fn size(&self) -> (f32, f32) {
        (self.area.width as f32, self.area.height as f32 * ROW_SCALE)
    }

    /// Places the grid inside the surface, shaped by `aspect` and centered.
    pub fn geometry(&self, aspect: Aspect, padding: f32) -> GridGeometry {
        let (width, height) = self.size();
        let (fit_width, fit_height) = aspect.fit(width, height);
        let mut geometry = GridGeometry::from_size(fit_width, fit_height, Padding::uniform(padding));
        geometry.origin_x += (width - fit_width) / 2.0;
        geometry.origin_y += (height - fit_height) / 2.0;
        geometry
    }

    /// Maps a terminal cell to the session-space point at its center, or
    /// `None` if it lies outside the surface.
    pub fn to_point(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.area;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside {
            return None;
        }
        self.to_point_clamped(column, row)
    }

    /// Like [`to_point`](Self::to_point) but pins outside positions to the
    /// nearest edge, so a drag that leaves the widget keeps its trailing line.
    /// `None` only when the surface has no area left, e.g. after the terminal
    /// shrank mid-drag.
    pub fn to_point_clamped(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.area;
        if area.is_empty() {
            return None;
        }
        let column = column.clamp(area.x, area.x + area.width - 1);
        let row = row.clamp(area.y, area.y + area.height - 1);
        Some(Point::new(
            (column - area.x) as f32 + 0.5,
            ((row - area.y) as f32 + 0.5) * ROW_SCALE,
        ))
    }
}
