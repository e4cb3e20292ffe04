use serde::{Deserialize, Serialize};

use crate::pattern::{Cell, GRID_SIZE};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, target: Point, t: f32) -> Point {
        Point::new(
            (1.0 - t) * self.x + t * target.x,
            (1.0 - t) * self.y + t * target.y,
        )
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned rectangle in host coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn spanning(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub fn around(center: Point, half_width: f32, half_height: f32) -> Self {
        Self {
            left: center.x - half_width,
            top: center.y - half_height,
            right: center.x + half_width,
            bottom: center.y + half_height,
        }
    }

    pub fn inflate(self, by: f32) -> Self {
        Self {
            left: self.left - by,
            top: self.top - by,
            right: self.right + by,
            bottom: self.bottom + by,
        }
    }

    pub fn union(self, other: Bounds) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Padding {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Padding {
    pub const fn uniform(value: f32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }
}

/// Placement of the 3x3 grid inside the host surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridGeometry {
    pub origin_x: f32,
    pub origin_y: f32,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl GridGeometry {
    /// Splits the padded content box of a `width` x `height` surface into
    /// three equal rows and columns.
    pub fn from_size(width: f32, height: f32, padding: Padding) -> Self {
        let content_width = (width - padding.left - padding.right).max(0.0);
        let content_height = (height - padding.top - padding.bottom).max(0.0);
        Self {
            origin_x: padding.left,
            origin_y: padding.top,
            cell_width: content_width / GRID_SIZE as f32,
            cell_height: content_height / GRID_SIZE as f32,
        }
    }

    pub fn center_x(&self, column: usize) -> f32 {
        self.origin_x + column as f32 * self.cell_width + self.cell_width / 2.0
    }

    pub fn center_y(&self, row: usize) -> f32 {
        self.origin_y + row as f32 * self.cell_height + self.cell_height / 2.0
    }

    pub fn center(&self, cell: Cell) -> Point {
        Point::new(self.center_x(cell.column()), self.center_y(cell.row()))
    }

    pub fn cell_bounds(&self, cell: Cell) -> Bounds {
        Bounds::around(self.center(cell), self.cell_width / 2.0, self.cell_height / 2.0)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            left: self.origin_x,
            top: self.origin_y,
            right: self.origin_x + self.cell_width * GRID_SIZE as f32,
            bottom: self.origin_y + self.cell_height * GRID_SIZE as f32,
        }
    }
}

/// Policy for shaping the widget inside the space offered by its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    /// Width and height both shrink to the smaller side.
    #[default]
    Square,
    /// Width is kept; height may not exceed it.
    LockWidth,
    /// Height is kept; width may not exceed it.
    LockHeight,
}

impl Aspect {
    pub fn fit(self, width: f32, height: f32) -> (f32, f32) {
        match self {
            Aspect::Square => {
                let side = width.min(height);
                (side, side)
            }
            Aspect::LockWidth => (width, width.min(height)),
            Aspect::LockHeight => (width.min(height), height),
        }
    }
}
