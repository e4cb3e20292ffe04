use std::ops::{Index, IndexMut};
use std::time::Duration;

use crate::animation::easing::Easing;
use crate::animation::scheduler::{AnimationHandle, Interpolation, Property};
use crate::engine::geometry::Point;
use crate::pattern::{CELL_COUNT, Cell};

pub const SIZE_GROW_DURATION: Duration = Duration::from_millis(96);
pub const SIZE_SHRINK_DURATION: Duration = Duration::from_millis(192);
pub const LINE_SWEEP_DURATION: Duration = Duration::from_millis(100);

/// Transient drawing attributes of one dot.
///
/// These outlive any single pattern: clearing the pattern leaves running
/// pulses alone so the dots settle on their own.
#[derive(Clone, Debug, PartialEq)]
pub struct CellPresentation {
    pub scale: f32,
    pub translate_y: f32,
    pub alpha: f32,
    pub size: f32,
    /// Where the connecting line into this cell currently ends; `None` when
    /// no sweep has run or the sweep was cancelled.
    pub line_end: Option<Point>,
    pub line_animation: Option<AnimationHandle>,
}

impl CellPresentation {
    pub fn new(dot_size: f32) -> Self {
        Self {
            scale: 1.0,
            translate_y: 0.0,
            alpha: 1.0,
            size: dot_size,
            line_end: None,
            line_animation: None,
        }
    }

    pub fn drawn_size(&self) -> f32 {
        self.size * self.scale
    }
}

/// Presentation state for all nine cells, indexed by [`Cell`].
#[derive(Clone, Debug, PartialEq)]
pub struct CellStates {
    states: [CellPresentation; CELL_COUNT],
}

impl CellStates {
    pub fn new(dot_size: f32) -> Self {
        Self {
            states: std::array::from_fn(|_| CellPresentation::new(dot_size)),
        }
    }

    /// Resets resting sizes; used when the configured dot size changes.
    pub fn set_dot_size(&mut self, dot_size: f32) {
        for state in &mut self.states {
            state.size = dot_size;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, &CellPresentation)> {
        Cell::ALL.into_iter().zip(self.states.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Cell, &mut CellPresentation)> {
        Cell::ALL.into_iter().zip(self.states.iter_mut())
    }
}

impl Index<Cell> for CellStates {
    type Output = CellPresentation;

    fn index(&self, cell: Cell) -> &CellPresentation {
        &self.states[cell.index()]
    }
}

impl IndexMut<Cell> for CellStates {
    fn index_mut(&mut self, cell: Cell) -> &mut CellPresentation {
        &mut self.states[cell.index()]
    }
}

/// Grow to `activated`, then fall back to `resting`.
pub fn size_pulse(cell: Cell, resting: f32, activated: f32) -> Interpolation {
    Interpolation::new(
        cell,
        Property::DotSize {
            from: resting,
            to: activated,
        },
        SIZE_GROW_DURATION,
        Easing::LinearOutSlowIn,
    )
    .then(Interpolation::new(
        cell,
        Property::DotSize {
            from: activated,
            to: resting,
        },
        SIZE_SHRINK_DURATION,
        Easing::FastOutSlowIn,
    ))
}

/// Sweep the end of the line into `cell` from `from` to `to`.
pub fn line_sweep(cell: Cell, from: Point, to: Point) -> Interpolation {
    Interpolation::new(
        cell,
        Property::LineEnd { from, to },
        LINE_SWEEP_DURATION,
        Easing::Linear,
    )
}
