pub mod cell_state;
pub mod clock;
pub mod easing;
pub mod replay;
pub mod scheduler;

pub use cell_state::{CellPresentation, CellStates};
pub use clock::{Clock, ManualClock, SystemClock};
pub use easing::Easing;
pub use replay::{MILLIS_PER_CIRCLE_ANIMATING, ReplayFrame};
pub use scheduler::{AnimationHandle, FrameScheduler, Interpolation, Property, Scheduler};
