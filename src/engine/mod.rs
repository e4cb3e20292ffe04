pub mod gap_fill;
pub mod geometry;
pub mod listener;
pub mod saved_state;
pub mod session;

pub use geometry::{Aspect, Bounds, GridGeometry, Padding, Point};
pub use hit_test::{DEFAULT_HIT_FACTOR, HitTester};
pub use listener::{Announcement, HostServices, NoHost, PatternEvent, PatternEvents, PatternListener};
pub use saved_state::SavedState;
pub use session::{
    Dirty, DotColor, DotFrame, DotStyle, Frame, PathFrame, PatternSession, SessionOptions,
    SessionPhase, TrailingSegment,
};
