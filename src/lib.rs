//! Gesture lock pattern recognition for a 3x3 dot grid.
//!
//! [`engine::PatternSession`] consumes pointer events and produces a
//! [`pattern::Pattern`]; hosts render it from [`engine::Frame`] snapshots.
//! The `config` and `store` modules are shared with the terminal front end.

pub mod animation;
pub mod config;
pub mod engine;
pub mod error;
pub mod pattern;
pub mod store;

pub use engine::{PatternSession, Point, SessionOptions};
pub use error::PatternError;
pub use pattern::{Cell, DisplayMode, Pattern};
