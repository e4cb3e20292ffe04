use serde::{Deserialize, Serialize};

/// What a host persists to bring a session back after being torn down.
///
/// Field order is part of the contract: pattern string, display mode ordinal,
/// then the three flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedState {
    pub serialized_pattern: String,
    pub display_mode: i32,
    pub input_enabled: bool,
    pub in_stealth_mode: bool,
    pub haptic_feedback_enabled: bool,
}
