use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::saved_state::SavedState;
use crate::pattern::Pattern;

pub const SCHEMA_VERSION: u32 = 1;

/// Contents of the lock state file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LockData {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    /// Widget state as it was when the host last shut down.
    pub view: SavedState,
    /// Pattern the user enrolled for the unlock screen. `None` until one has
    /// been recorded; an enrolled pattern is never empty.
    #[serde(default)]
    pub enrolled: Option<Pattern>,
}

impl Default for LockData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            view: SavedState {
                input_enabled: true,
                haptic_feedback_enabled: true,
                ..SavedState::default()
            },
            enrolled: None,
        }
    }
}

impl LockData {
    /// Check if loaded data has a stale schema version and should be discarded.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
