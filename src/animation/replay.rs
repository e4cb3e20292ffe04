use std::time::Duration;

/// Time each dot stays the newest lit dot while a pattern replays.
pub const MILLIS_PER_CIRCLE_ANIMATING: u64 = 700;

/// Snapshot of a looping replay at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReplayFrame {
    /// Number of leading cells of the pattern that are lit.
    pub lit: usize,
    /// How far the trailing line has travelled toward the next cell, in `[0, 1)`.
    pub progress: f32,
}

impl ReplayFrame {
    /// Computes the frame `elapsed` after the replay started for a pattern of
    /// `len` cells. One cycle lights each cell in turn and then holds the full
    /// pattern for one extra step before starting over.
    pub fn at(elapsed: Duration, len: usize) -> Self {
        let step = MILLIS_PER_CIRCLE_ANIMATING as u128;
        let cycle = (len as u128 + 1) * step;
        let spot = elapsed.as_millis() % cycle;
        Self {
            lit: (spot / step) as usize,
            progress: (spot % step) as f32 / step as f32,
        }
    }

    /// Whether the trailing line is travelling between two cells.
    pub fn is_between_cells(&self, len: usize) -> bool {
        self.lit >= 1 && self.lit < len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_cycle_lights_prefixes_in_order() {
        assert_eq!(ReplayFrame::at(ms(0), 3).lit, 0);
        assert_eq!(ReplayFrame::at(ms(699), 3).lit, 0);
        assert_eq!(ReplayFrame::at(ms(700), 3).lit, 1);
        assert_eq!(ReplayFrame::at(ms(1_400), 3).lit, 2);
        assert_eq!(ReplayFrame::at(ms(2_100), 3).lit, 3);
    }

    #[test]
    fn test_cycle_wraps() {
        // Cycle for three cells is 4 * 700 = 2800ms.
        assert_eq!(ReplayFrame::at(ms(2_800), 3).lit, 0);
        assert_eq!(ReplayFrame::at(ms(2_800 * 5 + 750), 3).lit, 1);
    }

    #[test]
    fn test_progress_within_step() {
        let frame = ReplayFrame::at(ms(1_050), 3);
        assert_eq!(frame.lit, 1);
        assert!((frame.progress - 0.5).abs() < 1e-6);
        assert!(frame.is_between_cells(3));
    }

    #[test]
    fn test_not_between_cells_at_ends() {
        assert!(!ReplayFrame::at(ms(100), 3).is_between_cells(3));
        assert!(!ReplayFrame::at(ms(2_200), 3).is_between_cells(3));
    }
}
