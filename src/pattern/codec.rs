//! Compact string form of a pattern: one character per cell, `'1'` for the
//! top-left dot through `'9'` for the bottom-right one.

use crate::error::{PatternError, Result};
use crate::pattern::Pattern;
use crate::pattern::cell::{CELL_COUNT, Cell};

const BASE: u8 = b'1';

pub fn encode(cells: &[Cell]) -> String {
    cells
        .iter()
        .map(|cell| char::from(BASE + cell.index() as u8))
        .collect()
}

/// Decodes a string produced by [`encode`]. The empty string is the empty
/// pattern.
pub fn decode(input: &str) -> Result<Pattern> {
    let malformed = |reason: String| PatternError::MalformedPattern {
        input: input.to_string(),
        reason,
    };

    let mut pattern = Pattern::new();
    for ch in input.chars() {
        let index = (ch as u32)
            .checked_sub(BASE as u32)
            .map(|i| i as usize)
            .filter(|&i| i < CELL_COUNT)
            .ok_or_else(|| malformed(format!("{ch:?} does not name a cell")))?;
        let cell = Cell::ALL[index];
        if !pattern.push(cell) {
            return Err(malformed(format!("cell {cell} repeats")));
        }
    }
    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(i32, i32)]) -> Vec<Cell> {
        coords.iter().map(|&(r, c)| Cell::of(r, c).unwrap()).collect()
    }

    #[test]
    fn test_encode_diagonal() {
        assert_eq!(encode(&cells(&[(0, 0), (1, 1), (2, 2)])), "159");
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_decode_empty_is_empty_pattern() {
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_full_grid() {
        let pattern = decode("123654789").unwrap();
        assert_eq!(pattern.len(), 9);
        assert_eq!(pattern.cells()[3], Cell::of(1, 2).unwrap());
        assert_eq!(pattern.to_string(), "123654789");
    }

    #[test]
    fn test_round_trip_every_length() {
        // Walk a snake through the grid so each prefix is a distinct-cell pattern.
        let snake = cells(&[
            (0, 0),
            (0, 1),
            (0, 2),
            (1, 2),
            (1, 1),
            (1, 0),
            (2, 0),
            (2, 1),
            (2, 2),
        ]);
        for len in 0..=snake.len() {
            let prefix = &snake[..len];
            let decoded = decode(&encode(prefix)).unwrap();
            assert_eq!(decoded.cells(), prefix);
        }
    }

    #[test]
    fn test_decode_rejects_out_of_range_chars() {
        for bad in ["0", "12a", ":", "1 2", "é"] {
            let err = decode(bad).unwrap_err();
            assert!(
                matches!(err, PatternError::MalformedPattern { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_repeats() {
        let err = decode("1231").unwrap_err();
        assert!(err.to_string().contains("repeats"));
    }
}
