use crate::pattern::{Cell, SelectionLookup};

/// Returns the cell a straight jump from `last` to `hit` passes over, if any.
///
/// A row step is inserted when the jump spans two rows and does not move
/// exactly one column; likewise for columns. When both rules fire (corner to
/// opposite corner) the result is the center cell.
pub fn intermediate(last: Cell, hit: Cell) -> Option<Cell> {
    let d_row = hit.row() as i32 - last.row() as i32;
    let d_column = hit.column() as i32 - last.column() as i32;

    let mut row = last.row() as i32;
    let mut column = last.column() as i32;
    if d_row.abs() == 2 && d_column.abs() != 1 {
        row += d_row.signum();
    }
    if d_column.abs() == 2 && d_row.abs() != 1 {
        column += d_column.signum();
    }

    if row == last.row() as i32 && column == last.column() as i32 {
        return None;
    }
    Cell::of(row, column).ok()
}

/// Cell to commit before `hit`: the intermediate cell, unless the pattern
/// already holds it.
pub fn resolve(last: Option<Cell>, hit: Cell, lookup: &SelectionLookup) -> Option<Cell> {
    let fill = intermediate(last?, hit)?;
    if lookup.contains(fill) {
        return None;
    }
    tracing::trace!(%fill, %hit, "filling skipped cell");
    Some(fill)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: i32, column: i32) -> Cell {
        Cell::of(row, column).unwrap()
    }

    #[test]
    fn test_no_last_cell_needs_no_fill() {
        assert_eq!(resolve(None, c(2, 2), &SelectionLookup::default()), None);
    }

    #[test]
    fn test_vertical_skip() {
        assert_eq!(intermediate(c(0, 0), c(2, 0)), Some(c(1, 0)));
        assert_eq!(intermediate(c(2, 2), c(0, 2)), Some(c(1, 2)));
    }

    #[test]
    fn test_horizontal_skip() {
        assert_eq!(intermediate(c(0, 0), c(0, 2)), Some(c(0, 1)));
        assert_eq!(intermediate(c(1, 2), c(1, 0)), Some(c(1, 1)));
    }

    #[test]
    fn test_adjacent_moves_need_no_fill() {
        assert_eq!(intermediate(c(0, 0), c(1, 1)), None);
        assert_eq!(intermediate(c(1, 1), c(0, 1)), None);
        assert_eq!(intermediate(c(2, 1), c(2, 2)), None);
    }

    #[test]
    fn test_knight_moves_need_no_fill() {
        assert_eq!(intermediate(c(0, 0), c(2, 1)), None);
        assert_eq!(intermediate(c(0, 0), c(1, 2)), None);
        assert_eq!(intermediate(c(2, 2), c(0, 1)), None);
    }

    // Both guards hold on an opposite-corner jump, so each axis steps once.
    #[test]
    fn test_opposite_corners_fill_center() {
        assert_eq!(intermediate(c(0, 0), c(2, 2)), Some(c(1, 1)));
        assert_eq!(intermediate(c(2, 0), c(0, 2)), Some(c(1, 1)));
    }

    #[test]
    fn test_used_fill_is_skipped() {
        let lookup = SelectionLookup::from_cells(&[c(1, 0), c(0, 0)]);
        assert_eq!(resolve(Some(c(0, 0)), c(2, 0), &lookup), None);

        let lookup = SelectionLookup::from_cells(&[c(0, 0)]);
        assert_eq!(resolve(Some(c(0, 0)), c(2, 0), &lookup), Some(c(1, 0)));
    }
}
