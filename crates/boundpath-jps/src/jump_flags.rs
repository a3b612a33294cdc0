use boundpath_grid::{BitGrid, Direction, Grid};
use enumset::EnumSet;

/// Cardinal jump-point flags.
///
/// A cell is flagged for a cardinal travel direction when entering it moving
/// that way leaves at least one forced neighbor, which makes the cell a
/// primary jump point for that direction. Diagonal jump points are implied by
/// the cardinal flags and never stored.
pub struct JumpFlags {
    flags: Grid<EnumSet<Direction>>,
}

impl JumpFlags {
    pub fn new(map: &BitGrid) -> Self {
        use Direction::*;

        let mut flags = Grid::new(map.width(), map.height(), |_, _| EnumSet::empty());
        for y in 0..map.height() {
            for x in 0..map.width() {
                if !map.get(x, y) {
                    continue;
                }
                for dir in [Down, Right, Up, Left] {
                    if is_jump_point(map, x, y, dir) {
                        flags[(x, y)] |= dir;
                    }
                }
            }
        }
        JumpFlags { flags }
    }

    /// Travel directions for which `(x, y)` is a primary jump point.
    #[inline(always)]
    pub fn get(&self, x: i32, y: i32) -> EnumSet<Direction> {
        self.flags[(x, y)]
    }
}

// Forced-neighbor test for cardinal travel: the cell behind must be open, and
// some perpendicular neighbor must be open while the cell diagonally behind
// it is a wall.
fn is_jump_point(map: &BitGrid, x: i32, y: i32, dir: Direction) -> bool {
    let (dx, dy) = dir.vector();
    if !map.get(x - dx, y - dy) {
        return false;
    }
    let perpendiculars = [(dy, dx), (-dy, -dx)];
    perpendiculars
        .iter()
        .any(|&(px, py)| map.get(x + px, y + py) && !map.get(x - dx + px, y - dy + py))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from_rows(rows: &[&str]) -> BitGrid {
        let mut map = BitGrid::new(rows[0].len() as i32, rows.len() as i32);
        for (y, row) in rows.iter().enumerate() {
            for (x, cell) in row.chars().enumerate() {
                map.set(x as i32, y as i32, cell == '.');
            }
        }
        map
    }

    #[test]
    fn open_map_has_no_jump_points() {
        let map = grid_from_rows(&["....", "....", "...."]);
        let flags = JumpFlags::new(&map);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(flags.get(x, y), EnumSet::empty());
            }
        }
    }

    #[test]
    fn wall_corner_forces_a_turn() {
        use Direction::*;

        // Passing the wall's corner, (1, 1) regains access to the cells the
        // wall shadowed, whether entered moving right or moving down.
        let map = grid_from_rows(&["@...", "....", "...."]);
        let flags = JumpFlags::new(&map);
        assert_eq!(flags.get(1, 1), Right | Down);
        // (1, 0) has no open cell behind it for rightward travel.
        assert_eq!(flags.get(1, 0), EnumSet::empty());
        // Approaching leftwards from deeper in the row is unaffected.
        assert!(!flags.get(2, 1).contains(Left));
    }

    #[test]
    fn walls_are_never_jump_points() {
        let map = grid_from_rows(&["@.", ".."]);
        let flags = JumpFlags::new(&map);
        assert_eq!(flags.get(0, 0), EnumSet::empty());
    }
}
