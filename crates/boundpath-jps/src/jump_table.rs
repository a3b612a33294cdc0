use boundpath_grid::{BitGrid, Direction, Grid};

use crate::JumpFlags;

/// Per-cell signed jump distances, one per direction.
///
/// For every traversable cell, `k > 0` means the k-th cell along the
/// direction is a jump point with every cell in between traversable, `-k`
/// means k moves are possible before running into a wall with no jump point
/// in between, and `0` means the move is immediately blocked (for diagonals
/// this includes the corner-cutting case where either orthogonal cell passed
/// between is a wall). Walls hold all zeroes.
pub struct JumpTable {
    jumps: Grid<[i16; 8]>,
}

impl JumpTable {
    pub fn new(map: &BitGrid) -> Self {
        let flags = JumpFlags::new(map);
        let mut jumps = Grid::new(map.width(), map.height(), |_, _| [0i16; 8]);
        cardinal_sweeps(map, &flags, &mut jumps);
        diagonal_sweeps(map, &mut jumps);
        JumpTable { jumps }
    }

    #[inline(always)]
    pub fn width(&self) -> i32 {
        self.jumps.width()
    }

    #[inline(always)]
    pub fn height(&self) -> i32 {
        self.jumps.height()
    }

    #[inline(always)]
    pub fn get(&self, x: i32, y: i32) -> &[i16; 8] {
        &self.jumps[(x, y)]
    }

    #[inline(always)]
    pub fn dist(&self, x: i32, y: i32, dir: Direction) -> i16 {
        self.jumps[(x, y)][dir as usize]
    }

    /// Bit i set means movement in direction i is immediately blocked.
    pub fn blocked_bitfield(&self, x: i32, y: i32) -> u8 {
        let mut blocked = 0;
        for (i, &dist) in self.jumps[(x, y)].iter().enumerate() {
            if dist == 0 {
                blocked |= 1 << i;
            }
        }
        blocked
    }
}

// Each cardinal direction is one sweep over the map against the direction of
// travel, carrying the distance since the last milestone (jump point or wall)
// and which kind it was.
fn cardinal_sweeps(map: &BitGrid, flags: &JumpFlags, jumps: &mut Grid<[i16; 8]>) {
    use Direction::*;

    let (w, h) = (map.width(), map.height());

    for y in 0..h {
        let mut sweep = SweepState::new();
        for x in 0..w {
            sweep.step(map.get(x, y), flags.get(x, y).contains(Left), &mut jumps[(x, y)][Left as usize]);
        }
        let mut sweep = SweepState::new();
        for x in (0..w).rev() {
            sweep.step(map.get(x, y), flags.get(x, y).contains(Right), &mut jumps[(x, y)][Right as usize]);
        }
    }

    for x in 0..w {
        let mut sweep = SweepState::new();
        for y in 0..h {
            sweep.step(map.get(x, y), flags.get(x, y).contains(Up), &mut jumps[(x, y)][Up as usize]);
        }
        let mut sweep = SweepState::new();
        for y in (0..h).rev() {
            sweep.step(map.get(x, y), flags.get(x, y).contains(Down), &mut jumps[(x, y)][Down as usize]);
        }
    }
}

struct SweepState {
    count: i32,
    jump_point_last_seen: bool,
}

impl SweepState {
    fn new() -> Self {
        SweepState {
            count: -1,
            jump_point_last_seen: false,
        }
    }

    fn step(&mut self, traversable: bool, is_jump_point: bool, out: &mut i16) {
        if !traversable {
            self.count = -1;
            self.jump_point_last_seen = false;
            *out = 0;
            return;
        }
        self.count += 1;
        *out = if self.jump_point_last_seen {
            self.count as i16
        } else {
            -self.count as i16
        };
        if is_jump_point {
            self.count = 0;
            self.jump_point_last_seen = true;
        }
    }
}

// Diagonal distances propagate from the neighbor one step along the
// diagonal: a wall (or cut corner) gives 0, a neighbor with a usable
// cardinal jump along either component gives 1, anything else extends the
// neighbor's diagonal entry by one, preserving its sign.
fn diagonal_sweeps(map: &BitGrid, jumps: &mut Grid<[i16; 8]>) {
    use Direction::*;

    let (w, h) = (map.width(), map.height());

    for y in 0..h {
        for x in 0..w {
            if !map.get(x, y) {
                continue;
            }
            diagonal_step(map, jumps, x, y, UpLeft, Up, Left);
            diagonal_step(map, jumps, x, y, UpRight, Up, Right);
        }
    }

    for y in (0..h).rev() {
        for x in 0..w {
            if !map.get(x, y) {
                continue;
            }
            diagonal_step(map, jumps, x, y, DownLeft, Down, Left);
            diagonal_step(map, jumps, x, y, DownRight, Down, Right);
        }
    }
}

fn diagonal_step(
    map: &BitGrid,
    jumps: &mut Grid<[i16; 8]>,
    x: i32,
    y: i32,
    dir: Direction,
    component_y: Direction,
    component_x: Direction,
) {
    let (dx, dy) = dir.vector();
    let dist = if !map.get(x + dx, y) || !map.get(x, y + dy) || !map.get(x + dx, y + dy) {
        0
    } else {
        let ahead = jumps[(x + dx, y + dy)];
        if ahead[component_y as usize] > 0 || ahead[component_x as usize] > 0 {
            1
        } else {
            let ahead = ahead[dir as usize];
            if ahead > 0 {
                ahead + 1
            } else {
                ahead - 1
            }
        }
    };
    jumps[(x, y)][dir as usize] = dist;
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
    fn corridor_distances_count_to_the_wall() {
        use Direction::*;

        let map = grid_from_rows(&[".........."]);
        let table = JumpTable::new(&map);
        assert_eq!(table.dist(0, 0, Right), -9);
        assert_eq!(table.dist(0, 0, Left), 0);
        assert_eq!(table.dist(5, 0, Left), -5);
        assert_eq!(table.dist(5, 0, Right), -4);
        assert_eq!(table.dist(9, 0, Right), 0);
        // Every off-axis move is blocked in a one-cell corridor.
        assert_eq!(table.blocked_bitfield(5, 0), !(1u8 << Right as u8 | 1u8 << Left as u8));
    }

    #[test]
    fn forced_neighbor_produces_positive_distances() {
        use Direction::*;

        let map = grid_from_rows(&["@.........", ".........."]);
        let table = JumpTable::new(&map);
        // (1, 1) is a jump point for rightward travel, so cells to its left
        // see a positive distance toward it.
        assert_eq!(table.dist(0, 1, Right), 1);
        // Beyond the jump point the wall is all that remains.
        assert_eq!(table.dist(1, 1, Right), -8);
        // The top row only sees the wall at its left end.
        assert_eq!(table.dist(5, 0, Left), -4);
    }

    #[test]
    fn empty_square_diagonals_run_to_the_corner() {
        use Direction::*;

        let map = grid_from_rows(&[".....", ".....", ".....", ".....", "....."]);
        let table = JumpTable::new(&map);
        assert_eq!(table.dist(0, 0, DownRight), -4);
        assert_eq!(table.dist(4, 4, DownRight), 0);
        assert_eq!(table.dist(4, 4, UpLeft), -4);
        assert_eq!(table.dist(2, 2, UpRight), -2);
        assert_eq!(table.dist(2, 2, DownLeft), -2);
    }

    #[test]
    fn diagonal_finds_cells_with_usable_cardinal_jumps() {
        use Direction::*;

        let map = grid_from_rows(&[
            "....",
            "@...",
            "....",
            "....",
        ]);
        let table = JumpTable::new(&map);
        // The wall corner makes (1, 2) a jump point for downward travel, so
        // column 1 sees positive downward distances above it.
        assert_eq!(table.dist(1, 1, Down), 1);
        assert_eq!(table.dist(1, 0, Down), 2);
        // A down-left move from (2, 0) lands on (1, 1), which has a usable
        // downward jump, so the diagonal distance is one step.
        assert_eq!(table.dist(2, 0, DownLeft), 1);
        // From (3, 0) the diagonal passes only cells with wall distances.
        assert_eq!(table.dist(3, 0, DownLeft), -3);
        // Moving into the wall's row head-on is immediately blocked.
        assert_eq!(table.dist(1, 0, DownLeft), 0);
        assert_eq!(table.dist(0, 0, Down), 0);
    }
}
