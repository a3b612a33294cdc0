#![deny(unsafe_op_in_unsafe_fn)]
//! 2D octile grid types shared by the preprocessing and query phases.

mod bitgrid;
mod grid;

use enumset::EnumSetType;

pub use self::bitgrid::*;
pub use self::grid::*;

/// Maximum supported map width and height.
pub const MAX_MAP_DIM: i32 = 2048;

/// Fixed-point cost of a cardinal step during preprocessing floods.
pub const FLOOD_CARDINAL_COST: u64 = 100_000;
/// Fixed-point cost of a diagonal step during preprocessing floods.
pub const FLOOD_DIAGONAL_COST: u64 = 141_421;
/// Quantization width of the flood's bucket priority queue.
pub const FLOOD_BUCKET_WIDTH: u64 = 10_000;

// Query-phase fixed point. 3363/2378 matches sqrt(2) to within 7e-8, close
// enough that cost comparisons never misorder paths at the supported map
// sizes, while keeping sqrt(2) and sqrt(2)-1 exactly representable.
/// Fixed-point cost of a cardinal step during queries.
pub const CARDINAL_COST: u64 = 2378;
/// Fixed-point cost of a diagonal step during queries.
pub const DIAGONAL_COST: u64 = 3363;
/// Fixed-point value of sqrt(2)-1, the octile heuristic's diagonal surcharge.
pub const DIAGONAL_SURCHARGE: u64 = DIAGONAL_COST - CARDINAL_COST;

/// Movement directions on an 8-connected grid.
///
/// The discriminant order is load-bearing: blocked-direction bitfields and
/// the probe dispatch table are indexed by it, and odd discriminants are the
/// diagonals.
#[derive(EnumSetType, Debug)]
pub enum Direction {
    Down,
    DownRight,
    Right,
    UpRight,
    Up,
    UpLeft,
    Left,
    DownLeft,
}

impl Direction {
    /// All directions in discriminant order.
    pub const ALL: [Direction; 8] = [
        Direction::Down,
        Direction::DownRight,
        Direction::Right,
        Direction::UpRight,
        Direction::Up,
        Direction::UpLeft,
        Direction::Left,
        Direction::DownLeft,
    ];

    /// Unit step for this direction; x grows rightward, y grows downward.
    #[inline(always)]
    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Down => (0, 1),
            Direction::DownRight => (1, 1),
            Direction::Right => (1, 0),
            Direction::UpRight => (1, -1),
            Direction::Up => (0, -1),
            Direction::UpLeft => (-1, -1),
            Direction::Left => (-1, 0),
            Direction::DownLeft => (-1, 1),
        }
    }

    #[inline(always)]
    pub fn is_diagonal(self) -> bool {
        self as u8 & 1 != 0
    }

    #[inline(always)]
    pub fn backwards(self) -> Direction {
        Direction::ALL[(self as usize + 4) % 8]
    }
}

/// Octile distance with cardinal steps costing 1 and diagonal steps sqrt(2).
pub fn octile_distance(from: (i32, i32), to: (i32, i32)) -> f64 {
    let dx = (from.0 - to.0).abs();
    let dy = (from.1 - to.1).abs();
    let diagonals = dx.min(dy);
    let orthos = dx.max(dy) - diagonals;
    orthos as f64 + diagonals as f64 * std::f64::consts::SQRT_2
}

/// Octile distance in query fixed-point units.
#[inline(always)]
pub fn octile_cost(from: (i32, i32), to: (i32, i32)) -> u64 {
    let dx = (from.0 - to.0).unsigned_abs() as u64;
    let dy = (from.1 - to.1).unsigned_abs() as u64;
    dx.min(dy) * DIAGONAL_SURCHARGE + dx.max(dy) * CARDINAL_COST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_vectors_are_unit_steps() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.vector();
            assert_eq!(dx.abs().max(dy.abs()), 1);
            assert_eq!(dir.is_diagonal(), dx != 0 && dy != 0);
            let (bx, by) = dir.backwards().vector();
            assert_eq!((bx, by), (-dx, -dy));
        }
    }

    #[test]
    fn octile_cost_matches_octile_distance() {
        for &(from, to) in &[((0, 0), (4, 4)), ((0, 0), (7, 2)), ((3, 9), (3, 1))] {
            let exact = octile_distance(from, to);
            let fixed = octile_cost(from, to) as f64 / CARDINAL_COST as f64;
            assert!((exact - fixed).abs() / exact.max(1.0) < 1e-6);
        }
    }
}
