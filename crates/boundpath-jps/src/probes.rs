use boundpath_grid::Direction;
use enumset::EnumSet;

const D: u8 = 1 << Direction::Down as usize;
const DR: u8 = 1 << Direction::DownRight as usize;
const R: u8 = 1 << Direction::Right as usize;
const UR: u8 = 1 << Direction::UpRight as usize;
const U: u8 = 1 << Direction::Up as usize;
const UL: u8 = 1 << Direction::UpLeft as usize;
const L: u8 = 1 << Direction::Left as usize;
const DL: u8 = 1 << Direction::DownLeft as usize;

/// Directions worth probing when expanding a node that was entered moving
/// `incoming`, given the node's blocked-direction bitfield.
///
/// These are the exact JPS+ successor sets: the natural continuation plus any
/// forced turns for cardinal travel, and the two components plus the diagonal
/// itself for diagonal travel. Every returned direction is an open move.
#[inline(always)]
pub fn probe_set(blocked: u8, incoming: Direction) -> EnumSet<Direction> {
    EnumSet::from_u8(PROBES[(blocked as usize) << 3 | incoming as usize])
}

/// Directions open for the initial expansion of a search, which has no
/// incoming direction to prune by: every move the bitfield allows.
#[inline(always)]
pub fn open_set(blocked: u8) -> EnumSet<Direction> {
    EnumSet::from_u8(!blocked)
}

static PROBES: [u8; 2048] = probe_table();

// A perpendicular turn is forced exactly when the sideways move is open but
// the diagonal move back past the parent is not: the parent cell and the
// sideways cell are both known open, so the back diagonal being blocked
// pins the wall onto the cell behind the sideways neighbor.
const fn cardinal_probes(
    blocked: u8,
    fwd: u8,
    side_a: u8,
    fwd_a: u8,
    back_a: u8,
    side_b: u8,
    fwd_b: u8,
    back_b: u8,
) -> u8 {
    let open = !blocked;
    let mut probes = 0;
    if open & fwd != 0 {
        probes |= fwd;
    }
    if open & side_a != 0 && blocked & back_a != 0 {
        probes |= side_a;
        if open & fwd_a != 0 {
            probes |= fwd_a;
        }
    }
    if open & side_b != 0 && blocked & back_b != 0 {
        probes |= side_b;
        if open & fwd_b != 0 {
            probes |= fwd_b;
        }
    }
    probes
}

// Diagonal travel has no forced turns when corner cutting is off; the
// successors are the two components and the continuation.
const fn diagonal_probes(blocked: u8, fwd: u8, component_a: u8, component_b: u8) -> u8 {
    let open = !blocked;
    let mut probes = 0;
    if open & component_a != 0 {
        probes |= component_a;
    }
    if open & component_b != 0 {
        probes |= component_b;
    }
    if open & fwd != 0 {
        probes |= fwd;
    }
    probes
}

const fn probe_table() -> [u8; 2048] {
    let mut table = [0; 2048];
    let mut blocked = 0;
    while blocked < 256 {
        let b = blocked as u8;
        table[blocked << 3 | Direction::Down as usize] = cardinal_probes(b, D, L, DL, UL, R, DR, UR);
        table[blocked << 3 | Direction::Up as usize] = cardinal_probes(b, U, L, UL, DL, R, UR, DR);
        table[blocked << 3 | Direction::Right as usize] = cardinal_probes(b, R, U, UR, UL, D, DR, DL);
        table[blocked << 3 | Direction::Left as usize] = cardinal_probes(b, L, U, UL, UR, D, DL, DR);
        table[blocked << 3 | Direction::DownRight as usize] = diagonal_probes(b, DR, D, R);
        table[blocked << 3 | Direction::DownLeft as usize] = diagonal_probes(b, DL, D, L);
        table[blocked << 3 | Direction::UpRight as usize] = diagonal_probes(b, UR, U, R);
        table[blocked << 3 | Direction::UpLeft as usize] = diagonal_probes(b, UL, U, L);
        blocked += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    #[test]
    fn unobstructed_travel_continues_straight() {
        assert_eq!(probe_set(0, Right), EnumSet::only(Right));
        assert_eq!(probe_set(0, Down), EnumSet::only(Down));
        assert_eq!(probe_set(0, DownRight), Down | Right | DownRight);
        assert_eq!(probe_set(0, UpLeft), Up | Left | UpLeft);
    }

    #[test]
    fn blocked_back_diagonal_forces_a_turn() {
        // Travelling right past a wall that sits diagonally behind the upper
        // neighbor: the turn up and the diagonal up-right both open up.
        assert_eq!(probe_set(UL, Right), Right | Up | UpRight);
        // If the up-right move is itself blocked, only the turn remains.
        assert_eq!(probe_set(UL | UR, Right), Right | Up);
        // Both sides forced at once.
        assert_eq!(probe_set(UL | DL, Right), Right | Up | UpRight | Down | DownRight);
    }

    #[test]
    fn blocked_moves_never_appear() {
        for blocked in 0..=255u8 {
            for dir in Direction::ALL {
                let probes = probe_set(blocked, dir);
                assert!(
                    probes.as_u8() & blocked == 0,
                    "blocked {blocked:#010b} incoming {dir:?} probes {probes:?}"
                );
            }
        }
        assert_eq!(open_set(0b1111_1011), EnumSet::only(Right));
    }

    #[test]
    fn diagonal_components_survive_blocked_continuation() {
        // The diagonal move requires both components open, so losing it
        // still leaves the components.
        assert_eq!(probe_set(DR, DownRight), Down | Right);
        assert_eq!(probe_set(DR | R, DownRight), EnumSet::only(Down));
    }
}
