use boundpath_grid::{BitGrid, Direction, Grid, FLOOD_CARDINAL_COST, FLOOD_DIAGONAL_COST};
use boundpath_jps::{open_set, probe_set, JumpTable};

use crate::bucket_queue::{BucketQueue, UNQUEUED};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum FloodStatus {
    Open,
    Closed,
}

#[derive(Copy, Clone)]
struct FloodNode {
    given_cost: u64,
    search_number: u32,
    bucket_pos: (u32, u32),
    departure: Direction,
    from_parent: Direction,
    status: FloodStatus,
}

const STALE: FloodNode = FloodNode {
    given_cost: 0,
    search_number: 0,
    bucket_pos: UNQUEUED,
    departure: Direction::Down,
    from_parent: Direction::Down,
    status: FloodStatus::Closed,
};

/// Octile Dijkstra flood labelling every reachable cell with the direction of
/// the first step taken from the source.
///
/// Expansion is pruned with the same dispatch table the query engine uses, so
/// the recorded departure directions match the moves the query would later
/// take. Flooding with unpruned Dijkstra expansion would record departures
/// the query never chooses and the resulting goal bounds would be unsound.
///
/// The node grid and bucket queue are allocated once and reused across
/// floods; stale nodes are recognized by their search number.
pub struct DijkstraFlood<'a> {
    map: &'a BitGrid,
    blocked: Grid<u8>,
    nodes: Grid<FloodNode>,
    queue: BucketQueue,
    search_number: u32,
}

impl<'a> DijkstraFlood<'a> {
    pub fn new(map: &'a BitGrid, jumps: &JumpTable) -> Self {
        assert_eq!(map.width(), jumps.width(), "jump table has incorrect width");
        assert_eq!(map.height(), jumps.height(), "jump table has incorrect height");

        DijkstraFlood {
            map,
            blocked: Grid::new(map.width(), map.height(), |x, y| jumps.blocked_bitfield(x, y)),
            nodes: Grid::new(map.width(), map.height(), |_, _| STALE),
            queue: BucketQueue::new(),
            search_number: 0,
        }
    }

    /// Floods outward from `source`, invoking `settled` once per reachable
    /// cell (the source excluded) with the departure direction of its
    /// optimal path, in non-decreasing cost order per bucket.
    pub fn flood(&mut self, source: (i32, i32), mut settled: impl FnMut((i32, i32), Direction)) {
        self.reset();
        if !self.map.get(source.0, source.1) {
            return;
        }

        // The source is the only node expanded in every open direction, and
        // the only place departure labels originate; successors inherit them
        // unchanged.
        self.nodes[source] = FloodNode {
            given_cost: 0,
            search_number: self.search_number,
            bucket_pos: UNQUEUED,
            departure: Direction::Down,
            from_parent: Direction::Down,
            status: FloodStatus::Closed,
        };
        for dir in open_set(self.blocked[source]) {
            let (dx, dy) = dir.vector();
            let cell = (source.0 + dx, source.1 + dy);
            self.relax(cell, dir, dir, step_cost(dir));
        }

        while let Some(cell) = self.queue.pop() {
            let node = &mut self.nodes[cell];
            node.status = FloodStatus::Closed;
            let node = *node;
            settled(cell, node.departure);

            for dir in probe_set(self.blocked[cell], node.from_parent) {
                let (dx, dy) = dir.vector();
                let next = (cell.0 + dx, cell.1 + dy);
                self.relax(next, node.departure, dir, node.given_cost + step_cost(dir));
            }
        }
    }

    fn relax(
        &mut self,
        cell: (i32, i32),
        departure: Direction,
        from_parent: Direction,
        given_cost: u64,
    ) {
        let Self {
            ref mut nodes,
            ref mut queue,
            search_number,
            ..
        } = *self;

        let pos;
        {
            let node = &mut nodes[cell];
            if node.search_number != search_number {
                *node = FloodNode {
                    given_cost,
                    search_number,
                    bucket_pos: UNQUEUED,
                    departure,
                    from_parent,
                    status: FloodStatus::Open,
                };
            } else {
                if node.status != FloodStatus::Open || given_cost >= node.given_cost {
                    return;
                }
                node.given_cost = given_cost;
                node.departure = departure;
                node.from_parent = from_parent;
            }
            pos = node.bucket_pos;
        }

        let new_pos = queue.relaxed(cell, given_cost, pos, |moved, moved_pos| {
            nodes[moved].bucket_pos = moved_pos;
        });
        nodes[cell].bucket_pos = new_pos;
    }

    fn reset(&mut self) {
        self.search_number = self.search_number.checked_add(1).unwrap_or_else(|| {
            self.nodes.storage_mut().fill(STALE);
            1
        });
        self.queue.reset();
    }
}

#[inline(always)]
fn step_cost(dir: Direction) -> u64 {
    if dir.is_diagonal() {
        FLOOD_DIAGONAL_COST
    } else {
        FLOOD_CARDINAL_COST
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn grid_from_rows(rows: &[&str]) -> BitGrid {
        let mut map = BitGrid::new(rows[0].len() as i32, rows.len() as i32);
        for (y, row) in rows.iter().enumerate() {
            for (x, cell) in row.chars().enumerate() {
                map.set(x as i32, y as i32, cell == '.');
            }
        }
        map
    }

    fn flood_from(
        map: &BitGrid,
        source: (i32, i32),
    ) -> HashMap<(i32, i32), Direction> {
        let jumps = JumpTable::new(map);
        let mut flood = DijkstraFlood::new(map, &jumps);
        let mut labels = HashMap::new();
        flood.flood(source, |cell, departure| {
            assert!(labels.insert(cell, departure).is_none(), "cell settled twice");
        });
        labels
    }

    #[test]
    fn labels_empty_square_by_departure_octant() {
        use Direction::*;

        let map = grid_from_rows(&[".....", ".....", ".....", ".....", "....."]);
        let labels = flood_from(&map, (0, 0));
        assert_eq!(labels.len(), 24);
        assert_eq!(labels[&(4, 0)], Right);
        assert_eq!(labels[&(1, 0)], Right);
        assert_eq!(labels[&(0, 4)], Down);
        assert_eq!(labels[&(4, 4)], DownRight);
        assert_eq!(labels[&(2, 2)], DownRight);
        // Off-diagonal interior cells still depart diagonally; the canonical
        // order takes the diagonal first and the straight leg last.
        assert_eq!(labels[&(3, 1)], DownRight);
        assert_eq!(labels[&(1, 3)], DownRight);
    }

    #[test]
    fn unreachable_cells_are_never_settled() {
        let map = grid_from_rows(&["..@.", "..@.", "..@."]);
        let labels = flood_from(&map, (0, 0));
        assert_eq!(labels.len(), 5);
        assert!(!labels.contains_key(&(3, 0)));
        assert!(!labels.contains_key(&(3, 2)));
    }

    #[test]
    fn walls_are_routed_around() {
        use Direction::*;

        let map = grid_from_rows(&["...", ".@.", "..."]);
        let labels = flood_from(&map, (0, 1));
        // Every diagonal out of the source cuts the wall's corner, so the
        // cell behind the wall is reached around it, departing up or down.
        let detour = labels[&(2, 1)];
        assert!(detour == Up || detour == Down, "unexpected departure {detour:?}");
        assert_eq!(labels[&(0, 0)], Up);
        assert_eq!(labels[&(0, 2)], Down);
    }

    #[test]
    fn flood_from_a_wall_settles_nothing() {
        let map = grid_from_rows(&[".@.", "..."]);
        let labels = flood_from(&map, (1, 0));
        assert!(labels.is_empty());
    }

    #[test]
    fn repeated_floods_reuse_state_cleanly() {
        let map = grid_from_rows(&["....", "....", "...."]);
        let jumps = JumpTable::new(&map);
        let mut flood = DijkstraFlood::new(&map, &jumps);
        let mut first = HashMap::new();
        flood.flood((0, 0), |cell, dir| {
            first.insert(cell, dir);
        });
        let mut second = HashMap::new();
        flood.flood((3, 2), |cell, dir| {
            second.insert(cell, dir);
        });
        assert_eq!(second.len(), 11);
        assert_eq!(second[&(0, 0)], Direction::UpLeft);
        // Rerunning the first flood reproduces it exactly.
        let mut third = HashMap::new();
        flood.flood((0, 0), |cell, dir| {
            third.insert(cell, dir);
        });
        assert_eq!(first, third);
    }
}
