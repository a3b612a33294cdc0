use boundpath_grid::{octile_cost, Direction, Grid, CARDINAL_COST, DIAGONAL_COST};
use boundpath_jps::{open_set, probe_set};
use enumset::EnumSet;

use crate::open_list::{FastStack, UnsortedQueue};
use crate::PreprocessedMap;

const NO_PARENT: (i16, i16) = (-1, -1);

// Worst cases observed in practice stay well under these; the tiers grow if
// a map proves them wrong.
const FAST_STACK_CAPACITY: usize = 1000;
const OPEN_QUEUE_CAPACITY: usize = 10_000;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum ListStatus {
    Open,
    Closed,
}

#[derive(Copy, Clone)]
struct SearchNode {
    parent: (i16, i16),
    given_cost: u64,
    final_cost: u64,
    search_number: u32,
    from_parent: Direction,
    status: ListStatus,
}

const STALE: SearchNode = SearchNode {
    parent: NO_PARENT,
    given_cost: 0,
    final_cost: 0,
    search_number: 0,
    from_parent: Direction::Down,
    status: ListStatus::Closed,
};

/// JPS+ point-to-point searcher over a preprocessed map.
///
/// The search-node grid and open-list tiers are allocated once and reused;
/// nodes from earlier queries are recognized as stale by their search
/// number, so a query never pays for clearing the grid. The preprocessed map
/// is only read, and may back any number of searchers.
pub struct JpsPlusSearcher<'a> {
    tiles: &'a PreprocessedMap,
    nodes: Grid<SearchNode>,
    fast_stack: FastStack,
    open_queue: UnsortedQueue,
    search_number: u32,
    goal: (i32, i32),
}

impl<'a> JpsPlusSearcher<'a> {
    pub fn new(tiles: &'a PreprocessedMap) -> Self {
        JpsPlusSearcher {
            tiles,
            nodes: Grid::new(tiles.width(), tiles.height(), |_, _| STALE),
            fast_stack: FastStack::with_capacity(FAST_STACK_CAPACITY),
            open_queue: UnsortedQueue::with_capacity(OPEN_QUEUE_CAPACITY),
            search_number: 0,
            goal: (0, 0),
        }
    }

    /// Finds an optimal octile path from `start` to `goal`, both inclusive,
    /// with every intermediate cell filled in. Returns `None` if no path
    /// exists.
    #[track_caller]
    pub fn get_path(&mut self, start: (i32, i32), goal: (i32, i32)) -> Option<Vec<(i32, i32)>> {
        let in_bounds = |(x, y): (i32, i32)| {
            x >= 0 && y >= 0 && x < self.tiles.width() && y < self.tiles.height()
        };
        assert!(in_bounds(start), "start out of bounds");
        assert!(in_bounds(goal), "goal out of bounds");

        if start == goal {
            return Some(vec![start]);
        }

        self.reset();
        self.goal = goal;

        // The start is expanded in every open direction and closed
        // immediately; its zero final cost sends all successors through the
        // unsorted tier.
        self.nodes[start] = SearchNode {
            parent: NO_PARENT,
            given_cost: 0,
            final_cost: 0,
            search_number: self.search_number,
            from_parent: Direction::Down,
            status: ListStatus::Closed,
        };
        let blocked = self.tiles.tile(start.0, start.1).blocked;
        self.expand(start, 0, 0, open_set(blocked));

        loop {
            let mut next = self.fast_stack.pop();
            if next.is_none() {
                let Self {
                    ref nodes,
                    ref mut open_queue,
                    ..
                } = *self;
                next = open_queue.pop(|cell| nodes[cell].final_cost);
            }
            let Some(cell) = next else {
                return None;
            };

            if cell == goal {
                return Some(self.finalize_path());
            }

            let node = self.nodes[cell];
            let blocked = self.tiles.tile(cell.0, cell.1).blocked;
            self.expand(
                cell,
                node.given_cost,
                node.final_cost,
                probe_set(blocked, node.from_parent),
            );
            self.nodes[cell].status = ListStatus::Closed;
        }
    }

    fn expand(
        &mut self,
        cell: (i32, i32),
        given_cost: u64,
        final_cost: u64,
        probes: EnumSet<Direction>,
    ) {
        let tile = self.tiles.tile(cell.0, cell.1);
        for dir in probes {
            // A probe whose goal bounds exclude the goal cannot start an
            // optimal path and is skipped outright.
            if !tile.bounds[dir as usize].contains(self.goal.0, self.goal.1) {
                continue;
            }
            let jump = tile.jumps[dir as usize];
            if dir.is_diagonal() {
                self.probe_diagonal(cell, dir, jump, given_cost, final_cost);
            } else {
                self.probe_cardinal(cell, dir, jump, given_cost, final_cost);
            }
        }
    }

    // Cardinal probes have two outcomes: a straight shot at a goal lying
    // within the jump's passable stretch, or the recorded jump point.
    fn probe_cardinal(
        &mut self,
        (x, y): (i32, i32),
        dir: Direction,
        jump: i16,
        given_cost: u64,
        final_cost: u64,
    ) {
        let (dx, dy) = dir.vector();
        let (gx, gy) = self.goal;

        let toward = if dx != 0 {
            y == gy && (gx - x) * dx > 0
        } else {
            x == gx && (gy - y) * dy > 0
        };
        if toward {
            let dist = (gx - x).abs().max((gy - y).abs());
            if dist <= jump.unsigned_abs() as i32 {
                let given = given_cost + dist as u64 * CARDINAL_COST;
                self.push(self.goal, (x, y), dir, given, final_cost);
                return;
            }
        }

        if jump > 0 {
            let target = (x + dx * jump as i32, y + dy * jump as i32);
            let given = given_cost + jump as u64 * CARDINAL_COST;
            self.push(target, (x, y), dir, given, final_cost);
        }
    }

    // Diagonal probes additionally stop level with a goal in their quadrant
    // (a target jump point), from where a cardinal probe can finish the job.
    fn probe_diagonal(
        &mut self,
        (x, y): (i32, i32),
        dir: Direction,
        jump: i16,
        given_cost: u64,
        final_cost: u64,
    ) {
        let (dx, dy) = dir.vector();
        let (gx, gy) = self.goal;

        let x_dist = (gx - x) * dx;
        let y_dist = (gy - y) * dy;
        if x_dist > 0 && y_dist > 0 {
            let closer = x_dist.min(y_dist);
            if closer <= jump.unsigned_abs() as i32 {
                let target = (x + dx * closer, y + dy * closer);
                let given = given_cost + closer as u64 * DIAGONAL_COST;
                self.push(target, (x, y), dir, given, final_cost);
                return;
            }
        }

        if jump > 0 {
            let target = (x + dx * jump as i32, y + dy * jump as i32);
            let given = given_cost + jump as u64 * DIAGONAL_COST;
            self.push(target, (x, y), dir, given, final_cost);
        }
    }

    fn push(
        &mut self,
        cell: (i32, i32),
        parent: (i32, i32),
        dir: Direction,
        given_cost: u64,
        parent_final: u64,
    ) {
        let search_number = self.search_number;
        let goal = self.goal;
        let node = &mut self.nodes[cell];

        if node.search_number != search_number {
            let final_cost = given_cost + octile_cost(cell, goal);
            *node = SearchNode {
                parent: (parent.0 as i16, parent.1 as i16),
                given_cost,
                final_cost,
                search_number,
                from_parent: dir,
                status: ListStatus::Open,
            };
            if final_cost <= parent_final {
                self.fast_stack.push(cell);
            } else {
                self.open_queue.push(cell);
            }
        } else if given_cost < node.given_cost && node.status == ListStatus::Open {
            // Cheaper route to an open node: rewrite it in place. The node
            // stays in whichever tier holds it; the unsorted tier reads live
            // costs and the fast stack's bound only loosens as costs drop.
            let heuristic = node.final_cost - node.given_cost;
            node.parent = (parent.0 as i16, parent.1 as i16);
            node.from_parent = dir;
            node.given_cost = given_cost;
            node.final_cost = given_cost + heuristic;
        }
    }

    // Expansions jump many cells at a time; walk the parent links backwards
    // from the goal, filling in the cells each jump skipped.
    fn finalize_path(&self) -> Vec<(i32, i32)> {
        let mut path = vec![];
        let mut prev: Option<(i32, i32)> = None;
        let mut cur = self.goal;
        loop {
            if let Some(prev) = prev {
                let dx = (cur.0 - prev.0).signum();
                let dy = (cur.1 - prev.1).signum();
                let steps = (cur.0 - prev.0).abs().max((cur.1 - prev.1).abs()) - 1;
                let (mut x, mut y) = prev;
                for _ in 0..steps {
                    x += dx;
                    y += dy;
                    path.push((x, y));
                }
            }
            path.push(cur);
            prev = Some(cur);
            let parent = self.nodes[cur].parent;
            if parent == NO_PARENT {
                break;
            }
            cur = (parent.0 as i32, parent.1 as i32);
        }
        path.reverse();
        path
    }

    fn reset(&mut self) {
        self.search_number = self.search_number.checked_add(1).unwrap_or_else(|| {
            self.nodes.storage_mut().fill(STALE);
            1
        });
        self.fast_stack.reset();
        self.open_queue.reset();
    }
}
