use std::sync::Mutex;
use std::time::{Duration, Instant};

use boundpath_grid::{BitGrid, Grid};
use boundpath_jps::JumpTable;
use rayon::prelude::*;

use crate::DijkstraFlood;

/// Axis-aligned box of goal cells, inclusive on both axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GoalBounds {
    pub min_y: i16,
    pub max_y: i16,
    pub min_x: i16,
    pub max_x: i16,
}

impl GoalBounds {
    /// The empty box: min > max on both axes, containing no cell.
    pub const EMPTY: GoalBounds = GoalBounds {
        min_y: i16::MAX,
        max_y: i16::MIN,
        min_x: i16::MAX,
        max_x: i16::MIN,
    };

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.min_y > self.max_y && self.min_x > self.max_x
    }

    pub fn grow(&mut self, x: i32, y: i32) {
        self.min_y = self.min_y.min(y as i16);
        self.max_y = self.max_y.max(y as i16);
        self.min_x = self.min_x.min(x as i16);
        self.max_x = self.max_x.max(x as i16);
    }

    #[inline(always)]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        y >= self.min_y as i32
            && y <= self.max_y as i32
            && x >= self.min_x as i32
            && x <= self.max_x as i32
    }
}

/// For every traversable cell and departure direction, the minimal box
/// covering every cell whose optimal path starts with a step in that
/// direction. A goal outside the box never needs the direction probed.
pub struct GoalBoundsTable {
    bounds: Grid<[GoalBounds; 8]>,
}

impl GoalBoundsTable {
    /// Floods from every traversable cell to build the table. Floods are
    /// independent, so they run in parallel with one flooder per worker.
    ///
    /// `progress_callback` receives (cells done, cells total, elapsed).
    pub fn compute(
        map: &BitGrid,
        jumps: &JumpTable,
        progress_callback: impl FnMut(usize, usize, Duration) + Send,
    ) -> Self {
        let mut sources = vec![];
        for y in 0..map.height() {
            for x in 0..map.width() {
                if map.get(x, y) {
                    sources.push((x, y));
                }
            }
        }

        let start = Instant::now();
        let total = sources.len();
        let progress = Mutex::new((0, progress_callback));

        let computed: Vec<_> = sources
            .par_iter()
            .map_init(
                || DijkstraFlood::new(map, jumps),
                |flood, &source| {
                    let mut boxes = [GoalBounds::EMPTY; 8];
                    flood.flood(source, |(x, y), departure| {
                        boxes[departure as usize].grow(x, y);
                    });

                    let mut progress = progress.lock().unwrap();
                    let (done, callback) = &mut *progress;
                    *done += 1;
                    callback(*done, total, start.elapsed());

                    (source, boxes)
                },
            )
            .collect();

        let mut bounds = Grid::new(map.width(), map.height(), |_, _| [GoalBounds::EMPTY; 8]);
        for (source, boxes) in computed {
            bounds[source] = boxes;
        }
        GoalBoundsTable { bounds }
    }

    #[inline(always)]
    pub fn get(&self, x: i32, y: i32) -> &[GoalBounds; 8] {
        &self.bounds[(x, y)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boundpath_grid::Direction::*;

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
    fn goal_bounds_partition_the_empty_square() {
        let map = grid_from_rows(&[".....", ".....", ".....", ".....", "....."]);
        let jumps = JumpTable::new(&map);
        let table = GoalBoundsTable::compute(&map, &jumps, |_, _, _| {});

        let corner = table.get(0, 0);
        // The diagonal octant owns the whole interior.
        assert!(corner[DownRight as usize].contains(4, 4));
        assert!(corner[DownRight as usize].contains(2, 2));
        // Straight departures own exactly their row or column.
        assert!(corner[Right as usize].contains(4, 0));
        assert!(!corner[Right as usize].contains(4, 4));
        assert_eq!(
            corner[Down as usize],
            GoalBounds { min_y: 1, max_y: 4, min_x: 0, max_x: 0 }
        );
        // Directions that exit the map are empty.
        assert!(corner[Up as usize].is_empty());
        assert!(corner[UpLeft as usize].is_empty());
        assert!(corner[Left as usize].is_empty());
        assert!(corner[DownLeft as usize].is_empty());
        assert!(corner[UpRight as usize].is_empty());
    }

    #[test]
    fn walls_get_empty_bounds() {
        let map = grid_from_rows(&["..", ".@"]);
        let jumps = JumpTable::new(&map);
        let table = GoalBoundsTable::compute(&map, &jumps, |_, _, _| {});
        assert!(table.get(1, 1).iter().all(GoalBounds::is_empty));
    }

    #[test]
    fn progress_reports_every_source() {
        let map = grid_from_rows(&["...", "..."]);
        let jumps = JumpTable::new(&map);
        let seen = Mutex::new(0usize);
        GoalBoundsTable::compute(&map, &jumps, |done, total, _| {
            assert_eq!(total, 6);
            assert!(done <= total);
            *seen.lock().unwrap() += 1;
        });
        assert_eq!(*seen.lock().unwrap(), 6);
    }
}
