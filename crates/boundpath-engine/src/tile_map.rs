use std::io::{self, Error, Read, Write};
use std::time::Duration;

use boundpath_flood::{GoalBounds, GoalBoundsTable};
use boundpath_grid::{BitGrid, Grid};
use boundpath_jps::JumpTable;

// A single i16 standing in for all four bounds of an empty box on disk.
const EMPTY_BOUNDS_MARKER: i16 = -1;

/// Everything the query engine needs to know about one traversable cell.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TileRecord {
    /// Bit i set means movement in direction i is immediately blocked.
    pub blocked: u8,
    pub jumps: [i16; 8],
    pub bounds: [GoalBounds; 8],
}

impl TileRecord {
    // Walls keep this record; nothing ever expands them.
    const WALL: TileRecord = TileRecord {
        blocked: 0xff,
        jumps: [0; 8],
        bounds: [GoalBounds::EMPTY; 8],
    };
}

/// The per-cell tables consumed by the query engine: jump distances, goal
/// bounds, and the blocked-direction bitfield derived from the former.
pub struct PreprocessedMap {
    tiles: Grid<TileRecord>,
}

impl PreprocessedMap {
    /// Runs the full offline pipeline on a map.
    ///
    /// `progress_callback` receives (cells flooded, cells total, elapsed)
    /// from the goal-bounding pass, which dominates the run time.
    pub fn compute(
        map: &BitGrid,
        progress_callback: impl FnMut(usize, usize, Duration) + Send,
    ) -> Self {
        let jumps = JumpTable::new(map);
        let bounds = GoalBoundsTable::compute(map, &jumps, progress_callback);

        let tiles = Grid::new(map.width(), map.height(), |x, y| {
            if !map.get(x, y) {
                return TileRecord::WALL;
            }
            TileRecord {
                blocked: jumps.blocked_bitfield(x, y),
                jumps: *jumps.get(x, y),
                bounds: *bounds.get(x, y),
            }
        });
        PreprocessedMap { tiles }
    }

    #[inline(always)]
    pub fn width(&self) -> i32 {
        self.tiles.width()
    }

    #[inline(always)]
    pub fn height(&self) -> i32 {
        self.tiles.height()
    }

    #[inline(always)]
    pub fn tile(&self, x: i32, y: i32) -> &TileRecord {
        &self.tiles[(x, y)]
    }

    /// Writes the tables in row-major cell order, skipping walls: 8 jump
    /// distances, then per direction either the empty marker or the four
    /// bounds, all little-endian i16.
    pub fn save(&self, map: &BitGrid, to: &mut impl Write) -> io::Result<()> {
        assert_eq!(map.width(), self.width(), "map has incorrect width");
        assert_eq!(map.height(), self.height(), "map has incorrect height");

        let mut write_i16 = |value: i16| to.write_all(&value.to_le_bytes());
        for y in 0..self.height() {
            for x in 0..self.width() {
                if !map.get(x, y) {
                    continue;
                }
                let tile = &self.tiles[(x, y)];
                for dist in tile.jumps {
                    write_i16(dist)?;
                }
                for bounds in &tile.bounds {
                    if bounds.is_empty() {
                        write_i16(EMPTY_BOUNDS_MARKER)?;
                    } else {
                        write_i16(bounds.min_y)?;
                        write_i16(bounds.max_y)?;
                        write_i16(bounds.min_x)?;
                        write_i16(bounds.max_x)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Reads tables previously written by [`save`](Self::save) for the same
    /// map. The blocked bitfields are rebuilt from the jump distances.
    pub fn load(map: &BitGrid, from: &mut impl Read) -> io::Result<Self> {
        let max_jump = map.width().max(map.height()) as i16;
        let mut read_i16 = || {
            let mut bytes = [0; 2];
            from.read_exact(&mut bytes)?;
            Ok::<_, Error>(i16::from_le_bytes(bytes))
        };

        let mut tiles = Grid::new(map.width(), map.height(), |_, _| TileRecord::WALL);
        for y in 0..map.height() {
            for x in 0..map.width() {
                if !map.get(x, y) {
                    continue;
                }
                let mut tile = TileRecord {
                    blocked: 0,
                    jumps: [0; 8],
                    bounds: [GoalBounds::EMPTY; 8],
                };
                for (dir, dist) in tile.jumps.iter_mut().enumerate() {
                    *dist = read_i16()?;
                    if dist.unsigned_abs() > max_jump.unsigned_abs() {
                        return Err(Error::other(format!(
                            "jump distance {dist} at ({x}, {y}) exceeds the map size"
                        )));
                    }
                    if *dist == 0 {
                        tile.blocked |= 1 << dir;
                    }
                }
                for bounds in &mut tile.bounds {
                    let min_y = read_i16()?;
                    if min_y == EMPTY_BOUNDS_MARKER {
                        continue;
                    }
                    *bounds = GoalBounds {
                        min_y,
                        max_y: read_i16()?,
                        min_x: read_i16()?,
                        max_x: read_i16()?,
                    };
                }
                tiles[(x, y)] = tile;
            }
        }
        Ok(PreprocessedMap { tiles })
    }
}
