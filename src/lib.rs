//! JPS+ with goal bounding for octile grid maps.
//!
//! The offline phase ([`PreprocessedMap::compute`]) turns a map into per-cell
//! jump distances and goal bounds; the online phase ([`JpsPlusSearcher`])
//! answers point-to-point queries against those tables.

pub use boundpath_engine as engine;
pub use boundpath_flood as flood;
pub use boundpath_grid as grid;
pub use boundpath_jps as jps;

pub use boundpath_engine::{JpsPlusSearcher, PreprocessedMap};
pub use boundpath_grid::{BitGrid, Direction};

pub mod movingai;
