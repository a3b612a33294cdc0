#![deny(unsafe_op_in_unsafe_fn)]
//! Dijkstra flooding and goal-bounds precomputation.
//!
//! Rabin, S., & Sturtevant, N. (2016, February). Combining bounding boxes and
//! JPS to prune grid pathfinding. In Proceedings of the AAAI Conference on
//! Artificial Intelligence (Vol. 30, No. 1).

mod bounds;
mod bucket_queue;
mod flood;

pub use self::bounds::*;
pub use self::bucket_queue::*;
pub use self::flood::*;
