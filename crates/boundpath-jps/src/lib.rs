#![deny(unsafe_op_in_unsafe_fn)]
//! Jump-point precomputation and successor dispatch for octile maps.
//!
//! Harabor, D., & Grastien, A. (2014, May). Improving jump point search. In
//! Proceedings of the International Conference on Automated Planning and
//! Scheduling (Vol. 24, pp. 128-135).

mod jump_flags;
mod jump_table;
mod probes;

pub use self::jump_flags::*;
pub use self::jump_table::*;
pub use self::probes::*;
