//! Filesystem operations: moving one file or directory into the reorg tree.

mod dir_move;
mod file_move;
mod helpers;
mod metadata;
mod relocate;
mod util;

pub use dir_move::copy_tree;
pub use relocate::{attempt, relocate, MoveResult};
