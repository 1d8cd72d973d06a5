mod arena;
mod error;
mod node;
mod range;
mod tree;

pub use error::{Error, Result};
pub use node::{Color, Link, MAX_LIVE_SLOTS, SENTINEL};
pub use range::RangeIter;
pub use tree::{InsertOutcome, Iter, RedBlackTree};
