use thiserror::Error;

/// Errors surfaced across the tree's public API.
///
/// Precondition violations (bad slot ids, mutation during iteration, a
/// comparator that isn't a total order) are not represented here — those
/// are programming errors and trip an assertion instead, per the crate's
/// error handling design.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Returned by `reserve` (or capacity-carrying construction) when the
    /// allocator cannot satisfy the request. The tree is left unchanged.
    #[error("failed to allocate additional arena capacity")]
    AllocationFailure,

    /// Returned by `insert` when the arena has exhausted the addressable
    /// slot id space (`2^32 - 1` live slots). The tree is left unchanged.
    #[error("tree is full: no addressable slot ids remain")]
    FullTree,

    /// Returned by `update` when the key is absent.
    #[error("key not found")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, Error>;
