use thiserror::Error;

/// Errors reported by [`BPTree`](crate::BPTree) and its iterators.
///
/// A missing key is not an error: lookups and deletions report absence
/// through `Option`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The requested branching factor is below the structural minimum.
    #[error("order must be >= {min}, got {order}")]
    InvalidOrder {
        /// The rejected branching factor.
        order: usize,
        /// The smallest accepted branching factor.
        min: usize,
    },

    /// [`Iter::next_entry`](crate::tree::Iter::next_entry) was called after the
    /// last element had been returned.
    #[error("there is no next element")]
    NoNextElement,
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
