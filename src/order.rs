use core::fmt;

use crate::error::{Error, Result};

/// The branching factor of a [`BPTree`](crate::BPTree).
///
/// An internal node holds at most `order` children and every node holds at most
/// `order - 1` keys. Every node other than the root holds at least
/// `ceil(order / 2) - 1` keys.
///
/// # Examples
///
/// ```
/// use bptree::Order;
///
/// let order = Order::new(5).unwrap();
/// assert_eq!(order.max_keys(), 4);
/// assert_eq!(order.min_keys(), 2);
///
/// assert!(Order::new(2).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Order(usize);

impl Order {
    /// The smallest accepted branching factor.
    pub const MIN: usize = 3;

    /// The branching factor used by [`BPTree::new`](crate::BPTree::new).
    pub const DEFAULT: Self = Self(4);

    /// Validates a branching factor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order < Order::MIN`.
    pub const fn new(order: usize) -> Result<Self> {
        if order < Self::MIN {
            return Err(Error::InvalidOrder { order, min: Self::MIN });
        }
        Ok(Self(order))
    }

    /// Returns the branching factor.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Returns the maximum number of keys a node may hold.
    #[must_use]
    pub const fn max_keys(self) -> usize {
        self.0 - 1
    }

    /// Returns the minimum number of keys a non-root node must hold.
    #[must_use]
    pub const fn min_keys(self) -> usize {
        self.0.div_ceil(2) - 1
    }

    /// Number of keys kept by the left half when an overflowing node is split.
    pub(crate) const fn split_point(self) -> usize {
        self.max_keys().div_ceil(2)
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for Order {
    type Error = Error;

    fn try_from(order: usize) -> Result<Self> {
        Self::new(order)
    }
}

impl From<Order> for usize {
    fn from(order: Order) -> Self {
        order.get()
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
