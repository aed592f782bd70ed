//! An in-memory B+ tree keyed by byte strings.
//!
//! [`BPTree`] maps arbitrary byte strings to byte-string values, ordered
//! lexicographically by byte. All entries live in the leaves, which are linked
//! left to right so that ordered iteration never revisits internal nodes.
//!
//! # Example
//!
//! ```
//! use bptree::BPTree;
//!
//! let mut pantry = BPTree::new();
//! pantry.put("apple", "3");
//! pantry.put("banana", "12");
//! pantry.put("cinnamon", "1");
//!
//! assert_eq!(pantry.get("banana"), Some(&b"12"[..]));
//! assert_eq!(pantry.len(), 3);
//!
//! // Overwriting hands back the previous value.
//! assert_eq!(pantry.put("apple", "2"), Some(b"3".to_vec()));
//!
//! pantry.delete("banana");
//! let keys: Vec<&[u8]> = pantry.keys().collect();
//! assert_eq!(keys, [&b"apple"[..], b"cinnamon"]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Configurable order** - Any branching factor of 3 or more via [`Order`]
//! - **Linked leaves** - O(1) per step ordered iteration
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other by handle. Every node records
//! its parent, so splits propagate upward and underflows are repaired by
//! borrowing from or merging with a sibling without re-walking from the root.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order;
mod raw;

pub mod tree;

pub use error::{Error, Result};
pub use order::Order;
pub use tree::BPTree;
