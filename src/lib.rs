//! An in-memory B-Tree index.
//!
//! This crate provides [`BTree`], an ordered key/value index built on classic
//! B-Tree balancing rules. It is the mutation engine of a page-oriented index:
//! nodes split on insert and the split propagates up the ancestor chain, while
//! delete removes nodes that end up empty and folds their surviving child into
//! a neighbour.
//!
//! # Example
//!
//! ```
//! use btree_index::{BTree, Error};
//!
//! let mut index = BTree::new(3);
//!
//! for key in [10, 20, 30, 70, 60, 80, 50, 40, 55, 65] {
//!     index.insert(key, key * 10)?;
//! }
//! assert_eq!(index.height(), 3);
//! assert_eq!(index.find(&55), Ok(&550));
//!
//! assert!(index.delete(&55));
//! assert_eq!(index.find(&55), Err(Error::KeyNotFound));
//!
//! // Every structural invariant still holds.
//! assert_eq!(index.validate(), Ok(()));
//! # Ok::<(), Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **No recursion** - Every descent records its path on an explicit stack
//! - **Arena storage** - Nodes live in a slot arena and refer to children by handle
//! - **Fallible by value** - Duplicate inserts and lookup misses are returned as [`Error`]s
//!
//! # Implementation
//!
//! Values are stored only in leaves. Inner nodes hold separator keys, and a key
//! equal to a separator routes to the right of it. A node splits once it holds
//! more than [`BTree::max_entries`] keys. Partially filled nodes are never
//! rebalanced; a node is removed only once it is completely empty.
//!
//! Structural changes are reported as `tracing` events at the `TRACE` level
//! under the `btree_index::insert`, `btree_index::split` and
//! `btree_index::collapse` targets.

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

mod degree;
mod error;
mod raw;

pub mod btree;

pub use btree::BTree;
pub use degree::Degree;
pub use error::{Error, Result};
