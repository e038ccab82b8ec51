//! An arena-backed red-black tree map for Rust.
//!
//! This crate provides [`RBTreeMap`], an ordered associative container that keeps
//! the five red-black properties across every insertion and removal:
//!
//! 1. Every node is red or black.
//! 2. The root is black.
//! 3. Every leaf position is the (black) sentinel.
//! 4. A red node has two black children.
//! 5. Every path from a node down to a leaf position crosses the same number of black nodes.
//!
//! # Example
//!
//! ```
//! use rbtree_map::RBTreeMap;
//!
//! let mut map = RBTreeMap::new();
//! map.insert(2, "a");
//! map.insert(1, "b");
//! map.insert(10, "c");
//!
//! // A repeated key overwrites the value, never the key.
//! assert_eq!(map.insert(10, "d"), Some("c"));
//!
//! assert_eq!(map.get(&10), Some(&"d"));
//! assert!(map.erase(&2));
//! assert!(!map.erase(&2));
//! assert_eq!(map.len(), 2);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Arena storage** - Nodes and values live in two slot vectors addressed by index;
//!   teardown drains them instead of recursing through the tree
//! - **Per-map sentinel** - No shared mutable state between map instances
//! - **Fallible allocation** - [`RBTreeMap::try_insert`] and [`RBTreeMap::try_reserve`]
//!   report allocation failure instead of aborting
//! - **Self-check** - [`RBTreeMap::validate`] walks the whole tree and names the first
//!   broken invariant
//!
//! # Non-goals
//!
//! There is no iteration or range API, no persistence, no concurrent access and no
//! multimap mode. The map is `Send`/`Sync` whenever its keys and values are, but
//! mutation requires `&mut self`.

#![no_std]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;

pub mod error;
pub mod rbtree_map;

pub use error::{Error, InvariantViolation, Result};
pub use rbtree_map::RBTreeMap;
