//! An in-memory, ordered key-to-value B+ tree.
//!
//! [`BPlusTreeMap`] stores entries in arena-allocated leaf and branch nodes
//! addressed by [`NodeId`](types::NodeId) rather than by pointer. Leaves form
//! a doubly-linked chain in key order, so forward/reverse iteration and range
//! queries never have to touch a branch. Mutation can fail only when the
//! allocator itself is out of memory ([`BPlusTreeError::AllocationFailed`]);
//! every split reserves its new node's arena slot before any existing node is
//! mutated, so a failed split never loses data.
//!
//! ```
//! use bplustree::BPlusTreeMap;
//!
//! let mut tree = BPlusTreeMap::new(32).unwrap();
//! for i in 0..1000 {
//!     tree.insert(i, i * i).unwrap();
//! }
//! assert_eq!(tree.get(&500), Some(&250000));
//! assert_eq!(tree.range(10..13).map(|(k, _)| *k).collect::<Vec<_>>(), vec![10, 11, 12]);
//! tree.remove(&500);
//! assert_eq!(tree.get(&500), None);
//! ```

mod arena;
mod construction;
mod delete;
mod error;
mod get;
mod insert;
mod iteration;
mod node;
mod search;
mod types;
mod validation;

pub use error::{BPlusTreeError, TreeResult};
pub use iteration::{Cursor, Iter, IterRev, Range};
pub use types::{BPlusTreeMap, NodeId, MIN_CAPACITY};
