//! Error types for `BPlusTreeMap`.
//!
//! Lookups and removals report an absent key through `Option`, not through
//! this enum — only contract violations and resource exhaustion are errors
//! here. See the crate's top-level docs for the full taxonomy.

use std::error::Error;
use std::fmt;

/// Everything that can go wrong calling into a `BPlusTreeMap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BPlusTreeError {
    /// `new`/`with_capacity` was called with a branching factor below
    /// [`crate::types::MIN_CAPACITY`].
    InvalidCapacity(String),
    /// A split or the initial root allocation could not grow the arena.
    /// The tree is left exactly as it was before the call that failed.
    AllocationFailed(String),
    /// `validate` found a structural invariant violated. Indicates a bug in
    /// this crate, not caller misuse.
    CorruptedTree(String),
}

impl BPlusTreeError {
    pub fn invalid_capacity<S: Into<String>>(msg: S) -> Self {
        BPlusTreeError::InvalidCapacity(msg.into())
    }

    pub fn allocation_failed<S: Into<String>>(msg: S) -> Self {
        BPlusTreeError::AllocationFailed(msg.into())
    }

    pub fn corrupted_tree<S: Into<String>>(msg: S) -> Self {
        BPlusTreeError::CorruptedTree(msg.into())
    }

    /// True for errors raised by bad arguments rather than by tree state.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, BPlusTreeError::InvalidCapacity(_))
    }
}

impl fmt::Display for BPlusTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BPlusTreeError::InvalidCapacity(msg) => write!(f, "invalid capacity: {msg}"),
            BPlusTreeError::AllocationFailed(msg) => write!(f, "allocation failed: {msg}"),
            BPlusTreeError::CorruptedTree(msg) => write!(f, "corrupted tree: {msg}"),
        }
    }
}

impl Error for BPlusTreeError {}

/// Result of an operation that can only fail by violating a caller contract
/// or exhausting memory (`new`, `insert`).
pub type TreeResult<T> = Result<T, BPlusTreeError>;
