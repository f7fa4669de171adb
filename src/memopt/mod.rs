//! Memory-optimized integer containers
//!
//! At full-corpus scale (tens of millions of pages) generic hash maps carry
//! too much per-entry overhead. These containers partition their keys by the
//! high bits into sorted dense blocks and pay a binary search per access
//! instead.

pub mod hash_key_dict;
pub mod int_int_dict;
pub mod int_set;

pub use hash_key_dict::{CollisionPolicy, HashKeyDict};
pub use int_int_dict::IntIntDict;
pub use int_set::IntSet;

/// Number of low bits addressed inside one block.
pub(crate) const BLOCK_BITS: u32 = 16;
