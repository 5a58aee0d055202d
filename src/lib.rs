//! # skipstore
//!
//! An ordered in-memory key-value index built on a skip list, with a
//! line-oriented flat-file snapshot format and a coarse-grained
//! thread-safe wrapper.
//!
//! ## Core idea
//! A skip list keeps entries in key order across multiple linked levels.
//! Level 0 is a plain sorted linked list containing every entry; each
//! higher level skips over a random subset, so a search can drop most of
//! the list in a few hops — expected O(log n) insert, lookup and delete
//! without any rebalancing.
//!
//! [`SkipList`] is the single-threaded engine. [`Store`] wraps it in one
//! reader-writer lock and ties it to a configured snapshot file.

pub mod codec;
pub mod error;
pub mod skiplist;
pub mod store;

// Public re-exports for the top-level API
pub use codec::LineCodec;
pub use error::{Error, Result};
pub use skiplist::{DeleteOutcome, InsertOutcome, LoadStats, SkipList};
pub use store::{Options, Stats, Store};
