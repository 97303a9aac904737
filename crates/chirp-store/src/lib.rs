//! Record store for Chirp users and posts.
//!
//! The store is the only component with real invariants: unique usernames,
//! monotonic user ids, and atomic check-then-write sequences under
//! concurrent requests. Everything above it (routing, parsing, response
//! formatting) is plumbing that calls into a [`RecordStore`].
//!
//! # Storage Backends
//!
//! All backends implement the [`RecordStore`] trait:
//!
//! - [`InMemoryRecordStore`] -- `RwLock`-guarded collections with an
//!   [`IdAllocator`]; state lives as long as the process
//! - [`SqliteRecordStore`] -- durable tables with a `UNIQUE` username
//!   constraint and auto-increment ids (feature `sqlite`, on by default)
//!
//! # Design Rules
//!
//! 1. Usernames are unique among live users; a failed create mutates nothing.
//! 2. Ids strictly increase and are never reused, even after deletion.
//! 3. Posts never reference users structurally; deleting a user keeps its posts.
//! 4. Locks are held for one in-memory operation or one transaction only.
//! 5. Every failure is a [`StoreError`] value; the store never panics on bad input.

pub mod allocator;
pub mod error;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(test)]
mod conformance;

// Re-export primary types at crate root for ergonomic imports.
pub use allocator::IdAllocator;
pub use error::{ErrorKind, StoreError, StoreResult};
pub use memory::InMemoryRecordStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRecordStore;
pub use traits::RecordStore;
