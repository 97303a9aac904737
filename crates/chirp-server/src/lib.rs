//! HTTP server for Chirp.
//!
//! Exposes user and post operations as JSON endpoints over a single shared
//! [`RecordStore`](chirp_store::RecordStore). Each request is bound to the
//! store by [`StoreLayer`] and handlers reach it through the [`Store`]
//! extractor.

pub mod binder;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use binder::{BoundStore, MissingStore, Store, StoreLayer};
pub use config::{ServerConfig, StorageConfig};
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::ChirpServer;
