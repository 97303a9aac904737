//! Foundation types for Chirp.
//!
//! This crate provides the identity and record types shared by the store,
//! the HTTP server, and the CLI. Every other Chirp crate depends on
//! `chirp-types`.
//!
//! # Key Types
//!
//! - [`UserId`] -- Store-assigned, strictly increasing user identity
//! - [`User`] -- A registered username bound to its identity
//! - [`Post`] -- An immutable piece of content attributed to an author name

pub mod error;
pub mod post;
pub mod user;

pub use error::TypeError;
pub use post::Post;
pub use user::{validate_username, User, UserId};
