//! Transactional persistence for the authorization relationship graph
//!
//! Four entities are persisted: subjects and the contracts binding them to
//! groups live in typed relational columns (they are queried relationally);
//! groups and policies are serialized to an opaque payload and stored through
//! the generic entity store.
//!
//! The storage seam is the [`RelationStore`] trait. Every typed operation
//! exists in two forms: an autonomous one that wraps a single statement in
//! its own transaction, and a transaction-participating one on
//! [`StoreTransaction`], which composite operations combine under
//! [`with_transaction`]. Two backends are provided:
//!
//! - [`PgRelationStore`] — PostgreSQL via sqlx, with duplicate contract
//!   bindings rejected by a `UNIQUE (subject_id, group_id)` constraint
//! - [`InMemoryRelationStore`] — snapshot-transaction store for tests and
//!   local development

pub mod entity;
pub mod error;
pub mod memory;
pub mod migration;
pub mod models;
pub mod postgres;
pub mod transaction;

pub use entity::*;
pub use error::*;
pub use memory::*;
pub use models::*;
pub use postgres::*;
pub use transaction::*;
