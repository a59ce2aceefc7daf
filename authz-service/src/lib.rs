//! Authorization service core
//!
//! Composes the two halves of the system: the relationship consistency
//! manager, which keeps the Subject/Group/Contract graph free of duplicate
//! bindings and orphaned groups across multi-entity transactions, and the
//! policy engine, which evaluates a policy's condition tree against the
//! attributes a subject acquired through its group bindings.
//!
//! The central operation is [`AuthzService::authorize`]: resolve the
//! subject's groups via contracts, merge their attribute lists, load the
//! named policy and evaluate it to a terminal verdict.

pub mod authorize;
pub mod error;
pub mod relationship;

pub use authorize::*;
pub use error::*;
pub use relationship::*;
