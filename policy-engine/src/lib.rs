//! Attribute-based policy evaluation for the authorization engine
//!
//! A policy is a stored tree of boolean/attribute predicates. Evaluation runs
//! in-process against the effective attribute set a subject acquired through
//! its group bindings and produces a terminal [`Verdict`].
//!
//! # Core Concepts
//!
//! - **Group**: a bundle of key/value attributes conferred on bound subjects
//! - **Policy**: a named, stored [`Condition`] tree
//! - **Condition**: one node of the predicate tree (has-attribute,
//!   attribute comparison, negation, and, or)
//! - **Verdict**: the evaluation outcome, `Permitted` or `Denied`
//!
//! # Example
//!
//! ```rust
//! use policy_engine::{Attribute, Condition, Group, Policy, PolicyEngine, Verdict};
//!
//! let group = Group::with_attributes(vec![Attribute::new("tier", "gold")]);
//! let policy = Policy::with_condition(Condition::has_attribute(["tier"]));
//!
//! let engine = PolicyEngine::new();
//! let verdict = engine.check(&policy, &group, None).unwrap();
//! assert_eq!(verdict, Verdict::Permitted);
//! ```

pub mod attributes;
pub mod engine;
pub mod error;
pub mod models;

pub use attributes::*;
pub use engine::*;
pub use error::*;
pub use models::*;
