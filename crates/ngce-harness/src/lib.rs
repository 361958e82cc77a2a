#![forbid(unsafe_code)]

//! Test backend and fixtures for exercising binding lifecycles.
//!
//! - [`model`]: an in-memory host — JSON-valued scope with a digest
//!   loop, DOM-like elements, and an expression table.
//! - [`fixtures`]: one-call bundles wiring a host, scope, and element
//!   to a binder.
//! - [`strategy`]: proptest generators for the attribute-name grammar.
//!
//! Everything here is deterministic and single-threaded so lifecycle
//! tests can assert exact watcher, listener, and report counts.

pub mod fixtures;
pub mod model;
pub mod strategy;

pub use fixtures::Fixture;
pub use model::{ModelElement, ModelHost, ModelScope};
