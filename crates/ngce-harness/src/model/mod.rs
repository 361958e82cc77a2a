#![forbid(unsafe_code)]

//! The in-memory reference host.
//!
//! Three handles, all cheap clones over shared state:
//!
//! - [`ModelScope`]: value store + watchers + the digest loop
//! - [`ModelElement`]: attribute table, property bag, listeners, destroy
//!   lifecycle with child cascade
//! - [`ModelHost`]: the [`HostBackend`](ngce_core::host::HostBackend) tying
//!   them together, with an expression service and an inspectable exception
//!   sink
//!
//! Values are `serde_json::Value`, so equality is structural and deep
//! watches behave honestly. The scope's digest panics on re-entrant cycles
//! and on runaway dirty loops — harness misbehavior fails loudly instead of
//! hanging a test.

pub mod element;
pub mod host;
pub mod scope;

pub use element::{ElementHandler, ModelElement};
pub use host::ModelHost;
pub use scope::{ModelScope, ScopeEvaluator, ScopeListener};
