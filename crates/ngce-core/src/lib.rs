#![forbid(unsafe_code)]

//! Core vocabulary for the ngce binding bridge.
//!
//! This crate provides:
//! - [`attr`] — the attribute-name grammar: [`classify`] plus the
//!   canonicalization helpers (camelCase for properties, kebab-case for
//!   events) and the DOM event-handler name guard
//! - [`host`] — the [`HostBackend`] seam the runtime drives, with the
//!   [`WatchGuard`]/[`ListenerGuard`] cancellation discipline
//! - [`error`] — the [`BindError`] taxonomy, split into fatal setup-time
//!   failures and reported live-phase failures
//!
//! It is dependency-free by default; the `serde` feature derives
//! `Serialize`/`Deserialize` on the classification types.

pub mod attr;
pub mod error;
pub mod host;

pub use attr::{
    BindingKind, BindingTarget, camel_to_kebab, canonical_event_name, canonical_property_name,
    classify, is_dom_event_property, pascal_to_camel, pascal_to_kebab, underscore_to_camel,
};
pub use error::BindError;
pub use host::{
    ApplyWork, ChangeListener, CompiledExpr, DestroyHook, EventHandler, HostBackend, HostError,
    ListenerGuard, RawAttribute, WatchEvaluator, WatchGuard,
};
