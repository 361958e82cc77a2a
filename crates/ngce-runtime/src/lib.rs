#![forbid(unsafe_code)]

//! Binding controller runtime for the ngce binding bridge.
//!
//! This crate provides:
//! - [`binder`] — [`ElementBinder`] with the compile/link lifecycle,
//!   [`BindingSet`] (shared compile product) and [`BindingSession`]
//!   (per-instance dispose handle)
//! - [`deferred`] — [`DeferredBinding`] for targets inserted after link time
//! - [`directive`] — the registrable-unit facade with staged pre/post
//!   linking and the declared priority
//!
//! Everything is generic over [`HostBackend`](ngce_core::host::HostBackend);
//! `ngce-harness` ships an in-memory model backend for tests.

pub mod binder;
pub mod deferred;
pub mod directive;

pub use binder::{BinderOptions, Binding, BindingSession, BindingSet, ElementBinder};
pub use deferred::DeferredBinding;
pub use directive::{
    BINDING_PRIORITY, CompiledDirective, CustomElementDirective, DIRECTIVE_NAME,
    DirectiveDescriptor, HOST_DEFAULT_PRIORITY, LinkOutcome, PreLinked,
};
