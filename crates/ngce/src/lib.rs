#![forbid(unsafe_code)]

//! Facade crate: one dependency line for the whole binding bridge.
//!
//! - [`attr`], [`error`], [`host`]: the name grammar, error taxonomy, and
//!   host seam from `ngce-core`.
//! - [`binder`], [`deferred`], [`directive`] (feature `runtime`, default):
//!   the binding controller from `ngce-runtime`.
//! - feature `harness`: re-exports the in-memory test host from
//!   `ngce-harness` for downstream test suites.
//! - feature `serde`: serialization for the classification types.
//!
//! Most callers want [`prelude`].

pub use ngce_core::attr;
pub use ngce_core::error;
pub use ngce_core::host;

#[cfg(feature = "runtime")]
pub use ngce_runtime::{binder, deferred, directive};

#[cfg(feature = "harness")]
pub use ngce_harness as harness;

/// The names practically every caller touches.
pub mod prelude {
    pub use ngce_core::attr::{BindingKind, BindingTarget, classify};
    pub use ngce_core::error::BindError;
    pub use ngce_core::host::{HostBackend, HostError, RawAttribute};

    #[cfg(feature = "runtime")]
    pub use ngce_runtime::{
        BINDING_PRIORITY, BinderOptions, BindingSession, BindingSet, CustomElementDirective,
        DIRECTIVE_NAME, DeferredBinding, ElementBinder, LinkOutcome,
    };

    #[cfg(feature = "harness")]
    pub use ngce_harness::{Fixture, ModelElement, ModelHost, ModelScope};
}
