#![forbid(unsafe_code)]

//! Binding failure taxonomy.
//!
//! Two families, split by when in the element lifecycle they can occur:
//!
//! | Family | Variants | Policy |
//! |--------|----------|--------|
//! | setup-time | `DisallowedProperty`, `Compile`, `InitialApply`, `BulkShape`, `SessionState` | fatal — returned to the caller, binding construction aborts |
//! | live-phase | `Eval`, `Teardown` | non-fatal — routed to the host's exception sink, execution continues |
//!
//! Once an element is live, a broken binding must never take down the
//! element, its sibling bindings, or the host's propagation cycle; only the
//! setup family is allowed to abort anything. [`BindError::is_setup_failure`]
//! encodes the split.
//!
//! Host-side failures cross the seam as
//! [`HostError`](crate::host::HostError); the variants here wrap one with the
//! offending attribute name and expose it through `Error::source`.

use std::fmt;

use crate::host::HostError;

/// Everything that can go wrong while compiling, linking, running, or
/// tearing down a set of element bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A property binding's canonical name denotes a native DOM
    /// event-handler property (`on` + letters, matched case-insensitively).
    /// Wiring those through the property path would install a native handler
    /// outside the event-binding lifecycle, so this fails at compile time.
    DisallowedProperty {
        /// The raw attribute as authored.
        attribute: String,
        /// The canonical property name that tripped the guard.
        property: String,
    },
    /// The backend could not compile a binding's expression source.
    Compile { attribute: String, source: HostError },
    /// The initial, pre-observer evaluation of a property binding failed.
    InitialApply { attribute: String, source: HostError },
    /// A bulk binding's value has the wrong shape: the property form needs a
    /// map, the event form needs a map of callables.
    BulkShape { attribute: String, detail: String },
    /// A reactive re-evaluation or event-triggered evaluation failed after
    /// the element went live.
    Eval { attribute: String, source: HostError },
    /// A single disposer failed during teardown. Reported per-disposer;
    /// sibling disposers still run.
    Teardown { attribute: String, source: HostError },
    /// A deferred binding session was driven out of order (attach after
    /// destroy, double attach).
    SessionState { detail: String },
}

impl BindError {
    /// The raw attribute the failure belongs to, when there is one.
    #[must_use]
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Self::DisallowedProperty { attribute, .. }
            | Self::Compile { attribute, .. }
            | Self::InitialApply { attribute, .. }
            | Self::BulkShape { attribute, .. }
            | Self::Eval { attribute, .. }
            | Self::Teardown { attribute, .. } => Some(attribute),
            Self::SessionState { .. } => None,
        }
    }

    /// Whether this failure belongs to the setup family and may abort
    /// binding construction. Live-phase failures (`Eval`, `Teardown`) go to
    /// the exception sink instead.
    #[must_use]
    pub fn is_setup_failure(&self) -> bool {
        match self {
            Self::DisallowedProperty { .. }
            | Self::Compile { .. }
            | Self::InitialApply { .. }
            | Self::BulkShape { .. }
            | Self::SessionState { .. } => true,
            Self::Eval { .. } | Self::Teardown { .. } => false,
        }
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DisallowedProperty {
                attribute,
                property,
            } => write!(
                f,
                "property bindings for HTML DOM event properties are disallowed: \
                 `{attribute}` targets `{property}`"
            ),
            Self::Compile { attribute, source } => {
                write!(f, "failed to compile `{attribute}`: {source}")
            }
            Self::InitialApply { attribute, source } => {
                write!(f, "initial evaluation of `{attribute}` failed: {source}")
            }
            Self::BulkShape { attribute, detail } => {
                write!(f, "malformed bulk binding `{attribute}`: {detail}")
            }
            Self::Eval { attribute, source } => {
                write!(f, "evaluation of `{attribute}` failed: {source}")
            }
            Self::Teardown { attribute, source } => {
                write!(f, "teardown of `{attribute}` failed: {source}")
            }
            Self::SessionState { detail } => {
                write!(f, "binding session misuse: {detail}")
            }
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Compile { source, .. }
            | Self::InitialApply { source, .. }
            | Self::Eval { source, .. }
            | Self::Teardown { source, .. } => Some(source),
            Self::DisallowedProperty { .. }
            | Self::BulkShape { .. }
            | Self::SessionState { .. } => None,
        }
    }
}
