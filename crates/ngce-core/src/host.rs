#![forbid(unsafe_code)]

//! The seam between the binding bridge and its host framework.
//!
//! Everything the bridge needs from the templating/reactivity layer is
//! collected in [`HostBackend`]: expression compilation, reactive watches,
//! attribute inspection, element property/event access, the destruction
//! lifecycle hook, the shared exception sink, and the propagation-cycle
//! probe. The bridge never talks to a real DOM or a real scope directly,
//! which is what lets the whole lifecycle run against the in-memory model
//! host in `ngce-harness`.
//!
//! # Invariants
//!
//! 1. Backend handles ([`HostBackend`] impls and their associated `Value`,
//!    `Scope`, `Element` types) are cheap to clone — clones refer to the
//!    same underlying state.
//! 2. Compilation is pure and deterministic: the same source yields an
//!    equivalent [`CompiledExpr`], shareable across element instances.
//! 3. A [`WatchGuard`]/[`ListenerGuard`] releases its observer at most once;
//!    calling `cancel`/`detach` again is a no-op returning `Ok`.
//! 4. Dropping an unreleased guard still releases the observer (failures are
//!    swallowed on that path — release explicitly when they matter).
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | `compile` fails | `Err(HostError)`, surfaced as a setup-time error |
//! | watch evaluator fails mid-cycle | host treats the value as unchanged; the evaluator owner has already routed the error |
//! | guard cancel fails | `Err(HostError)`, reported per-disposer by the caller |

use std::fmt;
use std::rc::Rc;

use crate::error::BindError;

/// Opaque failure raised by a host collaborator.
///
/// Carries only a message; [`BindError`](crate::error::BindError) variants
/// wrap it with binding context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    message: String,
}

impl HostError {
    /// Create a host error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HostError {}

/// One attribute exactly as authored in the template.
///
/// The name keeps its vendor prefix and separator spelling; the value is the
/// raw expression source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub name: String,
    pub value: String,
}

impl RawAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A compiled expression: pure callable of (scope, optional event local).
///
/// Produced once per binding at compile time and reused for every evaluation
/// and every element instance compiled from the same template node. The
/// second argument carries the triggering event object for event bindings
/// (the expression language's `$event` local); property evaluations pass
/// `None`.
pub type CompiledExpr<B> = Rc<
    dyn Fn(
        &<B as HostBackend>::Scope,
        Option<&<B as HostBackend>::Value>,
    ) -> Result<<B as HostBackend>::Value, HostError>,
>;

/// A host-callable event handler, invoked with the triggering event object.
pub type EventHandler<B> = Rc<dyn Fn(&<B as HostBackend>::Value)>;

/// Evaluator registered with [`HostBackend::watch`].
///
/// If evaluation returns `Err`, the owner of the evaluator has already routed
/// the failure to the exception sink; the host must treat the watched value
/// as unchanged and keep the cycle running.
pub type WatchEvaluator<B> =
    Rc<dyn Fn(&<B as HostBackend>::Scope) -> Result<<B as HostBackend>::Value, HostError>>;

/// Change callback for a watch: receives (new, old) evaluated values.
pub type ChangeListener<B> =
    Box<dyn FnMut(&<B as HostBackend>::Value, &<B as HostBackend>::Value)>;

/// One-shot destruction callback registered via [`HostBackend::on_destroy`].
pub type DestroyHook = Box<dyn FnOnce()>;

/// Work wrapped in a fresh propagation cycle by [`HostBackend::apply`].
pub type ApplyWork = Box<dyn FnOnce()>;

/// Cancellation guard for a registered reactive observer.
///
/// Built by the backend around whatever unregistration closure its watch
/// mechanism hands back. Cancellation runs at most once; an explicit
/// [`cancel`](Self::cancel) surfaces failures, while the `Drop` backstop
/// swallows them.
pub struct WatchGuard {
    cancel: Option<Box<dyn FnOnce() -> Result<(), HostError>>>,
}

impl WatchGuard {
    /// Wrap an unregistration closure.
    pub fn new(cancel: impl FnOnce() -> Result<(), HostError> + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A guard with nothing to release.
    #[must_use]
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Release the observer. Idempotent: the second and later calls return
    /// `Ok(())` without invoking anything.
    pub fn cancel(&mut self) -> Result<(), HostError> {
        match self.cancel.take() {
            Some(cancel) => cancel(),
            None => Ok(()),
        }
    }

    /// Whether the guard still holds an unreleased observer.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel();
        }
    }
}

impl fmt::Debug for WatchGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchGuard")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Detachment guard for an attached event listener. Same discipline as
/// [`WatchGuard`].
pub struct ListenerGuard {
    detach: Option<Box<dyn FnOnce() -> Result<(), HostError>>>,
}

impl ListenerGuard {
    /// Wrap a detachment closure.
    pub fn new(detach: impl FnOnce() -> Result<(), HostError> + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A guard with nothing to release.
    #[must_use]
    pub fn noop() -> Self {
        Self { detach: None }
    }

    /// Remove the listener. Idempotent like [`WatchGuard::cancel`].
    pub fn detach(&mut self) -> Result<(), HostError> {
        match self.detach.take() {
            Some(detach) => detach(),
            None => Ok(()),
        }
    }

    /// Whether the guard still holds an attached listener.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            let _ = detach();
        }
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Capabilities the binding bridge consumes from its host framework.
///
/// Implementations are single-threaded handle bundles: cloning shares the
/// underlying framework state. `ngce-harness` ships a complete in-memory
/// model implementation for tests.
pub trait HostBackend: Clone + 'static {
    /// Dynamic value flowing between expressions, properties, and events.
    type Value: Clone + 'static;
    /// Scope/context handle expressions evaluate against.
    type Scope: Clone + 'static;
    /// Element handle for property and event access.
    type Element: Clone + 'static;

    /// Compile an expression source string. Pure and deterministic.
    fn compile(&self, source: &str) -> Result<CompiledExpr<Self>, HostError>;

    /// Register a reactive observer on `scope`.
    ///
    /// The host invokes `evaluator` during each propagation cycle and calls
    /// `on_change` with (new, old) when the value changed — structurally,
    /// not just by identity, when `deep` is set. An `Err` from the evaluator
    /// must be treated as no change (see [`WatchEvaluator`]).
    fn watch(
        &self,
        scope: &Self::Scope,
        evaluator: WatchEvaluator<Self>,
        on_change: ChangeListener<Self>,
        deep: bool,
    ) -> WatchGuard;

    /// Every attribute on `element` as originally authored, in declaration
    /// order.
    fn attributes(&self, element: &Self::Element) -> Vec<RawAttribute>;

    /// Read a property off the underlying element.
    fn property(&self, element: &Self::Element, name: &str) -> Option<Self::Value>;

    /// Assign a property on the underlying element.
    fn set_property(&self, element: &Self::Element, name: &str, value: Self::Value);

    /// Attach a native event listener under `name`.
    fn listen(
        &self,
        element: &Self::Element,
        name: &str,
        handler: EventHandler<Self>,
    ) -> ListenerGuard;

    /// Register a one-shot callback fired exactly once when `element` is
    /// removed from the live context.
    fn on_destroy(&self, element: &Self::Element, callback: DestroyHook);

    /// Shared fire-and-forget exception sink.
    fn report_exception(&self, error: BindError);

    /// Whether a propagation cycle is currently running for `scope`.
    fn propagation_in_progress(&self, scope: &Self::Scope) -> bool;

    /// Run `work` and then drive a fresh propagation cycle so reactive
    /// consumers observe any state changes it made. Must not be called while
    /// a cycle is already in progress.
    fn apply(&self, scope: &Self::Scope, work: ApplyWork);

    /// Decompose a map-like value into (key, value) entries in the map's own
    /// order. `None` when the value is not a map.
    fn entries(&self, value: &Self::Value) -> Option<Vec<(String, Self::Value)>>;

    /// Resolve a host-language callable carried inside a value. `None` when
    /// the value is not callable.
    fn listener_from_value(
        &self,
        scope: &Self::Scope,
        value: &Self::Value,
    ) -> Option<EventHandler<Self>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn watch_guard_cancels_once() {
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let mut guard = WatchGuard::new(move || {
            c.set(c.get() + 1);
            Ok(())
        });

        assert!(guard.is_active());
        assert!(guard.cancel().is_ok());
        assert!(!guard.is_active());
        assert!(guard.cancel().is_ok(), "second cancel is a no-op");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn watch_guard_drop_releases() {
        let calls = Rc::new(Cell::new(0));
        {
            let c = Rc::clone(&calls);
            let _guard = WatchGuard::new(move || {
                c.set(c.get() + 1);
                Ok(())
            });
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn watch_guard_drop_after_cancel_is_silent() {
        let calls = Rc::new(Cell::new(0));
        {
            let c = Rc::clone(&calls);
            let mut guard = WatchGuard::new(move || {
                c.set(c.get() + 1);
                Ok(())
            });
            guard.cancel().unwrap();
        }
        assert_eq!(calls.get(), 1, "drop must not release a second time");
    }

    #[test]
    fn watch_guard_surfaces_cancel_failure() {
        let mut guard = WatchGuard::new(|| Err(HostError::new("observer gone")));
        let err = guard.cancel().unwrap_err();
        assert_eq!(err.message(), "observer gone");
        // Failure consumed the closure; the guard is spent.
        assert!(!guard.is_active());
        assert!(guard.cancel().is_ok());
    }

    #[test]
    fn noop_guards_are_inert() {
        let mut watch = WatchGuard::noop();
        assert!(!watch.is_active());
        assert!(watch.cancel().is_ok());

        let mut listener = ListenerGuard::noop();
        assert!(!listener.is_active());
        assert!(listener.detach().is_ok());
    }

    #[test]
    fn listener_guard_detaches_once() {
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let mut guard = ListenerGuard::new(move || {
            c.set(c.get() + 1);
            Ok(())
        });

        assert!(guard.detach().is_ok());
        assert!(guard.detach().is_ok());
        drop(guard);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn host_error_display() {
        let err = HostError::new("compile blew up");
        assert_eq!(err.to_string(), "compile blew up");
        assert_eq!(err.message(), "compile blew up");
    }

    #[test]
    fn raw_attribute_construction() {
        let attr = RawAttribute::new("ngce-prop-x", "expr");
        assert_eq!(attr.name, "ngce-prop-x");
        assert_eq!(attr.value, "expr");
    }

    #[test]
    fn guard_debug_reports_active_state() {
        let guard = WatchGuard::new(|| Ok(()));
        assert!(format!("{guard:?}").contains("active: true"));
        let spent = WatchGuard::noop();
        assert!(format!("{spent:?}").contains("active: false"));
    }
}
