#![forbid(unsafe_code)]

//! Per-element live binding state and the two link phases.
//!
//! A [`BindingSession`] owns the disposer handles (watch guards, listener
//! guards) created when a [`BindingSet`] is linked onto one element
//! instance. Sessions are never shared between instances — compiled
//! expressions are, sessions are not.
//!
//! # Invariants
//!
//! 1. Initial evaluation runs for every property binding before any reactive
//!    observer is registered; a failing initial apply aborts the link with
//!    nothing to unwind.
//! 2. The property phase completes before the event phase begins.
//! 3. Teardown runs at most once per session: watch guards cancel first,
//!    then listeners detach; each disposer failure is reported individually
//!    and never blocks a sibling.
//! 4. Failures after the element is live (re-evaluation, event dispatch,
//!    disposers) are routed to the backend's exception sink, never
//!    propagated.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | initial property evaluation fails | link aborts with `InitialApply` |
//! | bulk initial value is not a map | link aborts with `BulkShape` |
//! | event phase fails | session tears down, link aborts |
//! | reactive re-evaluation fails | `Eval` reported, value treated as unchanged |
//! | disposer fails | `Teardown` reported, siblings still run |

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ngce_core::error::BindError;
use ngce_core::host::{
    ChangeListener, CompiledExpr, EventHandler, HostBackend, ListenerGuard, WatchEvaluator,
    WatchGuard,
};

use super::set::{Binding, BindingSet};

// ---------------------------------------------------------------------------
// SessionCore — shared guts
// ---------------------------------------------------------------------------

/// Guard storage shared between a [`BindingSession`], the element's destroy
/// hook, and (for deferred targets) the pending attach handle.
pub(crate) struct SessionCore<B: HostBackend> {
    backend: B,
    disposed: Cell<bool>,
    watches: RefCell<Vec<(String, WatchGuard)>>,
    listeners: RefCell<Vec<(String, ListenerGuard)>>,
}

impl<B: HostBackend> SessionCore<B> {
    pub(crate) fn new(backend: B) -> Rc<Self> {
        Rc::new(Self {
            backend,
            disposed: Cell::new(false),
            watches: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub(crate) fn watch_count(&self) -> usize {
        self.watches.borrow().len()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn register_watch(&self, attribute: &str, guard: WatchGuard) {
        self.watches.borrow_mut().push((attribute.to_string(), guard));
    }

    fn register_listener(&self, attribute: &str, guard: ListenerGuard) {
        self.listeners
            .borrow_mut()
            .push((attribute.to_string(), guard));
    }

    /// Fire teardown when `element` leaves the live context.
    pub(crate) fn install_destroy_hook(self: &Rc<Self>, element: &B::Element) {
        let core = Rc::clone(self);
        self.backend
            .on_destroy(element, Box::new(move || core.teardown()));
    }

    /// Release every guard, exactly once. Watches cancel before listeners
    /// detach; a failing disposer is reported and its siblings still run.
    pub(crate) fn teardown(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let watches = self.watches.take();
        let listeners = self.listeners.take();
        tracing::debug!(
            watches = watches.len(),
            listeners = listeners.len(),
            "tearing down binding session"
        );
        for (attribute, mut guard) in watches {
            if let Err(source) = guard.cancel() {
                tracing::warn!(attribute = %attribute, error = %source, "watch cancel failed");
                self.backend
                    .report_exception(BindError::Teardown { attribute, source });
            }
        }
        for (attribute, mut guard) in listeners {
            if let Err(source) = guard.detach() {
                tracing::warn!(attribute = %attribute, error = %source, "listener detach failed");
                self.backend
                    .report_exception(BindError::Teardown { attribute, source });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Phase runners
// ---------------------------------------------------------------------------

/// Property phase: initial-apply every property and bulk-property binding,
/// then register their reactive observers.
pub(crate) fn apply_properties<B: HostBackend>(
    core: &Rc<SessionCore<B>>,
    scope: &B::Scope,
    element: &B::Element,
    set: &BindingSet<B>,
) -> Result<(), BindError> {
    let backend = core.backend();

    for binding in set.properties() {
        let value = (binding.expr())(scope, None).map_err(|source| BindError::InitialApply {
            attribute: binding.attribute().to_string(),
            source,
        })?;
        backend.set_property(element, binding.name(), value);
    }
    for binding in set.bulk_properties() {
        let value = (binding.expr())(scope, None).map_err(|source| BindError::InitialApply {
            attribute: binding.attribute().to_string(),
            source,
        })?;
        let entries = backend.entries(&value).ok_or_else(|| BindError::BulkShape {
            attribute: binding.attribute().to_string(),
            detail: "expected a map value".to_string(),
        })?;
        for (name, value) in entries {
            backend.set_property(element, &name, value);
        }
    }

    // Every initial value is on the element; observers may now register.
    for binding in set.properties() {
        register_property_watch(core, scope, element, binding);
    }
    for binding in set.bulk_properties() {
        register_bulk_watch(core, scope, element, binding);
    }
    Ok(())
}

/// Event phase: attach a listener per event binding and per bulk-events map
/// entry. On failure the whole session tears down before the error returns.
pub(crate) fn attach_events<B: HostBackend>(
    core: &Rc<SessionCore<B>>,
    scope: &B::Scope,
    element: &B::Element,
    set: &BindingSet<B>,
) -> Result<(), BindError> {
    if core.is_disposed() {
        return Err(BindError::SessionState {
            detail: "event phase requested after the session was torn down".to_string(),
        });
    }
    match attach_events_inner(core, scope, element, set) {
        Ok(()) => Ok(()),
        Err(err) => {
            core.teardown();
            Err(err)
        }
    }
}

fn attach_events_inner<B: HostBackend>(
    core: &Rc<SessionCore<B>>,
    scope: &B::Scope,
    element: &B::Element,
    set: &BindingSet<B>,
) -> Result<(), BindError> {
    let backend = core.backend();

    for binding in set.events() {
        let handler = event_handler(backend, scope, binding.attribute(), binding.expr());
        let guard = backend.listen(element, binding.name(), handler);
        core.register_listener(binding.attribute(), guard);
    }

    for binding in set.bulk_events() {
        let value = (binding.expr())(scope, None).map_err(|source| BindError::InitialApply {
            attribute: binding.attribute().to_string(),
            source,
        })?;
        let entries = backend.entries(&value).ok_or_else(|| BindError::BulkShape {
            attribute: binding.attribute().to_string(),
            detail: "expected a map value".to_string(),
        })?;
        for (event_name, entry) in entries {
            let handler = backend.listener_from_value(scope, &entry).ok_or_else(|| {
                BindError::BulkShape {
                    attribute: binding.attribute().to_string(),
                    detail: format!("entry `{event_name}` is not a callable handler"),
                }
            })?;
            // Bulk map keys are host-authored; they attach as written.
            let guard = backend.listen(element, &event_name, handler);
            core.register_listener(binding.attribute(), guard);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Closure builders
// ---------------------------------------------------------------------------

/// Deep-watch one property expression; re-apply the property on change.
fn register_property_watch<B: HostBackend>(
    core: &Rc<SessionCore<B>>,
    scope: &B::Scope,
    element: &B::Element,
    binding: &Binding<B>,
) {
    let backend = core.backend();
    let name = binding.name().to_string();
    let attribute = binding.attribute().to_string();

    let on_change: ChangeListener<B> = {
        let backend = backend.clone();
        let element = element.clone();
        let attribute = attribute.clone();
        Box::new(move |new, _old| {
            tracing::trace!(attribute = %attribute, property = %name, "re-applying property");
            backend.set_property(&element, &name, new.clone());
        })
    };

    let evaluator = reporting_evaluator(backend, &attribute, binding.expr());
    let guard = backend.watch(scope, evaluator, on_change, true);
    core.register_watch(binding.attribute(), guard);
}

/// Deep-watch a whole-map expression; re-apply every entry on change. A
/// non-map value at this point is reported and skipped, never fatal.
fn register_bulk_watch<B: HostBackend>(
    core: &Rc<SessionCore<B>>,
    scope: &B::Scope,
    element: &B::Element,
    binding: &Binding<B>,
) {
    let backend = core.backend();
    let attribute = binding.attribute().to_string();

    let on_change: ChangeListener<B> = {
        let backend = backend.clone();
        let element = element.clone();
        let attribute = attribute.clone();
        Box::new(move |new, _old| match backend.entries(new) {
            Some(entries) => {
                tracing::trace!(attribute = %attribute, entries = entries.len(), "re-applying bulk properties");
                for (name, value) in entries {
                    backend.set_property(&element, &name, value);
                }
            }
            None => {
                backend.report_exception(BindError::BulkShape {
                    attribute: attribute.clone(),
                    detail: "expected a map value".to_string(),
                });
            }
        })
    };

    let evaluator = reporting_evaluator(backend, &attribute, binding.expr());
    let guard = backend.watch(scope, evaluator, on_change, true);
    core.register_watch(binding.attribute(), guard);
}

/// Wrap a compiled expression as a watch evaluator that reports its own
/// failures. The `Err` still reaches the host, which treats the value as
/// unchanged.
fn reporting_evaluator<B: HostBackend>(
    backend: &B,
    attribute: &str,
    expr: &CompiledExpr<B>,
) -> WatchEvaluator<B> {
    let backend = backend.clone();
    let attribute = attribute.to_string();
    let expr = Rc::clone(expr);
    Rc::new(move |scope: &B::Scope| {
        (expr)(scope, None).map_err(|source| {
            tracing::debug!(attribute = %attribute, error = %source, "watch evaluation failed");
            backend.report_exception(BindError::Eval {
                attribute: attribute.clone(),
                source: source.clone(),
            });
            source
        })
    })
}

/// Build the native-event callback for one event binding.
///
/// Dispatch rule: inside a propagation cycle the expression evaluates
/// directly; outside one, evaluation is wrapped in `apply` so a fresh cycle
/// picks up its effects. Evaluation failures are reported, never thrown back
/// at the event source.
fn event_handler<B: HostBackend>(
    backend: &B,
    scope: &B::Scope,
    attribute: &str,
    expr: &CompiledExpr<B>,
) -> EventHandler<B> {
    let backend = backend.clone();
    let scope = scope.clone();
    let attribute = attribute.to_string();
    let expr = Rc::clone(expr);
    Rc::new(move |event: &B::Value| {
        if backend.propagation_in_progress(&scope) {
            tracing::trace!(attribute = %attribute, "event during propagation, evaluating directly");
            evaluate_event(&backend, &scope, &attribute, &expr, event);
        } else {
            tracing::trace!(attribute = %attribute, "event outside propagation, applying");
            let backend_inner = backend.clone();
            let scope_inner = scope.clone();
            let attribute_inner = attribute.clone();
            let expr_inner = Rc::clone(&expr);
            let event = event.clone();
            backend.apply(
                &scope,
                Box::new(move || {
                    evaluate_event(
                        &backend_inner,
                        &scope_inner,
                        &attribute_inner,
                        &expr_inner,
                        &event,
                    );
                }),
            );
        }
    })
}

fn evaluate_event<B: HostBackend>(
    backend: &B,
    scope: &B::Scope,
    attribute: &str,
    expr: &CompiledExpr<B>,
    event: &B::Value,
) {
    if let Err(source) = (expr)(scope, Some(event)) {
        tracing::debug!(attribute = %attribute, error = %source, "event expression failed");
        backend.report_exception(BindError::Eval {
            attribute: attribute.to_string(),
            source,
        });
    }
}

// ---------------------------------------------------------------------------
// BindingSession — public dispose handle
// ---------------------------------------------------------------------------

/// Dispose handle for one element instance's live bindings.
///
/// Teardown normally rides the element's destruction signal;
/// [`dispose`](Self::dispose) is the manual path. Both are idempotent and
/// safe to combine: whichever runs first wins.
pub struct BindingSession<B: HostBackend> {
    core: Rc<SessionCore<B>>,
}

impl<B: HostBackend> BindingSession<B> {
    pub(crate) fn from_core(core: Rc<SessionCore<B>>) -> Self {
        Self { core }
    }

    /// Tear the session down now instead of waiting for the destruction
    /// signal. No-op if teardown already ran.
    pub fn dispose(&self) {
        self.core.teardown();
    }

    /// Whether teardown has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Number of reactive observers currently held. Zero after teardown.
    #[must_use]
    pub fn watch_count(&self) -> usize {
        self.core.watch_count()
    }

    /// Number of event listeners currently held. Zero after teardown.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.core.listener_count()
    }
}

impl<B: HostBackend> std::fmt::Debug for BindingSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingSession")
            .field("disposed", &self.is_disposed())
            .field("watches", &self.watch_count())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
