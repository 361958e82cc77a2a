#![forbid(unsafe_code)]

//! The [`HostBackend`] implementation over the model scope and element.
//!
//! [`ModelHost`] wires the binding controller to [`ModelScope`] and
//! [`ModelElement`] and supplies a small expression service good enough for
//! lifecycle tests:
//!
//! - a registry of programmatic expressions (`register_expr`) for anything
//!   with side effects, keyed by the exact source string
//! - JSON literals (`true`, `3`, `"text"`, `{"a": 1}`) compiled to constants
//! - dotted-path reads (`user.name`, `$event.detail`) against the scope,
//!   with the reserved `$event` root resolving to the event local; absent
//!   segments read as `null`
//!
//! Reported exceptions accumulate in order and are inspectable, which is how
//! tests assert the "report, never propagate" live-phase policy.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use ngce_core::error::BindError;
use ngce_core::host::{
    ApplyWork, ChangeListener, CompiledExpr, DestroyHook, EventHandler, HostBackend, HostError,
    ListenerGuard, RawAttribute, WatchEvaluator, WatchGuard,
};
use serde_json::Value;

use super::element::{ElementHandler, ModelElement};
use super::scope::ModelScope;

struct HostState {
    exprs: RefCell<HashMap<String, CompiledExpr<ModelHost>>>,
    handlers: RefCell<HashMap<String, ElementHandler>>,
    failing: RefCell<HashSet<String>>,
    reported: RefCell<Vec<BindError>>,
}

/// Shared handle to one model backend. Clones share state.
#[derive(Clone)]
pub struct ModelHost {
    state: Rc<HostState>,
}

impl ModelHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(HostState {
                exprs: RefCell::new(HashMap::new()),
                handlers: RefCell::new(HashMap::new()),
                failing: RefCell::new(HashSet::new()),
                reported: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register a programmatic expression under its exact source string.
    pub fn register_expr(
        &self,
        source: impl Into<String>,
        expr: impl Fn(&ModelScope, Option<&Value>) -> Result<Value, HostError> + 'static,
    ) {
        self.state
            .exprs
            .borrow_mut()
            .insert(source.into(), Rc::new(expr));
    }

    /// Register a named handler resolvable through string values in bulk
    /// event maps.
    pub fn register_handler(&self, name: impl Into<String>, handler: impl Fn(&Value) + 'static) {
        self.state
            .handlers
            .borrow_mut()
            .insert(name.into(), Rc::new(handler));
    }

    /// Make compilation of `source` fail.
    pub fn fail_compile(&self, source: impl Into<String>) {
        self.state.failing.borrow_mut().insert(source.into());
    }

    /// Exceptions reported so far, in order.
    #[must_use]
    pub fn reported(&self) -> Vec<BindError> {
        self.state.reported.borrow().clone()
    }

    /// Drain the reported exceptions.
    pub fn take_reported(&self) -> Vec<BindError> {
        self.state.reported.take()
    }

    fn compile_source(&self, source: &str) -> Result<CompiledExpr<Self>, HostError> {
        if self.state.failing.borrow().contains(source) {
            return Err(HostError::new(format!("cannot compile `{source}`")));
        }
        if let Some(expr) = self.state.exprs.borrow().get(source) {
            return Ok(Rc::clone(expr));
        }
        if let Ok(literal) = serde_json::from_str::<Value>(source) {
            return Ok(Rc::new(move |_: &ModelScope, _: Option<&Value>| {
                Ok(literal.clone())
            }));
        }
        if is_path(source) {
            let path = source.to_string();
            return Ok(Rc::new(move |scope: &ModelScope, local: Option<&Value>| {
                Ok(read_path(scope, local, &path))
            }));
        }
        Err(HostError::new(format!(
            "cannot compile expression `{source}`"
        )))
    }
}

impl Default for ModelHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModelHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHost")
            .field("exprs", &self.state.exprs.borrow().len())
            .field("handlers", &self.state.handlers.borrow().len())
            .field("reported", &self.state.reported.borrow().len())
            .finish()
    }
}

fn is_ident(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_path(source: &str) -> bool {
    !source.is_empty() && source.split('.').all(is_ident)
}

/// Dotted-path read; the `$event` root resolves to the event local. Absent
/// segments read as `null`.
fn read_path(scope: &ModelScope, local: Option<&Value>, path: &str) -> Value {
    let mut segments = path.split('.');
    let root = match segments.next() {
        Some(root) => root,
        None => return Value::Null,
    };
    let mut current = if root == "$event" {
        local.cloned().unwrap_or(Value::Null)
    } else {
        scope.get(root).unwrap_or(Value::Null)
    };
    for segment in segments {
        current = current.get(segment).cloned().unwrap_or(Value::Null);
    }
    current
}

impl HostBackend for ModelHost {
    type Value = Value;
    type Scope = ModelScope;
    type Element = ModelElement;

    fn compile(&self, source: &str) -> Result<CompiledExpr<Self>, HostError> {
        self.compile_source(source)
    }

    fn watch(
        &self,
        scope: &ModelScope,
        evaluator: WatchEvaluator<Self>,
        on_change: ChangeListener<Self>,
        deep: bool,
    ) -> WatchGuard {
        scope.watch(evaluator, on_change, deep)
    }

    fn attributes(&self, element: &ModelElement) -> Vec<RawAttribute> {
        element.attributes()
    }

    fn property(&self, element: &ModelElement, name: &str) -> Option<Value> {
        element.property(name)
    }

    fn set_property(&self, element: &ModelElement, name: &str, value: Value) {
        element.set_property(name, value);
    }

    fn listen(
        &self,
        element: &ModelElement,
        name: &str,
        handler: EventHandler<Self>,
    ) -> ListenerGuard {
        element.listen(name, handler)
    }

    fn on_destroy(&self, element: &ModelElement, callback: DestroyHook) {
        element.on_destroy(callback);
    }

    fn report_exception(&self, error: BindError) {
        tracing::debug!(error = %error, "exception reported");
        self.state.reported.borrow_mut().push(error);
    }

    fn propagation_in_progress(&self, scope: &ModelScope) -> bool {
        scope.in_progress()
    }

    fn apply(&self, scope: &ModelScope, work: ApplyWork) {
        scope.apply(work);
    }

    fn entries(&self, value: &Value) -> Option<Vec<(String, Value)>> {
        value
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn listener_from_value(
        &self,
        _scope: &ModelScope,
        value: &Value,
    ) -> Option<EventHandler<Self>> {
        value
            .as_str()
            .and_then(|name| self.state.handlers.borrow().get(name).cloned())
    }
}
