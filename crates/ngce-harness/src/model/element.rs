#![forbid(unsafe_code)]

//! In-memory element with attributes, properties, listeners, and a
//! destruction lifecycle.
//!
//! [`ModelElement`] stands in for a DOM element wrapper: an ordered raw
//! attribute table, a property bag, named event listeners, one-shot destroy
//! hooks, and child elements that get destroyed when their parent does.
//!
//! # Invariants
//!
//! 1. Attribute declaration order is preserved; re-setting an existing
//!    attribute replaces its value in place.
//! 2. Destroy hooks fire exactly once, on the first `destroy` call; the
//!    element's own hooks run before its children are destroyed.
//! 3. A hook registered after destruction runs immediately.
//! 4. `fire` delivers to a snapshot of listeners — a handler detaching a
//!    sibling mid-dispatch suppresses that sibling.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use ngce_core::host::{DestroyHook, ListenerGuard, RawAttribute};
use serde_json::Value;

/// Handler signature listeners attach with.
pub type ElementHandler = Rc<dyn Fn(&Value)>;

struct ListenerSlot {
    id: u64,
    event: String,
    handler: ElementHandler,
    active: Cell<bool>,
}

struct ElementState {
    tag: String,
    attributes: RefCell<Vec<RawAttribute>>,
    properties: RefCell<BTreeMap<String, Value>>,
    listeners: RefCell<Vec<Rc<ListenerSlot>>>,
    next_listener_id: Cell<u64>,
    destroy_hooks: RefCell<Vec<DestroyHook>>,
    destroyed: Cell<bool>,
    children: RefCell<Vec<ModelElement>>,
}

/// Shared handle to one model element. Clones share state.
#[derive(Clone)]
pub struct ModelElement {
    state: Rc<ElementState>,
}

impl ModelElement {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            state: Rc::new(ElementState {
                tag: tag.into(),
                attributes: RefCell::new(Vec::new()),
                properties: RefCell::new(BTreeMap::new()),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
                destroy_hooks: RefCell::new(Vec::new()),
                destroyed: Cell::new(false),
                children: RefCell::new(Vec::new()),
            }),
        }
    }

    /// The element's tag name.
    #[must_use]
    pub fn tag(&self) -> String {
        self.state.tag.clone()
    }

    // -- attributes ---------------------------------------------------------

    /// Declare an attribute. Replaces the value of an existing name,
    /// otherwise appends in declaration order.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let mut attributes = self.state.attributes.borrow_mut();
        if let Some(existing) = attributes.iter_mut().find(|a| a.name == name) {
            existing.value = value;
        } else {
            attributes.push(RawAttribute::new(name, value));
        }
    }

    /// The attribute table in declaration order.
    #[must_use]
    pub fn attributes(&self) -> Vec<RawAttribute> {
        self.state.attributes.borrow().clone()
    }

    /// One attribute's raw value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.state
            .attributes
            .borrow()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.clone())
    }

    // -- properties ---------------------------------------------------------

    #[must_use]
    pub fn property(&self, name: &str) -> Option<Value> {
        self.state.properties.borrow().get(name).cloned()
    }

    pub fn set_property(&self, name: impl Into<String>, value: Value) {
        self.state.properties.borrow_mut().insert(name.into(), value);
    }

    /// Number of properties ever assigned. Zero means untouched.
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.state.properties.borrow().len()
    }

    // -- listeners ----------------------------------------------------------

    /// Attach a listener under `event`. The guard detaches it.
    pub fn listen(&self, event: impl Into<String>, handler: ElementHandler) -> ListenerGuard {
        let id = self.state.next_listener_id.get();
        self.state.next_listener_id.set(id + 1);
        self.state.listeners.borrow_mut().push(Rc::new(ListenerSlot {
            id,
            event: event.into(),
            handler,
            active: Cell::new(true),
        }));

        let state = Rc::clone(&self.state);
        ListenerGuard::new(move || {
            let mut listeners = state.listeners.borrow_mut();
            if let Some(pos) = listeners.iter().position(|l| l.id == id) {
                listeners[pos].active.set(false);
                listeners.remove(pos);
            }
            Ok(())
        })
    }

    /// Deliver a native event. Returns how many listeners ran.
    pub fn fire(&self, event: &str, payload: &Value) -> usize {
        let listeners: Vec<Rc<ListenerSlot>> = self.state.listeners.borrow().clone();
        let mut delivered = 0;
        for listener in listeners {
            if listener.active.get() && listener.event == event {
                (listener.handler)(payload);
                delivered += 1;
            }
        }
        delivered
    }

    /// Listeners currently attached under `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.state
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event == event)
            .count()
    }

    /// Listeners currently attached, any event.
    #[must_use]
    pub fn listener_total(&self) -> usize {
        self.state.listeners.borrow().len()
    }

    // -- lifecycle ----------------------------------------------------------

    /// Register a one-shot destruction callback. Runs immediately if the
    /// element is already destroyed.
    pub fn on_destroy(&self, callback: DestroyHook) {
        if self.state.destroyed.get() {
            callback();
        } else {
            self.state.destroy_hooks.borrow_mut().push(callback);
        }
    }

    /// Remove the element from the live context: fire its destroy hooks,
    /// then destroy its children. Idempotent.
    pub fn destroy(&self) {
        if self.state.destroyed.replace(true) {
            return;
        }
        let hooks = self.state.destroy_hooks.take();
        for hook in hooks {
            hook();
        }
        let children: Vec<ModelElement> = self.state.children.borrow().clone();
        for child in children {
            child.destroy();
        }
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state.destroyed.get()
    }

    /// Nest `child` under this element so destruction cascades.
    pub fn add_child(&self, child: &ModelElement) {
        self.state.children.borrow_mut().push(child.clone());
    }
}

impl fmt::Debug for ModelElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelElement")
            .field("tag", &self.state.tag)
            .field("attributes", &self.state.attributes.borrow().len())
            .field("properties", &self.property_count())
            .field("listeners", &self.listener_total())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attributes_keep_declaration_order() {
        let el = ModelElement::new("custom-widget");
        el.set_attribute("ngce-prop-b", "two");
        el.set_attribute("class", "x");
        el.set_attribute("ngce-prop-a", "one");

        let names: Vec<String> = el.attributes().into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["ngce-prop-b", "class", "ngce-prop-a"]);
    }

    #[test]
    fn resetting_an_attribute_replaces_in_place() {
        let el = ModelElement::new("custom-widget");
        el.set_attribute("ngce-prop-a", "one");
        el.set_attribute("class", "x");
        el.set_attribute("ngce-prop-a", "replaced");

        assert_eq!(el.attribute("ngce-prop-a"), Some("replaced".to_string()));
        let names: Vec<String> = el.attributes().into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["ngce-prop-a", "class"]);
    }

    #[test]
    fn property_roundtrip() {
        let el = ModelElement::new("custom-widget");
        assert_eq!(el.property("disabled"), None);
        el.set_property("disabled", json!(true));
        assert_eq!(el.property("disabled"), Some(json!(true)));
        assert_eq!(el.property_count(), 1);
    }

    #[test]
    fn fire_reaches_matching_listeners_only() {
        let el = ModelElement::new("custom-widget");
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        let _a = el.listen("foo", Rc::new(move |_: &Value| sink.set(sink.get() + 1)));
        let _b = el.listen("bar", Rc::new(|_: &Value| {}));

        assert_eq!(el.fire("foo", &json!({})), 1);
        assert_eq!(el.fire("baz", &json!({})), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_guard_detaches() {
        let el = ModelElement::new("custom-widget");
        let mut guard = el.listen("foo", Rc::new(|_: &Value| {}));
        assert_eq!(el.listener_count("foo"), 1);
        guard.detach().unwrap();
        assert_eq!(el.listener_count("foo"), 0);
        assert_eq!(el.fire("foo", &json!(null)), 0);
    }

    #[test]
    fn handler_receives_the_payload() {
        let el = ModelElement::new("custom-widget");
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let _guard = el.listen(
            "change",
            Rc::new(move |payload: &Value| *sink.borrow_mut() = Some(payload.clone())),
        );
        el.fire("change", &json!({"detail": 7}));
        assert_eq!(*seen.borrow(), Some(json!({"detail": 7})));
    }

    #[test]
    fn destroy_fires_hooks_once() {
        let el = ModelElement::new("custom-widget");
        let calls = Rc::new(Cell::new(0));
        let sink = Rc::clone(&calls);
        el.on_destroy(Box::new(move || sink.set(sink.get() + 1)));

        el.destroy();
        el.destroy();
        assert_eq!(calls.get(), 1);
        assert!(el.is_destroyed());
    }

    #[test]
    fn hook_after_destroy_runs_immediately() {
        let el = ModelElement::new("custom-widget");
        el.destroy();
        let called = Rc::new(Cell::new(false));
        let sink = Rc::clone(&called);
        el.on_destroy(Box::new(move || sink.set(true)));
        assert!(called.get());
    }

    #[test]
    fn destroy_cascades_to_children() {
        let parent = ModelElement::new("section");
        let child = ModelElement::new("custom-widget");
        parent.add_child(&child);

        let calls = Rc::new(Cell::new(0));
        let sink = Rc::clone(&calls);
        child.on_destroy(Box::new(move || sink.set(sink.get() + 1)));

        parent.destroy();
        assert!(child.is_destroyed());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn detaching_a_sibling_mid_dispatch_suppresses_it() {
        let el = ModelElement::new("custom-widget");
        let slot: Rc<RefCell<Option<ListenerGuard>>> = Rc::new(RefCell::new(None));
        let killer = Rc::clone(&slot);
        let _first = el.listen(
            "foo",
            Rc::new(move |_: &Value| {
                if let Some(mut guard) = killer.borrow_mut().take() {
                    guard.detach().unwrap();
                }
            }),
        );
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        let second = el.listen("foo", Rc::new(move |_: &Value| sink.set(sink.get() + 1)));
        *slot.borrow_mut() = Some(second);

        assert_eq!(el.fire("foo", &json!(null)), 1);
        assert_eq!(hits.get(), 0);
    }
}
