#![forbid(unsafe_code)]

//! Compiled binding collections.
//!
//! [`BindingSet::compile`] is the compile half of the binding lifecycle: it
//! scans an element's raw attributes, classifies each name, and compiles the
//! recognized ones into [`Binding`]s grouped by kind. The set is immutable
//! after compilation and may be shared (via `Rc`) across every element
//! instance stamped from the same template node; only sessions hold
//! per-instance state.
//!
//! # Invariants
//!
//! 1. Attributes that fail to classify are skipped, never consumed — they
//!    stay visible to other attribute-table consumers under their original
//!    name.
//! 2. Declaration order is preserved within each binding group.
//! 3. A property binding whose canonical name is a DOM event-handler
//!    property (`on` + letters) fails compilation; no such binding is ever
//!    recorded.

use std::rc::Rc;

use ngce_core::attr::{self, BindingKind};
use ngce_core::error::BindError;
use ngce_core::host::{CompiledExpr, HostBackend, RawAttribute};

// ---------------------------------------------------------------------------
// Binding — one compiled attribute
// ---------------------------------------------------------------------------

/// One recognized attribute, compiled: the canonical target name plus the
/// compiled expression, with the raw attribute name kept for diagnostics.
pub struct Binding<B: HostBackend> {
    attribute: String,
    name: String,
    expr: CompiledExpr<B>,
}

impl<B: HostBackend> Binding<B> {
    /// The raw attribute name as authored.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The canonical target name (camelCase property or kebab-case event;
    /// empty for bulk forms).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compiled expression, shared with every session linked from this
    /// set.
    #[must_use]
    pub fn expr(&self) -> &CompiledExpr<B> {
        &self.expr
    }
}

impl<B: HostBackend> Clone for Binding<B> {
    fn clone(&self) -> Self {
        Self {
            attribute: self.attribute.clone(),
            name: self.name.clone(),
            expr: Rc::clone(&self.expr),
        }
    }
}

impl<B: HostBackend> std::fmt::Debug for Binding<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("attribute", &self.attribute)
            .field("name", &self.name)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// BindingSet — everything compiled off one attribute table
// ---------------------------------------------------------------------------

/// The compiled bindings of one template node, grouped by kind.
pub struct BindingSet<B: HostBackend> {
    properties: Vec<Binding<B>>,
    events: Vec<Binding<B>>,
    bulk_properties: Vec<Binding<B>>,
    bulk_events: Vec<Binding<B>>,
}

impl<B: HostBackend> BindingSet<B> {
    /// Classify and compile every recognized attribute.
    ///
    /// Fails fast on the first disallowed property name or expression that
    /// the backend refuses to compile; unrecognized attributes are ignored.
    pub fn compile(backend: &B, attributes: &[RawAttribute]) -> Result<Self, BindError> {
        let mut set = Self {
            properties: Vec::new(),
            events: Vec::new(),
            bulk_properties: Vec::new(),
            bulk_events: Vec::new(),
        };

        for raw in attributes {
            let Some(target) = attr::classify(&raw.name) else {
                continue;
            };
            if target.kind == BindingKind::Property && attr::is_dom_event_property(&target.name) {
                return Err(BindError::DisallowedProperty {
                    attribute: raw.name.clone(),
                    property: target.name,
                });
            }
            let expr = backend
                .compile(&raw.value)
                .map_err(|source| BindError::Compile {
                    attribute: raw.name.clone(),
                    source,
                })?;
            let binding = Binding {
                attribute: raw.name.clone(),
                name: target.name,
                expr,
            };
            match target.kind {
                BindingKind::Property => set.properties.push(binding),
                BindingKind::Event => set.events.push(binding),
                BindingKind::BulkProperties => set.bulk_properties.push(binding),
                BindingKind::BulkEvents => set.bulk_events.push(binding),
            }
        }

        tracing::debug!(
            properties = set.properties.len(),
            events = set.events.len(),
            bulk_properties = set.bulk_properties.len(),
            bulk_events = set.bulk_events.len(),
            "compiled binding set"
        );
        Ok(set)
    }

    /// Property bindings in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[Binding<B>] {
        &self.properties
    }

    /// Event bindings in declaration order.
    #[must_use]
    pub fn events(&self) -> &[Binding<B>] {
        &self.events
    }

    /// Whole-map property bindings in declaration order.
    #[must_use]
    pub fn bulk_properties(&self) -> &[Binding<B>] {
        &self.bulk_properties
    }

    /// Whole-map event bindings in declaration order.
    #[must_use]
    pub fn bulk_events(&self) -> &[Binding<B>] {
        &self.bulk_events
    }

    /// True when no attribute classified as a binding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.events.is_empty()
            && self.bulk_properties.is_empty()
            && self.bulk_events.is_empty()
    }

    /// Total number of compiled bindings across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
            + self.events.len()
            + self.bulk_properties.len()
            + self.bulk_events.len()
    }
}

impl<B: HostBackend> Clone for BindingSet<B> {
    fn clone(&self) -> Self {
        Self {
            properties: self.properties.clone(),
            events: self.events.clone(),
            bulk_properties: self.bulk_properties.clone(),
            bulk_events: self.bulk_events.clone(),
        }
    }
}

impl<B: HostBackend> std::fmt::Debug for BindingSet<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingSet")
            .field("properties", &self.properties)
            .field("events", &self.events)
            .field("bulk_properties", &self.bulk_properties)
            .field("bulk_events", &self.bulk_events)
            .finish()
    }
}
