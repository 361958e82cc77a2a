#![forbid(unsafe_code)]

//! The binding controller: compile and link lifecycle for one element.
//!
//! This module provides:
//!
//! - [`BindingSet`]: the compile product — classified, compiled bindings of
//!   one template node, shareable across element instances
//! - [`BindingSession`]: the link product — per-instance disposer handles
//!   with exactly-once teardown
//! - [`ElementBinder`]: the entry point composing both steps for hosts with
//!   a single-stage lifecycle, plus the deferred-target variant
//!
//! Split pre/post linking for hosts that stage their lifecycle is in
//! [`crate::directive`].
//!
//! # Architecture
//!
//! The controller is generic over [`HostBackend`] and owns no host state:
//! scopes, elements, and values only pass through. All per-instance state
//! lives in the session; everything compiled is immutable and shared.
//!
//! Lifecycle: attribute scan → classify → compile → initial apply → register
//! observers (properties) and listeners (events) → teardown on the element's
//! destruction signal.

pub mod session;
pub mod set;

pub use session::BindingSession;
pub use set::{Binding, BindingSet};

use std::rc::Rc;

use ngce_core::error::BindError;
use ngce_core::host::{HostBackend, RawAttribute};

use crate::deferred::DeferredBinding;
use session::SessionCore;

// ---------------------------------------------------------------------------
// BinderOptions
// ---------------------------------------------------------------------------

/// Link-time configuration knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderOptions {
    /// Bind onto the element carrying the attributes (`true`, the default),
    /// or defer the property/event phases until a separately inserted target
    /// element is attached (`false`). See [`DeferredBinding`].
    pub targets_own_element: bool,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            targets_own_element: true,
        }
    }
}

// ---------------------------------------------------------------------------
// ElementBinder
// ---------------------------------------------------------------------------

/// Compiles and links bindings against one host backend.
///
/// Cheap to clone; carries only the backend handle.
pub struct ElementBinder<B: HostBackend> {
    backend: B,
}

impl<B: HostBackend> ElementBinder<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The backend this binder drives.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Scan `element`'s attributes and compile every recognized binding.
    pub fn compile(&self, element: &B::Element) -> Result<BindingSet<B>, BindError> {
        let attributes = self.backend.attributes(element);
        BindingSet::compile(&self.backend, &attributes)
    }

    /// Compile from an attribute table the host already collected.
    pub fn compile_attributes(
        &self,
        attributes: &[RawAttribute],
    ) -> Result<BindingSet<B>, BindError> {
        BindingSet::compile(&self.backend, attributes)
    }

    /// Link a compiled set onto `element`: property phase, destruction hook,
    /// event phase, in that order.
    pub fn link(
        &self,
        scope: &B::Scope,
        element: &B::Element,
        set: &BindingSet<B>,
    ) -> Result<BindingSession<B>, BindError> {
        let core = SessionCore::new(self.backend.clone());
        session::apply_properties(&core, scope, element, set)?;
        core.install_destroy_hook(element);
        session::attach_events(&core, scope, element, set)?;
        Ok(BindingSession::from_core(core))
    }

    /// Link variant for a target element that arrives later: teardown hooks
    /// onto `owner`'s destruction now, the property and event phases run
    /// when [`DeferredBinding::attach`] receives the target.
    pub fn link_deferred(
        &self,
        scope: &B::Scope,
        owner: &B::Element,
        set: Rc<BindingSet<B>>,
    ) -> DeferredBinding<B> {
        let core = SessionCore::new(self.backend.clone());
        core.install_destroy_hook(owner);
        DeferredBinding::new(core, scope.clone(), set)
    }

    /// Compile and link in one step.
    pub fn bind(
        &self,
        scope: &B::Scope,
        element: &B::Element,
    ) -> Result<BindingSession<B>, BindError> {
        let set = self.compile(element)?;
        self.link(scope, element, &set)
    }
}

impl<B: HostBackend> Clone for ElementBinder<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}

impl<B: HostBackend> std::fmt::Debug for ElementBinder<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementBinder").finish()
    }
}
