#![forbid(unsafe_code)]

//! Deferred binding onto an asynchronously inserted target element.
//!
//! Some hosts stamp out the element that actually carries the bound
//! properties at a later lifecycle stage than the element that declared the
//! bindings. [`DeferredBinding`] covers that shape: compilation and the
//! owner-destruction teardown hook are established up front, while the
//! property and event phases wait for [`attach`](DeferredBinding::attach) to
//! deliver the target.
//!
//! # Invariants
//!
//! 1. Nothing touches any element before `attach`.
//! 2. `attach` runs the full property-then-event ordering on the target,
//!    exactly as an immediate link would.
//! 3. `attach` succeeds at most once; a second call, or a call after the
//!    owner was destroyed, fails with a session-state error.
//! 4. Owner destruction before `attach` is an empty teardown — the target
//!    stays untouched.

use std::cell::Cell;
use std::rc::Rc;

use ngce_core::error::BindError;
use ngce_core::host::HostBackend;

use crate::binder::session::{self, BindingSession, SessionCore};
use crate::binder::set::BindingSet;

/// A link waiting for its target element.
///
/// Created by [`ElementBinder::link_deferred`](crate::binder::ElementBinder::link_deferred)
/// or a directive compiled with `targets_own_element = false`. Teardown is
/// already wired to the owner element's destruction signal.
pub struct DeferredBinding<B: HostBackend> {
    core: Rc<SessionCore<B>>,
    scope: B::Scope,
    set: Rc<BindingSet<B>>,
    attached: Cell<bool>,
}

impl<B: HostBackend> DeferredBinding<B> {
    pub(crate) fn new(core: Rc<SessionCore<B>>, scope: B::Scope, set: Rc<BindingSet<B>>) -> Self {
        Self {
            core,
            scope,
            set,
            attached: Cell::new(false),
        }
    }

    /// Run the property and event phases against the now-available target.
    ///
    /// Returns the live session on success. Fails with
    /// [`BindError::SessionState`] when the owner was already destroyed or
    /// the binding was already attached; fails like an immediate link when a
    /// phase fails, tearing down whatever was established.
    pub fn attach(&self, target: &B::Element) -> Result<BindingSession<B>, BindError> {
        if self.core.is_disposed() {
            return Err(BindError::SessionState {
                detail: "attach requested after the owner element was destroyed".to_string(),
            });
        }
        if self.attached.replace(true) {
            return Err(BindError::SessionState {
                detail: "deferred binding attached twice".to_string(),
            });
        }
        tracing::debug!(bindings = self.set.len(), "attaching deferred binding");
        session::apply_properties(&self.core, &self.scope, target, &self.set)?;
        session::attach_events(&self.core, &self.scope, target, &self.set)?;
        Ok(BindingSession::from_core(Rc::clone(&self.core)))
    }

    /// Whether `attach` has been consumed.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// Whether the owner's destruction (or a manual dispose of the attached
    /// session) already tore the binding down.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }
}

impl<B: HostBackend> std::fmt::Debug for DeferredBinding<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredBinding")
            .field("attached", &self.is_attached())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
