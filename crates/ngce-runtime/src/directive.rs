#![forbid(unsafe_code)]

//! Registrable-unit facade over the binding controller.
//!
//! Hosts that organize behavior into named, prioritized directives register
//! one [`CustomElementDirective`] and drive it through the staged lifecycle:
//! compile once per template node, then pre-link and post-link once per
//! element instance. The stages are enforced by construction: a
//! [`PreLinked`] handle is the only way to reach
//! [`post_link`](PreLinked::post_link), so the property phase always
//! completes before the event phase.
//!
//! Hosts with a single-stage lifecycle can skip this module and use
//! [`ElementBinder::link`](crate::binder::ElementBinder::link) directly.
//!
//! # Invariants
//!
//! 1. The declared priority (100) exceeds the host default (0): normalized
//!    attribute names are established before normal-priority collaborators
//!    inspect the attribute table.
//! 2. One compile, many links: the compiled [`BindingSet`] is shared
//!    immutably across every instance pre-linked from it.

use std::rc::Rc;

use ngce_core::error::BindError;
use ngce_core::host::{HostBackend, RawAttribute};

use crate::binder::session::{self, BindingSession, SessionCore};
use crate::binder::set::BindingSet;
use crate::binder::{BinderOptions, ElementBinder};
use crate::deferred::DeferredBinding;

/// Name the directive registers under.
pub const DIRECTIVE_NAME: &str = "ngCustomElement";

/// Priority this directive declares.
pub const BINDING_PRIORITY: i32 = 100;

/// Priority the host assigns to units that do not declare one.
pub const HOST_DEFAULT_PRIORITY: i32 = 0;

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Registration metadata the host consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveDescriptor {
    pub name: &'static str,
    pub priority: i32,
}

// ---------------------------------------------------------------------------
// CustomElementDirective
// ---------------------------------------------------------------------------

/// The registrable unit: binds declared properties and events of a custom
/// element to host expressions.
pub struct CustomElementDirective<B: HostBackend> {
    binder: ElementBinder<B>,
    options: BinderOptions,
}

impl<B: HostBackend> CustomElementDirective<B> {
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, BinderOptions::default())
    }

    pub fn with_options(backend: B, options: BinderOptions) -> Self {
        Self {
            binder: ElementBinder::new(backend),
            options,
        }
    }

    /// Metadata for the host's registry.
    #[must_use]
    pub fn descriptor(&self) -> DirectiveDescriptor {
        DirectiveDescriptor {
            name: DIRECTIVE_NAME,
            priority: BINDING_PRIORITY,
        }
    }

    /// Compile hook: classify and compile the raw attribute table once per
    /// template node.
    pub fn compile(&self, attributes: &[RawAttribute]) -> Result<CompiledDirective<B>, BindError> {
        let set = Rc::new(self.binder.compile_attributes(attributes)?);
        Ok(CompiledDirective {
            binder: self.binder.clone(),
            options: self.options,
            set,
        })
    }
}

impl<B: HostBackend> std::fmt::Debug for CustomElementDirective<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomElementDirective")
            .field("options", &self.options)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// CompiledDirective — one template node, many instances
// ---------------------------------------------------------------------------

/// The compile product. Each element instance stamped from the template node
/// gets its own [`pre_link`](Self::pre_link).
pub struct CompiledDirective<B: HostBackend> {
    binder: ElementBinder<B>,
    options: BinderOptions,
    set: Rc<BindingSet<B>>,
}

impl<B: HostBackend> CompiledDirective<B> {
    /// The shared compiled bindings.
    #[must_use]
    pub fn binding_set(&self) -> &BindingSet<B> {
        &self.set
    }

    /// Property phase. With `targets_own_element` unset, the phases are
    /// deferred instead and `element` only anchors teardown.
    pub fn pre_link(
        &self,
        scope: &B::Scope,
        element: &B::Element,
    ) -> Result<PreLinked<B>, BindError> {
        if self.options.targets_own_element {
            let core = SessionCore::new(self.binder.backend().clone());
            session::apply_properties(&core, scope, element, &self.set)?;
            core.install_destroy_hook(element);
            Ok(PreLinked {
                inner: PreLinkedInner::Own {
                    core,
                    scope: scope.clone(),
                    element: element.clone(),
                    set: Rc::clone(&self.set),
                },
            })
        } else {
            let deferred = self.binder.link_deferred(scope, element, Rc::clone(&self.set));
            Ok(PreLinked {
                inner: PreLinkedInner::Deferred(deferred),
            })
        }
    }
}

impl<B: HostBackend> std::fmt::Debug for CompiledDirective<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledDirective")
            .field("options", &self.options)
            .field("bindings", &self.set.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// PreLinked → LinkOutcome
// ---------------------------------------------------------------------------

/// Proof that the property phase ran. Consumed by
/// [`post_link`](Self::post_link).
pub struct PreLinked<B: HostBackend> {
    inner: PreLinkedInner<B>,
}

enum PreLinkedInner<B: HostBackend> {
    Own {
        core: Rc<SessionCore<B>>,
        scope: B::Scope,
        element: B::Element,
        set: Rc<BindingSet<B>>,
    },
    Deferred(DeferredBinding<B>),
}

impl<B: HostBackend> PreLinked<B> {
    /// Event phase. For a deferred target this hands back the pending
    /// binding instead; its phases run at
    /// [`attach`](DeferredBinding::attach).
    pub fn post_link(self) -> Result<LinkOutcome<B>, BindError> {
        match self.inner {
            PreLinkedInner::Own {
                core,
                scope,
                element,
                set,
            } => {
                session::attach_events(&core, &scope, &element, &set)?;
                Ok(LinkOutcome::Bound(BindingSession::from_core(core)))
            }
            PreLinkedInner::Deferred(deferred) => Ok(LinkOutcome::Deferred(deferred)),
        }
    }
}

impl<B: HostBackend> std::fmt::Debug for PreLinked<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match &self.inner {
            PreLinkedInner::Own { .. } => "own-element",
            PreLinkedInner::Deferred(_) => "deferred",
        };
        f.debug_struct("PreLinked").field("target", &stage).finish()
    }
}

/// What a completed link produced.
#[must_use]
pub enum LinkOutcome<B: HostBackend> {
    /// The element was bound immediately; the session is live.
    Bound(BindingSession<B>),
    /// The target element is still pending; attach it to go live.
    Deferred(DeferredBinding<B>),
}

impl<B: HostBackend> LinkOutcome<B> {
    /// The live session, if the link bound immediately.
    #[must_use]
    pub fn into_session(self) -> Option<BindingSession<B>> {
        match self {
            Self::Bound(session) => Some(session),
            Self::Deferred(_) => None,
        }
    }

    /// The pending binding, if the link deferred.
    #[must_use]
    pub fn into_deferred(self) -> Option<DeferredBinding<B>> {
        match self {
            Self::Bound(_) => None,
            Self::Deferred(deferred) => Some(deferred),
        }
    }
}

impl<B: HostBackend> std::fmt::Debug for LinkOutcome<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bound(session) => f.debug_tuple("Bound").field(session).finish(),
            Self::Deferred(deferred) => f.debug_tuple("Deferred").field(deferred).finish(),
        }
    }
}
