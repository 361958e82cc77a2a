#![forbid(unsafe_code)]

//! Ready-made host/scope/element bundles for lifecycle tests.

use ngce_core::error::BindError;
use ngce_runtime::{BindingSession, ElementBinder};
use serde_json::Value;

use crate::model::{ModelElement, ModelHost, ModelScope};

/// One backend, one scope, one element — the usual test setup.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub host: ModelHost,
    pub scope: ModelScope,
    pub element: ModelElement,
}

impl Fixture {
    /// A fresh fixture around a `custom-widget` element.
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: ModelHost::new(),
            scope: ModelScope::new(),
            element: ModelElement::new("custom-widget"),
        }
    }

    /// A fixture whose element already declares `attributes`.
    #[must_use]
    pub fn with_attributes(attributes: &[(&str, &str)]) -> Self {
        let fixture = Self::new();
        for (name, value) in attributes {
            fixture.element.set_attribute(*name, *value);
        }
        fixture
    }

    /// A binder over this fixture's backend.
    #[must_use]
    pub fn binder(&self) -> ElementBinder<ModelHost> {
        ElementBinder::new(self.host.clone())
    }

    /// Compile and link the fixture's element in one step.
    pub fn bind(&self) -> Result<BindingSession<ModelHost>, BindError> {
        self.binder().bind(&self.scope, &self.element)
    }

    /// Shorthand for `scope.set`.
    pub fn set(&self, key: &str, value: Value) {
        self.scope.set(key, value);
    }

    /// Shorthand for `scope.digest`.
    pub fn digest(&self) {
        self.scope.digest();
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
