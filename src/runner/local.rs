//! In-process execution.

use crate::error::{GraphError, Result};
use crate::graph::Component;
use crate::value::{Inputs, Value};

use super::backend::Backend;

/// Runs component bodies directly in the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    fn run_component(&mut self, component: &Component, inputs: &Inputs) -> Result<Value> {
        if !component.has_body() {
            return Err(GraphError::backend(
                component.name(),
                "no in-process body is defined",
            ));
        }
        component
            .invoke(inputs)
            .map_err(|e| GraphError::backend(component.name(), format!("{:#}", e)))
    }
}
