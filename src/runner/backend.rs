//! The contract between the interpreter and execution strategies.

use crate::error::Result;
use crate::graph::Component;
use crate::value::{Inputs, Value};

/// Runs leaf components on behalf of the [`Interpreter`](super::Interpreter).
///
/// `run_component` is called exactly once per executed component, with its
/// inputs already resolved. The returned value is checked against the
/// component's declared return type by the interpreter; record results may be
/// returned positionally and are relabeled there.
///
/// Failures should be reported as [`GraphError::BackendExecution`](crate::GraphError::BackendExecution).
/// They abort the run without retry.
pub trait Backend {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Run one component with its resolved inputs.
    fn run_component(&mut self, component: &Component, inputs: &Inputs) -> Result<Value>;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run_component(&mut self, component: &Component, inputs: &Inputs) -> Result<Value> {
        (**self).run_component(component, inputs)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run_component(&mut self, component: &Component, inputs: &Inputs) -> Result<Value> {
        (**self).run_component(component, inputs)
    }
}
