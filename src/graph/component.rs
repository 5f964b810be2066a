//! Component definitions and the leaf nodes they produce.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{GraphError, Result};
use crate::expr::Expr;
use crate::graph::deployment::{Deployment, Hardware};
use crate::value::{Inputs, Value, ValueType};

/// The computation behind a component.
pub type ComponentFn = Arc<dyn Fn(&Inputs) -> anyhow::Result<Value> + Send + Sync>;

/// A declared component parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: ValueType,
    pub default: Option<Value>,
}

/// Definition of a component.
///
/// Invoking a definition through [`Tracer::call`](crate::graph::Tracer::call)
/// does not run the body. It records a [`Component`] node instead.
#[derive(Clone)]
pub struct ComponentDef {
    function: String,
    name: Option<String>,
    params: Vec<Param>,
    returns: Option<ValueType>,
    deployment: Deployment,
    body: Option<ComponentFn>,
}

impl ComponentDef {
    /// Start a definition. `function` is the base of generated node names.
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            name: None,
            params: Vec::new(),
            returns: None,
            deployment: Deployment::default(),
            body: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty,
            default: None,
        });
        self
    }

    /// Declare a parameter with a default used when the argument is omitted.
    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        ty: ValueType,
        default: impl Into<Value>,
    ) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty,
            default: Some(default.into()),
        });
        self
    }

    pub fn returns(mut self, ty: ValueType) -> Self {
        self.returns = Some(ty);
        self
    }

    /// Use a fixed node name instead of a generated one.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn base_image(mut self, image: impl Into<String>) -> Self {
        self.deployment.base_image = Some(image.into());
        self
    }

    pub fn packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deployment.packages = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn hardware(mut self, hardware: Hardware) -> Self {
        self.deployment.hardware = hardware;
        self
    }

    /// Program and leading arguments for the process backend.
    pub fn command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deployment.command = command.into_iter().map(Into::into).collect();
        self
    }

    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&Inputs) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn return_type(&self) -> Option<&ValueType> {
        self.returns.as_ref()
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub(crate) fn body_fn(&self) -> Option<ComponentFn> {
        self.body.clone()
    }
}

impl fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDef")
            .field("function", &self.function)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("deployment", &self.deployment)
            .finish_non_exhaustive()
    }
}

/// A leaf node in a traced pipeline.
pub struct Component {
    pub(crate) name: String,
    pub(crate) function: String,
    pub(crate) inputs: IndexMap<String, Expr>,
    pub(crate) return_type: ValueType,
    pub(crate) deployment: Deployment,
    pub(crate) body: Option<ComponentFn>,
}

impl Component {
    /// Unique name within the enclosing pipeline.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the definition or operator this node was built from.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Input expressions in parameter declaration order.
    pub fn inputs(&self) -> &IndexMap<String, Expr> {
        &self.inputs
    }

    pub fn return_type(&self) -> &ValueType {
        &self.return_type
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// True if the node can run in-process.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Run the body with resolved inputs.
    pub fn invoke(&self, inputs: &Inputs) -> anyhow::Result<Value> {
        match &self.body {
            Some(body) => body(inputs),
            None => anyhow::bail!("component has no in-process body"),
        }
    }

    /// Lazy reference to a named output field.
    pub fn field(self: &Arc<Self>, name: impl Into<String>) -> Expr {
        Expr::from(self).field(name)
    }

    /// Lazy reference to an output by position.
    pub fn index(self: &Arc<Self>, index: usize) -> Expr {
        Expr::from(self).index(index)
    }

    /// One lazy reference per declared output, in declaration order.
    pub fn outputs(self: &Arc<Self>) -> Result<Vec<Expr>> {
        let schema = self.return_type.as_record().ok_or_else(|| {
            GraphError::contract(format!(
                "component '{}' returns {} and has no outputs to unpack",
                self.name, self.return_type
            ))
        })?;
        Ok((0..schema.len()).map(|i| self.index(i)).collect())
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("function", &self.function)
            .field("inputs", &self.inputs.keys().collect::<Vec<_>>())
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}
