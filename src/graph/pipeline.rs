//! Pipelines: ordered containers of traced nodes.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{GraphError, Result};
use crate::expr::Expr;
use crate::graph::component::Component;
use crate::graph::condition::Condition;
use crate::graph::tracer::Tracer;
use crate::value::ValueType;

/// A child of a pipeline.
#[derive(Debug, Clone)]
pub enum Node {
    Component(Arc<Component>),
    Pipeline(Arc<Pipeline>),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Component(c) => c.name(),
            Node::Pipeline(p) => p.name(),
        }
    }

    pub fn inputs(&self) -> &IndexMap<String, Expr> {
        match self {
            Node::Component(c) => c.inputs(),
            Node::Pipeline(p) => p.inputs(),
        }
    }

    pub fn as_component(&self) -> Option<&Arc<Component>> {
        match self {
            Node::Component(c) => Some(c),
            Node::Pipeline(_) => None,
        }
    }

    pub fn as_pipeline(&self) -> Option<&Arc<Pipeline>> {
        match self {
            Node::Pipeline(p) => Some(p),
            Node::Component(_) => None,
        }
    }
}

/// A traced pipeline, possibly guarded by a [`Condition`].
///
/// Pipelines are produced by the [`Tracer`] and never change afterwards.
#[derive(Debug)]
pub struct Pipeline {
    pub(crate) name: String,
    pub(crate) inputs: IndexMap<String, Expr>,
    pub(crate) children: Vec<Node>,
    pub(crate) return_value: Option<Expr>,
    pub(crate) return_type: Option<ValueType>,
    pub(crate) condition: Option<Condition>,
}

impl Pipeline {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared inputs, resolved against the enclosing table at execution time.
    pub fn inputs(&self) -> &IndexMap<String, Expr> {
        &self.inputs
    }

    /// Children in trace order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name() == name)
    }

    pub fn return_value(&self) -> Option<&Expr> {
        self.return_value.as_ref()
    }

    /// Declared or inferred return type. `None` when nothing is returned.
    pub fn return_type(&self) -> Option<&ValueType> {
        self.return_type.as_ref()
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// The body of a pipeline definition.
pub type PipelineFn = Arc<dyn Fn(&mut Tracer, &Args) -> Result<Option<Expr>> + Send + Sync>;

/// A declared pipeline parameter. Untyped parameters accept anything.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParam {
    pub name: String,
    pub ty: Option<ValueType>,
}

/// Definition of a pipeline.
///
/// Invoking a definition through [`Tracer::invoke`] runs its body once,
/// recording every node it creates.
#[derive(Clone)]
pub struct PipelineDef {
    function: String,
    name: Option<String>,
    params: Vec<PipelineParam>,
    returns: Option<ValueType>,
    body: PipelineFn,
}

impl PipelineDef {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            name: None,
            params: Vec::new(),
            returns: None,
            body: Arc::new(|_, _| Ok(None)),
        }
    }

    /// Declare an untyped parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(PipelineParam {
            name: name.into(),
            ty: None,
        });
        self
    }

    /// Declare a parameter whose arguments are type-checked.
    pub fn typed_param(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.params.push(PipelineParam {
            name: name.into(),
            ty: Some(ty),
        });
        self
    }

    pub fn returns(mut self, ty: ValueType) -> Self {
        self.returns = Some(ty);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut Tracer, &Args) -> Result<Option<Expr>> + Send + Sync + 'static,
    {
        self.body = Arc::new(body);
        self
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn params(&self) -> &[PipelineParam] {
        &self.params
    }

    pub fn return_type(&self) -> Option<&ValueType> {
        self.returns.as_ref()
    }

    pub(crate) fn body_fn(&self) -> PipelineFn {
        Arc::clone(&self.body)
    }
}

impl fmt::Debug for PipelineDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineDef")
            .field("function", &self.function)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Arguments handed to a pipeline body.
#[derive(Debug, Clone, Default)]
pub struct Args {
    pipeline: String,
    values: IndexMap<String, Expr>,
}

impl Args {
    pub(crate) fn new(pipeline: impl Into<String>, values: IndexMap<String, Expr>) -> Self {
        Self {
            pipeline: pipeline.into(),
            values,
        }
    }

    /// Get an argument by name.
    pub fn get(&self, name: &str) -> Result<Expr> {
        self.values.get(name).cloned().ok_or_else(|| {
            GraphError::contract(format!(
                "pipeline '{}' was not given an argument named '{}'",
                self.pipeline, name
            ))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Expr)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
