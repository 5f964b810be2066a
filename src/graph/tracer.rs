//! The trace-time graph builder.
//!
//! A [`Tracer`] owns the active-context stack: one frame per pipeline that is
//! currently being traced. Calling a component definition records a node in
//! the top frame; invoking a pipeline definition pushes a frame, runs the
//! body, pops the frame and records the finished pipeline in its parent.
//!
//! The stack is always back at its previous depth when a pipeline-defining
//! call returns, whether the body succeeded or not.

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

use crate::config::TraceSettings;
use crate::dispatch::{DispatchRegistry, Operator};
use crate::error::{GraphError, Result};
use crate::expr::{infer_type, Expr};
use crate::graph::component::{Component, ComponentDef, ComponentFn};
use crate::graph::condition::{Comparator, Condition};
use crate::graph::naming;
use crate::graph::pipeline::{Args, Node, Pipeline, PipelineDef};
use crate::value::{Inputs, Value, ValueType};

/// Draws of a generated name before a collision is left to registration.
const MAX_NAME_ATTEMPTS: usize = 32;

/// One open pipeline.
#[derive(Debug)]
struct Frame {
    name: String,
    inputs: IndexMap<String, Expr>,
    children: Vec<Node>,
    condition: Option<Condition>,
}

impl Frame {
    fn new(name: String, inputs: IndexMap<String, Expr>, condition: Option<Condition>) -> Self {
        Self {
            name,
            inputs,
            children: Vec::new(),
            condition,
        }
    }
}

/// Records components and pipelines as pipeline bodies run.
///
/// A tracer is single-threaded state. Trace one pipeline at a time.
#[derive(Debug)]
pub struct Tracer {
    frames: Vec<Frame>,
    registry: DispatchRegistry,
    settings: TraceSettings,
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer {
    /// Create a tracer with default settings and the builtin operators.
    pub fn new() -> Self {
        Self::with_settings(TraceSettings::default())
    }

    pub fn with_settings(settings: TraceSettings) -> Self {
        Self {
            frames: Vec::new(),
            registry: DispatchRegistry::with_builtins(),
            settings,
        }
    }

    /// Replace the operator registry.
    pub fn with_registry(mut self, registry: DispatchRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    pub fn registry(&self) -> &DispatchRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DispatchRegistry {
        &mut self.registry
    }

    /// Number of pipelines currently open.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Record a component node with named arguments.
    ///
    /// The body does not run. Every argument must name a declared parameter,
    /// and its inferred type must be accepted by the parameter's type.
    pub fn call<K, V, I>(&mut self, def: &ComponentDef, args: I) -> Result<Arc<Component>>
    where
        K: Into<String>,
        V: Into<Expr>,
        I: IntoIterator<Item = (K, V)>,
    {
        let return_type = def.return_type().cloned().ok_or_else(|| {
            GraphError::contract(format!(
                "component '{}' has no return type declaration",
                def.function()
            ))
        })?;

        let mut supplied: IndexMap<String, Expr> = IndexMap::new();
        for (key, value) in args {
            let key = key.into();
            if !def.params().iter().any(|p| p.name == key) {
                return Err(GraphError::contract(format!(
                    "component '{}' has no parameter named '{}'",
                    def.function(),
                    key
                )));
            }
            if supplied.insert(key.clone(), value.into()).is_some() {
                return Err(GraphError::contract(format!(
                    "argument '{}' of component '{}' was given twice",
                    key,
                    def.function()
                )));
            }
        }

        let mut inputs = IndexMap::new();
        for param in def.params() {
            let expr = match supplied.shift_remove(&param.name) {
                Some(expr) => expr,
                None => match &param.default {
                    Some(default) => Expr::Literal(default.clone()),
                    None => {
                        return Err(GraphError::contract(format!(
                            "component '{}' is missing argument '{}'",
                            def.function(),
                            param.name
                        )))
                    }
                },
            };
            let found = infer_type(&expr)?;
            if !param.ty.accepts(&found) {
                return Err(GraphError::contract(format!(
                    "argument '{}' of component '{}' expects {}, found {}",
                    param.name,
                    def.function(),
                    param.ty,
                    found
                )));
            }
            inputs.insert(param.name.clone(), expr);
        }

        let component = Arc::new(Component {
            name: self.node_name(def.explicit_name(), def.function())?,
            function: def.function().to_string(),
            inputs,
            return_type,
            deployment: self.settings.resolve_deployment(def.deployment()),
            body: def.body_fn(),
        });
        self.register(Node::Component(Arc::clone(&component)))?;
        Ok(component)
    }

    /// Record a component node, mapping arguments onto parameters in order.
    pub fn call_positional<V, I>(&mut self, def: &ComponentDef, args: I) -> Result<Arc<Component>>
    where
        V: Into<Expr>,
        I: IntoIterator<Item = V>,
    {
        let args: Vec<Expr> = args.into_iter().map(Into::into).collect();
        if args.len() > def.params().len() {
            return Err(GraphError::contract(format!(
                "component '{}' takes {} arguments but {} were given",
                def.function(),
                def.params().len(),
                args.len()
            )));
        }
        let named: Vec<(String, Expr)> = def
            .params()
            .iter()
            .map(|p| p.name.clone())
            .zip(args)
            .collect();
        self.call(def, named)
    }

    /// Trace a pipeline definition.
    ///
    /// The body runs exactly once. Its returned expression becomes the
    /// pipeline's return value.
    pub fn invoke<K, V, I>(&mut self, def: &PipelineDef, args: I) -> Result<Arc<Pipeline>>
    where
        K: Into<String>,
        V: Into<Expr>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut inputs: IndexMap<String, Expr> = IndexMap::new();
        for (key, value) in args {
            let key = key.into();
            let value = value.into();
            let param = def
                .params()
                .iter()
                .find(|p| p.name == key)
                .ok_or_else(|| {
                    GraphError::contract(format!(
                        "pipeline '{}' has no parameter named '{}'",
                        def.function(),
                        key
                    ))
                })?;
            if let Some(ty) = &param.ty {
                let found = infer_type(&value)?;
                if !ty.accepts(&found) {
                    return Err(GraphError::contract(format!(
                        "argument '{}' of pipeline '{}' expects {}, found {}",
                        key,
                        def.function(),
                        ty,
                        found
                    )));
                }
            }
            if inputs.insert(key.clone(), value).is_some() {
                return Err(GraphError::contract(format!(
                    "argument '{}' of pipeline '{}' was given twice",
                    key,
                    def.function()
                )));
            }
        }

        let name = self.node_name(def.explicit_name(), def.function())?;
        let args = Args::new(name.clone(), inputs.clone());
        let body = def.body_fn();
        let frame = Frame::new(name, inputs, None);
        self.trace_frame(frame, def.return_type().cloned(), move |tracer| {
            body(tracer, &args)
        })
    }

    /// Trace an ad hoc nested pipeline named after `name`.
    pub fn scope<F>(&mut self, name: &str, body: F) -> Result<Arc<Pipeline>>
    where
        F: FnOnce(&mut Tracer) -> Result<Option<Expr>>,
    {
        let frame = Frame::new(self.node_name(None, name)?, IndexMap::new(), None);
        self.trace_frame(frame, None, body)
    }

    /// Trace a conditional pipeline guarded by `condition`.
    pub fn when<F>(&mut self, condition: Condition, body: F) -> Result<Arc<Pipeline>>
    where
        F: FnOnce(&mut Tracer) -> Result<()>,
    {
        let frame = Frame::new(
            self.node_name(None, "condition")?,
            IndexMap::new(),
            Some(condition),
        );
        self.trace_frame(frame, None, |tracer| body(tracer).map(|_| None))
    }

    pub fn when_equal<F>(
        &mut self,
        left: impl Into<Expr>,
        right: impl Into<Expr>,
        body: F,
    ) -> Result<Arc<Pipeline>>
    where
        F: FnOnce(&mut Tracer) -> Result<()>,
    {
        self.when(Condition::equal(left, right)?, body)
    }

    pub fn when_not_equal<F>(
        &mut self,
        left: impl Into<Expr>,
        right: impl Into<Expr>,
        body: F,
    ) -> Result<Arc<Pipeline>>
    where
        F: FnOnce(&mut Tracer) -> Result<()>,
    {
        self.when(Condition::not_equal(left, right)?, body)
    }

    /// Trace a pipeline that runs only after `deps` have been produced.
    ///
    /// The guard compares the dependencies against a fresh witness string
    /// with `!=`, so it always holds once the dependencies exist.
    pub fn depends_on<F>(&mut self, deps: &[Expr], body: F) -> Result<Arc<Pipeline>>
    where
        F: FnOnce(&mut Tracer) -> Result<()>,
    {
        if let Some(literal) = deps.iter().find(|d| !d.is_deferred()) {
            return Err(GraphError::contract(format!(
                "depends_on needs node references, found literal {}",
                literal
            )));
        }
        let left = match deps {
            [] => {
                return Err(GraphError::contract(
                    "depends_on needs at least one node reference",
                ))
            }
            [single] => single.clone(),
            many => Expr::tuple(many.iter().cloned()),
        };
        let witness = format!("witness-{}", naming::random_suffix(16)?);
        let condition = Condition::new(left, Value::from(witness), Comparator::NotEqual)?;

        let frame = Frame::new(
            self.node_name(None, "depends-on")?,
            IndexMap::new(),
            Some(condition),
        );
        self.trace_frame(frame, None, |tracer| body(tracer).map(|_| None))
    }

    /// Apply an operator, recording a component that wraps the selected overload.
    pub fn apply(&mut self, operator: Operator, operands: Vec<Expr>) -> Result<Arc<Component>> {
        let types = operands
            .iter()
            .map(infer_type)
            .collect::<Result<Vec<ValueType>>>()?;
        let overload = self.registry.select(operator, &types)?;
        let implementation = overload.implementation();
        let return_type = overload.returns().clone();

        let inputs: IndexMap<String, Expr> = Operator::param_names(operands.len())
            .into_iter()
            .zip(operands)
            .collect();
        let body: ComponentFn = Arc::new(move |inputs: &Inputs| {
            let args: Vec<Value> = inputs.values().cloned().collect();
            implementation(&args)
        });

        let component = Arc::new(Component {
            name: self.node_name(None, operator.name())?,
            function: operator.name().to_string(),
            inputs,
            return_type,
            deployment: self.settings.operator_deployment(),
            body: Some(body),
        });
        self.register(Node::Component(Arc::clone(&component)))?;
        Ok(component)
    }

    pub fn add(&mut self, a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Arc<Component>> {
        self.apply(Operator::Add, vec![a.into(), b.into()])
    }

    pub fn subtract(&mut self, a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Arc<Component>> {
        self.apply(Operator::Subtract, vec![a.into(), b.into()])
    }

    pub fn multiply(&mut self, a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Arc<Component>> {
        self.apply(Operator::Multiply, vec![a.into(), b.into()])
    }

    pub fn divide(&mut self, a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Arc<Component>> {
        self.apply(Operator::Divide, vec![a.into(), b.into()])
    }

    pub fn floor_divide(
        &mut self,
        a: impl Into<Expr>,
        b: impl Into<Expr>,
    ) -> Result<Arc<Component>> {
        self.apply(Operator::FloorDivide, vec![a.into(), b.into()])
    }

    pub fn equal(&mut self, a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Arc<Component>> {
        self.apply(Operator::Equal, vec![a.into(), b.into()])
    }

    pub fn not_equal(&mut self, a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Arc<Component>> {
        self.apply(Operator::NotEqual, vec![a.into(), b.into()])
    }

    pub fn contains(&mut self, a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Arc<Component>> {
        self.apply(Operator::Contains, vec![a.into(), b.into()])
    }

    pub fn length(&mut self, a: impl Into<Expr>) -> Result<Arc<Component>> {
        self.apply(Operator::Length, vec![a.into()])
    }

    pub fn to_string(&mut self, a: impl Into<Expr>) -> Result<Arc<Component>> {
        self.apply(Operator::ToString, vec![a.into()])
    }

    pub fn to_int(&mut self, a: impl Into<Expr>) -> Result<Arc<Component>> {
        self.apply(Operator::ToInt, vec![a.into()])
    }

    pub fn to_float(&mut self, a: impl Into<Expr>) -> Result<Arc<Component>> {
        self.apply(Operator::ToFloat, vec![a.into()])
    }

    /// Explicit names are normalized as given. Generated names draw a new
    /// suffix while they collide with a sibling in the current frame.
    fn node_name(&self, explicit: Option<&str>, base: &str) -> Result<String> {
        if let Some(name) = explicit {
            return Ok(naming::normalize(name));
        }
        let suffix_len = self.settings.name_suffix_length;
        let mut name = naming::generate(base, suffix_len)?;
        for _ in 0..MAX_NAME_ATTEMPTS {
            if suffix_len == 0 || !self.has_sibling(&name) {
                break;
            }
            debug!("Generated name '{}' is taken, drawing another", name);
            name = naming::generate(base, suffix_len)?;
        }
        Ok(name)
    }

    fn has_sibling(&self, name: &str) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.children.iter().any(|c| c.name() == name))
    }

    fn trace_frame<F>(
        &mut self,
        frame: Frame,
        declared: Option<ValueType>,
        body: F,
    ) -> Result<Arc<Pipeline>>
    where
        F: FnOnce(&mut Tracer) -> Result<Option<Expr>>,
    {
        debug!("Entering pipeline '{}' at depth {}", frame.name, self.depth());
        self.frames.push(frame);
        let outcome = body(self);
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| GraphError::contract("active-context stack is empty"))?;
        debug!(
            "Exiting pipeline '{}' with {} children",
            frame.name,
            frame.children.len()
        );

        let return_value = outcome?;
        let return_type = match (declared, &return_value) {
            (Some(declared), Some(expr)) => {
                let found = infer_type(expr)?;
                if !declared.accepts(&found) {
                    return Err(GraphError::contract(format!(
                        "pipeline '{}' declares {} but returns {}",
                        frame.name, declared, found
                    )));
                }
                Some(declared)
            }
            (Some(declared), None) => {
                return Err(GraphError::contract(format!(
                    "pipeline '{}' declares {} but returns nothing",
                    frame.name, declared
                )))
            }
            (None, Some(expr)) => Some(infer_type(expr)?),
            (None, None) => None,
        };

        let pipeline = Arc::new(Pipeline {
            name: frame.name,
            inputs: frame.inputs,
            children: frame.children,
            return_value,
            return_type,
            condition: frame.condition,
        });
        self.register(Node::Pipeline(Arc::clone(&pipeline)))?;
        Ok(pipeline)
    }

    fn register(&mut self, node: Node) -> Result<()> {
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };
        if frame.children.iter().any(|c| c.name() == node.name()) {
            return Err(GraphError::contract(format!(
                "pipeline '{}' already has a node named '{}'",
                frame.name,
                node.name()
            )));
        }
        debug!("Registered '{}' in pipeline '{}'", node.name(), frame.name);
        frame.children.push(node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greet() -> ComponentDef {
        ComponentDef::new("greet")
            .param("name", ValueType::String)
            .returns(ValueType::String)
            .body(|inputs| Ok(Value::from(format!("Hello, {}!", inputs.str("name")?))))
    }

    fn split() -> ComponentDef {
        ComponentDef::new("split")
            .param("name", ValueType::String)
            .returns(
                ValueType::record(
                    "Output",
                    [("first", ValueType::String), ("last", ValueType::String)],
                )
                .unwrap(),
            )
    }

    #[test]
    fn call_outside_pipeline_registers_nowhere() {
        let mut tracer = Tracer::new();
        let node = tracer.call(&greet(), [("name", "world")]).unwrap();
        assert!(node.name().starts_with("greet-"));
        assert_eq!(tracer.depth(), 0);
    }

    #[test]
    fn call_rejects_unknown_argument() {
        let mut tracer = Tracer::new();
        let err = tracer.call(&greet(), [("nom", "world")]).unwrap_err();
        assert!(matches!(err, GraphError::TraceContract { .. }));
    }

    #[test]
    fn call_rejects_missing_argument() {
        let mut tracer = Tracer::new();
        let err = tracer
            .call(&greet(), Vec::<(String, Expr)>::new())
            .unwrap_err();
        assert!(err.to_string().contains("missing argument 'name'"));
    }

    #[test]
    fn call_rejects_type_mismatch() {
        let mut tracer = Tracer::new();
        let err = tracer.call(&greet(), [("name", 42)]).unwrap_err();
        assert!(err.to_string().contains("expects string, found integer"));
    }

    #[test]
    fn call_requires_return_type() {
        let mut tracer = Tracer::new();
        let def = ComponentDef::new("noop").param("x", ValueType::Integer);
        let err = tracer.call(&def, [("x", 1)]).unwrap_err();
        assert!(err.to_string().contains("no return type declaration"));
    }

    #[test]
    fn call_uses_defaults() {
        let mut tracer = Tracer::new();
        let def = ComponentDef::new("greet")
            .param("name", ValueType::String)
            .param_with_default("punctuation", ValueType::String, "!")
            .returns(ValueType::String);
        let node = tracer.call(&def, [("name", "world")]).unwrap();
        let keys: Vec<_> = node.inputs().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "punctuation"]);
    }

    #[test]
    fn call_positional_maps_in_order() {
        let mut tracer = Tracer::new();
        let node = tracer.call_positional(&greet(), ["world"]).unwrap();
        assert_eq!(node.inputs()["name"].to_string(), "\"world\"");
        assert!(tracer.call_positional(&greet(), ["a", "b"]).is_err());
    }

    #[test]
    fn explicit_names_are_normalized() {
        let mut tracer = Tracer::new();
        let node = tracer
            .call(&greet().name("say_hello"), [("name", "world")])
            .unwrap();
        assert_eq!(node.name(), "say-hello");
    }

    #[test]
    fn components_default_base_image() {
        let mut tracer = Tracer::new();
        let node = tracer.call(&greet(), [("name", "world")]).unwrap();
        assert_eq!(
            node.deployment().base_image.as_deref(),
            Some("tracegraph/runtime:latest")
        );
    }

    #[test]
    fn pipeline_records_children_in_order() {
        let def = PipelineDef::new("main").param("name").body(|t, args| {
            let parts = t.call(&split(), [("name", args.get("name")?)])?;
            let greeting = t.call(&greet(), [("name", parts.field("first"))])?;
            Ok(Some(Expr::from(greeting)))
        });

        let mut tracer = Tracer::new();
        let pipeline = tracer.invoke(&def, [("name", "Tyrion Lannister")]).unwrap();
        assert_eq!(tracer.depth(), 0);
        assert_eq!(pipeline.len(), 2);
        assert!(pipeline.children()[0].name().starts_with("split-"));
        assert!(pipeline.children()[1].name().starts_with("greet-"));
        assert_eq!(pipeline.return_type(), Some(&ValueType::String));
    }

    #[test]
    fn nested_pipeline_becomes_child() {
        let inner = PipelineDef::new("inner").body(|t, _| {
            let node = t.call(&greet(), [("name", "world")])?;
            Ok(Some(node.into()))
        });
        let outer = PipelineDef::new("outer").body(move |t, _| {
            let nested = t.invoke(&inner, Vec::<(String, Expr)>::new())?;
            assert_eq!(t.depth(), 1);
            Ok(Some(nested.into()))
        });

        let mut tracer = Tracer::new();
        let pipeline = tracer
            .invoke(&outer, Vec::<(String, Expr)>::new())
            .unwrap();
        assert_eq!(pipeline.len(), 1);
        assert!(pipeline.children()[0].as_pipeline().is_some());
    }

    #[test]
    fn failing_body_restores_depth() {
        let def = PipelineDef::new("broken").body(|t, _| {
            t.call(&greet(), [("name", 1)])?;
            Ok(None)
        });
        let mut tracer = Tracer::new();
        assert!(tracer.invoke(&def, Vec::<(String, Expr)>::new()).is_err());
        assert_eq!(tracer.depth(), 0);
    }

    #[test]
    fn sibling_name_collision_is_rejected() {
        let def = PipelineDef::new("main").body(|t, _| {
            t.call(&greet().name("hello"), [("name", "a")])?;
            t.call(&greet().name("hello"), [("name", "b")])?;
            Ok(None)
        });
        let err = Tracer::new()
            .invoke(&def, Vec::<(String, Expr)>::new())
            .unwrap_err();
        assert!(err.to_string().contains("already has a node named 'hello'"));
    }

    #[test]
    fn pipeline_rejects_unknown_argument() {
        let def = PipelineDef::new("main").param("name");
        let err = Tracer::new().invoke(&def, [("other", "x")]).unwrap_err();
        assert!(matches!(err, GraphError::TraceContract { .. }));
    }

    #[test]
    fn pipeline_checks_declared_return_type() {
        let def = PipelineDef::new("main")
            .returns(ValueType::Integer)
            .body(|_, _| Ok(Some(Expr::from("text"))));
        let err = Tracer::new()
            .invoke(&def, Vec::<(String, Expr)>::new())
            .unwrap_err();
        assert!(err.to_string().contains("declares integer but returns string"));
    }

    #[test]
    fn when_records_conditional_pipeline() {
        let def = PipelineDef::new("main").param("name").body(|t, args| {
            let parts = t.call(&split(), [("name", args.get("name")?)])?;
            t.when_equal(parts.field("last"), "Lannister", |t| {
                t.call(&greet(), [("name", "Lannister")])?;
                Ok(())
            })?;
            Ok(None)
        });
        let pipeline = Tracer::new()
            .invoke(&def, [("name", "Jaime Lannister")])
            .unwrap();
        let guarded = pipeline.children()[1].as_pipeline().unwrap();
        assert!(guarded.is_conditional());
        assert!(guarded.name().starts_with("condition-"));
        assert_eq!(guarded.len(), 1);
    }

    #[test]
    fn depends_on_requires_node_references() {
        let mut tracer = Tracer::new();
        let err = tracer
            .depends_on(&[Expr::from("literal")], |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, GraphError::TraceContract { .. }));
        assert!(tracer.depends_on(&[], |_| Ok(())).is_err());
    }

    #[test]
    fn depends_on_builds_not_equal_guard() {
        let mut tracer = Tracer::new();
        let first = tracer.call(&greet(), [("name", "a")]).unwrap();
        let second = tracer.call(&greet(), [("name", "b")]).unwrap();
        let guarded = tracer
            .depends_on(&[first.into(), second.into()], |_| Ok(()))
            .unwrap();
        let condition = guarded.condition().unwrap();
        assert_eq!(condition.comparator(), Comparator::NotEqual);
        assert!(matches!(condition.left(), Expr::Record(fields) if fields.len() == 2));
    }

    #[test]
    fn operators_synthesize_components() {
        let mut tracer = Tracer::new();
        let greeting = tracer.call(&greet(), [("name", "world")]).unwrap();
        let length = tracer.length(&greeting).unwrap();
        assert!(length.name().starts_with("length-"));
        assert_eq!(length.return_type(), &ValueType::Integer);
        assert_eq!(length.deployment().hardware.cpus.as_deref(), Some("1"));
        assert_eq!(length.inputs().keys().next().map(String::as_str), Some("a"));
    }

    #[test]
    fn operator_without_overload_fails() {
        let mut tracer = Tracer::new();
        let greeting = tracer.call(&greet(), [("name", "world")]).unwrap();
        let err = tracer.subtract(&greeting, 1).unwrap_err();
        assert!(matches!(err, GraphError::DispatchResolution { .. }));
    }

    #[test]
    fn scope_builds_named_nested_pipeline() {
        let mut tracer = Tracer::new();
        let scoped = tracer
            .scope("prepare", |t| {
                let node = t.call(&greet(), [("name", "x")])?;
                Ok(Some(node.into()))
            })
            .unwrap();
        assert!(scoped.name().starts_with("prepare-"));
        assert_eq!(scoped.return_type(), Some(&ValueType::String));
    }

    #[test]
    fn generated_names_avoid_siblings() {
        let settings = TraceSettings {
            name_suffix_length: 1,
            ..TraceSettings::default()
        };
        let def = PipelineDef::new("main").body(|t, _| {
            for _ in 0..8 {
                t.call(&greet(), [("name", "x")])?;
            }
            Ok(None)
        });
        let pipeline = Tracer::with_settings(settings)
            .invoke(&def, Vec::<(String, Expr)>::new())
            .unwrap();
        let mut names: Vec<&str> = pipeline.children().iter().map(Node::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn unsuffixed_generated_names_still_collide() {
        let settings = TraceSettings {
            name_suffix_length: 0,
            ..TraceSettings::default()
        };
        let def = PipelineDef::new("main").body(|t, _| {
            t.call(&greet(), [("name", "a")])?;
            t.call(&greet(), [("name", "b")])?;
            Ok(None)
        });
        let err = Tracer::with_settings(settings)
            .invoke(&def, Vec::<(String, Expr)>::new())
            .unwrap_err();
        assert!(matches!(err, GraphError::TraceContract { .. }));
    }

    #[test]
    fn depends_on_accepts_record_and_value_less_nodes() {
        let def = PipelineDef::new("main").body(|t, _| {
            let parts = t.call(&split(), [("name", "Ned Stark")])?;
            let greeting = t.call(&greet(), [("name", "x")])?;
            let prepare = t.scope("prepare", |_| Ok(None))?;
            t.depends_on(&[parts.into(), greeting.into(), prepare.into()], |t| {
                t.call(&greet(), [("name", "after")])?;
                Ok(())
            })?;
            Ok(None)
        });
        let pipeline = Tracer::new()
            .invoke(&def, Vec::<(String, Expr)>::new())
            .unwrap();
        let guarded = pipeline.children()[3].as_pipeline().unwrap();
        let left = guarded.condition().unwrap().left();
        assert_eq!(left.referenced_nodes().len(), 3);
    }
}
