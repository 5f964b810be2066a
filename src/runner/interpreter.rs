//! Recursive, declaration-ordered execution of traced pipelines.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::Result;
use crate::expr::{resolve, Expr, ValueTable};
use crate::graph::{Node, Pipeline};
use crate::value::{reconstruct, Inputs, Record, Value};

use super::backend::Backend;

/// What happened to a node during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The node ran.
    Completed,

    /// A conditional pipeline whose guard was false.
    Skipped,
}

/// One executed or skipped node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Node names from the root pipeline down, joined with `/`.
    pub path: String,

    pub status: StepStatus,

    /// Time spent on the node, including nested children.
    pub duration: Duration,
}

/// Result of running a pipeline.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The pipeline's resolved return value, if it returns one.
    pub value: Option<Value>,

    /// Value table of the root pipeline after its last child ran.
    pub values: ValueTable,

    /// Nodes in completion order. Nested pipelines follow their children.
    pub steps: Vec<StepRecord>,

    /// Total duration.
    pub duration: Duration,
}

impl RunOutcome {
    pub fn completed(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|s| s.status == StepStatus::Skipped)
    }

    /// Resolve an expression against the root pipeline's final value table.
    pub fn resolve(&self, expr: &Expr) -> Result<Value> {
        resolve(&self.values, expr)
    }
}

/// Walks a traced pipeline and runs its leaves through a [`Backend`].
///
/// Children run strictly in the order they were traced. A child never runs
/// twice, and nothing inside a conditional pipeline runs when its guard is
/// false. The first error aborts the run.
pub struct Interpreter<B: Backend> {
    backend: B,
}

impl<B: Backend> Interpreter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Run a traced pipeline to completion.
    pub fn run(&mut self, pipeline: &Pipeline) -> Result<RunOutcome> {
        let start = Instant::now();
        debug!(
            "Running pipeline '{}' with backend '{}'",
            pipeline.name(),
            self.backend.name()
        );

        let seed = resolve_inputs(&ValueTable::new(), pipeline.inputs())?;
        let mut steps = Vec::new();
        let (value, values) = self.run_pipeline(
            pipeline,
            ValueTable::new().merged(seed.iter()),
            pipeline.name(),
            &mut steps,
        )?;

        Ok(RunOutcome {
            value,
            values,
            steps,
            duration: start.elapsed(),
        })
    }

    fn run_pipeline(
        &mut self,
        pipeline: &Pipeline,
        mut table: ValueTable,
        path: &str,
        steps: &mut Vec<StepRecord>,
    ) -> Result<(Option<Value>, ValueTable)> {
        for child in pipeline.children() {
            let start = Instant::now();
            let child_path = format!("{}/{}", path, child.name());
            let inputs = resolve_inputs(&table, child.inputs())?;

            let produced = match child {
                Node::Pipeline(nested) => {
                    if let Some(condition) = nested.condition() {
                        if !condition.evaluate(&table)? {
                            debug!("Skipping '{}': {} is false", nested.name(), condition);
                            steps.push(StepRecord {
                                path: child_path,
                                status: StepStatus::Skipped,
                                duration: start.elapsed(),
                            });
                            continue;
                        }
                    }

                    let inner = table.merged(inputs.iter());
                    let (value, _) = self.run_pipeline(nested, inner, &child_path, steps)?;
                    // A pipeline without a return value completes with the empty record.
                    match (value, nested.return_type()) {
                        (Some(raw), Some(declared)) => {
                            Some(reconstruct(nested.name(), declared, raw)?)
                        }
                        (Some(value), None) => Some(value),
                        (None, _) => Some(Value::Record(Record::new())),
                    }
                }
                Node::Component(component) => {
                    let raw = self.backend.run_component(component, &inputs)?;
                    let value = reconstruct(component.name(), component.return_type(), raw)?;
                    info!("[{}] - {}", component.name(), value);
                    Some(value)
                }
            };

            steps.push(StepRecord {
                path: child_path,
                status: StepStatus::Completed,
                duration: start.elapsed(),
            });
            if let Some(value) = produced {
                table.insert(child.name(), value);
            }
        }

        let value = match pipeline.return_value() {
            Some(expr) => Some(resolve(&table, expr)?),
            None => None,
        };
        Ok((value, table))
    }
}

fn resolve_inputs(table: &ValueTable, exprs: &IndexMap<String, Expr>) -> Result<Inputs> {
    let mut inputs = Inputs::new();
    for (name, expr) in exprs {
        inputs.insert(name.clone(), resolve(table, expr)?);
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::graph::{ComponentDef, PipelineDef, Tracer};
    use crate::runner::LocalBackend;
    use crate::value::{Record, ValueType};
    use std::sync::Arc;

    fn no_args() -> Vec<(String, Expr)> {
        Vec::new()
    }

    fn echo() -> ComponentDef {
        ComponentDef::new("echo")
            .param("text", ValueType::String)
            .returns(ValueType::String)
            .body(|inputs| Ok(Value::from(inputs.str("text")?)))
    }

    #[test]
    fn runs_children_and_returns_value() {
        let def = PipelineDef::new("main").param("text").body(|t, args| {
            let first = t.call(&echo(), [("text", args.get("text")?)])?;
            let second = t.call(&echo(), [("text", first)])?;
            Ok(Some(second.into()))
        });
        let pipeline = Tracer::new().invoke(&def, [("text", "hi")]).unwrap();

        let outcome = Interpreter::new(LocalBackend).run(&pipeline).unwrap();
        assert_eq!(outcome.value, Some(Value::from("hi")));
        assert_eq!(outcome.completed().count(), 2);
        assert!(outcome.steps[0].path.starts_with(pipeline.name()));
    }

    #[test]
    fn positional_record_results_are_relabeled() {
        let pair = ComponentDef::new("pair")
            .returns(
                ValueType::record(
                    "Pair",
                    [("left", ValueType::Integer), ("right", ValueType::Float)],
                )
                .unwrap(),
            )
            .body(|_| Ok(Value::from(Record::positional([Value::from(1), Value::from(2)]))));
        let def = PipelineDef::new("main").body(move |t, _| {
            let node = t.call(&pair, no_args())?;
            Ok(Some(node.field("right")))
        });
        let pipeline = Tracer::new().invoke(&def, no_args()).unwrap();

        let outcome = Interpreter::new(LocalBackend).run(&pipeline).unwrap();
        assert_eq!(outcome.value, Some(Value::Float(2.0)));
    }

    #[test]
    fn wrong_result_type_is_output_contract_error() {
        let liar = ComponentDef::new("liar")
            .returns(ValueType::Integer)
            .body(|_| Ok(Value::from("not a number")));
        let def = PipelineDef::new("main").body(move |t, _| {
            t.call(&liar, no_args())?;
            Ok(None)
        });
        let pipeline = Tracer::new().invoke(&def, no_args()).unwrap();

        let err = Interpreter::new(LocalBackend).run(&pipeline).unwrap_err();
        assert!(matches!(err, GraphError::OutputContract { .. }));
    }

    #[test]
    fn false_guard_skips_and_hides_children() {
        let def = PipelineDef::new("main").body(|t, _| {
            let name = t.call(&echo(), [("text", "Stark")])?;
            t.when_equal(&name, "Lannister", |t| {
                t.call(&echo().name("hidden"), [("text", "never")])?;
                Ok(())
            })?;
            Ok(None)
        });
        let pipeline = Tracer::new().invoke(&def, no_args()).unwrap();

        let outcome = Interpreter::new(LocalBackend).run(&pipeline).unwrap();
        assert_eq!(outcome.skipped().count(), 1);
        assert_eq!(outcome.completed().count(), 1);
        assert!(!outcome.values.contains("hidden"));
        assert!(!outcome.values.contains(pipeline.children()[1].name()));
    }

    #[test]
    fn outputs_resolve_after_run() {
        let split = ComponentDef::new("split")
            .param("name", ValueType::String)
            .returns(
                ValueType::record(
                    "Output",
                    [("first", ValueType::String), ("last", ValueType::String)],
                )
                .unwrap(),
            )
            .body(|inputs| {
                let name = inputs.str("name")?;
                let (first, last) = name.split_once(' ').unwrap_or((name, ""));
                Ok(Value::from(Record::positional([
                    Value::from(first),
                    Value::from(last),
                ])))
            });
        let def = PipelineDef::new("main").body(move |t, _| {
            t.call(&split, [("name", "Arya Stark")])?;
            Ok(None)
        });
        let pipeline = Tracer::new().invoke(&def, no_args()).unwrap();
        let node = Arc::clone(pipeline.children()[0].as_component().unwrap());

        let outcome = Interpreter::new(LocalBackend).run(&pipeline).unwrap();
        assert_eq!(outcome.resolve(&node.field("last")).unwrap(), Value::from("Stark"));
        assert_eq!(outcome.resolve(&node.index(0)).unwrap(), Value::from("Arya"));
    }

    #[test]
    fn value_less_pipeline_completes_with_empty_record() {
        let def = PipelineDef::new("main").body(|t, _| {
            let prepare = t.scope("prepare", |t| {
                t.call(&echo(), [("text", "setup")])?;
                Ok(None)
            })?;
            t.depends_on(&[prepare.into()], |t| {
                t.call(&echo().name("after"), [("text", "done")])?;
                Ok(())
            })?;
            Ok(None)
        });
        let pipeline = Tracer::new().invoke(&def, no_args()).unwrap();

        let outcome = Interpreter::new(LocalBackend).run(&pipeline).unwrap();
        let prepare = pipeline.children()[0].name();
        assert_eq!(
            outcome.values.get(prepare),
            Some(&Value::Record(Record::new()))
        );
        assert_eq!(outcome.skipped().count(), 0);
        assert!(outcome.steps.iter().any(|s| s.path.ends_with("/after")));
    }
}
