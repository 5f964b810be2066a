//! Translation of traced pipelines into workflow documents.
//!
//! Visibility follows execution: a task may read any task declared before it
//! in its own pipeline or in an enclosing one. Tasks inside a nested or
//! conditional pipeline are never visible outside it.

use indexmap::IndexMap;

use crate::error::{GraphError, Result};
use crate::expr::{infer_type, Expr};
use crate::graph::{Component, Condition, Node, Pipeline};
use crate::value::{FieldDef, Value, ValueType};

use super::workflow::{Argument, Task, TaskKind, WhenClause, WorkflowSpec};

/// A task reference, tagged with the nesting level that declared the task.
type Reference = (usize, String);

/// Compile a traced pipeline.
pub fn compile(pipeline: &Pipeline) -> Result<WorkflowSpec> {
    let mut compiler = Compiler {
        levels: vec![Vec::new()],
    };

    let mut refs = Vec::new();
    let inputs = compiler.arguments(pipeline.inputs(), &mut refs)?;
    let (tasks, output) = compiler.pipeline_body(pipeline, &mut refs)?;

    Ok(WorkflowSpec {
        name: pipeline.name().to_string(),
        inputs,
        tasks,
        output,
    })
}

#[derive(Clone, Copy)]
enum Pick<'a> {
    Name(&'a str),
    Position(usize),
}

struct Compiler {
    /// Names of already compiled tasks, one list per open pipeline.
    levels: Vec<Vec<String>>,
}

impl Compiler {
    fn pipeline_body(
        &mut self,
        pipeline: &Pipeline,
        refs: &mut Vec<Reference>,
    ) -> Result<(Vec<Task>, Option<Argument>)> {
        let level = self.levels.len() - 1;
        let mut tasks = Vec::with_capacity(pipeline.len());

        for child in pipeline.children() {
            let mut child_refs = Vec::new();
            let arguments = self.arguments(child.inputs(), &mut child_refs)?;

            let (kind, when) = match child {
                Node::Component(component) => (container(component), None),
                Node::Pipeline(nested) => {
                    let when = nested
                        .condition()
                        .map(|c| self.when_clause(c, &mut child_refs))
                        .transpose()?;
                    self.levels.push(Vec::new());
                    let body = self.pipeline_body(nested, &mut child_refs);
                    self.levels.pop();
                    let (tasks, output) = body?;
                    (TaskKind::Dag { tasks, output }, when)
                }
            };

            let mut dependencies = Vec::new();
            for (ref_level, name) in child_refs {
                if ref_level == level {
                    if !dependencies.contains(&name) {
                        dependencies.push(name);
                    }
                } else if ref_level < level {
                    refs.push((ref_level, name));
                }
            }

            self.levels[level].push(child.name().to_string());
            tasks.push(Task {
                name: child.name().to_string(),
                kind,
                arguments,
                dependencies,
                when,
            });
        }

        let mut output_refs = Vec::new();
        let output = pipeline
            .return_value()
            .map(|expr| self.argument(expr, &mut output_refs))
            .transpose()?;
        refs.extend(output_refs.into_iter().filter(|(l, _)| *l < level));

        Ok((tasks, output))
    }

    fn when_clause(&self, condition: &Condition, refs: &mut Vec<Reference>) -> Result<WhenClause> {
        Ok(WhenClause {
            left: self.argument(condition.left(), refs)?,
            operator: condition.comparator(),
            right: self.argument(condition.right(), refs)?,
        })
    }

    fn arguments(
        &self,
        exprs: &IndexMap<String, Expr>,
        refs: &mut Vec<Reference>,
    ) -> Result<IndexMap<String, Argument>> {
        let mut arguments = IndexMap::with_capacity(exprs.len());
        for (name, expr) in exprs {
            arguments.insert(name.clone(), self.argument(expr, refs)?);
        }
        Ok(arguments)
    }

    fn argument(&self, expr: &Expr, refs: &mut Vec<Reference>) -> Result<Argument> {
        match expr {
            Expr::Literal(value) => Ok(Argument::Literal(value.clone())),
            Expr::Component(c) => self.task_output(c.name(), None, refs),
            Expr::Pipeline(p) => self.task_output(p.name(), None, refs),
            Expr::Field { parent, name } => self.select(parent, Pick::Name(name), refs),
            Expr::Index { parent, index } => self.select(parent, Pick::Position(*index), refs),
            Expr::Record(fields) => {
                let mut record = IndexMap::with_capacity(fields.len());
                for (name, field) in fields {
                    record.insert(name.clone(), self.argument(field, refs)?);
                }
                Ok(Argument::Record(record))
            }
        }
    }

    fn select(&self, parent: &Expr, pick: Pick<'_>, refs: &mut Vec<Reference>) -> Result<Argument> {
        match parent {
            Expr::Component(c) => {
                let field = output_field(parent, &infer_type(parent)?, &pick)?;
                self.task_output(c.name(), Some(field), refs)
            }
            Expr::Pipeline(p) => {
                let field = output_field(parent, &infer_type(parent)?, &pick)?;
                self.task_output(p.name(), Some(field), refs)
            }
            other => {
                let picked = match self.argument(other, refs)? {
                    Argument::Record(mut fields) => match pick {
                        Pick::Name(name) => fields.shift_remove(name),
                        Pick::Position(index) => fields.shift_remove_index(index).map(|(_, v)| v),
                    },
                    Argument::Literal(Value::Record(record)) => {
                        let value = match pick {
                            Pick::Name(name) => record.get(name),
                            Pick::Position(index) => record.get_index(index).map(|(_, v)| v),
                        };
                        value.map(|v| Argument::Literal(v.clone()))
                    }
                    _ => None,
                };
                picked.ok_or_else(|| missing_field(other, &pick))
            }
        }
    }

    fn task_output(
        &self,
        task: &str,
        field: Option<String>,
        refs: &mut Vec<Reference>,
    ) -> Result<Argument> {
        let level = self
            .levels
            .iter()
            .rposition(|names| names.iter().any(|n| n == task))
            .ok_or_else(|| GraphError::NameResolution {
                name: task.to_string(),
            })?;
        refs.push((level, task.to_string()));
        Ok(Argument::TaskOutput {
            task: task.to_string(),
            field,
        })
    }
}

fn container(component: &Component) -> TaskKind {
    let deployment = component.deployment();
    let outputs = match component.return_type() {
        ValueType::Record(schema) => schema.fields().to_vec(),
        scalar => vec![FieldDef {
            name: "output".to_string(),
            ty: scalar.clone(),
        }],
    };
    TaskKind::Container {
        component: component.function().to_string(),
        image: deployment.base_image.clone(),
        packages: deployment.packages.clone(),
        resources: deployment.hardware.clone(),
        command: deployment.command.clone(),
        outputs,
    }
}

fn output_field(parent: &Expr, ty: &ValueType, pick: &Pick<'_>) -> Result<String> {
    let schema = ty.as_record().ok_or_else(|| {
        GraphError::contract(format!("'{}' of type {} is not a record", parent, ty))
    })?;
    match pick {
        Pick::Name(name) => schema.field_type(name).map(|_| name.to_string()),
        Pick::Position(index) => schema.field_at(*index).map(|f| f.name.clone()),
    }
    .ok_or_else(|| missing_field(parent, pick))
}

fn missing_field(parent: &Expr, pick: &Pick<'_>) -> GraphError {
    match pick {
        Pick::Name(name) => {
            GraphError::contract(format!("'{}' has no field '{}'", parent, name))
        }
        Pick::Position(index) => {
            GraphError::contract(format!("'{}' has no element {}", parent, index))
        }
    }
}
