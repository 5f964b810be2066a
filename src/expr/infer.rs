//! Trace-time type inference for expressions.

use crate::error::{GraphError, Result};
use crate::value::{FieldDef, RecordSchema, ValueType};

use super::Expr;

/// Infer the type an expression will have once its nodes are computed.
///
/// Field and index references require their parent to be record-typed.
pub fn infer_type(expr: &Expr) -> Result<ValueType> {
    match expr {
        Expr::Literal(value) => Ok(value.value_type()),
        Expr::Component(component) => Ok(component.return_type().clone()),
        Expr::Pipeline(pipeline) => pipeline.return_type().cloned().ok_or_else(|| {
            GraphError::contract(format!(
                "pipeline '{}' has no return value and cannot be used as an input",
                pipeline.name()
            ))
        }),
        Expr::Field { parent, name } => {
            let parent_type = infer_type(parent)?;
            let schema = record_schema(parent, &parent_type)?;
            schema.field_type(name).cloned().ok_or_else(|| {
                GraphError::contract(format!(
                    "'{}' of type {} has no field '{}'",
                    parent, parent_type, name
                ))
            })
        }
        Expr::Index { parent, index } => {
            let parent_type = infer_type(parent)?;
            let schema = record_schema(parent, &parent_type)?;
            schema
                .field_at(*index)
                .map(|field| field.ty.clone())
                .ok_or_else(|| {
                    GraphError::contract(format!(
                        "index {} is out of range for '{}' of type {}",
                        index, parent, parent_type
                    ))
                })
        }
        Expr::Record(fields) => {
            let mut defs = Vec::with_capacity(fields.len());
            for (name, field) in fields {
                let ty = infer_type(field)?;
                if ty.as_record().is_some() {
                    return Err(GraphError::contract(format!(
                        "record field '{}' must be a scalar, found {}",
                        name, ty
                    )));
                }
                defs.push(FieldDef {
                    name: name.clone(),
                    ty,
                });
            }
            Ok(ValueType::Record(RecordSchema::inferred(defs)))
        }
    }
}

fn record_schema<'a>(parent: &Expr, ty: &'a ValueType) -> Result<&'a RecordSchema> {
    ty.as_record().ok_or_else(|| {
        GraphError::contract(format!(
            "'{}' has type {}; only record outputs have fields",
            parent, ty
        ))
    })
}
