//! Execution-time resolution of expressions against a local value table.

use indexmap::IndexMap;

use crate::error::{GraphError, Result};
use crate::value::{Record, Value};

use super::Expr;

/// Per-invocation mapping from node name to computed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    values: IndexMap<String, Value>,
}

impl ValueTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a computed value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A copy of this table extended with `entries`, which win on collision.
    pub fn merged<'a>(&self, entries: impl IntoIterator<Item = (&'a String, &'a Value)>) -> Self {
        let mut table = self.clone();
        for (name, value) in entries {
            table.insert(name.clone(), value.clone());
        }
        table
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ValueTable {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Resolve `expr` to a concrete value using `table`.
///
/// Node references are looked up by name; a missing name is a
/// [`GraphError::NameResolution`] error. Resolution never modifies the table.
pub fn resolve(table: &ValueTable, expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Component(component) => lookup(table, component.name()),
        Expr::Pipeline(pipeline) => lookup(table, pipeline.name()),
        Expr::Field { parent, name } => {
            let value = resolve(table, parent)?;
            value
                .as_record()
                .and_then(|record| record.get(name))
                .cloned()
                .ok_or_else(|| GraphError::NameResolution {
                    name: format!("{}.{}", parent, name),
                })
        }
        Expr::Index { parent, index } => {
            let value = resolve(table, parent)?;
            value
                .as_record()
                .and_then(|record| record.get_index(*index))
                .map(|(_, v)| v.clone())
                .ok_or_else(|| GraphError::NameResolution {
                    name: format!("{}[{}]", parent, index),
                })
        }
        Expr::Record(fields) => {
            let mut record = Record::new();
            for (name, field) in fields {
                record.insert(name.clone(), resolve(table, field)?);
            }
            Ok(Value::Record(record))
        }
    }
}

fn lookup(table: &ValueTable, name: &str) -> Result<Value> {
    table
        .get(name)
        .cloned()
        .ok_or_else(|| GraphError::NameResolution {
            name: name.to_string(),
        })
}
