//! Conversion of raw backend output into declared values.
//!
//! Backends hand back whatever their transport produces: an in-process
//! [`Value`], or JSON read from a child process. [`reconstruct`] checks that
//! result against the declared return type and rebuilds named records from
//! positional output.

use crate::error::{GraphError, Result};

use super::{Record, Value, ValueType};

impl Value {
    /// Convert raw JSON into a value. Arrays become positional records.
    pub fn from_json(json: &serde_json::Value) -> Result<Value> {
        match json {
            serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(GraphError::contract(format!(
                        "number {} is out of range",
                        n
                    )))
                }
            }
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            serde_json::Value::Array(items) => Ok(Value::Record(Record::positional(
                items.iter().map(Value::from_json).collect::<Result<Vec<_>>>()?,
            ))),
            serde_json::Value::Object(map) => {
                let mut record = Record::new();
                for (name, item) in map {
                    record.insert(name.clone(), Value::from_json(item)?);
                }
                Ok(Value::Record(record))
            }
            serde_json::Value::Null => Err(GraphError::contract(
                "null is not a valid value; expected string, integer, float, boolean or record",
            )),
        }
    }

    /// Encode as JSON. Positional records become arrays.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Record(record) if record.is_positional() => {
                serde_json::Value::Array(record.values().map(Value::to_json).collect())
            }
            Value::Record(record) => serde_json::Value::Object(
                record
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
        }
    }
}

/// Check `raw` against `declared`, rebuilding named records from positional output.
///
/// Integers widen to a declared float and booleans narrow to a declared
/// integer. Anything else that disagrees with the declaration is an
/// [`GraphError::OutputContract`] error naming `owner`.
pub fn reconstruct(owner: &str, declared: &ValueType, raw: Value) -> Result<Value> {
    let mismatch = |found: String| GraphError::OutputContract {
        component: owner.to_string(),
        expected: declared.to_string(),
        found,
    };

    match (declared, raw) {
        (ValueType::Record(schema), Value::Record(record)) => {
            if record.len() != schema.len() {
                return Err(mismatch(format!("a record with {} fields", record.len())));
            }
            let positional = record.is_positional();
            let mut rebuilt = Record::new();
            for (field, (name, value)) in schema.fields().iter().zip(record) {
                if !positional && field.name != name {
                    return Err(mismatch(format!("a record with field '{}'", name)));
                }
                rebuilt.insert(field.name.clone(), reconstruct(owner, &field.ty, value)?);
            }
            Ok(Value::Record(rebuilt))
        }
        (ValueType::Float, Value::Integer(i)) => Ok(Value::Float(i as f64)),
        (ValueType::Integer, Value::Boolean(b)) => Ok(Value::Integer(i64::from(b))),
        (declared, raw) if declared.kind() == raw.kind() && declared.as_record().is_none() => {
            Ok(raw)
        }
        (_, raw) => Err(mismatch(raw.kind().to_string())),
    }
}
