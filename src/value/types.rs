//! Declared value types and record schemas.
//!
//! Components declare their parameter and return types with [`ValueType`].
//! Records are fixed-arity, named collections of scalar types described by a
//! [`RecordSchema`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{GraphError, Result};

/// Schema-less tag for the closed set of value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    Record,
}

impl ValueKind {
    /// Check whether a value of this kind may stand where `other` is declared.
    ///
    /// Booleans are accepted wherever integers are.
    pub fn is_subtype_of(self, other: ValueKind) -> bool {
        self == other || matches!((self, other), (ValueKind::Boolean, ValueKind::Integer))
    }

    /// Check if this kind participates in numeric comparisons.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ValueKind::Integer | ValueKind::Float | ValueKind::Boolean
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::Record => "record",
        };
        write!(f, "{}", s)
    }
}

/// A declared type: one of the scalar types or a named record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    Record(RecordSchema),
}

impl ValueType {
    /// Build a record type, validating its fields.
    pub fn record<N, I>(name: impl Into<String>, fields: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, ValueType)>,
    {
        Ok(ValueType::Record(RecordSchema::new(name, fields)?))
    }

    /// The kind tag of this type.
    pub fn kind(&self) -> ValueKind {
        match self {
            ValueType::String => ValueKind::String,
            ValueType::Integer => ValueKind::Integer,
            ValueType::Float => ValueKind::Float,
            ValueType::Boolean => ValueKind::Boolean,
            ValueType::Record(_) => ValueKind::Record,
        }
    }

    /// Get the record schema, if this is a record type.
    pub fn as_record(&self) -> Option<&RecordSchema> {
        match self {
            ValueType::Record(schema) => Some(schema),
            _ => None,
        }
    }

    /// Check whether a value of type `actual` may be supplied where `self` is declared.
    ///
    /// Records match by arity and per-position type. Field names must agree
    /// unless `actual` is positional.
    pub fn accepts(&self, actual: &ValueType) -> bool {
        match (self, actual) {
            (ValueType::Record(declared), ValueType::Record(found)) => {
                if declared.len() != found.len() {
                    return false;
                }
                let positional = found.is_positional();
                declared
                    .fields()
                    .iter()
                    .zip(found.fields())
                    .all(|(d, a)| (positional || d.name == a.name) && d.ty.accepts(&a.ty))
            }
            (ValueType::Record(_), _) | (_, ValueType::Record(_)) => false,
            (declared, found) => found.kind().is_subtype_of(declared.kind()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Record(schema) => write!(f, "{}", schema),
            scalar => write!(f, "{}", scalar.kind()),
        }
    }
}

/// A single named field of a record schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,

    /// Field type (always scalar).
    #[serde(rename = "type")]
    pub ty: ValueType,
}

/// A fixed-arity, named record of scalar types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    name: String,
    fields: Vec<FieldDef>,
}

impl RecordSchema {
    /// Create a schema. Field types must be scalar and field names unique.
    pub fn new<N, I>(name: impl Into<String>, fields: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, ValueType)>,
    {
        let name = name.into();
        let mut seen = HashSet::new();
        let mut defs = Vec::new();

        for (field, ty) in fields {
            let field = field.into();
            if let ValueType::Record(_) = ty {
                return Err(GraphError::contract(format!(
                    "record '{}' field '{}' must be a string, integer, float or boolean",
                    name, field
                )));
            }
            if !seen.insert(field.clone()) {
                return Err(GraphError::contract(format!(
                    "record '{}' declares field '{}' twice",
                    name, field
                )));
            }
            defs.push(FieldDef { name: field, ty });
        }

        Ok(Self { name, fields: defs })
    }

    /// Build a schema without validation, for types inferred from values.
    pub(crate) fn inferred(fields: Vec<FieldDef>) -> Self {
        Self {
            name: "record".to_string(),
            fields,
        }
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Type of the named field.
    pub fn field_type(&self, name: &str) -> Option<&ValueType> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.ty)
    }

    /// Field at a position.
    pub fn field_at(&self, index: usize) -> Option<&FieldDef> {
        self.fields.get(index)
    }

    /// Field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// True when field names are `0`, `1`, ... in order.
    pub fn is_positional(&self) -> bool {
        is_positional(self.field_names())
    }
}

impl fmt::Display for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|field| format!("{}: {}", field.name, field.ty))
            .collect();
        write!(f, "{}({})", self.name, fields.join(", "))
    }
}

pub(crate) fn is_positional<'a>(names: impl Iterator<Item = &'a str>) -> bool {
    names.enumerate().all(|(i, name)| name == i.to_string())
}
