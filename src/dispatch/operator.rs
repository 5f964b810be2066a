//! Operator tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The operators that can be applied to graph references.
///
/// Applying an operator never computes anything at trace time; it adds a
/// small component that performs the operation when the graph runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Equal,
    NotEqual,
    Contains,
    Length,
    ToString,
    ToInt,
    ToFloat,
}

impl Operator {
    /// All operators, in a stable order.
    pub const ALL: [Operator; 12] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::FloorDivide,
        Operator::Equal,
        Operator::NotEqual,
        Operator::Contains,
        Operator::Length,
        Operator::ToString,
        Operator::ToInt,
        Operator::ToFloat,
    ];

    /// The operator's name, also used as the base of synthesized node names.
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Subtract => "subtract",
            Operator::Multiply => "multiply",
            Operator::Divide => "divide",
            Operator::FloorDivide => "floor_divide",
            Operator::Equal => "equal",
            Operator::NotEqual => "not_equal",
            Operator::Contains => "contains",
            Operator::Length => "length",
            Operator::ToString => "to_string",
            Operator::ToInt => "to_int",
            Operator::ToFloat => "to_float",
        }
    }

    /// Parameter names used for the synthesized component's inputs.
    pub fn param_names(arity: usize) -> Vec<String> {
        ["a", "b", "c", "d"]
            .iter()
            .take(arity)
            .map(|s| s.to_string())
            .chain((4..arity).map(|i| format!("arg{}", i)))
            .collect()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
