//! Guards for conditional pipelines.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{GraphError, Result};
use crate::expr::{infer_type, resolve, Expr, ValueTable};
use crate::value::{Value, ValueKind};

/// Two-operand comparison used by a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Comparator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::Less => "<",
            Comparator::LessOrEqual => "<=",
            Comparator::Greater => ">",
            Comparator::GreaterOrEqual => ">=",
        }
    }

    /// Equality comparators accept operands of any kind.
    pub fn is_equality(&self) -> bool {
        matches!(self, Comparator::Equal | Comparator::NotEqual)
    }

    /// Compare two concrete values.
    pub fn evaluate(&self, left: &Value, right: &Value) -> Result<bool> {
        match self {
            Comparator::Equal => Ok(left.loosely_equals(right)),
            Comparator::NotEqual => Ok(!left.loosely_equals(right)),
            ordering => {
                let found = left.compare(right).ok_or_else(|| {
                    GraphError::contract(format!(
                        "cannot order {} and {} with '{}'",
                        left.kind(),
                        right.kind(),
                        ordering.symbol()
                    ))
                })?;
                Ok(match ordering {
                    Comparator::Less => found == Ordering::Less,
                    Comparator::LessOrEqual => found != Ordering::Greater,
                    Comparator::Greater => found == Ordering::Greater,
                    _ => found != Ordering::Less,
                })
            }
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A comparison between two operands, at least one of them deferred.
#[derive(Debug, Clone)]
pub struct Condition {
    left: Expr,
    right: Expr,
    comparator: Comparator,
}

impl Condition {
    /// Build a condition, validating its operands at trace time.
    pub fn new(
        left: impl Into<Expr>,
        right: impl Into<Expr>,
        comparator: Comparator,
    ) -> Result<Self> {
        let left = left.into();
        let right = right.into();

        if !left.is_deferred() && !right.is_deferred() {
            return Err(GraphError::contract(format!(
                "condition {} {} {} has no traceable operand",
                left, comparator, right
            )));
        }

        // Equality accepts any operand kinds, so only ordering needs the types.
        if !comparator.is_equality() {
            let left_kind = infer_type(&left)?.kind();
            let right_kind = infer_type(&right)?.kind();
            if !orderable(left_kind, right_kind) {
                return Err(GraphError::contract(format!(
                    "'{}' needs two numeric or two string operands, found {} and {}",
                    comparator, left_kind, right_kind
                )));
            }
        }

        Ok(Self {
            left,
            right,
            comparator,
        })
    }

    pub fn equal(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Self> {
        Self::new(left, right, Comparator::Equal)
    }

    pub fn not_equal(left: impl Into<Expr>, right: impl Into<Expr>) -> Result<Self> {
        Self::new(left, right, Comparator::NotEqual)
    }

    pub fn left(&self) -> &Expr {
        &self.left
    }

    pub fn right(&self) -> &Expr {
        &self.right
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Resolve both operands against `table` and compare them.
    pub fn evaluate(&self, table: &ValueTable) -> Result<bool> {
        let left = resolve(table, &self.left)?;
        let right = resolve(table, &self.right)?;
        self.comparator.evaluate(&left, &right)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.comparator, self.right)
    }
}

fn orderable(left: ValueKind, right: ValueKind) -> bool {
    (left.is_numeric() && right.is_numeric())
        || (left == ValueKind::String && right == ValueKind::String)
}
