//! Ordered overload registry with first-match selection.
//!
//! Each [`Operator`] owns an ordered list of [`Overload`]s. Selection infers the
//! operand types and picks the first overload whose arity matches and whose
//! parameter kinds accept every operand kind.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{GraphError, Result};
use crate::value::{Value, ValueKind, ValueType};

use super::builtins;
use super::operator::Operator;

/// Implementation of one operator overload.
pub type OperatorFn = Arc<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// Parameter kinds of an overload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<ValueKind>,
}

impl Signature {
    pub fn new(params: impl IntoIterator<Item = ValueKind>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }

    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// True if every operand kind may stand where the matching parameter is declared.
    pub fn accepts(&self, operands: &[ValueKind]) -> bool {
        self.params.len() == operands.len()
            && self
                .params
                .iter()
                .zip(operands)
                .all(|(declared, found)| found.is_subtype_of(*declared))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.params.iter().map(|k| k.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// One registered implementation of an operator.
#[derive(Clone)]
pub struct Overload {
    signature: Signature,
    returns: ValueType,
    implementation: OperatorFn,
}

impl Overload {
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Declared return type of this implementation.
    pub fn returns(&self) -> &ValueType {
        &self.returns
    }

    /// Shared handle to the implementation.
    pub fn implementation(&self) -> OperatorFn {
        Arc::clone(&self.implementation)
    }

    /// Invoke the implementation directly.
    pub fn call(&self, args: &[Value]) -> anyhow::Result<Value> {
        (self.implementation)(args)
    }
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overload")
            .field("signature", &self.signature)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Registry of operator overloads.
#[derive(Clone, Default)]
pub struct DispatchRegistry {
    overloads: HashMap<Operator, Vec<Overload>>,
}

impl DispatchRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in overloads.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    /// Append an overload. Earlier registrations keep priority.
    pub fn register<F>(
        &mut self,
        operator: Operator,
        params: impl IntoIterator<Item = ValueKind>,
        returns: ValueType,
        implementation: F,
    ) where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.overloads.entry(operator).or_default().push(Overload {
            signature: Signature::new(params),
            returns,
            implementation: Arc::new(implementation),
        });
    }

    /// Registered overloads for an operator, in registration order.
    pub fn overloads(&self, operator: Operator) -> &[Overload] {
        self.overloads
            .get(&operator)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check if any overload is registered for an operator.
    pub fn contains(&self, operator: Operator) -> bool {
        !self.overloads(operator).is_empty()
    }

    /// Select the first overload accepting `operand_types`.
    pub fn select(&self, operator: Operator, operand_types: &[ValueType]) -> Result<&Overload> {
        let kinds: Vec<ValueKind> = operand_types.iter().map(ValueType::kind).collect();
        let candidates = self.overloads(operator);

        candidates
            .iter()
            .find(|overload| overload.signature.accepts(&kinds))
            .ok_or_else(|| GraphError::DispatchResolution {
                operator: operator.to_string(),
                attempted: Signature::new(kinds).to_string(),
                available: candidates
                    .iter()
                    .map(|o| o.signature.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl fmt::Debug for DispatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .overloads
            .iter()
            .map(|(op, list)| (op.name(), list.len()))
            .collect();
        f.debug_struct("DispatchRegistry")
            .field("overloads", &counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_new_is_empty() {
        let registry = DispatchRegistry::new();
        assert!(!registry.contains(Operator::Add));
        assert!(registry.overloads(Operator::Add).is_empty());
    }

    #[test]
    fn builtins_cover_every_operator() {
        let registry = DispatchRegistry::with_builtins();
        for op in Operator::ALL {
            assert!(registry.contains(op), "missing builtins for {op}");
        }
    }

    #[test]
    fn select_first_match_in_registration_order() {
        let mut registry = DispatchRegistry::new();
        registry.register(
            Operator::Add,
            [ValueKind::Integer, ValueKind::Integer],
            ValueType::Integer,
            |_| Ok(Value::from("first")),
        );
        registry.register(
            Operator::Add,
            [ValueKind::Integer, ValueKind::Integer],
            ValueType::Integer,
            |_| Ok(Value::from("second")),
        );

        let overload = registry
            .select(Operator::Add, &[ValueType::Integer, ValueType::Integer])
            .unwrap();
        assert_eq!(overload.call(&[]).unwrap(), Value::from("first"));
    }

    #[test]
    fn booleans_match_integer_slots() {
        let registry = DispatchRegistry::with_builtins();
        let overload = registry
            .select(Operator::Add, &[ValueType::Boolean, ValueType::Integer])
            .unwrap();
        assert_eq!(
            overload.signature().params(),
            &[ValueKind::Integer, ValueKind::Integer]
        );
    }

    #[test]
    fn no_match_reports_alternatives() {
        let registry = DispatchRegistry::with_builtins();
        let err = registry
            .select(Operator::Add, &[ValueType::String, ValueType::Integer])
            .unwrap_err();
        match err {
            GraphError::DispatchResolution {
                operator,
                attempted,
                available,
            } => {
                assert_eq!(operator, "add");
                assert_eq!(attempted, "(string, integer)");
                assert!(available.starts_with("(string, string), (integer, integer)"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn arity_mismatch_does_not_match() {
        let registry = DispatchRegistry::with_builtins();
        assert!(registry
            .select(Operator::Length, &[ValueType::String, ValueType::String])
            .is_err());
    }

    #[test]
    fn selection_is_stable_after_appending() {
        let mut registry = DispatchRegistry::with_builtins();
        let before = registry
            .select(Operator::Add, &[ValueType::Float, ValueType::Integer])
            .unwrap()
            .signature()
            .clone();
        registry.register(
            Operator::Add,
            [ValueKind::Float, ValueKind::Integer],
            ValueType::String,
            |_| Ok(Value::from("shadowed")),
        );
        let after = registry
            .select(Operator::Add, &[ValueType::Float, ValueType::Integer])
            .unwrap();
        assert_eq!(after.signature(), &before);
        assert_eq!(after.returns(), &ValueType::Float);
    }
}
