//! Resolved component arguments.

use anyhow::{anyhow, Context};
use indexmap::IndexMap;

use super::{Record, Value};

/// The resolved arguments handed to a component body, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    values: IndexMap<String, Value>,
}

impl Inputs {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Get an argument or fail with a descriptive error.
    pub fn require(&self, name: &str) -> anyhow::Result<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| anyhow!("missing argument '{}'", name))
    }

    pub fn str(&self, name: &str) -> anyhow::Result<&str> {
        let value = self.require(name)?;
        value
            .as_str()
            .with_context(|| format!("argument '{}' is {}, not a string", name, value.kind()))
    }

    pub fn int(&self, name: &str) -> anyhow::Result<i64> {
        let value = self.require(name)?;
        value
            .as_int()
            .with_context(|| format!("argument '{}' is {}, not an integer", name, value.kind()))
    }

    pub fn float(&self, name: &str) -> anyhow::Result<f64> {
        let value = self.require(name)?;
        value
            .as_float()
            .with_context(|| format!("argument '{}' is {}, not a number", name, value.kind()))
    }

    pub fn bool(&self, name: &str) -> anyhow::Result<bool> {
        let value = self.require(name)?;
        value
            .as_bool()
            .with_context(|| format!("argument '{}' is {}, not a boolean", name, value.kind()))
    }

    pub fn record(&self, name: &str) -> anyhow::Result<&Record> {
        let value = self.require(name)?;
        value
            .as_record()
            .with_context(|| format!("argument '{}' is {}, not a record", name, value.kind()))
    }

    /// Arguments in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Argument values in parameter order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
