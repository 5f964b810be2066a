//! Deferred references between graph nodes.
//!
//! While a pipeline is traced, component outputs do not exist yet. An [`Expr`]
//! stands in for them: a literal, a whole node, a field or element of a node's
//! record output, or a composite record of other expressions. Expressions are
//! typed with [`infer_type`] during tracing and turned into concrete values with
//! [`resolve`] during execution.

pub mod infer;
pub mod resolve;

pub use infer::infer_type;
pub use resolve::{resolve, ValueTable};

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::graph::{Component, Pipeline};
use crate::value::Value;

/// An input or return expression in a traced graph.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A concrete value known at trace time.
    Literal(Value),

    /// The whole output of a component.
    Component(Arc<Component>),

    /// The return value of a nested pipeline.
    Pipeline(Arc<Pipeline>),

    /// A named field of a record-valued parent.
    Field { parent: Box<Expr>, name: String },

    /// A positional element of a record-valued parent.
    Index { parent: Box<Expr>, index: usize },

    /// A record assembled from other expressions.
    Record(IndexMap<String, Expr>),
}

impl Expr {
    /// Wrap a literal value.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Lazy reference to a named field of this expression's record value.
    pub fn field(&self, name: impl Into<String>) -> Expr {
        Expr::Field {
            parent: Box::new(self.clone()),
            name: name.into(),
        }
    }

    /// Lazy reference to the element at `index` of this expression's record value.
    pub fn index(&self, index: usize) -> Expr {
        Expr::Index {
            parent: Box::new(self.clone()),
            index,
        }
    }

    /// Composite record of named expressions.
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Expr)>,
    {
        Expr::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Composite record with fields named `0`, `1`, ...
    pub fn tuple(items: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Record(
            items
                .into_iter()
                .enumerate()
                .map(|(i, e)| (i.to_string(), e))
                .collect(),
        )
    }

    /// True if the expression refers to a node that has not been computed yet.
    pub fn is_deferred(&self) -> bool {
        match self {
            Expr::Literal(_) => false,
            Expr::Component(_) | Expr::Pipeline(_) => true,
            Expr::Field { parent, .. } | Expr::Index { parent, .. } => parent.is_deferred(),
            Expr::Record(fields) => fields.values().any(Expr::is_deferred),
        }
    }

    /// Names of the nodes this expression reads, in first-seen order.
    pub fn referenced_nodes(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_nodes(&mut names);
        names
    }

    fn collect_nodes<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Component(c) => push_unique(names, c.name()),
            Expr::Pipeline(p) => push_unique(names, p.name()),
            Expr::Field { parent, .. } | Expr::Index { parent, .. } => parent.collect_nodes(names),
            Expr::Record(fields) => {
                for field in fields.values() {
                    field.collect_nodes(names);
                }
            }
        }
    }
}

fn push_unique<'a>(names: &mut Vec<&'a str>, name: &'a str) {
    if !names.contains(&name) {
        names.push(name);
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::String(s)) => write!(f, "{:?}", s),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Component(c) => write!(f, "{}", c.name()),
            Expr::Pipeline(p) => write!(f, "{}", p.name()),
            Expr::Field { parent, name } => write!(f, "{}.{}", parent, name),
            Expr::Index { parent, index } => write!(f, "{}[{}]", parent, index),
            Expr::Record(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Literal(s.into())
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::Literal(s.into())
    }
}

impl From<i64> for Expr {
    fn from(i: i64) -> Self {
        Expr::Literal(i.into())
    }
}

impl From<i32> for Expr {
    fn from(i: i32) -> Self {
        Expr::Literal(i.into())
    }
}

impl From<f64> for Expr {
    fn from(f: f64) -> Self {
        Expr::Literal(f.into())
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Literal(b.into())
    }
}

impl From<Arc<Component>> for Expr {
    fn from(c: Arc<Component>) -> Self {
        Expr::Component(c)
    }
}

impl From<&Arc<Component>> for Expr {
    fn from(c: &Arc<Component>) -> Self {
        Expr::Component(Arc::clone(c))
    }
}

impl From<Arc<Pipeline>> for Expr {
    fn from(p: Arc<Pipeline>) -> Self {
        Expr::Pipeline(p)
    }
}

impl From<&Arc<Pipeline>> for Expr {
    fn from(p: &Arc<Pipeline>) -> Self {
        Expr::Pipeline(Arc::clone(p))
    }
}

impl From<&Expr> for Expr {
    fn from(e: &Expr) -> Self {
        e.clone()
    }
}
