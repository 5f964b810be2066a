//! Workflow document types.
//!
//! A [`WorkflowSpec`] is the compiled, serializable form of a traced
//! pipeline. Tasks keep trace order; dependencies are annotations for the
//! target system and never reorder tasks.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::{Comparator, Hardware};
use crate::value::{FieldDef, Value};

/// A compiled pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    /// Root pipeline name.
    pub name: String,

    /// Arguments the root pipeline was traced with.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, Argument>,

    /// Tasks in trace order.
    pub tasks: Vec<Task>,

    /// The root pipeline's return value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Argument>,
}

impl WorkflowSpec {
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| GraphError::Other(e.into()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| GraphError::Other(e.into()))
    }

    /// Find a top-level task by name.
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

/// One node of the compiled graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,

    #[serde(flatten)]
    pub kind: TaskKind,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub arguments: IndexMap<String, Argument>,

    /// Sibling tasks this task reads from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Guard evaluated by the target system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<WhenClause>,
}

/// What a task runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    /// A leaf component.
    Container {
        component: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        packages: Vec<String>,

        #[serde(default, skip_serializing_if = "Hardware::is_empty")]
        resources: Hardware,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        command: Vec<String>,

        /// Declared outputs. Scalar returns have one output named `output`.
        outputs: Vec<FieldDef>,
    },

    /// A nested or conditional pipeline.
    Dag {
        tasks: Vec<Task>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<Argument>,
    },
}

/// A task argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Argument {
    /// A value known at trace time.
    Literal(Value),

    /// The output of another task, or one field of it.
    TaskOutput {
        task: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// A record assembled from other arguments.
    Record(IndexMap<String, Argument>),
}

/// A deferred comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenClause {
    pub left: Argument,
    pub operator: Comparator,
    pub right: Argument,
}
