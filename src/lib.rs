//! Tracegraph - trace-time pipeline graphs with pluggable execution.
//!
//! Pipelines are described by ordinary Rust closures. Running a pipeline
//! body once through a [`Tracer`] records a graph of typed components
//! instead of computing anything. The traced graph can then be executed by
//! an [`Interpreter`] over any [`Backend`], or compiled into a workflow
//! document for an external engine.
//!
//! # Modules
//!
//! - [`compile`] - Translation of traced graphs into workflow documents
//! - [`config`] - Trace settings and settings file discovery
//! - [`dispatch`] - Operator overloads selected by operand type
//! - [`error`] - Error types and result aliases
//! - [`expr`] - Deferred references, type inference and resolution
//! - [`graph`] - Components, pipelines, conditions and the tracer
//! - [`runner`] - The interpreter and its backends
//! - [`value`] - Values, value types and record schemas
//!
//! # Example
//!
//! ```
//! use tracegraph::{run_local, ComponentDef, PipelineDef, Tracer, Value, ValueType};
//!
//! let greet = ComponentDef::new("greet")
//!     .param("name", ValueType::String)
//!     .returns(ValueType::String)
//!     .body(|inputs| Ok(Value::from(format!("Hello, {}!", inputs.str("name")?))));
//!
//! let main = PipelineDef::new("main").param("name").body(move |t, args| {
//!     let hello = t.call(&greet, [("name", args.get("name")?)])?;
//!     Ok(Some(hello.into()))
//! });
//!
//! let pipeline = Tracer::new().invoke(&main, [("name", "world")]).unwrap();
//! let outcome = run_local(&pipeline).unwrap();
//! assert_eq!(outcome.value, Some(Value::from("Hello, world!")));
//! ```

pub mod compile;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod expr;
pub mod graph;
pub mod runner;
pub mod value;

pub use config::TraceSettings;
pub use dispatch::{DispatchRegistry, Operator};
pub use error::{GraphError, Result};
pub use expr::{infer_type, resolve, Expr, ValueTable};
pub use graph::{
    Comparator, Component, ComponentDef, Condition, Hardware, Node, Pipeline, PipelineDef, Tracer,
};
pub use runner::{run_local, Backend, Interpreter, LocalBackend, ProcessBackend, RunOutcome};
pub use value::{Inputs, Record, Value, ValueType};
