//! Compilation of traced pipelines into workflow documents.
//!
//! Instead of running a pipeline, [`compile`] translates it into a
//! [`WorkflowSpec`] that an external workflow engine can execute. Conditions
//! are not evaluated here; they become `when` clauses on the guarded tasks.
//!
//! # Example
//!
//! ```
//! use tracegraph::compile::compile;
//! use tracegraph::{ComponentDef, PipelineDef, Tracer, ValueType};
//!
//! let greet = ComponentDef::new("greet")
//!     .param("name", ValueType::String)
//!     .returns(ValueType::String);
//! let main = PipelineDef::new("main").body(move |t, _| {
//!     let hello = t.call(&greet, [("name", "world")])?;
//!     Ok(Some(hello.into()))
//! });
//!
//! let pipeline = Tracer::new().invoke(&main, Vec::<(String, tracegraph::Expr)>::new()).unwrap();
//! let yaml = compile(&pipeline).unwrap().to_yaml().unwrap();
//! assert!(yaml.contains("type: container"));
//! ```

pub mod compiler;
pub mod workflow;

pub use compiler::compile;
pub use workflow::{Argument, Task, TaskKind, WhenClause, WorkflowSpec};
