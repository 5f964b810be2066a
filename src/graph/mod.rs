//! The traced graph model.
//!
//! - [`ComponentDef`] and [`PipelineDef`] describe steps and pipelines
//! - [`Tracer`] runs pipeline bodies once and records the nodes they create
//! - [`Component`] and [`Pipeline`] are the immutable nodes of a traced graph
//! - [`Condition`] guards conditional pipelines

pub mod component;
pub mod condition;
pub mod deployment;
pub mod naming;
pub mod pipeline;
pub mod tracer;

pub use component::{Component, ComponentDef, ComponentFn, Param};
pub use condition::{Comparator, Condition};
pub use deployment::{Accelerator, AcceleratorType, Deployment, Hardware};
pub use pipeline::{Args, Node, Pipeline, PipelineDef, PipelineFn, PipelineParam};
pub use tracer::Tracer;
