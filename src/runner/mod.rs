//! Pipeline execution.
//!
//! The [`Interpreter`] walks a traced pipeline in declaration order and hands
//! each leaf component to a [`Backend`]:
//! - [`LocalBackend`] calls component bodies in-process
//! - [`ProcessBackend`] runs each component's deployment command as a child process

pub mod backend;
pub mod interpreter;
pub mod local;
pub mod process;

pub use backend::Backend;
pub use interpreter::{Interpreter, RunOutcome, StepRecord, StepStatus};
pub use local::LocalBackend;
pub use process::ProcessBackend;

use crate::error::Result;
use crate::graph::Pipeline;

/// Run a pipeline in-process.
pub fn run_local(pipeline: &Pipeline) -> Result<RunOutcome> {
    Interpreter::new(LocalBackend).run(pipeline)
}
