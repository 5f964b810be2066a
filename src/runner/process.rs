//! Out-of-process execution.
//!
//! Each component runs as a child process built from its deployment command.
//! Resolved inputs are passed as `--<name>=<value>` arguments, with records
//! JSON-encoded. The child reports its result on the last non-empty stdout
//! line as a JSON object: `{"output": <value>}`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{debug, warn};

use crate::error::{GraphError, Result};
use crate::graph::Component;
use crate::value::{Inputs, Value};

use super::backend::Backend;

/// Runs each component's deployment command as a child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessBackend {
    /// Working directory for children.
    cwd: Option<PathBuf>,

    /// Environment variables (merged with the parent's).
    env: HashMap<String, String>,
}

impl ProcessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

impl Backend for ProcessBackend {
    fn name(&self) -> &str {
        "process"
    }

    fn run_component(&mut self, component: &Component, inputs: &Inputs) -> Result<Value> {
        let (program, leading) = component
            .deployment()
            .command
            .split_first()
            .ok_or_else(|| GraphError::backend(component.name(), "no command is configured"))?;

        let start = Instant::now();
        let mut cmd = Command::new(program);
        cmd.args(leading);
        for (name, value) in inputs.iter() {
            cmd.arg(format_argument(name, value));
        }

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().map_err(|e| {
            GraphError::backend(
                component.name(),
                format!("failed to spawn '{}': {}", program, e),
            )
        })?;
        debug!(
            "[{}] child exited with {:?} after {:?}",
            component.name(),
            output.status.code(),
            start.elapsed()
        );

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !stderr.is_empty() {
            warn!("[{}] stderr: {}", component.name(), stderr);
        }

        if !output.status.success() {
            warn!(
                "[{}] exited with code {:?}",
                component.name(),
                output.status.code()
            );
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            let mut message = format!("process exited with code {}", code);
            if !stderr.is_empty() {
                message.push_str(": ");
                message.push_str(stderr);
            }
            return Err(GraphError::backend(component.name(), message));
        }

        parse_output(component.name(), &String::from_utf8_lossy(&output.stdout))
    }
}

/// Render one resolved input as a command-line argument.
pub fn format_argument(name: &str, value: &Value) -> String {
    match value {
        Value::String(s) => format!("--{}={}", name, s),
        Value::Record(_) => format!("--{}={}", name, value.to_json()),
        other => format!("--{}={}", name, other),
    }
}

/// Extract the result from a child's stdout.
pub fn parse_output(component: &str, stdout: &str) -> Result<Value> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .ok_or_else(|| GraphError::backend(component, "process produced no output"))?;

    let json: serde_json::Value = serde_json::from_str(line).map_err(|e| {
        GraphError::backend(component, format!("malformed output {:?}: {}", line, e))
    })?;
    let output = json
        .get("output")
        .ok_or_else(|| GraphError::backend(component, format!("no 'output' key in {}", line)))?;

    Value::from_json(output).map_err(|e| GraphError::backend(component, e.to_string()))
}
