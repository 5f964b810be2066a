//! Deployment metadata attached to components.
//!
//! None of this is interpreted by the tracer or the interpreter. Backends that
//! package or schedule components read it; the in-process backend ignores it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Accelerator models that can be requested for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcceleratorType {
    #[serde(rename = "nvidia-tesla-t4")]
    T4,
    #[serde(rename = "nvidia-tesla-v100")]
    V100,
    #[serde(rename = "nvidia-tesla-p4")]
    P4,
    #[serde(rename = "nvidia-tesla-p100")]
    P100,
    #[serde(rename = "nvidia-tesla-k80")]
    K80,
}

impl AcceleratorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceleratorType::T4 => "nvidia-tesla-t4",
            AcceleratorType::V100 => "nvidia-tesla-v100",
            AcceleratorType::P4 => "nvidia-tesla-p4",
            AcceleratorType::P100 => "nvidia-tesla-p100",
            AcceleratorType::K80 => "nvidia-tesla-k80",
        }
    }
}

impl fmt::Display for AcceleratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Requested accelerators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Accelerator {
    /// Number of accelerators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Accelerator model
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AcceleratorType>,
}

/// Hardware resources for a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// Requested CPU cores. A trailing "m" means milli-CPUs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<String>,

    /// Requested memory, e.g. "16G"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    /// Requested accelerators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator: Option<Accelerator>,
}

impl Hardware {
    pub fn with_cpus(mut self, cpus: impl Into<String>) -> Self {
        self.cpus = Some(cpus.into());
        self
    }

    pub fn with_memory(mut self, memory: impl Into<String>) -> Self {
        self.memory = Some(memory.into());
        self
    }

    pub fn with_accelerator(mut self, count: u32, kind: AcceleratorType) -> Self {
        self.accelerator = Some(Accelerator {
            count: Some(count),
            kind: Some(kind),
        });
        self
    }

    /// True when an accelerator is requested.
    pub fn wants_accelerator(&self) -> bool {
        self.accelerator
            .as_ref()
            .is_some_and(|a| a.count.unwrap_or(0) > 0 || a.kind.is_some())
    }

    /// True when no resource is requested.
    pub fn is_empty(&self) -> bool {
        self.cpus.is_none() && self.memory.is_none() && self.accelerator.is_none()
    }
}

/// Packaging and scheduling hints for a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    /// Container base image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_image: Option<String>,

    /// Extra packages to install in the image
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,

    /// Hardware resources
    #[serde(skip_serializing_if = "Hardware::is_empty")]
    pub hardware: Hardware,

    /// Program and leading arguments for the process backend
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}
