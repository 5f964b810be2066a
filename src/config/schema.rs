//! Settings schema.
//!
//! This module contains the struct that maps to the `.tracegraph.yml`
//! settings file.

use serde::{Deserialize, Serialize};

use crate::graph::{Deployment, Hardware};

/// Settings that shape how pipelines are traced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Base image for components that do not name one
    pub default_base_image: String,

    /// Base image for components that request an accelerator and name no image
    pub accelerator_base_image: String,

    /// Resource profile stamped on components synthesized from operators
    pub operator_hardware: Hardware,

    /// Number of hex characters in generated name suffixes
    pub name_suffix_length: usize,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            default_base_image: "tracegraph/runtime:latest".to_string(),
            accelerator_base_image: "tracegraph/runtime:latest-cuda".to_string(),
            operator_hardware: Hardware::default().with_cpus("1").with_memory("1G"),
            name_suffix_length: 8,
        }
    }
}

impl TraceSettings {
    /// Fill in the base image of a component's deployment.
    pub fn resolve_deployment(&self, declared: &Deployment) -> Deployment {
        let mut deployment = declared.clone();
        if deployment.base_image.is_none() {
            let image = if deployment.hardware.wants_accelerator() {
                &self.accelerator_base_image
            } else {
                &self.default_base_image
            };
            deployment.base_image = Some(image.clone());
        }
        deployment
    }

    /// Deployment for operator-synthesized components.
    pub fn operator_deployment(&self) -> Deployment {
        Deployment {
            base_image: Some(self.default_base_image.clone()),
            hardware: self.operator_hardware.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AcceleratorType;

    #[test]
    fn defaults_are_sensible() {
        let settings = TraceSettings::default();
        assert_eq!(settings.name_suffix_length, 8);
        assert_eq!(settings.operator_hardware.cpus.as_deref(), Some("1"));
        assert!(settings.default_base_image.ends_with(":latest"));
    }

    #[test]
    fn resolve_deployment_uses_default_image() {
        let settings = TraceSettings::default();
        let deployment = settings.resolve_deployment(&Deployment::default());
        assert_eq!(
            deployment.base_image.as_deref(),
            Some("tracegraph/runtime:latest")
        );
    }

    #[test]
    fn resolve_deployment_uses_accelerator_image() {
        let settings = TraceSettings::default();
        let declared = Deployment {
            hardware: Hardware::default().with_accelerator(1, AcceleratorType::T4),
            ..Default::default()
        };
        let deployment = settings.resolve_deployment(&declared);
        assert_eq!(
            deployment.base_image.as_deref(),
            Some("tracegraph/runtime:latest-cuda")
        );
    }

    #[test]
    fn resolve_deployment_keeps_explicit_image() {
        let settings = TraceSettings::default();
        let declared = Deployment {
            base_image: Some("python:3.11".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.resolve_deployment(&declared).base_image.as_deref(),
            Some("python:3.11")
        );
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let settings: TraceSettings = serde_yaml::from_str("name_suffix_length: 4").unwrap();
        assert_eq!(settings.name_suffix_length, 4);
        assert_eq!(
            settings.default_base_image,
            TraceSettings::default().default_base_image
        );
    }
}
