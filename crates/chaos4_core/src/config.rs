//! Run configuration, loadable from TOML.
//!
//! ```toml
//! [integration]
//! start = 0.0
//! end = 500.0
//! dt = 0.01
//! method = "rk4"
//!
//! [section]
//! index = 2
//! threshold = 0.0
//! direction = "increasing"
//! ```

use crate::engine::TimeSpan;
use crate::error::{Result, SolverError};
use crate::section::{CrossingDirection, Hyperplane};
use crate::solvers::Method;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct IntegrationConfig {
    pub start: f64,
    pub end: f64,
    pub dt: f64,
    pub method: Method,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 500.0,
            dt: 0.01,
            method: Method::Rk4,
        }
    }
}

impl IntegrationConfig {
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }

    /// Applies the engine's parameter checks without integrating anything.
    pub fn validate(&self) -> Result<usize> {
        self.span().step_count(self.dt)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SectionConfig {
    pub index: usize,
    pub threshold: f64,
    pub direction: CrossingDirection,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            index: 2,
            threshold: 0.0,
            direction: CrossingDirection::Increasing,
        }
    }
}

impl SectionConfig {
    pub fn hyperplane(&self) -> Result<Hyperplane> {
        Hyperplane::new(self.index, self.threshold, self.direction)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub integration: IntegrationConfig,
    pub section: SectionConfig,
}

impl RunConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RunConfig = toml::from_str(content)
            .map_err(|err| SolverError::invalid(format!("Failed to parse configuration: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| {
            SolverError::invalid(format!("Failed to serialize configuration: {err}"))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.integration.validate()?;
        self.section.hyperplane()?;
        Ok(())
    }
}
