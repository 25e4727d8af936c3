//! # JSON Configuration System
//!
//! Describes a mock core in JSON: how many ports it has, the register values
//! it starts with and the wiring directives applied at setup.
//!
//! ## Usage
//!
//! ```rust
//! use gpio_mock::system_config::CoreConfig;
//!
//! let config = CoreConfig::from_json_str(r#"{
//!     "name": "Loopback",
//!     "ports": 2,
//!     "directives": ["BitLink 0 1 3 1"]
//! }"#).expect("valid config");
//!
//! let mut system = config.build().expect("buildable config");
//! system.run(1);
//! assert_eq!(system.info().rule_count, 1);
//! ```
//!
//! ## Configuration File Format
//!
//! ```json
//! {
//!   "name": "Loopback",
//!   "description": "Port A outputs wired to port B inputs",
//!   "ports": 2,
//!   "initial_values": [
//!     {"group": "Direction", "port": 0, "value": 255}
//!   ],
//!   "directives": [
//!     "BitLink 0 1 3 1",
//!     "BitLink 0 2 3 2"
//!   ]
//! }
//! ```
//!
//! Groups are named as in [`RegisterGroup`]. Values written to set/clear
//! groups are latched until the first tick, as with any other write.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;
use crate::mock_core::MockCore;
use crate::types::{RegisterGroup, RegisterValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub ports: usize,
    #[serde(default)]
    pub initial_values: Vec<InitialValue>,
    #[serde(default)]
    pub directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialValue {
    pub group: RegisterGroup,
    pub port: usize,
    pub value: RegisterValue,
}

impl CoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Create a core, write the initial values and apply every directive in
    /// order. Fails on the first rejected entry.
    pub fn build(&self) -> Result<ConfiguredCore, ConfigError> {
        if self.ports == 0 {
            return Err(ConfigError::InvalidPortCount(self.ports));
        }

        let mut core = MockCore::new(self.ports);

        for initial in &self.initial_values {
            let port = core
                .port(initial.port)
                .map_err(|source| ConfigError::InitialValue {
                    group: initial.group.to_string(),
                    port: initial.port,
                    source,
                })?;
            core.write(initial.group, port, initial.value);
        }

        for (position, directive) in self.directives.iter().enumerate() {
            core.apply_directive(directive)
                .map_err(|source| ConfigError::Directive { position, source })?;
        }

        info!(
            name = %self.name,
            ports = self.ports,
            rules = core.rule_count(),
            "core configured"
        );

        Ok(ConfiguredCore {
            config: self.clone(),
            core,
        })
    }
}

/// Load and build a core from a JSON file.
pub fn create_from_json(path: impl AsRef<Path>) -> Result<ConfiguredCore, ConfigError> {
    CoreConfig::load(path)?.build()
}

/// A core built from a configuration, kept together with that configuration.
#[derive(Debug)]
pub struct ConfiguredCore {
    config: CoreConfig,
    core: MockCore,
}

impl ConfiguredCore {
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn core(&self) -> &MockCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut MockCore {
        &mut self.core
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.core.tick();
        }
    }

    pub fn info(&self) -> CoreInfo {
        CoreInfo {
            name: self.config.name.clone(),
            description: self.config.description.clone(),
            port_count: self.core.port_count(),
            register_count: self.core.bank().register_count(),
            rule_count: self.core.rule_count(),
            tick_count: self.core.tick_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreInfo {
    pub name: String,
    pub description: String,
    pub port_count: usize,
    pub register_count: usize,
    pub rule_count: usize,
    pub tick_count: u64,
}
