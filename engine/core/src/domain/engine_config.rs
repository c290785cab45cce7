// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Engine Configuration Types
//!
//! Kubernetes-style manifest describing how the engine is wired.
//!
//! # Format
//!
//! ```yaml
//! apiVersion: loadout.dev/v1
//! kind: EngineConfig
//! metadata:
//!   name: production
//! spec:
//!   storage:
//!     backend: postgres
//!     connectionString: "env:DATABASE_URL"
//!   tenants:
//!     - id: "6f1c2b1e-8d0a-4c52-9a55-2d3f5a0e7b11"
//!       integrationInstalled: true
//!       policy:
//!         agentTools:
//!           enabled: true
//!   observability:
//!     logLevel: info
//!     logFormat: compact
//! ```
//!
//! # Discovery Order
//!
//! 1. Explicit `--config` path (hard error if unreadable)
//! 2. `LOADOUT_CONFIG_PATH` environment variable
//! 3. `./loadout-config.yaml`
//! 4. `~/.loadout/config.yaml`
//! 5. `/etc/loadout/config.yaml`
//! 6. Built-in defaults

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::caller::TenantId;
use super::tenant_policy::TenantPolicyConfiguration;

pub const API_VERSION: &str = "loadout.dev/v1";
pub const KIND: &str = "EngineConfig";

pub type EngineConfig = EngineConfigManifest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfigManifest {
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: EngineConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfigSpec {
    #[serde(default)]
    pub storage: StorageConfig,

    /// Seed records applied at startup on either backend. A policy seed is
    /// written only for tenants the store has no record for; integration
    /// presence always comes from here.
    #[serde(default)]
    pub tenants: Vec<TenantSeed>,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Postgres,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str("in-memory"),
            Self::Postgres => f.write_str("postgres"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Literal URL or `env:VAR_NAME`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            connection_string: None,
            max_connections: default_max_connections(),
        }
    }
}

impl StorageConfig {
    /// Resolve `env:VAR` indirection. `None` when unset or the variable is missing.
    pub fn resolved_connection_string(&self) -> Option<String> {
        let raw = self.connection_string.as_deref()?;
        match raw.strip_prefix("env:") {
            Some(var) => std::env::var(var).ok(),
            None => Some(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSeed {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Absent means the tenant stays unconfigured and resolves through defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<TenantPolicyConfiguration>,

    #[serde(default)]
    pub integration_installed: bool,
}

impl TenantSeed {
    pub fn tenant_id(&self) -> anyhow::Result<TenantId> {
        TenantId::from_string(&self.id)
            .map_err(|e| anyhow::anyhow!("Invalid tenant id '{}': {}", self.id, e))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Compact,
        }
    }
}

impl Default for EngineConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "default".to_string(),
                version: None,
                labels: None,
            },
            spec: EngineConfigSpec::default(),
        }
    }
}

impl EngineConfigManifest {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover a configuration file using the documented precedence order.
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("LOADOUT_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./loadout-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".loadout").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/loadout/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load from the explicit path if given, otherwise discover, otherwise defaults.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Environment overrides for container deployments.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("LOADOUT_DATABASE_URL") {
            tracing::info!("Environment override: LOADOUT_DATABASE_URL (backend=postgres)");
            self.spec.storage.backend = StorageBackend::Postgres;
            self.spec.storage.connection_string = Some(url);
        }

        if let Ok(level) = std::env::var("LOADOUT_LOG_LEVEL") {
            match level.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    tracing::info!("Environment override: LOADOUT_LOG_LEVEL={}", level);
                    self.spec.observability.log_level = level.to_lowercase();
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for LOADOUT_LOG_LEVEL: '{}'. Expected trace/debug/info/warn/error. Ignoring.",
                        level
                    );
                }
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.storage.backend == StorageBackend::Postgres
            && self
                .spec
                .storage
                .connection_string
                .as_deref()
                .map_or(true, str::is_empty)
        {
            anyhow::bail!("spec.storage.connectionString is required for the postgres backend");
        }

        if self.spec.storage.max_connections == 0 {
            anyhow::bail!("spec.storage.maxConnections must be at least 1");
        }

        let mut seen = HashSet::new();
        for seed in &self.spec.tenants {
            let id = seed.tenant_id()?;
            if !seen.insert(id) {
                anyhow::bail!("Duplicate tenant id in spec.tenants: '{}'", seed.id);
            }
        }

        Ok(())
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}
