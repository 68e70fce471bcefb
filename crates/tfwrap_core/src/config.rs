//! Wrapper configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::IacResult;

/// Per-instance defaults for every engine invocation.
///
/// Operation calls can override the default flags for a single invocation;
/// the stored values only change through the `set_*` methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapperConfig {
    /// Workspace name, attached to every log span
    pub workspace: String,
    /// Default working directory (process cwd when unset)
    pub working_dir: Option<PathBuf>,
    /// Hold the state lock during operations
    pub lock: bool,
    /// Seconds to retry acquiring the state lock (0 = engine default)
    pub lock_timeout: u64,
    /// Allow interactive prompts
    pub input: bool,
    /// Concurrent operations inside the engine
    pub parallelism: u32,
    /// Colored engine output
    pub color: bool,
    /// Default variable file for plan and destroy
    pub var_file: Option<String>,
    /// Plan file written by plan and read by apply/show
    pub plan_file: String,
    /// Engine binary
    pub binary: String,
    /// Export `TF_IN_AUTOMATION=1` to the engine
    pub automation: bool,
    /// Value for `TF_LOG`
    pub engine_log: Option<String>,
    /// Extra environment for the engine process
    pub env: BTreeMap<String, String>,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            workspace: "default".to_string(),
            working_dir: None,
            lock: true,
            lock_timeout: 0,
            input: false,
            parallelism: 10,
            color: true,
            var_file: None,
            plan_file: "plan.tfplan".to_string(),
            binary: "terraform".to_string(),
            automation: true,
            engine_log: None,
            env: BTreeMap::new(),
        }
    }
}

impl WrapperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document; missing keys keep their defaults.
    pub fn from_yaml_str(content: &str) -> IacResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_yaml_file(path: &Path) -> IacResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = workspace.into();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_lock(mut self, enabled: bool) -> Self {
        self.lock = enabled;
        self
    }

    pub fn with_lock_timeout(mut self, seconds: u64) -> Self {
        self.lock_timeout = seconds;
        self
    }

    pub fn with_input(mut self, enabled: bool) -> Self {
        self.input = enabled;
        self
    }

    pub fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn with_var_file(mut self, path: impl Into<String>) -> Self {
        self.var_file = Some(path.into());
        self
    }

    pub fn with_plan_file(mut self, path: impl Into<String>) -> Self {
        self.plan_file = path.into();
        self
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_automation(mut self, enabled: bool) -> Self {
        self.automation = enabled;
        self
    }

    pub fn with_engine_log(mut self, level: impl Into<String>) -> Self {
        self.engine_log = Some(level.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Environment variables handed to every engine process.
    pub fn environment(&self) -> BTreeMap<String, String> {
        let mut env = self.env.clone();
        if self.automation {
            env.insert("TF_IN_AUTOMATION".to_string(), "1".to_string());
        }
        if let Some(level) = &self.engine_log {
            env.insert("TF_LOG".to_string(), level.clone());
        }
        env
    }
}
