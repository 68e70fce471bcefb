//! Subcommands and their per-call options.
//!
//! Every option struct defaults to "use the wrapper's configuration"; set a
//! field only to override it for one call.

use std::path::PathBuf;

use serde_json::Value;

use crate::vars::Variables;

/// Engine subcommands driven by the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subcommand {
    Version,
    Init,
    Get,
    Plan,
    Apply,
    Destroy,
    Show,
    Fmt,
    Validate,
    Output,
    Login,
    Logout,
}

impl Subcommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subcommand::Version => "version",
            Subcommand::Init => "init",
            Subcommand::Get => "get",
            Subcommand::Plan => "plan",
            Subcommand::Apply => "apply",
            Subcommand::Destroy => "destroy",
            Subcommand::Show => "show",
            Subcommand::Fmt => "fmt",
            Subcommand::Validate => "validate",
            Subcommand::Output => "output",
            Subcommand::Login => "login",
            Subcommand::Logout => "logout",
        }
    }

    /// Human-readable title used for logging.
    pub fn title(&self) -> String {
        format!("Terraform {}", self.as_str())
    }
}

impl std::fmt::Display for Subcommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overrides for the flags shared by most subcommands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultFlags {
    pub color: Option<bool>,
    pub lock: Option<bool>,
    /// Seconds; zero counts as unset
    pub lock_timeout: Option<u64>,
    pub input: Option<bool>,
}

impl DefaultFlags {
    pub fn color(mut self, enabled: bool) -> Self {
        self.color = Some(enabled);
        self
    }

    pub fn lock(mut self, enabled: bool) -> Self {
        self.lock = Some(enabled);
        self
    }

    pub fn lock_timeout(mut self, seconds: u64) -> Self {
        self.lock_timeout = Some(seconds);
        self
    }

    pub fn input(mut self, enabled: bool) -> Self {
        self.input = Some(enabled);
        self
    }
}

/// Options for `terraform init`.
#[derive(Debug, Clone, PartialEq)]
pub struct InitOptions {
    pub defaults: DefaultFlags,
    pub upgrade: bool,
    pub reconfigure: bool,
    pub migrate_state: bool,
    pub force_copy: bool,
    /// Configure the backend; `false` emits `-backend=false`
    pub backend: bool,
    pub backend_config: Vec<String>,
    /// Download modules; `false` emits `-get=false`
    pub get: bool,
    /// Download plugins; `false` emits `-get-plugins=false`
    pub get_plugins: bool,
    pub plugin_dir: Option<String>,
    pub from_module: Option<String>,
    /// Emit `-lockfile=readonly`
    pub readonly: bool,
    pub chdir: Option<PathBuf>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            defaults: DefaultFlags::default(),
            upgrade: false,
            reconfigure: false,
            migrate_state: false,
            force_copy: false,
            backend: true,
            backend_config: Vec::new(),
            get: true,
            get_plugins: true,
            plugin_dir: None,
            from_module: None,
            readonly: false,
            chdir: None,
        }
    }
}

impl InitOptions {
    pub fn upgrade(mut self) -> Self {
        self.upgrade = true;
        self
    }

    pub fn reconfigure(mut self) -> Self {
        self.reconfigure = true;
        self
    }

    pub fn backend_config(mut self, config: impl Into<String>) -> Self {
        self.backend_config.push(config.into());
        self
    }

    pub fn no_backend(mut self) -> Self {
        self.backend = false;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn chdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chdir = Some(dir.into());
        self
    }
}

/// Options for `terraform get`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetOptions {
    pub update: bool,
    pub color: Option<bool>,
    pub chdir: Option<PathBuf>,
}

/// Options for `terraform plan`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanOptions {
    pub defaults: DefaultFlags,
    /// Plan file to write (configured plan file when unset)
    pub out: Option<String>,
    pub destroy: bool,
    pub refresh: Option<bool>,
    pub refresh_only: bool,
    pub replace: Vec<String>,
    pub target: Vec<String>,
    pub vars: Variables,
    /// Variable file (configured var file when unset)
    pub var_file: Option<String>,
    pub compact_warnings: bool,
    pub json: bool,
    /// Zero counts as unset
    pub parallelism: Option<u32>,
    pub state: Option<String>,
    pub chdir: Option<PathBuf>,
}

impl PlanOptions {
    pub fn out(mut self, path: impl Into<String>) -> Self {
        self.out = Some(path.into());
        self
    }

    pub fn destroy(mut self) -> Self {
        self.destroy = true;
        self
    }

    pub fn refresh_only(mut self) -> Self {
        self.refresh_only = true;
        self
    }

    pub fn target(mut self, address: impl Into<String>) -> Self {
        self.target.push(address.into());
        self
    }

    pub fn replace(mut self, address: impl Into<String>) -> Self {
        self.replace.push(address.into());
        self
    }

    pub fn var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(key, value);
        self
    }

    pub fn vars(mut self, vars: Variables) -> Self {
        self.vars = vars;
        self
    }

    pub fn var_file(mut self, path: impl Into<String>) -> Self {
        self.var_file = Some(path.into());
        self
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    pub fn chdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chdir = Some(dir.into());
        self
    }
}

/// Options for `terraform apply`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyOptions {
    pub defaults: DefaultFlags,
    /// Plan file to apply (configured plan file when unset)
    pub plan_file: Option<String>,
    pub auto_approve: bool,
    pub compact_warnings: bool,
    /// Stream JSON events and aggregate them
    pub json: bool,
    pub parallelism: Option<u32>,
    pub state: Option<String>,
    pub state_out: Option<String>,
    pub backup: Option<String>,
    pub chdir: Option<PathBuf>,
}

impl ApplyOptions {
    pub fn plan_file(mut self, path: impl Into<String>) -> Self {
        self.plan_file = Some(path.into());
        self
    }

    pub fn auto_approve(mut self) -> Self {
        self.auto_approve = true;
        self
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    pub fn chdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chdir = Some(dir.into());
        self
    }
}

/// Options for `terraform destroy`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestroyOptions {
    pub defaults: DefaultFlags,
    pub target: Vec<String>,
    pub vars: Variables,
    pub var_file: Option<String>,
    pub auto_approve: bool,
    pub parallelism: Option<u32>,
    pub chdir: Option<PathBuf>,
}

impl DestroyOptions {
    pub fn auto_approve(mut self) -> Self {
        self.auto_approve = true;
        self
    }

    pub fn target(mut self, address: impl Into<String>) -> Self {
        self.target.push(address.into());
        self
    }

    pub fn var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(key, value);
        self
    }

    pub fn chdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chdir = Some(dir.into());
        self
    }
}

/// Options for `terraform show`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowOptions {
    /// Plan or state file (configured plan file when unset)
    pub file: Option<String>,
    pub json: bool,
    pub color: Option<bool>,
    pub chdir: Option<PathBuf>,
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            file: None,
            json: true,
            color: None,
            chdir: None,
        }
    }
}

/// Options for `terraform fmt`.
#[derive(Debug, Clone, PartialEq)]
pub struct FmtOptions {
    /// List reformatted files; `false` emits `-list=false`
    pub list: bool,
    pub diff: bool,
    /// Write changes; `false` emits `-write=false`
    pub write: bool,
    pub check: bool,
    pub recursive: bool,
    pub chdir: Option<PathBuf>,
}

impl Default for FmtOptions {
    fn default() -> Self {
        Self {
            list: true,
            diff: false,
            write: true,
            check: false,
            recursive: false,
            chdir: None,
        }
    }
}

impl FmtOptions {
    /// `-check -recursive`, as used by CI pipelines.
    pub fn check_only() -> Self {
        Self {
            check: true,
            recursive: true,
            ..Self::default()
        }
    }
}

/// Options for `terraform validate`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidateOptions {
    pub json: bool,
    pub color: Option<bool>,
    pub chdir: Option<PathBuf>,
}

/// Options for `terraform output`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    /// Single output to read (all outputs when unset)
    pub name: Option<String>,
    pub json: bool,
    pub raw: bool,
    pub color: Option<bool>,
    pub state: Option<String>,
    pub chdir: Option<PathBuf>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            name: None,
            json: true,
            raw: false,
            color: None,
            state: None,
            chdir: None,
        }
    }
}

impl OutputOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Options for `terraform login` and `terraform logout`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginOptions {
    pub hostname: Option<String>,
    pub chdir: Option<PathBuf>,
}

impl LoginOptions {
    pub fn host(hostname: impl Into<String>) -> Self {
        Self {
            hostname: Some(hostname.into()),
            chdir: None,
        }
    }
}
