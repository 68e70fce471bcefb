//! Option registry and argument builder.
//!
//! Every flag the wrapper can emit is listed in [`TfOption`]. A flag template
//! comes in one of three shapes:
//!
//! - value-taking, ending in `=` (`-out=`): the value is appended
//! - bare switch (`-upgrade`): emitted only for `true`
//! - fixed literal (`-lockfile=readonly`): like a switch, emitted verbatim
//!
//! [`build_arg`] turns an option and a value into a token, or nothing when the
//! flag should be left out. Note that for value-taking flags an empty string
//! and an absent value are treated the same way: both omit the flag, so there
//! is no way to pass an explicitly empty value through this builder.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::IacError;

/// Shape of a flag template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// `-name=` followed by a value
    Value,
    /// `-name`, present or absent
    Switch,
    /// A complete `-name=value` token emitted as-is
    Literal,
}

/// Logical options known to the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TfOption {
    NoColor,
    Lock,
    LockTimeout,
    Input,
    Upgrade,
    FromModule,
    Reconfigure,
    MigrateState,
    ForceCopy,
    Backend,
    BackendConfig,
    Get,
    GetPlugins,
    PluginDir,
    LockfileReadonly,
    /// Global `-chdir=`. Operations run in the process working directory
    /// instead; this entry serves callers assembling raw argument vectors.
    Chdir,
    Update,
    Destroy,
    Out,
    RefreshOnly,
    Refresh,
    Replace,
    Target,
    Var,
    VarFile,
    CompactWarnings,
    Json,
    Parallelism,
    AutoApprove,
    State,
    StateOut,
    Backup,
    List,
    Diff,
    Write,
    Check,
    Recursive,
    Raw,
}

impl TfOption {
    pub const ALL: [TfOption; 38] = [
        TfOption::NoColor,
        TfOption::Lock,
        TfOption::LockTimeout,
        TfOption::Input,
        TfOption::Upgrade,
        TfOption::FromModule,
        TfOption::Reconfigure,
        TfOption::MigrateState,
        TfOption::ForceCopy,
        TfOption::Backend,
        TfOption::BackendConfig,
        TfOption::Get,
        TfOption::GetPlugins,
        TfOption::PluginDir,
        TfOption::LockfileReadonly,
        TfOption::Chdir,
        TfOption::Update,
        TfOption::Destroy,
        TfOption::Out,
        TfOption::RefreshOnly,
        TfOption::Refresh,
        TfOption::Replace,
        TfOption::Target,
        TfOption::Var,
        TfOption::VarFile,
        TfOption::CompactWarnings,
        TfOption::Json,
        TfOption::Parallelism,
        TfOption::AutoApprove,
        TfOption::State,
        TfOption::StateOut,
        TfOption::Backup,
        TfOption::List,
        TfOption::Diff,
        TfOption::Write,
        TfOption::Check,
        TfOption::Recursive,
        TfOption::Raw,
    ];

    /// Logical name of the option.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoColor => "no_color",
            Self::Lock => "lock",
            Self::LockTimeout => "lock_timeout",
            Self::Input => "input",
            Self::Upgrade => "upgrade",
            Self::FromModule => "from_module",
            Self::Reconfigure => "reconfigure",
            Self::MigrateState => "migrate_state",
            Self::ForceCopy => "force_copy",
            Self::Backend => "backend",
            Self::BackendConfig => "backend_config",
            Self::Get => "get",
            Self::GetPlugins => "get_plugins",
            Self::PluginDir => "plugin_dir",
            Self::LockfileReadonly => "readonly",
            Self::Chdir => "chdir",
            Self::Update => "update",
            Self::Destroy => "destroy",
            Self::Out => "out",
            Self::RefreshOnly => "refresh_only",
            Self::Refresh => "refresh",
            Self::Replace => "replace",
            Self::Target => "target",
            Self::Var => "var",
            Self::VarFile => "var_file",
            Self::CompactWarnings => "compact_warnings",
            Self::Json => "json",
            Self::Parallelism => "parallelism",
            Self::AutoApprove => "auto_approve",
            Self::State => "state",
            Self::StateOut => "state_out",
            Self::Backup => "backup",
            Self::List => "list",
            Self::Diff => "diff",
            Self::Write => "write",
            Self::Check => "check",
            Self::Recursive => "recursive",
            Self::Raw => "raw",
        }
    }

    /// Static part of the CLI flag.
    pub fn flag_template(&self) -> &'static str {
        match self {
            Self::NoColor => "-no-color",
            Self::Lock => "-lock=",
            Self::LockTimeout => "-lock-timeout=",
            Self::Input => "-input=",
            Self::Upgrade => "-upgrade",
            Self::FromModule => "-from-module=",
            Self::Reconfigure => "-reconfigure",
            Self::MigrateState => "-migrate-state",
            Self::ForceCopy => "-force-copy",
            Self::Backend => "-backend=",
            Self::BackendConfig => "-backend-config=",
            Self::Get => "-get=",
            Self::GetPlugins => "-get-plugins=",
            Self::PluginDir => "-plugin-dir=",
            Self::LockfileReadonly => "-lockfile=readonly",
            Self::Chdir => "-chdir=",
            Self::Update => "-update",
            Self::Destroy => "-destroy",
            Self::Out => "-out=",
            Self::RefreshOnly => "-refresh-only",
            Self::Refresh => "-refresh=",
            Self::Replace => "-replace=",
            Self::Target => "-target=",
            Self::Var => "-var",
            Self::VarFile => "-var-file=",
            Self::CompactWarnings => "-compact-warnings",
            Self::Json => "-json",
            Self::Parallelism => "-parallelism=",
            Self::AutoApprove => "-auto-approve",
            Self::State => "-state=",
            Self::StateOut => "-state-out=",
            Self::Backup => "-backup=",
            Self::List => "-list=",
            Self::Diff => "-diff",
            Self::Write => "-write=",
            Self::Check => "-check",
            Self::Recursive => "-recursive",
            Self::Raw => "-raw",
        }
    }

    pub fn kind(&self) -> FlagKind {
        let template = self.flag_template();
        if template.ends_with('=') {
            FlagKind::Value
        } else if template.contains('=') {
            FlagKind::Literal
        } else {
            FlagKind::Switch
        }
    }

    /// Look up an option by its logical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|opt| opt.name() == name)
    }
}

impl FromStr for TfOption {
    type Err = IacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| IacError::UnknownOption(s.to_string()))
    }
}

impl std::fmt::Display for TfOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A value handed to [`build_arg`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Absent,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for ArgValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Int)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ArgValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<&Path> for ArgValue {
    fn from(value: &Path) -> Self {
        Self::Text(value.to_string_lossy().into_owned())
    }
}

impl From<&PathBuf> for ArgValue {
    fn from(value: &PathBuf) -> Self {
        Self::from(value.as_path())
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// Build the token for `option`, or `None` when the flag must be omitted.
pub fn build_arg(option: TfOption, value: impl Into<ArgValue>) -> Option<String> {
    let template = option.flag_template();

    match (option.kind(), value.into()) {
        (FlagKind::Value, ArgValue::Absent) => None,
        (FlagKind::Value, ArgValue::Bool(b)) => Some(format!("{}{}", template, b)),
        (FlagKind::Value, ArgValue::Int(n)) => Some(format!("{}{}", template, n)),
        (FlagKind::Value, ArgValue::Text(s)) if s.is_empty() => None,
        (FlagKind::Value, ArgValue::Text(s)) => Some(format!("{}{}", template, s)),
        (FlagKind::Switch | FlagKind::Literal, ArgValue::Bool(true)) => Some(template.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_options() -> impl Iterator<Item = TfOption> {
        TfOption::ALL.into_iter().filter(|o| o.kind() == FlagKind::Value)
    }

    fn switch_options() -> impl Iterator<Item = TfOption> {
        TfOption::ALL.into_iter().filter(|o| o.kind() != FlagKind::Value)
    }

    #[test]
    fn test_registry_names_are_unique_and_resolvable() {
        for option in TfOption::ALL {
            assert_eq!(TfOption::from_name(option.name()), Some(option));
        }
        assert_eq!(TfOption::from_name("colour"), None);
        assert!(matches!(
            "colour".parse::<TfOption>(),
            Err(IacError::UnknownOption(name)) if name == "colour"
        ));
    }

    #[test]
    fn test_lockfile_only_has_the_readonly_form() {
        assert_eq!(TfOption::from_name("lockfile"), None);
        let templates: Vec<_> = TfOption::ALL
            .iter()
            .map(|o| o.flag_template())
            .filter(|t| t.starts_with("-lockfile"))
            .collect();
        assert_eq!(templates, vec!["-lockfile=readonly"]);
    }

    #[test]
    fn test_chdir_builds_for_raw_arguments() {
        assert_eq!(
            build_arg(TfOption::Chdir, Path::new("infra")).as_deref(),
            Some("-chdir=infra")
        );
        assert_eq!(build_arg(TfOption::Chdir, None::<&str>), None);
    }

    #[test]
    fn test_flag_kinds() {
        assert_eq!(TfOption::Out.kind(), FlagKind::Value);
        assert_eq!(TfOption::Upgrade.kind(), FlagKind::Switch);
        assert_eq!(TfOption::LockfileReadonly.kind(), FlagKind::Literal);
        assert_eq!(TfOption::Var.kind(), FlagKind::Switch);
    }

    #[test]
    fn test_empty_and_absent_values_are_omitted() {
        for option in value_options() {
            assert_eq!(build_arg(option, ""), None, "{}", option);
            assert_eq!(build_arg(option, None::<&str>), None, "{}", option);
        }
    }

    #[test]
    fn test_switches_follow_bool() {
        for option in switch_options() {
            let on = build_arg(option, true);
            assert_eq!(on.as_deref(), Some(option.flag_template()));
            assert_eq!(build_arg(option, true), on);
            assert_eq!(build_arg(option, false), None);
            assert_eq!(build_arg(option, None::<bool>), None);
        }
    }

    #[test]
    fn test_switch_ignores_non_bool_values() {
        assert_eq!(build_arg(TfOption::Upgrade, "yes"), None);
        assert_eq!(build_arg(TfOption::Json, 1_i64), None);
    }

    #[test]
    fn test_value_flags() {
        assert_eq!(build_arg(TfOption::Lock, false).as_deref(), Some("-lock=false"));
        assert_eq!(build_arg(TfOption::Input, true).as_deref(), Some("-input=true"));
        assert_eq!(
            build_arg(TfOption::Out, "plan.tfplan").as_deref(),
            Some("-out=plan.tfplan")
        );
        assert_eq!(
            build_arg(TfOption::Parallelism, 10_u32).as_deref(),
            Some("-parallelism=10")
        );
        assert_eq!(
            build_arg(TfOption::Target, Some("aws_s3_bucket.this")).as_deref(),
            Some("-target=aws_s3_bucket.this")
        );
        assert_eq!(
            build_arg(TfOption::StateOut, Path::new("out/terraform.tfstate")).as_deref(),
            Some("-state-out=out/terraform.tfstate")
        );
    }
}
