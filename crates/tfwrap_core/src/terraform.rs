//! Terraform wrapper: assembles argument vectors and interprets results.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, info_span, Instrument};

use tfwrap_runner::{CommandExecutor, ExecHooks, ExecRequest, ExecutionResult};

use crate::args::ArgumentVector;
use crate::commands::{
    ApplyOptions, DefaultFlags, DestroyOptions, FmtOptions, GetOptions, InitOptions, LoginOptions,
    OutputOptions, PlanOptions, ShowOptions, Subcommand, ValidateOptions,
};
use crate::config::WrapperConfig;
use crate::error::{CommandFailure, IacError, IacResult};
use crate::events::{AggregatedApplyResult, ApplyEventAggregator};
use crate::options::TfOption;
use crate::version::{EngineVersion, Feature, VersionGate};

/// Result of `terraform apply`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutput {
    /// Applied with plain output
    Applied,
    /// Applied with streamed JSON events
    Events(AggregatedApplyResult),
}

/// Result of a query-style command (`show`, `output`).
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Json(Value),
    Text(String),
}

impl QueryOutput {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            QueryOutput::Json(value) => Some(value),
            QueryOutput::Text(_) => None,
        }
    }
}

/// Typed wrapper around the Terraform CLI.
///
/// One instance holds the configuration defaults and the engine version
/// detected at construction. Methods that change either take `&mut self`;
/// share an instance across tasks only behind external synchronization.
pub struct Terraform {
    executor: Arc<dyn CommandExecutor>,
    config: WrapperConfig,
    version: EngineVersion,
}

impl Terraform {
    /// Create a wrapper, querying the engine version once.
    pub async fn new(executor: Arc<dyn CommandExecutor>, config: WrapperConfig) -> IacResult<Self> {
        let version = Self::query_version(executor.as_ref(), &config).await?;
        info!("Detected Terraform {} on {}", version.raw, version.platform);
        Ok(Self {
            executor,
            config,
            version,
        })
    }

    /// Create a wrapper with a known version, without running the engine.
    pub fn with_version(
        executor: Arc<dyn CommandExecutor>,
        config: WrapperConfig,
        version: EngineVersion,
    ) -> Self {
        Self {
            executor,
            config,
            version,
        }
    }

    pub fn config(&self) -> &WrapperConfig {
        &self.config
    }

    /// Cached engine version.
    pub fn version_info(&self) -> &EngineVersion {
        &self.version
    }

    pub fn gate(&self) -> VersionGate<'_> {
        VersionGate::new(&self.version)
    }

    /// Query the engine version again and refresh the cached value.
    pub async fn version(&mut self) -> IacResult<EngineVersion> {
        let version = Self::query_version(self.executor.as_ref(), &self.config).await?;
        self.version = version.clone();
        Ok(version)
    }

    pub fn set_color(&mut self, enabled: bool) {
        self.config.color = enabled;
    }

    pub fn set_lock(&mut self, enabled: bool) {
        self.config.lock = enabled;
    }

    pub fn set_input(&mut self, enabled: bool) {
        self.config.input = enabled;
    }

    pub fn set_lock_timeout(&mut self, seconds: u64) {
        self.config.lock_timeout = seconds;
    }

    async fn query_version(
        executor: &dyn CommandExecutor,
        config: &WrapperConfig,
    ) -> IacResult<EngineVersion> {
        let mut args = ArgumentVector::new(Subcommand::Version.as_str());
        args.flag(TfOption::Json, true);

        let request = ExecRequest::new(&config.binary)
            .args(args.into_vec())
            .title(Subcommand::Version.title())
            .echo_output(false);
        let request = config
            .environment()
            .into_iter()
            .fold(request, |request, (key, value)| request.env(key, value));

        let result = executor.execute(&request, None).await?;
        if !result.success() {
            let duration = result.duration_secs();
            return Err(IacError::from_failure(
                Subcommand::Version,
                CommandFailure::new("version", result.stderr, duration),
            ));
        }

        let version = EngineVersion::from_json(&result.stdout)?;
        debug!("Engine version payload: {:?}", version);
        Ok(version)
    }

    // ------------------------------------------------------------------
    // Argument assembly
    // ------------------------------------------------------------------

    /// Effective "disable color" value: per-call override, else the default.
    fn no_color(&self, color: Option<bool>) -> bool {
        !color.unwrap_or(self.config.color)
    }

    /// Flags shared by most subcommands, in engine order.
    pub fn default_args(&self, flags: &DefaultFlags) -> Vec<String> {
        let mut args = ArgumentVector::default();

        let color = flags.color.or((!self.config.color).then_some(false));
        if let Some(color) = color {
            args.flag(TfOption::NoColor, !color);
        }

        let lock = flags.lock.or((!self.config.lock).then_some(false));
        args.flag(TfOption::Lock, lock);

        let lock_timeout = flags
            .lock_timeout
            .filter(|t| *t > 0)
            .or(Some(self.config.lock_timeout).filter(|t| *t > 0));
        args.flag(TfOption::LockTimeout, lock_timeout.map(|t| format!("{}s", t)));

        let input = flags.input.or((!self.config.input).then_some(false));
        args.flag(TfOption::Input, input);

        args.into_vec()
    }

    /// Whether the engine may prompt, so stdin must stay attached.
    pub fn accepts_input(&self, flags: &DefaultFlags) -> bool {
        flags.input.unwrap_or(self.config.input)
    }

    fn parallelism(&self, requested: Option<u32>) -> u32 {
        requested.filter(|p| *p > 0).unwrap_or(self.config.parallelism)
    }

    fn var_file<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested
            .filter(|f| !f.is_empty())
            .or(self.config.var_file.as_deref())
    }

    pub fn init_args(&self, opts: &InitOptions) -> ArgumentVector {
        let mut args = ArgumentVector::new(Subcommand::Init.as_str());
        args.flag(TfOption::LockfileReadonly, opts.readonly)
            .extend(self.default_args(&opts.defaults))
            .flag(TfOption::Upgrade, opts.upgrade)
            .flag(TfOption::Reconfigure, opts.reconfigure)
            .flag(TfOption::MigrateState, opts.migrate_state)
            .flag(TfOption::ForceCopy, opts.force_copy)
            .repeated(TfOption::BackendConfig, &opts.backend_config)
            .flag(TfOption::PluginDir, opts.plugin_dir.as_deref())
            .flag(TfOption::FromModule, opts.from_module.as_deref());

        if !opts.backend {
            args.flag(TfOption::Backend, false);
        }
        if !opts.get {
            args.flag(TfOption::Get, false);
        }
        if !opts.get_plugins {
            args.flag(TfOption::GetPlugins, false);
        }
        args
    }

    pub fn get_args(&self, opts: &GetOptions) -> ArgumentVector {
        let mut args = ArgumentVector::new(Subcommand::Get.as_str());
        args.flag(TfOption::Update, opts.update)
            .flag(TfOption::NoColor, self.no_color(opts.color));
        args
    }

    pub fn plan_args(&self, opts: &PlanOptions) -> ArgumentVector {
        let gate = self.gate();
        let out = opts
            .out
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or(&self.config.plan_file);

        let mut args = ArgumentVector::new(Subcommand::Plan.as_str());
        args.extend(self.default_args(&opts.defaults))
            .flag(TfOption::Out, out)
            .flag(
                TfOption::RefreshOnly,
                gate.allow(Feature::PlanRefreshOnly, opts.refresh_only),
            )
            .flag(TfOption::Json, gate.allow(Feature::PlanJson, opts.json))
            .flag(TfOption::Parallelism, self.parallelism(opts.parallelism))
            .flag(TfOption::Destroy, opts.destroy)
            .flag(TfOption::Refresh, opts.refresh)
            .repeated(TfOption::Replace, &opts.replace)
            .repeated(TfOption::Target, &opts.target)
            .flag(TfOption::VarFile, self.var_file(opts.var_file.as_deref()))
            .flag(TfOption::State, opts.state.as_deref())
            .flag(TfOption::CompactWarnings, opts.compact_warnings)
            .extend(opts.vars.to_args());
        args
    }

    /// Build the apply vector; the flag tells whether events are streamed.
    pub fn apply_args(&self, opts: &ApplyOptions) -> (ArgumentVector, bool) {
        let streaming = self.gate().allow(Feature::ApplyJson, opts.json);
        let plan_file = opts
            .plan_file
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.config.plan_file);

        let mut args = ArgumentVector::new(Subcommand::Apply.as_str());
        args.extend(self.default_args(&opts.defaults))
            .flag(TfOption::Json, streaming)
            .flag(TfOption::Parallelism, self.parallelism(opts.parallelism))
            .flag(TfOption::AutoApprove, opts.auto_approve)
            .flag(TfOption::CompactWarnings, opts.compact_warnings)
            .flag(TfOption::State, opts.state.as_deref())
            .flag(TfOption::StateOut, opts.state_out.as_deref())
            .flag(TfOption::Backup, opts.backup.as_deref())
            .positional(plan_file);
        (args, streaming)
    }

    pub fn destroy_args(&self, opts: &DestroyOptions) -> ArgumentVector {
        let mut args = ArgumentVector::new(Subcommand::Destroy.as_str());
        args.extend(self.default_args(&opts.defaults))
            .flag(TfOption::Parallelism, self.parallelism(opts.parallelism))
            .flag(TfOption::AutoApprove, opts.auto_approve)
            .repeated(TfOption::Target, &opts.target)
            .flag(TfOption::VarFile, self.var_file(opts.var_file.as_deref()))
            .extend(opts.vars.to_args());
        args
    }

    pub fn show_args(&self, opts: &ShowOptions) -> ArgumentVector {
        let file = opts
            .file
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(&self.config.plan_file);

        let mut args = ArgumentVector::new(Subcommand::Show.as_str());
        args.flag(TfOption::Json, opts.json)
            .flag(TfOption::NoColor, self.no_color(opts.color))
            .positional(file);
        args
    }

    pub fn fmt_args(&self, opts: &FmtOptions) -> ArgumentVector {
        let mut args = ArgumentVector::new(Subcommand::Fmt.as_str());
        args.flag(TfOption::Diff, opts.diff)
            .flag(TfOption::Check, opts.check)
            .flag(TfOption::Recursive, opts.recursive);
        if !opts.list {
            args.flag(TfOption::List, false);
        }
        if !opts.write {
            args.flag(TfOption::Write, false);
        }
        args
    }

    pub fn validate_args(&self, opts: &ValidateOptions) -> ArgumentVector {
        let mut args = ArgumentVector::new(Subcommand::Validate.as_str());
        args.flag(TfOption::NoColor, self.no_color(opts.color))
            .flag(TfOption::Json, opts.json);
        args
    }

    pub fn output_args(&self, opts: &OutputOptions) -> ArgumentVector {
        let mut args = ArgumentVector::new(Subcommand::Output.as_str());
        args.flag(TfOption::NoColor, self.no_color(opts.color))
            .flag(TfOption::Json, opts.json)
            .flag(TfOption::Raw, opts.raw)
            .flag(TfOption::State, opts.state.as_deref());
        if let Some(name) = opts.name.as_deref().filter(|n| !n.is_empty()) {
            args.positional(name);
        }
        args
    }

    pub fn login_args(&self, subcommand: Subcommand, opts: &LoginOptions) -> ArgumentVector {
        let mut args = ArgumentVector::new(subcommand.as_str());
        if let Some(hostname) = opts.hostname.as_deref().filter(|h| !h.is_empty()) {
            args.positional(hostname);
        }
        args
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Working directory: per-call value, else configured, else process cwd.
    pub fn resolve_cwd(&self, chdir: Option<&Path>) -> IacResult<PathBuf> {
        match chdir.or(self.config.working_dir.as_deref()) {
            Some(dir) => Ok(dir.to_path_buf()),
            None => Ok(std::env::current_dir()?),
        }
    }

    fn request(&self, title: String, args: ArgumentVector, cwd: PathBuf) -> ExecRequest {
        let request = ExecRequest::new(&self.config.binary)
            .args(args.into_vec())
            .cwd(cwd)
            .title(title);
        self.config
            .environment()
            .into_iter()
            .fold(request, |request, (key, value)| request.env(key, value))
    }

    async fn execute(
        &self,
        subcommand: Subcommand,
        request: ExecRequest,
        hooks: Option<&mut dyn ExecHooks>,
    ) -> IacResult<ExecutionResult> {
        debug!("Executing: {}", request.command_line());
        let span = info_span!(
            "terraform",
            workspace = %self.config.workspace,
            command = subcommand.as_str()
        );
        Ok(self.executor.execute(&request, hooks).instrument(span).await?)
    }

    /// Log success, or turn a failed exit into the subcommand's error kind.
    fn check(&self, subcommand: Subcommand, result: &ExecutionResult) -> IacResult<()> {
        if result.success() {
            info!(
                "{} completed in: {:.2} seconds",
                subcommand.title(),
                result.duration_secs()
            );
            return Ok(());
        }

        error!(
            "{} failed with exit code {} in: {:.2} seconds",
            subcommand.title(),
            result.exit_code,
            result.duration_secs()
        );
        Err(IacError::from_failure(
            subcommand,
            CommandFailure::new(subcommand.as_str(), result.stderr.clone(), result.duration_secs()),
        ))
    }

    async fn run_checked(
        &self,
        subcommand: Subcommand,
        args: ArgumentVector,
        chdir: Option<&Path>,
        interactive: bool,
    ) -> IacResult<bool> {
        let request = self
            .request(subcommand.title(), args, self.resolve_cwd(chdir)?)
            .interactive(interactive);
        let result = self.execute(subcommand, request, None).await?;
        self.check(subcommand, &result)?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Run `terraform init`.
    pub async fn init(&self, opts: &InitOptions) -> IacResult<bool> {
        let interactive = self.accepts_input(&opts.defaults);
        self.run_checked(Subcommand::Init, self.init_args(opts), opts.chdir.as_deref(), interactive)
            .await
    }

    /// Run `terraform get`.
    pub async fn get(&self, opts: &GetOptions) -> IacResult<bool> {
        self.run_checked(Subcommand::Get, self.get_args(opts), opts.chdir.as_deref(), false)
            .await
    }

    /// Run `terraform plan`, writing the plan file.
    pub async fn plan(&self, opts: &PlanOptions) -> IacResult<bool> {
        let interactive = self.accepts_input(&opts.defaults);
        self.run_checked(Subcommand::Plan, self.plan_args(opts), opts.chdir.as_deref(), interactive)
            .await
    }

    /// Run `terraform apply`.
    ///
    /// With `json` requested on an engine that supports it, the event stream
    /// is aggregated and raw output is not echoed.
    pub async fn apply(&self, opts: &ApplyOptions) -> IacResult<ApplyOutput> {
        let (args, streaming) = self.apply_args(opts);
        let request = self
            .request(Subcommand::Apply.title(), args, self.resolve_cwd(opts.chdir.as_deref())?)
            .echo_output(!streaming)
            .interactive(self.accepts_input(&opts.defaults));

        if !streaming {
            let result = self.execute(Subcommand::Apply, request, None).await?;
            self.check(Subcommand::Apply, &result)?;
            return Ok(ApplyOutput::Applied);
        }

        let mut aggregator = ApplyEventAggregator::new();
        let result = self
            .execute(Subcommand::Apply, request, Some(&mut aggregator))
            .await?;
        self.check(Subcommand::Apply, &result)?;
        aggregator.finish();
        Ok(ApplyOutput::Events(aggregator.into_result()))
    }

    /// Run `terraform destroy`. A failed exit is always an error.
    pub async fn destroy(&self, opts: &DestroyOptions) -> IacResult<bool> {
        let interactive = self.accepts_input(&opts.defaults);
        self.run_checked(
            Subcommand::Destroy,
            self.destroy_args(opts),
            opts.chdir.as_deref(),
            interactive,
        )
        .await
    }

    /// Run `terraform show`.
    ///
    /// Inspection is best effort: a failed exit is logged once, not returned
    /// as an error, and whatever stdout exists is decoded. Malformed JSON
    /// still fails with [`IacError::Json`].
    pub async fn show(&self, opts: &ShowOptions) -> IacResult<QueryOutput> {
        let request = self
            .request(
                Subcommand::Show.title(),
                self.show_args(opts),
                self.resolve_cwd(opts.chdir.as_deref())?,
            )
            .echo_output(false);
        let result = self.execute(Subcommand::Show, request, None).await?;

        // check() already logged the failure
        let _ = self.check(Subcommand::Show, &result);

        if opts.json {
            Ok(QueryOutput::Json(serde_json::from_str(&result.stdout)?))
        } else {
            Ok(QueryOutput::Text(result.stdout))
        }
    }

    /// Run `terraform fmt`.
    pub async fn fmt(&self, opts: &FmtOptions) -> IacResult<bool> {
        self.run_checked(Subcommand::Fmt, self.fmt_args(opts), opts.chdir.as_deref(), false)
            .await
    }

    /// Run `terraform validate`.
    pub async fn validate(&self, opts: &ValidateOptions) -> IacResult<bool> {
        self.run_checked(
            Subcommand::Validate,
            self.validate_args(opts),
            opts.chdir.as_deref(),
            false,
        )
        .await
    }

    /// Run `terraform output`, decoding JSON when requested.
    pub async fn output(&self, opts: &OutputOptions) -> IacResult<QueryOutput> {
        let request = self
            .request(
                Subcommand::Output.title(),
                self.output_args(opts),
                self.resolve_cwd(opts.chdir.as_deref())?,
            )
            .echo_output(!opts.json);
        let result = self.execute(Subcommand::Output, request, None).await?;
        self.check(Subcommand::Output, &result)?;

        if opts.json {
            Ok(QueryOutput::Json(serde_json::from_str(&result.stdout)?))
        } else {
            Ok(QueryOutput::Text(result.stdout))
        }
    }

    /// Run `terraform login`. Stdin stays attached for the token prompt.
    pub async fn login(&self, opts: &LoginOptions) -> IacResult<bool> {
        let args = self.login_args(Subcommand::Login, opts);
        self.run_checked(Subcommand::Login, args, opts.chdir.as_deref(), true)
            .await
    }

    /// Run `terraform logout`.
    pub async fn logout(&self, opts: &LoginOptions) -> IacResult<bool> {
        let args = self.login_args(Subcommand::Logout, opts);
        self.run_checked(Subcommand::Logout, args, opts.chdir.as_deref(), false)
            .await
    }

    /// Run arbitrary engine arguments and return the raw result.
    ///
    /// No flags are added and a failed exit is not turned into an error.
    pub async fn run(
        &self,
        args: Vec<String>,
        title: Option<&str>,
        chdir: Option<&Path>,
    ) -> IacResult<ExecutionResult> {
        let mut request = ExecRequest::new(&self.config.binary)
            .args(args)
            .cwd(self.resolve_cwd(chdir)?);
        if let Some(title) = title {
            request = request.title(title);
        }
        for (key, value) in self.config.environment() {
            request = request.env(key, value);
        }

        let span = info_span!("terraform", workspace = %self.config.workspace, command = "raw");
        Ok(self.executor.execute(&request, None).instrument(span).await?)
    }
}
