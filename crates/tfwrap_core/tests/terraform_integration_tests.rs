//! Integration tests for the Terraform wrapper, driven by the mock executor.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tempfile::tempdir;
use tfwrap_core::{
    ApplyOptions, ApplyOutput, DefaultFlags, DestroyOptions, EngineVersion, FmtOptions, GetOptions,
    IacError, InitOptions, LoginOptions, OutputOptions, PlanOptions, QueryOutput, ShowOptions,
    Terraform, ValidateOptions, WrapperConfig,
};
use tfwrap_runner::{MockExecutor, MockResponse};
use tracing_subscriber::fmt::MakeWriter;

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn version_payload(version: &str) -> String {
    json!({
        "terraform_version": version,
        "platform": "linux_amd64",
        "provider_selections": {},
        "terraform_outdated": true
    })
    .to_string()
}

/// Wrapper built through the real version query; the first response is consumed by it.
async fn terraform_with(
    version: &str,
    config: WrapperConfig,
    responses: Vec<MockResponse>,
) -> (Terraform, MockExecutor) {
    let mut all = vec![MockResponse::success(version_payload(version))];
    all.extend(responses);
    let mock = MockExecutor::new().with_responses(all);

    let tf = Terraform::new(Arc::new(mock.clone()), config).await.unwrap();
    mock.clear_calls();
    (tf, mock)
}

#[tokio::test]
async fn test_version_detected_at_construction() {
    let mock = MockExecutor::new().add_response(MockResponse::success(version_payload("1.5.7")));
    let tf = Terraform::new(Arc::new(mock.clone()), WrapperConfig::default())
        .await
        .unwrap();

    let version = tf.version_info();
    assert_eq!((version.major, version.minor, version.patch), (1, 5, 7));
    assert_eq!(version.platform, "linux_amd64");
    assert!(!version.is_latest());

    let call = mock.last_call().unwrap();
    assert_eq!(call.program, "terraform");
    assert_eq!(call.args, vec!["version", "-json"]);
    assert!(!call.echo_output);
}

#[tokio::test]
async fn test_unparseable_version_falls_back_to_zero() {
    let (tf, _) = terraform_with("1.6.0-beta1", WrapperConfig::default(), vec![]).await;
    let version = tf.version_info();
    assert_eq!((version.major, version.minor, version.patch), (0, 0, 0));
    assert_eq!(version.raw, "1.6.0-beta1");
}

#[tokio::test]
async fn test_version_query_failure() {
    let mock = MockExecutor::new().add_response(MockResponse::failure(127, "not installed"));
    let err = Terraform::new(Arc::new(mock), WrapperConfig::default())
        .await
        .err()
        .unwrap();

    assert!(matches!(err, IacError::VersionQueryFailed(_)));
    assert_eq!(err.failure().unwrap().stderr, "not installed");
}

#[tokio::test]
async fn test_version_requery_updates_cache() {
    let (mut tf, _) = terraform_with(
        "0.15.0",
        WrapperConfig::default(),
        vec![MockResponse::success(version_payload("1.2.3"))],
    )
    .await;
    assert_eq!(tf.version_info().major, 0);

    let version = tf.version().await.unwrap();
    assert_eq!(version.raw, "1.2.3");
    assert_eq!(tf.version_info().minor, 2);
}

#[tokio::test]
async fn test_plan_end_to_end() {
    let dir = tempdir().unwrap();
    let (tf, mock) = terraform_with(
        "1.5.0",
        WrapperConfig::default().with_working_dir(dir.path()),
        vec![MockResponse::success("Plan: 1 to add")],
    )
    .await;

    let planned = tf
        .plan(&PlanOptions::default().var("bucket_name", "test_bucket"))
        .await
        .unwrap();
    assert!(planned);

    let call = mock.last_call().unwrap();
    assert_eq!(
        call.args,
        vec![
            "plan",
            "-input=false",
            "-out=plan.tfplan",
            "-parallelism=10",
            "-var",
            "bucket_name=\"test_bucket\"",
        ]
    );
    assert!(!call.has_arg("-destroy"));
    assert_eq!(call.cwd, Some(dir.path().to_path_buf()));
    assert_eq!(call.title.as_deref(), Some("Terraform plan"));
    assert_eq!(call.env.get("TF_IN_AUTOMATION").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn test_plan_failure_carries_stderr() {
    let (tf, _) = terraform_with(
        "1.5.0",
        WrapperConfig::default(),
        vec![MockResponse::failure(1, "Error: Missing required argument")],
    )
    .await;

    let err = tf.plan(&PlanOptions::default()).await.unwrap_err();
    assert!(matches!(err, IacError::PlanFailed(_)));
    assert!(err.to_string().contains("Missing required argument"));
}

#[tokio::test]
async fn test_apply_streams_events_on_modern_engine() {
    let stream = [
        r#"{"@message":"Terraform 1.5.0","type":"version"}"#,
        r#"{"@message":"aws_s3_bucket.b: Creation complete","type":"apply_complete","hook":{"resource":{"addr":"aws_s3_bucket.b"},"action":"create"}}"#,
        r#"{"@message":"Apply complete!","type":"change_summary","changes":{"add":1,"change":0,"remove":0,"operation":"apply"}}"#,
        r#"{"@message":"Outputs: 1","type":"outputs","outputs":{"bucket":{"value":"test_bucket"}}}"#,
    ]
    .join("\n");
    let (tf, mock) = terraform_with(
        "1.5.0",
        WrapperConfig::default(),
        vec![MockResponse::success(stream)],
    )
    .await;

    let applied = tf
        .apply(&ApplyOptions::default().auto_approve().json())
        .await
        .unwrap();

    let call = mock.last_call().unwrap();
    assert!(call.had_hooks);
    assert!(!call.echo_output);
    assert!(call.has_arg("-json"));
    assert_eq!(call.args.last().map(String::as_str), Some("plan.tfplan"));

    let ApplyOutput::Events(result) = applied else {
        panic!("expected aggregated events");
    };
    assert_eq!(result.outputs, Some(json!({"bucket": {"value": "test_bucket"}})));
    assert_eq!(result.changes.as_ref().unwrap()["add"], 1);
    assert_eq!(result.resource("aws_s3_bucket.b").unwrap()["action"], "create");
}

#[tokio::test]
async fn test_apply_without_json_support() {
    let (tf, mock) = terraform_with(
        "0.14.0",
        WrapperConfig::default(),
        vec![MockResponse::success("Apply complete!")],
    )
    .await;

    let applied = tf.apply(&ApplyOptions::default().json()).await.unwrap();
    assert_eq!(applied, ApplyOutput::Applied);

    let call = mock.last_call().unwrap();
    assert!(!call.has_arg("-json"));
    assert!(!call.had_hooks);
    assert!(call.echo_output);
}

#[tokio::test]
async fn test_apply_failure_is_error() {
    let (tf, _) = terraform_with(
        "1.5.0",
        WrapperConfig::default(),
        vec![MockResponse::failure(1, "Error: creating bucket")],
    )
    .await;

    let err = tf.apply(&ApplyOptions::default().json()).await.unwrap_err();
    assert!(matches!(err, IacError::ApplyFailed(_)));
}

#[tokio::test]
async fn test_destroy_failure() {
    let (tf, mock) = terraform_with(
        "1.5.0",
        WrapperConfig::default(),
        vec![MockResponse::failure(1, "Error acquiring the state lock")],
    )
    .await;

    let err = tf
        .destroy(&DestroyOptions::default().auto_approve())
        .await
        .unwrap_err();
    let IacError::DestroyFailed(failure) = err else {
        panic!("expected DestroyFailed");
    };
    assert_eq!(failure.command, "destroy");
    assert_eq!(failure.stderr, "Error acquiring the state lock");
    assert!((failure.duration - 0.1).abs() < 1e-9);
    assert!(mock.last_call().unwrap().has_arg("-auto-approve"));
}

#[tokio::test]
async fn test_each_operation_reports_its_own_failure_kind() {
    let names = [
        "init", "get", "plan", "apply", "destroy", "fmt", "validate", "output", "login", "logout",
    ];
    let responses = names
        .iter()
        .map(|name| MockResponse::failure(1, format!("Error: {} broke", name)))
        .collect();
    let (tf, _) = terraform_with("1.5.0", WrapperConfig::default(), responses).await;

    let errors = vec![
        tf.init(&InitOptions::default()).await.unwrap_err(),
        tf.get(&GetOptions::default()).await.unwrap_err(),
        tf.plan(&PlanOptions::default()).await.unwrap_err(),
        tf.apply(&ApplyOptions::default()).await.unwrap_err(),
        tf.destroy(&DestroyOptions::default()).await.unwrap_err(),
        tf.fmt(&FmtOptions::default()).await.unwrap_err(),
        tf.validate(&ValidateOptions::default()).await.unwrap_err(),
        tf.output(&OutputOptions::default()).await.unwrap_err(),
        tf.login(&LoginOptions::default()).await.unwrap_err(),
        tf.logout(&LoginOptions::default()).await.unwrap_err(),
    ];

    assert!(matches!(errors[0], IacError::InitFailed(_)));
    assert!(matches!(errors[1], IacError::GetFailed(_)));
    assert!(matches!(errors[2], IacError::PlanFailed(_)));
    assert!(matches!(errors[3], IacError::ApplyFailed(_)));
    assert!(matches!(errors[4], IacError::DestroyFailed(_)));
    assert!(matches!(errors[5], IacError::FormatFailed(_)));
    assert!(matches!(errors[6], IacError::ValidateFailed(_)));
    assert!(matches!(errors[7], IacError::OutputFailed(_)));
    assert!(matches!(errors[8], IacError::LoginFailed(_)));
    assert!(matches!(errors[9], IacError::LogoutFailed(_)));

    for (name, err) in names.iter().zip(&errors) {
        let failure = err.failure().unwrap();
        assert_eq!(failure.command, *name);
        assert_eq!(failure.stderr, format!("Error: {} broke", name));
        assert!((failure.duration - 0.1).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_login_keeps_stdin_attached() {
    let (tf, mock) = terraform_with(
        "1.5.0",
        WrapperConfig::default(),
        vec![MockResponse::success(""), MockResponse::success("")],
    )
    .await;

    tf.login(&LoginOptions::host("app.terraform.io")).await.unwrap();
    tf.logout(&LoginOptions::host("app.terraform.io")).await.unwrap();

    let calls = mock.get_calls();
    assert!(calls[0].interactive);
    assert!(!calls[1].interactive);
}

#[tokio::test]
async fn test_stdin_attached_only_when_input_enabled() {
    let (tf, mock) = terraform_with(
        "1.5.0",
        WrapperConfig::default(),
        vec![MockResponse::success(""), MockResponse::success("")],
    )
    .await;

    tf.plan(&PlanOptions::default()).await.unwrap();
    let prompting = PlanOptions {
        defaults: DefaultFlags::default().input(true),
        ..PlanOptions::default()
    };
    tf.plan(&prompting).await.unwrap();

    let calls = mock.get_calls();
    assert!(!calls[0].interactive);
    assert!(calls[0].has_arg("-input=false"));
    assert!(calls[1].interactive);

    let (tf, mock) = terraform_with(
        "1.5.0",
        WrapperConfig::default().with_input(true),
        vec![MockResponse::success(""), MockResponse::success("")],
    )
    .await;

    tf.apply(&ApplyOptions::default()).await.unwrap();
    let quiet = DestroyOptions {
        defaults: DefaultFlags::default().input(false),
        ..DestroyOptions::default()
    };
    tf.destroy(&quiet).await.unwrap();

    let calls = mock.get_calls();
    assert!(calls[0].interactive);
    assert!(!calls[1].interactive);
}

#[tokio::test]
async fn test_show_failure_is_not_an_error() {
    let (tf, mock) = terraform_with(
        "1.5.0",
        WrapperConfig::default(),
        vec![MockResponse::failure(1, "no plan file").with_stdout("{}")],
    )
    .await;

    let shown = tf.show(&ShowOptions::default()).await.unwrap();
    assert_eq!(shown, QueryOutput::Json(json!({})));

    let call = mock.last_call().unwrap();
    assert_eq!(call.args, vec!["show", "-json", "plan.tfplan"]);
    assert!(!call.echo_output);
}

#[tokio::test]
async fn test_show_failure_is_logged_once() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::ERROR)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (tf, _) = terraform_with(
        "1.5.0",
        WrapperConfig::default(),
        vec![MockResponse::failure(1, "no plan file").with_stdout("{}")],
    )
    .await;
    tf.show(&ShowOptions::default()).await.unwrap();

    let output = logs.contents();
    let errors: Vec<&str> = output.lines().filter(|l| l.contains("ERROR")).collect();
    assert_eq!(errors.len(), 1, "{}", output);
    assert!(errors[0].contains("Terraform show failed with exit code 1"));
}

#[tokio::test]
async fn test_show_malformed_json_is_error() {
    let (tf, _) = terraform_with(
        "1.5.0",
        WrapperConfig::default(),
        vec![MockResponse::success("not json")],
    )
    .await;

    let err = tf.show(&ShowOptions::default()).await.unwrap_err();
    assert!(matches!(err, IacError::Json(_)));
}

#[tokio::test]
async fn test_output_decodes_json() {
    let (tf, mock) = terraform_with(
        "1.5.0",
        WrapperConfig::default(),
        vec![
            MockResponse::success(r#"{"bucket":{"sensitive":false,"type":"string","value":"b"}}"#),
            MockResponse::success("b\n"),
        ],
    )
    .await;

    let all = tf.output(&OutputOptions::default()).await.unwrap();
    assert_eq!(all.as_json().unwrap()["bucket"]["value"], "b");
    assert!(!mock.last_call().unwrap().echo_output);

    let raw = OutputOptions {
        json: false,
        raw: true,
        ..OutputOptions::named("bucket")
    };
    let single = tf.output(&raw).await.unwrap();
    assert_eq!(single, QueryOutput::Text("b\n".to_string()));
    assert_eq!(
        mock.last_call().unwrap().args,
        vec!["output", "-raw", "bucket"]
    );
}

#[tokio::test]
async fn test_per_call_chdir_wins() {
    let (tf, mock) = terraform_with(
        "1.5.0",
        WrapperConfig::default().with_working_dir("/infra/base"),
        vec![],
    )
    .await;

    tf.init(&InitOptions::default().chdir("/infra/override"))
        .await
        .unwrap();
    let call = mock.last_call().unwrap();
    assert_eq!(call.cwd, Some(PathBuf::from("/infra/override")));
    assert!(!call.args.iter().any(|a| a.starts_with("-chdir")));

    tf.fmt(&FmtOptions::check_only()).await.unwrap();
    let call = mock.last_call().unwrap();
    assert_eq!(call.cwd, Some(PathBuf::from("/infra/base")));
    assert_eq!(call.args, vec!["fmt", "-check", "-recursive"]);
}

#[tokio::test]
async fn test_overrides_leave_config_untouched() {
    let (tf, mock) = terraform_with("1.5.0", WrapperConfig::default(), vec![]).await;

    let mut opts = PlanOptions::default().out("other.tfplan").parallelism(2);
    opts.defaults = opts.defaults.lock(false).color(false);
    tf.plan(&opts).await.unwrap();
    tf.plan(&PlanOptions::default()).await.unwrap();

    let calls = mock.get_subcommand_calls("plan");
    assert_eq!(calls.len(), 2);
    assert!(calls[0].has_arg("-out=other.tfplan"));
    assert!(calls[0].has_arg("-lock=false"));
    assert!(calls[0].has_arg("-no-color"));
    assert!(calls[1].has_arg("-out=plan.tfplan"));
    assert!(calls[1].has_arg("-parallelism=10"));
    assert!(!calls[1].has_arg("-lock=false"));
    assert!(!calls[1].has_arg("-no-color"));
}

#[tokio::test]
async fn test_raw_run_passes_arguments_through() {
    let (tf, mock) = terraform_with(
        "1.5.0",
        WrapperConfig::default().with_binary("/usr/local/bin/terraform"),
        vec![MockResponse::failure(1, "workspace exists")],
    )
    .await;

    let args = vec!["workspace".to_string(), "new".to_string(), "dev".to_string()];
    let result = tf.run(args.clone(), Some("Create workspace"), None).await.unwrap();

    assert!(!result.success());
    let call = mock.last_call().unwrap();
    assert_eq!(call.program, "/usr/local/bin/terraform");
    assert_eq!(call.args, args);
    assert_eq!(call.title.as_deref(), Some("Create workspace"));
}

#[tokio::test]
async fn test_runner_error_propagates() {
    let mock = MockExecutor::new().simulate_failure("spawn failed");
    let tf = Terraform::with_version(
        Arc::new(mock),
        WrapperConfig::default(),
        EngineVersion::from_raw("1.5.0"),
    );

    let err = tf.plan(&PlanOptions::default()).await.unwrap_err();
    assert!(matches!(err, IacError::Runner(_)));
}
