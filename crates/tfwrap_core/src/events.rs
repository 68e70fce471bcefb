//! Aggregation of the JSON event stream printed by `terraform apply -json`.
//!
//! The engine prints one JSON object per line. Only three event types carry
//! information we keep:
//!
//! - `outputs`: replaces the aggregated outputs (last write wins)
//! - `change_summary`: replaces the aggregated change counts
//! - `apply_complete`: records the hook payload under its resource address
//!
//! Lines that are not JSON objects, lack a `type`, or have any other type are
//! skipped. The aggregator never fails.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, trace};

use tfwrap_runner::{ExecHooks, OutputLine, OutputStream};

/// Final result of an apply run.
///
/// A field stays `None` when the corresponding event never arrived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedApplyResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Value>,
    /// Resource address -> `apply_complete` hook payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<BTreeMap<String, Value>>,
}

impl AggregatedApplyResult {
    /// Completion record for one resource.
    pub fn resource(&self, addr: &str) -> Option<&Value> {
        self.result.as_ref().and_then(|r| r.get(addr))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    Outputs { outputs: Value },
    ChangeSummary { changes: Value },
    ApplyComplete { hook: Value },
    #[serde(other)]
    Other,
}

/// Aggregator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Accumulating,
    Done,
}

/// Folds apply events into an [`AggregatedApplyResult`].
#[derive(Debug)]
pub struct ApplyEventAggregator {
    state: AggregatorState,
    result: AggregatedApplyResult,
    skipped: usize,
}

impl Default for ApplyEventAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplyEventAggregator {
    pub fn new() -> Self {
        Self {
            state: AggregatorState::Accumulating,
            result: AggregatedApplyResult::default(),
            skipped: 0,
        }
    }

    /// Aggregate a complete stream in one go.
    pub fn aggregate<'a, I>(lines: I) -> AggregatedApplyResult
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut aggregator = Self::new();
        for line in lines {
            aggregator.feed_line(line);
        }
        aggregator.finish();
        aggregator.into_result()
    }

    pub fn state(&self) -> AggregatorState {
        self.state
    }

    /// Number of lines that could not be decoded.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn result(&self) -> &AggregatedApplyResult {
        &self.result
    }

    pub fn into_result(self) -> AggregatedApplyResult {
        self.result
    }

    /// Mark the stream as closed; later lines are ignored.
    pub fn finish(&mut self) {
        self.state = AggregatorState::Done;
    }

    /// Process one line of the stream.
    pub fn feed_line(&mut self, line: &str) {
        if self.state == AggregatorState::Done {
            return;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                trace!("Skipping undecodable apply line: {}", e);
                self.skipped += 1;
                return;
            }
        };

        if let Some(message) = value.get("@message").and_then(Value::as_str) {
            info!("{}", message);
        }

        let event = match StreamEvent::deserialize(&value) {
            Ok(event) => event,
            Err(e) => {
                trace!("Ignoring apply event: {}", e);
                return;
            }
        };

        match event {
            StreamEvent::Outputs { outputs } => self.result.outputs = Some(outputs),
            StreamEvent::ChangeSummary { changes } => self.result.changes = Some(changes),
            StreamEvent::ApplyComplete { hook } => {
                let Some(addr) = hook
                    .pointer("/resource/addr")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                else {
                    trace!("Ignoring apply_complete event without a resource address");
                    return;
                };
                self.result
                    .result
                    .get_or_insert_with(BTreeMap::new)
                    .insert(addr, hook);
            }
            StreamEvent::Other => {}
        }
    }
}

impl ExecHooks for ApplyEventAggregator {
    fn on_line(&mut self, line: &OutputLine) {
        if line.stream == OutputStream::Stdout {
            self.feed_line(&line.message);
        }
    }

    fn on_complete(&mut self, _stdout: &str, _stderr: &str) -> Option<Value> {
        self.finish();
        serde_json::to_value(&self.result).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outputs_and_complete_with_malformed_line() {
        let result = ApplyEventAggregator::aggregate([
            r#"{"type":"outputs","outputs":{"a":1}}"#,
            r#"{"type":"apply_complete","hook":{"resource":{"addr":"x"}}}"#,
            "not json",
        ]);

        assert_eq!(result.outputs, Some(json!({"a": 1})));
        assert_eq!(result.changes, None);
        assert_eq!(result.resource("x"), Some(&json!({"resource": {"addr": "x"}})));

        let encoded = serde_json::to_value(&result).unwrap();
        assert_eq!(
            encoded,
            json!({"outputs": {"a": 1}, "result": {"x": {"resource": {"addr": "x"}}}})
        );
    }

    #[test]
    fn test_last_write_wins() {
        let result = ApplyEventAggregator::aggregate([
            r#"{"type":"outputs","outputs":{"a":1}}"#,
            r#"{"type":"change_summary","changes":{"add":1,"change":0,"remove":0}}"#,
            r#"{"type":"outputs","outputs":{"b":2}}"#,
            r#"{"type":"change_summary","changes":{"add":2,"change":0,"remove":0}}"#,
        ]);

        assert_eq!(result.outputs, Some(json!({"b": 2})));
        assert_eq!(result.changes, Some(json!({"add": 2, "change": 0, "remove": 0})));
    }

    #[test]
    fn test_apply_complete_overwrites_same_address() {
        let result = ApplyEventAggregator::aggregate([
            r#"{"type":"apply_complete","hook":{"resource":{"addr":"aws_s3_bucket.a"},"action":"create"}}"#,
            r#"{"type":"apply_complete","hook":{"resource":{"addr":"aws_s3_bucket.b"},"action":"create"}}"#,
            r#"{"type":"apply_complete","hook":{"resource":{"addr":"aws_s3_bucket.a"},"action":"update"}}"#,
        ]);

        let records = result.result.as_ref().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(result.resource("aws_s3_bucket.a").unwrap()["action"], "update");
    }

    #[test]
    fn test_irrelevant_and_incomplete_events_are_ignored() {
        let mut aggregator = ApplyEventAggregator::new();
        for line in [
            r#"{"@message":"Terraform 1.5.0","type":"version","terraform":"1.5.0"}"#,
            r#"{"@message":"no type here"}"#,
            r#"{"type":"outputs"}"#,
            r#"{"type":"apply_complete","hook":{"resource":{}}}"#,
            r#"[1, 2, 3]"#,
            "",
            "{broken",
        ] {
            aggregator.feed_line(line);
        }

        assert_eq!(aggregator.skipped(), 2);
        assert_eq!(aggregator.state(), AggregatorState::Accumulating);
        assert_eq!(aggregator.result(), &AggregatedApplyResult::default());
    }

    #[test]
    fn test_empty_stream_is_valid() {
        let result = ApplyEventAggregator::aggregate(std::iter::empty());
        assert_eq!(result, AggregatedApplyResult::default());
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({}));
    }

    #[test]
    fn test_done_is_terminal() {
        let mut aggregator = ApplyEventAggregator::new();
        aggregator.feed_line(r#"{"type":"outputs","outputs":{"a":1}}"#);

        let output = aggregator.on_complete("", "");
        assert_eq!(output, Some(json!({"outputs": {"a": 1}})));
        assert_eq!(aggregator.state(), AggregatorState::Done);

        aggregator.feed_line(r#"{"type":"outputs","outputs":{"a":2}}"#);
        assert_eq!(aggregator.result().outputs, Some(json!({"a": 1})));
    }

    #[test]
    fn test_hooks_only_consume_stdout() {
        let mut aggregator = ApplyEventAggregator::new();
        aggregator.on_line(&OutputLine::stderr(r#"{"type":"outputs","outputs":{"a":1}}"#));
        aggregator.on_line(&OutputLine::stdout(r#"{"type":"outputs","outputs":{"b":1}}"#));

        assert_eq!(aggregator.result().outputs, Some(json!({"b": 1})));
    }
}
