//! Event handler for assistant hooks.
//!
//! Reads the event payload from stdin, normalizes it into a status record,
//! hands it to the daemon, and prints exactly one JSON object on stdout:
//!
//! ```text
//! PermissionRequest + daemon decision → {"decision": "...", "reason": "..."?}
//! anything else                       → {}
//! ```
//!
//! The host must never be blocked or broken by this hook, so every failure
//! below this point degrades to `{}`.

use crate::config::{self, HookConfig};
use crate::daemon_client::DaemonClient;
use crate::process;
use island_protocol::{normalize, DecisionOutcome, HookEventKind, ProcessInfo, SessionInfo};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandleError {
    #[error("failed to read stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("hook payload is not valid JSON: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("failed to write hook output: {0}")]
    Stdout(#[source] io::Error),
}

/// What the host reads back on stdout.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct HookOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HookOutput {
    fn for_outcome(event: &str, outcome: Option<DecisionOutcome>) -> Self {
        match outcome {
            Some(outcome) if event == HookEventKind::PermissionRequest.as_str() => Self {
                decision: Some(outcome.decision),
                reason: outcome.reason,
            },
            _ => Self::default(),
        }
    }
}

pub fn run(event_name: &str, config: &HookConfig) -> Result<(), HandleError> {
    let output = respond(event_name, io::stdin().lock(), config, || {
        (config::session_from_env(), process::current())
    });
    write_output(&mut io::stdout().lock(), &output)
}

/// `metadata` runs only after stdin is drained and the payload accepted.
fn respond<R, M>(event_name: &str, input: R, config: &HookConfig, metadata: M) -> HookOutput
where
    R: Read,
    M: FnOnce() -> (SessionInfo, ProcessInfo),
{
    let payload = match read_payload(input) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(error = %err, event = %event_name, "Skipping event");
            return HookOutput::default();
        }
    };

    if !config.enabled {
        tracing::debug!(event = %event_name, "Reporting disabled, skipping");
        return HookOutput::default();
    }

    let (session, process) = metadata();
    let record = normalize(event_name, &payload, &session, &process);
    let outcome = DaemonClient::from_config(config).deliver(&record);
    if let Some(outcome) = &outcome {
        tracing::debug!(
            decision = %outcome.decision,
            tool_use_id = ?record.tool_use_id,
            "Daemon decision received"
        );
    }

    HookOutput::for_outcome(&record.event, outcome)
}

/// Empty input is an empty payload: the event name alone is still worth reporting.
fn read_payload<R: Read>(mut input: R) -> Result<Value, HandleError> {
    let mut raw = String::new();
    input.read_to_string(&mut raw).map_err(HandleError::Stdin)?;

    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    serde_json::from_str(&raw).map_err(HandleError::MalformedPayload)
}

fn write_output<W: Write>(out: &mut W, output: &HookOutput) -> Result<(), HandleError> {
    serde_json::to_writer(&mut *out, output)
        .map_err(|err| HandleError::Stdout(io::Error::from(err)))?;
    writeln!(out).map_err(HandleError::Stdout)?;
    out.flush().map_err(HandleError::Stdout)
}
