//! Host event → [`StatusRecord`].
//!
//! ```text
//! PermissionRequest → waiting_for_approval  (tool, tool_input, tool_use_id)
//! PreToolUse        → running_tool          (tool, tool_input, tool_use_id)
//! PostToolUse       → processing            (tool, tool_use_id)
//! UserPromptSubmit  → processing
//! Stop              → waiting_for_input
//! SessionStart      → starting
//! SessionEnd        → idle
//! PreCompact        → compacting
//! Notification      → notification          (notification_type, message)
//! anything else     → idle
//! ```
//!
//! Payload reads never fail: a missing key, a `null`, or a value of the wrong
//! type all become an absent field.

use serde_json::Value;

use crate::{HookEventKind, StatusRecord};

/// Session metadata supplied by the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: String,
    pub cwd: String,
    pub source: String,
}

/// Best-effort facts about the invoking process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: Option<u32>,
    pub tty: Option<String>,
}

pub fn normalize(
    event_name: &str,
    payload: &Value,
    session: &SessionInfo,
    process: &ProcessInfo,
) -> StatusRecord {
    let kind = HookEventKind::from_name(event_name);

    let mut record = StatusRecord {
        session_id: session.session_id.clone(),
        working_directory: session.cwd.clone(),
        source: session.source.clone(),
        event: event_name.to_string(),
        status: kind.status(),
        process_id: process.pid,
        terminal: process.tty.clone(),
        tool_name: None,
        tool_input: None,
        tool_use_id: None,
        notification_kind: None,
        notification_message: None,
    };

    match kind {
        HookEventKind::PermissionRequest | HookEventKind::PreToolUse => {
            record.tool_name = string_field(payload, "tool_name");
            record.tool_input = value_field(payload, "tool_input");
            record.tool_use_id = string_field(payload, "tool_use_id");
        }
        HookEventKind::PostToolUse => {
            record.tool_name = string_field(payload, "tool_name");
            record.tool_use_id = string_field(payload, "tool_use_id");
        }
        HookEventKind::Notification => {
            record.notification_kind = string_field(payload, "type");
            record.notification_message = string_field(payload, "message");
        }
        _ => {}
    }

    record
}

fn string_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}

fn value_field(payload: &Value, key: &str) -> Option<Value> {
    payload.get(key).filter(|value| !value.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionStatus;
    use serde_json::json;

    fn session() -> SessionInfo {
        SessionInfo {
            session_id: "session-1".to_string(),
            cwd: "/repo".to_string(),
            source: "claude".to_string(),
        }
    }

    fn full_payload() -> Value {
        json!({
            "tool_name": "Bash",
            "tool_input": {"command": "cargo test", "timeout": 30},
            "tool_use_id": "toolu_01",
            "type": "idle_prompt",
            "message": "Claude is waiting for your input",
            "transcript_path": "/tmp/transcript.jsonl"
        })
    }

    #[test]
    fn permission_request_carries_tool_fields() {
        let process = ProcessInfo {
            pid: Some(4242),
            tty: Some("/dev/ttys003".to_string()),
        };
        let record = normalize("PermissionRequest", &full_payload(), &session(), &process);

        assert_eq!(record.status, SessionStatus::WaitingForApproval);
        assert_eq!(record.session_id, "session-1");
        assert_eq!(record.working_directory, "/repo");
        assert_eq!(record.process_id, Some(4242));
        assert_eq!(record.terminal.as_deref(), Some("/dev/ttys003"));
        assert_eq!(record.tool_name.as_deref(), Some("Bash"));
        assert_eq!(
            record.tool_input,
            Some(json!({"command": "cargo test", "timeout": 30}))
        );
        assert_eq!(record.tool_use_id.as_deref(), Some("toolu_01"));
        assert_eq!(record.notification_kind, None);
        assert_eq!(record.notification_message, None);
        assert!(record.expects_response());
    }

    #[test]
    fn post_tool_use_omits_tool_input() {
        let record = normalize(
            "PostToolUse",
            &full_payload(),
            &session(),
            &ProcessInfo::default(),
        );

        assert_eq!(record.status, SessionStatus::Processing);
        assert_eq!(record.tool_name.as_deref(), Some("Bash"));
        assert_eq!(record.tool_use_id.as_deref(), Some("toolu_01"));
        assert_eq!(record.tool_input, None);
    }

    #[test]
    fn notification_carries_type_and_message_only() {
        let record = normalize(
            "Notification",
            &full_payload(),
            &session(),
            &ProcessInfo::default(),
        );

        assert_eq!(record.status, SessionStatus::Notification);
        assert_eq!(record.notification_kind.as_deref(), Some("idle_prompt"));
        assert_eq!(
            record.notification_message.as_deref(),
            Some("Claude is waiting for your input")
        );
        assert_eq!(record.tool_name, None);
        assert_eq!(record.tool_use_id, None);
    }

    #[test]
    fn lifecycle_events_carry_no_extra_fields() {
        for event in ["UserPromptSubmit", "Stop", "SessionStart", "SessionEnd", "PreCompact", "Mystery"] {
            let record = normalize(event, &full_payload(), &session(), &ProcessInfo::default());
            assert_eq!(record.event, event);
            assert_eq!(record.tool_name, None, "{}", event);
            assert_eq!(record.tool_input, None, "{}", event);
            assert_eq!(record.tool_use_id, None, "{}", event);
            assert_eq!(record.notification_kind, None, "{}", event);
            assert_eq!(record.notification_message, None, "{}", event);
        }
    }

    #[test]
    fn unknown_event_is_idle_and_keeps_its_name() {
        let record = normalize("SubagentStop", &json!({}), &session(), &ProcessInfo::default());
        assert_eq!(record.event, "SubagentStop");
        assert_eq!(record.status, SessionStatus::Idle);
    }

    #[test]
    fn missing_or_mistyped_fields_degrade_to_absent() {
        let payload = json!({
            "tool_name": 7,
            "tool_input": null,
            "tool_use_id": ["x"]
        });
        let record = normalize("PreToolUse", &payload, &session(), &ProcessInfo::default());
        assert_eq!(record.status, SessionStatus::RunningTool);
        assert_eq!(record.tool_name, None);
        assert_eq!(record.tool_input, None);
        assert_eq!(record.tool_use_id, None);

        let record = normalize("PreToolUse", &json!([1, 2]), &session(), &ProcessInfo::default());
        assert_eq!(record.tool_name, None);
    }

    #[test]
    fn empty_tool_name_stays_present() {
        let record = normalize(
            "PreToolUse",
            &json!({"tool_name": ""}),
            &session(),
            &ProcessInfo::default(),
        );
        assert_eq!(record.tool_name.as_deref(), Some(""));
    }

    #[test]
    fn scalar_tool_input_is_forwarded_unexamined() {
        let record = normalize(
            "PermissionRequest",
            &json!({"tool_input": "raw"}),
            &session(),
            &ProcessInfo::default(),
        );
        assert_eq!(record.tool_input, Some(json!("raw")));
    }
}
