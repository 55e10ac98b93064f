//! Wire types for the AI Island hook socket.
//!
//! Shared by the hook client and anything that needs to speak to the island
//! daemon, so the message schema lives in exactly one place. The daemon is the
//! authority on what it accepts; these types mirror the keys it decodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod normalize;

pub use normalize::{normalize, ProcessInfo, SessionInfo};

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/ai-island.sock";
pub const DEFAULT_SOURCE: &str = "claude";
pub const UNKNOWN_EVENT: &str = "Unknown";

/// Permission approvals wait on a human, so the wait is a full day.
pub const RESPONSE_TIMEOUT_SECS: u64 = 86_400;
pub const READ_CHUNK_BYTES: usize = 4096;
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024; // 1MB

/// Decision assumed when the daemon replies with an object lacking one.
pub const FALLBACK_DECISION: &str = "ask";

/// Hook events the host emits. Anything else is carried through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEventKind {
    PermissionRequest,
    PreToolUse,
    PostToolUse,
    UserPromptSubmit,
    Stop,
    SessionStart,
    SessionEnd,
    PreCompact,
    Notification,
    Other(String),
}

impl HookEventKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "PermissionRequest" => Self::PermissionRequest,
            "PreToolUse" => Self::PreToolUse,
            "PostToolUse" => Self::PostToolUse,
            "UserPromptSubmit" => Self::UserPromptSubmit,
            "Stop" => Self::Stop,
            "SessionStart" => Self::SessionStart,
            "SessionEnd" => Self::SessionEnd,
            "PreCompact" => Self::PreCompact,
            "Notification" => Self::Notification,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PermissionRequest => "PermissionRequest",
            Self::PreToolUse => "PreToolUse",
            Self::PostToolUse => "PostToolUse",
            Self::UserPromptSubmit => "UserPromptSubmit",
            Self::Stop => "Stop",
            Self::SessionStart => "SessionStart",
            Self::SessionEnd => "SessionEnd",
            Self::PreCompact => "PreCompact",
            Self::Notification => "Notification",
            Self::Other(name) => name,
        }
    }

    /// Total mapping; unrecognized events report as idle.
    pub fn status(&self) -> SessionStatus {
        match self {
            Self::PermissionRequest => SessionStatus::WaitingForApproval,
            Self::PreToolUse => SessionStatus::RunningTool,
            Self::PostToolUse | Self::UserPromptSubmit => SessionStatus::Processing,
            Self::Stop => SessionStatus::WaitingForInput,
            Self::SessionStart => SessionStatus::Starting,
            Self::SessionEnd => SessionStatus::Idle,
            Self::PreCompact => SessionStatus::Compacting,
            Self::Notification => SessionStatus::Notification,
            Self::Other(_) => SessionStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    WaitingForApproval,
    RunningTool,
    Processing,
    WaitingForInput,
    Starting,
    Idle,
    Compacting,
    Notification,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionStatus::WaitingForApproval => "waiting_for_approval",
            SessionStatus::RunningTool => "running_tool",
            SessionStatus::Processing => "processing",
            SessionStatus::WaitingForInput => "waiting_for_input",
            SessionStatus::Starting => "starting",
            SessionStatus::Idle => "idle",
            SessionStatus::Compacting => "compacting",
            SessionStatus::Notification => "notification",
        };
        f.write_str(label)
    }
}

/// One message per connection, client to daemon.
///
/// Optional fields serialize as `null` rather than being skipped: the daemon
/// treats a missing tool and an empty tool name differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub session_id: String,
    #[serde(rename = "cwd")]
    pub working_directory: String,
    pub source: String,
    pub event: String,
    pub status: SessionStatus,
    #[serde(rename = "pid", default)]
    pub process_id: Option<u32>,
    #[serde(rename = "tty", default)]
    pub terminal: Option<String>,
    #[serde(rename = "tool", default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<Value>,
    #[serde(default)]
    pub tool_use_id: Option<String>,
    #[serde(rename = "notification_type", default)]
    pub notification_kind: Option<String>,
    #[serde(rename = "message", default)]
    pub notification_message: Option<String>,
}

impl StatusRecord {
    /// The only request/response exchange in the protocol. Every other record
    /// is fire-and-forget, whatever the event means to the host.
    pub fn expects_response(&self) -> bool {
        self.event == HookEventKind::PermissionRequest.as_str()
            && self.status == SessionStatus::WaitingForApproval
    }
}

/// The daemon's answer to a permission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub decision: String,
    pub reason: Option<String>,
}

impl DecisionOutcome {
    /// Interprets a parsed daemon reply.
    ///
    /// Returns `None` for non-objects and for the empty object. A reply that
    /// omits `decision` reads as [`FALLBACK_DECISION`]; an empty `reason` is
    /// dropped.
    pub fn from_response(value: &Value) -> Option<Self> {
        let object = value.as_object().filter(|object| !object.is_empty())?;

        let decision = object
            .get("decision")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_DECISION)
            .to_string();
        let reason = object
            .get("reason")
            .and_then(Value::as_str)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string);

        Some(Self { decision, reason })
    }
}
