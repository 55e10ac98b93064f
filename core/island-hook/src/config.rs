//! Per-invocation configuration, resolved from the environment.
//!
//! The hook is spawned fresh for every event, so nothing here is cached or
//! persisted. Lookups go through a closure so tests never touch the real
//! process environment.

use island_protocol::{SessionInfo, DEFAULT_SOCKET_PATH, DEFAULT_SOURCE, RESPONSE_TIMEOUT_SECS};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const EVENT_ENV: &str = "CLAUDE_HOOK_EVENT";
pub const SOCKET_ENV: &str = "AI_ISLAND_SOCKET";
const TIMEOUT_ENV: &str = "AI_ISLAND_TIMEOUT_SECS";
const ENABLE_ENV: &str = "AI_ISLAND_ENABLED";
const SESSION_ID_ENV: &str = "CLAUDE_SESSION_ID";
const CWD_ENV: &str = "CLAUDE_CWD";
const SOURCE_ENV: &str = "AI_SOURCE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConfig {
    pub socket_path: PathBuf,
    /// Applied to the send and to the response wait alike.
    pub timeout: Duration,
    pub enabled: bool,
}

impl HookConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let socket_path = lookup(SOCKET_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET_PATH));

        let timeout = Duration::from_secs(parse_timeout(lookup(TIMEOUT_ENV)));

        let enabled = match lookup(ENABLE_ENV) {
            Some(value) => !matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            ),
            None => true,
        };

        Self {
            socket_path,
            timeout,
            enabled,
        }
    }

    /// A `--socket` flag beats the environment.
    pub fn with_socket_override(mut self, socket: Option<PathBuf>) -> Self {
        if let Some(path) = socket {
            self.socket_path = path;
        }
        self
    }
}

fn parse_timeout(raw: Option<String>) -> u64 {
    let Some(raw) = raw else {
        return RESPONSE_TIMEOUT_SECS;
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => secs,
        _ => {
            tracing::warn!(value = %raw, "Ignoring invalid {}, using default", TIMEOUT_ENV);
            RESPONSE_TIMEOUT_SECS
        }
    }
}

pub fn session_from_env() -> SessionInfo {
    session_from_lookup(|key| env::var(key).ok(), current_dir_string)
}

fn session_from_lookup<F, D>(lookup: F, current_dir: D) -> SessionInfo
where
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> String,
{
    SessionInfo {
        session_id: lookup(SESSION_ID_ENV).unwrap_or_default(),
        cwd: lookup(CWD_ENV).unwrap_or_else(current_dir),
        source: lookup(SOURCE_ENV).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
    }
}

fn current_dir_string() -> String {
    env::current_dir()
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_default()
}
