//! Core domain types for daily brief runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel marking the start of the managed region in the host document.
pub const BEGIN_MARKER: &str = "<!-- BEGIN DAILY BRIEF -->";

/// Sentinel marking the end of the managed region in the host document.
pub const END_MARKER: &str = "<!-- END DAILY BRIEF -->";

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for orchestration run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Agent outcome
// ---------------------------------------------------------------------------

/// Terminal status of one agent within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Success,
    Error,
}

impl AgentStatus {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Outcome of one agent's execution, created once per run by the runner
/// and immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// Stable agent name from the roster.
    pub agent: String,
    /// Terminal status.
    pub status: AgentStatus,
    /// Captured failure message when `status` is `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResult {
    pub fn success(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            status: AgentStatus::Success,
            error: None,
        }
    }

    pub fn error(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            status: AgentStatus::Error,
            error: Some(message.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Status artifact
// ---------------------------------------------------------------------------

/// The `<name>.json` status record written next to each agent's content
/// artifact. Downstream consumers never need to special-case a missing
/// file: the runner writes one per agent regardless of outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Agent name.
    pub agent: String,
    /// Terminal status.
    pub status: AgentStatus,
    /// The semantic record the fetch produced, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Captured failure message, on error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// The `run.json` summary artifact written at the end of each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this run.
    pub run_id: RunId,
    /// UTC timestamp the composite document carries.
    pub generated_at: DateTime<Utc>,
    /// Per-agent outcomes, in roster order.
    pub agents: Vec<AgentResult>,
    /// Whether the host document was patched.
    pub host_updated: bool,
    /// Whether the dated archive entry was written.
    pub archive_written: bool,
    /// SHA-256 of the composite document body.
    pub brief_sha256: String,
    /// Wall-clock duration of the run.
    pub elapsed_ms: u64,
}

impl RunReport {
    /// True when every agent in the roster succeeded.
    pub fn all_agents_ok(&self) -> bool {
        self.agents.iter().all(|a| a.status.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn agent_status_serializes_snake_case() {
        let json = serde_json::to_string(&AgentStatus::Success).expect("serialize");
        assert_eq!(json, "\"success\"");
        let json = serde_json::to_string(&AgentStatus::Error).expect("serialize");
        assert_eq!(json, "\"error\"");
    }

    #[test]
    fn status_record_omits_empty_fields() {
        let record = StatusRecord {
            agent: "Quote".into(),
            status: AgentStatus::Success,
            data: Some(serde_json::json!({"text": "x", "author": "y"})),
            error: None,
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(!json.contains("\"error\""));

        let record = StatusRecord {
            agent: "Quote".into(),
            status: AgentStatus::Error,
            data: None,
            error: Some("Failed to fetch data".into()),
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(!json.contains("\"data\""));
        assert!(json.contains("Failed to fetch data"));
    }

    #[test]
    fn run_report_serialization() {
        let report = RunReport {
            run_id: RunId::new(),
            generated_at: Utc::now(),
            agents: vec![
                AgentResult::success("Quote"),
                AgentResult::error("Weather", "timed out"),
            ],
            host_updated: true,
            archive_written: true,
            brief_sha256: "0".repeat(64),
            elapsed_ms: 1234,
        };

        let json = serde_json::to_string_pretty(&report).expect("serialize");
        let parsed: RunReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.agents.len(), 2);
        assert!(!parsed.all_agents_ok());
        assert_eq!(parsed.agents[1].error.as_deref(), Some("timed out"));
    }
}
