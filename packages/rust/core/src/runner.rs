//! Agent execution envelope.
//!
//! [`run_agent`] wraps one agent's fetch/render pair so that every outcome
//! (data, empty source, fault, even a failed disk write) ends as an
//! [`AgentResult`] plus a pair of artifact files. Nothing escapes the
//! envelope, which is what lets the orchestrator treat all agents
//! uniformly at fan-in.

use std::path::Path;

use tracing::{debug, info, warn};

use dailybrief_agents::Agent;
use dailybrief_shared::{AgentResult, AgentStatus, DailyBriefError, Result, StatusRecord};

/// Message recorded when a fetch completes without producing data.
pub const NO_DATA_MESSAGE: &str = "Failed to fetch data";

/// Execute one agent: fetch, render, persist.
///
/// Always writes exactly one content artifact (`<name>.md`) and one status
/// artifact (`<name>.json`) under `output_dir`, keyed by the lower-cased
/// agent name, regardless of outcome. Downstream consumers never need to
/// special-case a missing file.
pub async fn run_agent(agent: &dyn Agent, output_dir: &Path) -> AgentResult {
    let name = agent.name();
    info!(agent = name, "starting agent");

    match agent.fetch().await {
        Ok(Some(data)) => {
            let fragment = agent.render(&data);
            let record = StatusRecord {
                agent: name.to_string(),
                status: AgentStatus::Success,
                data: Some(data),
                error: None,
            };

            match write_artifacts(output_dir, name, &fragment, &record) {
                Ok(()) => {
                    info!(agent = name, "agent completed successfully");
                    AgentResult::success(name)
                }
                Err(e) => {
                    warn!(agent = name, error = %e, "failed to persist agent output");
                    AgentResult::error(name, e.to_string())
                }
            }
        }
        Ok(None) => {
            warn!(agent = name, "agent produced no data");
            write_error_artifacts(output_dir, name, NO_DATA_MESSAGE);
            AgentResult::error(name, NO_DATA_MESSAGE)
        }
        Err(e) => {
            warn!(agent = name, error = %e, "agent failed");
            let message = e.to_string();
            write_error_artifacts(output_dir, name, &message);
            AgentResult::error(name, message)
        }
    }
}

/// The error placeholder fragment persisted when an agent fails.
pub fn error_fragment(name: &str, message: Option<&str>) -> String {
    let mut md = format!("**{name} data unavailable** ⛔\n");
    if let Some(message) = message {
        md.push_str(&format!("\n_Error: {message}_\n"));
    }
    md
}

fn write_artifacts(
    output_dir: &Path,
    name: &str,
    fragment: &str,
    record: &StatusRecord,
) -> Result<()> {
    let key = name.to_lowercase();

    let md_path = output_dir.join(format!("{key}.md"));
    std::fs::write(&md_path, fragment).map_err(|e| DailyBriefError::io(&md_path, e))?;
    debug!(agent = name, path = %md_path.display(), "wrote content artifact");

    let json = serde_json::to_string_pretty(record)
        .map_err(|e| DailyBriefError::validation(format!("status serialization failed: {e}")))?;
    let json_path = output_dir.join(format!("{key}.json"));
    std::fs::write(&json_path, json).map_err(|e| DailyBriefError::io(&json_path, e))?;
    debug!(agent = name, path = %json_path.display(), "wrote status artifact");

    Ok(())
}

/// Best-effort persistence of the error placeholder and status record.
/// A failing disk write is logged, not propagated: the in-memory
/// [`AgentResult`] already carries the outcome.
fn write_error_artifacts(output_dir: &Path, name: &str, message: &str) {
    let record = StatusRecord {
        agent: name.to_string(),
        status: AgentStatus::Error,
        data: None,
        error: Some(message.to_string()),
    };

    if let Err(e) = write_artifacts(output_dir, name, &error_fragment(name, Some(message)), &record)
    {
        warn!(agent = name, error = %e, "failed to persist error artifacts");
    }
}
