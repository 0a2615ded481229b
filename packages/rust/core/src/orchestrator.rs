//! Concurrent fan-out/fan-in orchestration of the agent roster.
//!
//! One run: spawn every agent under a bounded pool, wait for all of them
//! (full barrier, no partial assembly), collect their artifacts, compose
//! the brief, gate it through the validator, patch the host document, and
//! write the dated archive entry. The patch/write stage runs single-writer
//! after the concurrent phase has fully drained.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use dailybrief_agents::Agent;
use dailybrief_patch::{PatchMode, patch, validate};
use dailybrief_shared::{
    AgentResult, BEGIN_MARKER, BriefConfig, DailyBriefError, END_MARKER, Result, RunId, RunReport,
};

use crate::assemble::{self, placeholder_fragment};
use crate::runner;

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when one agent's runner finishes (either way).
    fn agent_finished(&self, name: &str, success: bool);
    /// Called when the run completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn agent_finished(&self, _name: &str, _success: bool) {}
    fn done(&self, _report: &RunReport) {}
}

/// Drives the fixed agent roster through one complete brief generation.
pub struct Orchestrator {
    agents: Vec<Arc<dyn Agent>>,
    config: BriefConfig,
}

impl Orchestrator {
    pub fn new(agents: Vec<Arc<dyn Agent>>, config: BriefConfig) -> Self {
        Self { agents, config }
    }

    /// Execute one full run.
    ///
    /// Per-agent failures are contained and reported through the
    /// [`RunReport`]; the returned `Err` is reserved for fatal
    /// orchestration faults (unreadable host document, unusable output
    /// directories).
    #[instrument(skip_all, fields(agents = self.agents.len(), pool = self.config.pool_size))]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<RunReport> {
        let start = Instant::now();
        let run_id = RunId::new();
        let generated_at = Utc::now();

        info!(%run_id, "starting daily brief run");

        std::fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| DailyBriefError::io(&self.config.output_dir, e))?;
        std::fs::create_dir_all(&self.config.archive_dir)
            .map_err(|e| DailyBriefError::io(&self.config.archive_dir, e))?;

        // Fatal precondition: the host document must be readable up front.
        let host_text = std::fs::read_to_string(&self.config.host_path)
            .map_err(|e| DailyBriefError::io(&self.config.host_path, e))?;

        // --- Fan-out ---
        progress.phase("Running agents");
        let semaphore = Arc::new(Semaphore::new(self.config.pool_size.max(1)));
        let mut handles = Vec::with_capacity(self.agents.len());

        for agent in &self.agents {
            let name = agent.name();
            let agent = Arc::clone(agent);
            let sem = Arc::clone(&semaphore);
            let output_dir = self.config.output_dir.clone();

            handles.push((
                name,
                tokio::spawn(async move {
                    let _permit = sem.acquire().await.expect("semaphore closed");
                    runner::run_agent(agent.as_ref(), &output_dir).await
                }),
            ));
        }

        // --- Fan-in: full barrier, results keyed by name ---
        let mut results_by_name: HashMap<&str, AgentResult> = HashMap::new();
        for (name, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                // A panicked task is an agent failure, not a run failure.
                Err(e) => {
                    warn!(agent = name, error = %e, "agent task did not complete");
                    AgentResult::error(name, format!("agent task failed: {e}"))
                }
            };
            progress.agent_finished(name, result.status.is_success());
            results_by_name.insert(name, result);
        }

        // --- Collect + assemble ---
        progress.phase("Collecting agent outputs");
        let fragments = self.collect_fragments();

        progress.phase("Assembling brief");
        let brief = assemble::compose(&fragments, generated_at);
        let brief_doc = assemble::brief_document(&brief);

        let brief_path = self.config.output_dir.join("brief.md");
        if let Err(e) = std::fs::write(&brief_path, &brief_doc) {
            warn!(path = %brief_path.display(), error = %e, "failed to write brief artifact");
        }

        // --- Patch host (gated by the validator) ---
        progress.phase("Updating host document");
        let host_updated = match validate(&brief_doc) {
            Ok(()) => self.patch_host(&host_text, &brief),
            Err(failure) => {
                warn!(diagnostic = %failure, "brief failed validation, host update skipped");
                false
            }
        };

        // --- Archive: unconditional, independent of the host outcome ---
        progress.phase("Writing archive");
        let archive_written = self.write_archive(&brief, generated_at);

        let agents: Vec<AgentResult> = self
            .agents
            .iter()
            .map(|agent| {
                results_by_name
                    .get(agent.name())
                    .cloned()
                    .unwrap_or_else(|| AgentResult::error(agent.name(), "no result collected"))
            })
            .collect();

        let report = RunReport {
            run_id,
            generated_at,
            agents,
            host_updated,
            archive_written,
            brief_sha256: sha256_hex(&brief),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        let report_path = self.config.output_dir.join("run.json");
        match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&report_path, json) {
                    warn!(path = %report_path.display(), error = %e, "failed to write run report");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize run report"),
        }

        progress.done(&report);
        info!(
            run_id = %report.run_id,
            host_updated = report.host_updated,
            archive_written = report.archive_written,
            elapsed_ms = report.elapsed_ms,
            "daily brief run complete"
        );

        Ok(report)
    }

    /// Read each agent's content artifact, substituting the placeholder
    /// fragment when a file is missing.
    fn collect_fragments(&self) -> HashMap<String, String> {
        let mut fragments = HashMap::new();

        for agent in &self.agents {
            let name = agent.name();
            let path = self.config.output_dir.join(format!("{}.md", name.to_lowercase()));

            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    fragments.insert(name.to_string(), content);
                }
                Err(e) => {
                    warn!(agent = name, path = %path.display(), error = %e, "no content artifact");
                    fragments.insert(name.to_string(), placeholder_fragment(name));
                }
            }
        }

        fragments
    }

    /// Patch the wrapped brief into the host document's managed region.
    ///
    /// The orchestrator always uses interior mode: the host's own markers
    /// stay fixed, which makes marker duplication impossible at this call
    /// site.
    fn patch_host(&self, host_text: &str, brief: &str) -> bool {
        let wrapped = assemble::wrap_for_host(brief);

        let patched = match patch(
            host_text,
            BEGIN_MARKER,
            END_MARKER,
            &wrapped,
            PatchMode::Interior,
        ) {
            Ok(patched) => patched,
            Err(e) => {
                warn!(error = %e, "host document patch refused");
                return false;
            }
        };

        match std::fs::write(&self.config.host_path, patched) {
            Ok(()) => {
                info!(path = %self.config.host_path.display(), "host document updated");
                true
            }
            Err(e) => {
                warn!(path = %self.config.host_path.display(), error = %e, "failed to write host document");
                false
            }
        }
    }

    /// Write the dated archive entry; same-day re-runs overwrite.
    fn write_archive(&self, brief: &str, generated_at: chrono::DateTime<Utc>) -> bool {
        let path = self
            .config
            .archive_dir
            .join(format!("{}.md", generated_at.format("%Y-%m-%d")));
        let entry = assemble::archive_entry(brief, generated_at);

        match std::fs::write(&path, entry) {
            Ok(()) => {
                info!(path = %path.display(), "archive entry written");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to write archive entry");
                false
            }
        }
    }
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Expose the output-artifact path convention for external callers.
pub fn content_artifact_path(output_dir: &Path, agent_name: &str) -> std::path::PathBuf {
    output_dir.join(format!("{}.md", agent_name.to_lowercase()))
}
