//! Orchestration core: the agent runner envelope, composite assembly, and
//! the concurrent fan-out/fan-in driver for one daily brief run.

pub mod assemble;
pub mod orchestrator;
pub mod runner;

pub use assemble::{ROSTER, compose, placeholder_fragment, wrap_for_host};
pub use orchestrator::{Orchestrator, ProgressReporter, SilentProgress, content_artifact_path};
pub use runner::{NO_DATA_MESSAGE, error_fragment, run_agent};
