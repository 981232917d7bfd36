//! Orchestration and the process-per-evaluation isolation boundary.

pub mod orchestrator;
pub(crate) mod worker;
