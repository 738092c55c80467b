//! Corpus-level batch stages
//!
//! Recordings are processed independently on a rayon pool; results are
//! folded into [`CorpusStats`] values and merged in manifest order, so the
//! written indexes do not depend on the worker count.

pub mod feature_stage;
pub mod label_stage;
pub mod manifest;
pub mod stats;

pub use feature_stage::{load_feature_dataset, run_feature_stage};
pub use label_stage::{process_conversation, run_label_stage};
pub use manifest::{load_manifest, ManifestEntry};
pub use stats::CorpusStats;

use crate::error::PipelineError;

/// Default worker count: all cores but one
pub fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

/// Thread pool for a stage; `jobs == 0` picks [`default_jobs`]
fn build_pool(jobs: usize) -> Result<rayon::ThreadPool, PipelineError> {
    let jobs = if jobs == 0 { default_jobs() } else { jobs };
    log::debug!("Building worker pool with {} threads", jobs);
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| PipelineError::ProcessingError(format!("Failed to build thread pool: {}", e)))
}
