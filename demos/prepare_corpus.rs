//! Prepare a turn-taking corpus: label stage followed by feature stage
//!
//! Usage:
//!   cargo run --release --example prepare_corpus -- \
//!       --input data/raw/synthetic --processed data/processed \
//!       --features data/features --config configs/hybrid_v1.yaml --jobs 8

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use turnprep::corpus::{default_jobs, load_feature_dataset, run_feature_stage, run_label_stage};
use turnprep::PipelineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    /// Frame labels and windows only
    Labels,
    /// Features from an existing label directory
    Features,
    /// Both stages
    All,
}

#[derive(Parser)]
#[command(name = "prepare_corpus")]
#[command(about = "Label and featurize a conversational corpus for turn-taking training")]
struct Args {
    /// Raw corpus directory containing manifest.json
    #[arg(long, default_value = "data/raw/synthetic")]
    input: PathBuf,

    /// Output directory of the label stage
    #[arg(long, default_value = "data/processed")]
    processed: PathBuf,

    /// Output directory of the feature stage
    #[arg(long, default_value = "data/features")]
    features: PathBuf,

    /// Training config YAML (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which stage(s) to run
    #[arg(long, value_enum, default_value_t = Stage::All)]
    stage: Stage,

    /// Add Gaussian noise (data.noise_augmentation_std) to every feature archive
    #[arg(long)]
    augment: bool,

    /// Parallel workers (default: CPU-1)
    #[arg(long)]
    jobs: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_yaml_file(path)?,
        None => PipelineConfig::default(),
    };
    let jobs = args.jobs.map(|j| j.max(1)).unwrap_or_else(default_jobs);
    eprintln!("Pipeline: stage={:?}, jobs={}", args.stage, jobs);

    let t0 = Instant::now();

    if matches!(args.stage, Stage::Labels | Stage::All) {
        let index = run_label_stage(&args.input, &args.processed, &config, jobs)?;
        eprintln!(
            "Labels: {} archives, {} windows ({} absent, {} failed)",
            index.files.len(),
            index.total_windows,
            index.absent.len(),
            index.failed.len()
        );
        if !index.class_weights.is_empty() {
            eprintln!("Suggested class weights:");
            for (name, weight) in &index.class_weights {
                eprintln!("  {:20}: {:.3}", name, weight);
            }
        }
    }

    if matches!(args.stage, Stage::Features | Stage::All) {
        let index = run_feature_stage(&args.processed, &args.features, &config, args.augment, jobs)?;
        eprintln!(
            "Features: {} archives, {} windows of {}x{}",
            index.files.len(),
            index.total_windows,
            index.context_frames,
            index.feature_dim
        );

        let (x, y) = load_feature_dataset(&args.features)?;
        eprintln!("Dataset: features {:?}, labels {:?}", x.shape(), y.shape());
    }

    eprintln!("Done in {:.1}s", t0.elapsed().as_secs_f32());
    Ok(())
}
