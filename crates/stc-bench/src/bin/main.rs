//! Standalone benchmark runner.

use std::fs;
use std::path::PathBuf;

use stc_app::ENGINE_VERSION;
use stc_bench::{BenchmarkSuite, default_scenarios, run_all};
use stc_results::RunManifest;
use tracing_subscriber::EnvFilter;

const REPEATS: usize = 5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let crate_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = crate_path
        .parent()
        .and_then(|p| p.parent())
        .ok_or("Could not determine repo root")?
        .to_path_buf();

    println!("Self-Triggered Control Benchmark Suite");
    println!("======================================\n");

    let benchmarks = default_scenarios();
    println!(
        "Running {} benchmarks in parallel, {} runs each...\n",
        benchmarks.len(),
        REPEATS
    );

    let mut results = Vec::new();
    for (id, outcome) in run_all(&benchmarks, REPEATS) {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => eprintln!("[{id}] FAILED: {e}"),
        }
    }

    for result in &results {
        println!("{}", result.scenario.name);
        println!("  Samples:        {}", result.samples);
        println!(
            "  Interval:       {:.3e} mean, {:.3e} min",
            result.mean_interval_s, result.min_interval_s
        );
        println!(
            "  Analog dev:     {:.3e} max, {:.3e} rms",
            result.max_deviation, result.rms_deviation
        );
        println!(
            "  Wall time:      {:.4}s (median), {:.4}s (min)",
            result.wall_time_median_s, result.wall_time_min_s
        );
        println!();
    }

    let baseline_json = serde_json::to_string_pretty(&BenchmarkSuite {
        timestamp: RunManifest::timestamp_now(),
        engine_version: ENGINE_VERSION.to_string(),
        results,
    })?;

    let baseline_dir = repo_root.join("benchmarks");
    fs::create_dir_all(&baseline_dir)?;
    let baseline_path = baseline_dir.join("baseline.json");
    fs::write(&baseline_path, baseline_json)?;

    println!("Baseline saved to: {}", baseline_path.display());
    Ok(())
}
