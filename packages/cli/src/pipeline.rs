//! Read, analyze, and emit steps shared by the subcommands and the
//! interactive menu.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rank_map_analysis::{AnalysisError, analyze};
use rank_map_analysis_models::AnalysisReport;
use rank_map_ingest::{Dataset, IngestError, read_records};
use rank_map_render::{RenderError, default_output_path, render_json, write_html};
use thiserror::Error;

use crate::config::RankMapConfig;

/// Errors from any pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading or cleaning the input failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Analysis failed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Rendering or writing output failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Output of a completed analysis run.
#[derive(Debug)]
pub struct Analyzed {
    /// Cleaned input.
    pub dataset: Dataset,
    /// Analysis results.
    pub report: AnalysisReport,
}

/// Reads `input` and analyzes it.
///
/// # Errors
///
/// Returns [`PipelineError`] if ingestion or analysis fails.
pub fn load_and_analyze(input: &Path, config: &RankMapConfig) -> Result<Analyzed, PipelineError> {
    let start = Instant::now();

    let dataset = read_records(input, &config.ingest)?;
    let report = analyze(&dataset.records, &config.analysis)?;
    log::info!(
        "Analyzed {} locations in {:.2?}",
        dataset.records.len(),
        start.elapsed()
    );

    Ok(Analyzed { dataset, report })
}

/// Writes the map page for `input`, returning the path written.
///
/// # Errors
///
/// Returns [`PipelineError`] if any stage fails.
pub fn render_map(
    input: &Path,
    output: Option<&Path>,
    config: &RankMapConfig,
) -> Result<(Analyzed, PathBuf), PipelineError> {
    let analyzed = load_and_analyze(input, config)?;
    let path = output.map_or_else(|| default_output_path(input), Path::to_path_buf);
    write_html(&path, &analyzed.report, &config.render)?;
    Ok((analyzed, path))
}

/// Writes the analysis JSON to `output`, or returns it when `output` is
/// `None`.
///
/// # Errors
///
/// Returns [`PipelineError`] if any stage fails.
pub fn export_json(
    input: &Path,
    output: Option<&Path>,
    config: &RankMapConfig,
) -> Result<Option<String>, PipelineError> {
    let analyzed = load_and_analyze(input, config)?;
    let json = render_json(&analyzed.report, &config.render)?;

    let Some(path) = output else {
        return Ok(Some(json));
    };
    std::fs::write(path, json).map_err(RenderError::from)?;
    log::info!("Analysis written to {}", path.display());
    print_summary(&analyzed);
    Ok(None)
}

/// Prints a short console digest of a run.
pub fn print_summary(analyzed: &Analyzed) {
    let report = &analyzed.report;
    let summary = &report.summary;

    println!();
    println!("Locations:     {}", summary.total_locations);
    println!("Numeric ranks: {}", summary.numeric_ranks.len());
    println!("Special ranks: {}", summary.special_ranks);
    println!("Unranked:      {}", summary.unranked);
    if analyzed.dataset.dropped_rows > 0 {
        println!("Dropped rows:  {}", analyzed.dataset.dropped_rows);
    }
    if let Some(perf) = &summary.performance {
        println!(
            "Rank avg {:.2}, best {}, worst {}, variance {:.2}",
            perf.avg_rank, perf.best_rank, perf.worst_rank, perf.rank_variance
        );
    }
    println!(
        "Center ({:.5}, {:.5}), zoom {}",
        report.bounds.center_lat, report.bounds.center_lng, report.zoom
    );
    println!(
        "Clusters: {}, populated density cells: {}",
        report.clusters.len(),
        report.density.total_cells
    );
}
