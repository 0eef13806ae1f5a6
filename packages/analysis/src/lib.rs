#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geospatial analysis over ranked location records.
//!
//! Every function here is a pure, synchronous computation over an
//! in-memory record slice: bounding box and zoom ([`bounds`]), rank to
//! color classification ([`color`]), a fixed-resolution density grid
//! ([`density`]), greedy proximity clustering ([`cluster`]), rank
//! summaries ([`stats`]) and heatmap weights ([`heatmap`]).
//!
//! [`analyze`] runs the whole pipeline and bundles the results into an
//! [`AnalysisReport`].

pub mod bounds;
pub mod cluster;
pub mod color;
pub mod density;
pub mod heatmap;
pub mod stats;

use rank_map_analysis_models::{AnalysisConfig, AnalysisReport, LocationRecord, Marker};
use thiserror::Error;

pub use bounds::{compute_bounds, compute_zoom};
pub use cluster::cluster_by_proximity;
pub use color::{classify, numeric_pool};
pub use density::compute_density;
pub use stats::summarize_ranks;

/// Errors that can occur during analysis.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// No records were supplied.
    #[error("No location records to analyze")]
    EmptyInput,

    /// A tunable is out of range.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what went wrong.
        message: String,
    },
}

/// Checks the grid size and clustering threshold of a config.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidConfig`] if `grid_size` is zero or
/// `cluster_threshold` is NaN or not positive.
pub fn validate_config(config: &AnalysisConfig) -> Result<(), AnalysisError> {
    density::check_grid_size(config.grid_size)?;
    cluster::check_threshold(config.cluster_threshold)?;
    Ok(())
}

/// Runs the full analysis pipeline over a record list.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyInput`] if `records` is empty, or
/// [`AnalysisError::InvalidConfig`] if the config fails validation.
pub fn analyze(
    records: &[LocationRecord],
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    validate_config(config)?;

    let bounds = compute_bounds(records)?;
    let zoom = compute_zoom(&bounds);
    log::info!(
        "Analyzing {} records (spread {:.4}°, zoom {zoom})",
        records.len(),
        bounds.max_spread()
    );

    let pool = numeric_pool(records);
    let markers = records
        .iter()
        .enumerate()
        .map(|(index, record)| Marker {
            index,
            lat: record.latitude,
            lng: record.longitude,
            title: record.title.clone(),
            url: record.url.clone(),
            rank: record.rank,
            assignment: classify(record.rank, &pool, config),
        })
        .collect();

    let density = compute_density(records, &bounds, config.grid_size)?;
    log::debug!("Density grid has {} populated cells", density.total_cells);

    let clusters = cluster_by_proximity(records, config.cluster_threshold)?;
    log::info!("Found {} proximity clusters", clusters.len());

    let summary = summarize_ranks(records, &config.special_label);
    let heat = heatmap::record_heat(records, &pool);
    let density_heat = heatmap::density_heat(&density.cells);

    Ok(AnalysisReport {
        bounds,
        zoom,
        markers,
        density,
        clusters,
        summary,
        heat,
        density_heat,
    })
}

#[cfg(test)]
mod tests {
    use rank_map_analysis_models::{LocationRecord, RankValue};

    use super::*;

    fn scenario() -> Vec<LocationRecord> {
        vec![
            LocationRecord::new(40.0, 29.0, "A").with_rank(RankValue::Numeric(1.0)),
            LocationRecord::new(40.001, 29.001, "B").with_rank(RankValue::Numeric(5.0)),
            LocationRecord::new(41.0, 30.0, "C").with_rank(RankValue::Special),
        ]
    }

    #[test]
    fn analyzes_three_record_scenario() {
        let report = analyze(&scenario(), &AnalysisConfig::default()).unwrap();

        assert!((report.bounds.south - 40.0).abs() < f64::EPSILON);
        assert!((report.bounds.north - 41.0).abs() < f64::EPSILON);
        assert!((report.bounds.west - 29.0).abs() < f64::EPSILON);
        assert!((report.bounds.east - 30.0).abs() < f64::EPSILON);
        assert_eq!(report.zoom.value(), 12);

        assert_eq!(report.clusters.len(), 1);
        assert_eq!(report.clusters[0].members, vec![0, 1]);
        assert!((report.clusters[0].avg_rank.unwrap() - 3.0).abs() < 1e-9);

        assert_eq!(report.markers.len(), 3);
        assert_eq!(report.markers[2].assignment.label, "20+");
        assert_eq!(report.summary.special_ranks, 1);
        assert_eq!(report.heat.len(), 3);

        let counted: u64 = report.density.cells.iter().map(|c| c.count).sum();
        assert_eq!(counted, 3);
        assert_eq!(report.density_heat.len(), report.density.total_cells);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(
            analyze(&[], &AnalysisConfig::default()),
            Err(AnalysisError::EmptyInput)
        );
    }

    #[test]
    fn rejects_zero_grid_size() {
        let config = AnalysisConfig {
            grid_size: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            analyze(&scenario(), &config),
            Err(AnalysisError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_threshold() {
        for threshold in [0.0, -0.5, f64::NAN] {
            let config = AnalysisConfig {
                cluster_threshold: threshold,
                ..AnalysisConfig::default()
            };
            assert!(validate_config(&config).is_err(), "accepted {threshold}");
        }
    }
}
