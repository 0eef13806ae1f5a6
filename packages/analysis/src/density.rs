//! Fixed-resolution density grid over the bounding box.
//!
//! The box is split into `grid_size × grid_size` equal cells, half-open on
//! the north and east edges. Points sitting exactly on the north or east
//! boundary are clamped into the last row/column so every record lands in
//! exactly one cell.

use std::collections::BTreeMap;

use rank_map_analysis_models::{Bounds, DensityAnalysis, DensityCell, LocationRecord};

use crate::AnalysisError;

pub(crate) fn check_grid_size(grid_size: usize) -> Result<(), AnalysisError> {
    if grid_size == 0 {
        return Err(AnalysisError::InvalidConfig {
            message: "grid size must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Band index of `value` along one axis of the grid.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn band_index(value: f64, origin: f64, step: f64, grid_size: usize) -> usize {
    if step <= 0.0 {
        return 0;
    }
    let raw = ((value - origin) / step).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(grid_size - 1)
    }
}

/// Counts records per grid cell and returns the populated cells in
/// row-major order (south to north, then west to east).
///
/// A zero-width axis (all records share a latitude or longitude) collapses
/// into a single band, and its span counts as one degree when computing
/// cell area so densities stay finite.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidConfig`] if `grid_size` is zero.
#[allow(clippy::cast_precision_loss)]
pub fn compute_density(
    records: &[LocationRecord],
    bounds: &Bounds,
    grid_size: usize,
) -> Result<DensityAnalysis, AnalysisError> {
    check_grid_size(grid_size)?;

    let lat_step = bounds.lat_spread() / grid_size as f64;
    let lng_step = bounds.lng_spread() / grid_size as f64;

    let mut counts: BTreeMap<(usize, usize), u64> = BTreeMap::new();
    for record in records {
        if !bounds.contains(record.latitude, record.longitude) {
            log::debug!(
                "Skipping ({}, {}) outside density bounds",
                record.latitude,
                record.longitude
            );
            continue;
        }
        let row = band_index(record.latitude, bounds.south, lat_step, grid_size);
        let col = band_index(record.longitude, bounds.west, lng_step, grid_size);
        *counts.entry((row, col)).or_default() += 1;
    }

    let area_lat = if lat_step > 0.0 { lat_step } else { 1.0 };
    let area_lng = if lng_step > 0.0 { lng_step } else { 1.0 };
    let cell_area = area_lat * area_lng;

    let cells: Vec<DensityCell> = counts
        .into_iter()
        .map(|((row, col), count)| DensityCell {
            row,
            col,
            center_lat: lat_step.mul_add(row as f64 + 0.5, bounds.south),
            center_lng: lng_step.mul_add(col as f64 + 0.5, bounds.west),
            count,
            density: count as f64 / cell_area,
        })
        .collect();

    let max_density = cells.iter().map(|c| c.density).fold(0.0, f64::max);

    Ok(DensityAnalysis {
        total_cells: cells.len(),
        cells,
        max_density,
    })
}
