//! Heatmap weights.
//!
//! Two flavours: one point per record weighted by rank, and one point per
//! populated density cell weighted by its density.

use rank_map_analysis_models::{DensityCell, HeatPoint, LocationRecord, RankValue};

use crate::color::{normalize, pool_range};

/// Weight for records above the tracked rank ceiling.
pub const SPECIAL_WEIGHT: f64 = 3.0;

/// Weight for records with no usable gradient position.
pub const BASE_WEIGHT: f64 = 1.0;

/// Upper bound on density-derived weights.
pub const MAX_DENSITY_WEIGHT: f64 = 5.0;

/// Multiplier applied to cell density before capping.
pub const DENSITY_WEIGHT_SCALE: f64 = 10.0;

/// One heat point per record.
///
/// Specials weigh [`SPECIAL_WEIGHT`]. Numeric ranks weigh `2 - t` where `t`
/// is the rank's position in the pool, so the best rank is hottest. Without
/// a spread pool, and for unranked records, the weight is [`BASE_WEIGHT`].
#[must_use]
pub fn record_heat(records: &[LocationRecord], pool: &[f64]) -> Vec<HeatPoint> {
    let range = pool_range(pool);

    records
        .iter()
        .map(|record| {
            let weight = match (record.rank, range) {
                (RankValue::Special, _) => SPECIAL_WEIGHT,
                (RankValue::Numeric(v), Some((min, max))) => 2.0 - normalize(v, min, max),
                (RankValue::Numeric(_) | RankValue::Unranked, _) => BASE_WEIGHT,
            };
            HeatPoint {
                lat: record.latitude,
                lng: record.longitude,
                weight,
            }
        })
        .collect()
}

/// One heat point per populated density cell, at the cell center.
#[must_use]
pub fn density_heat(cells: &[DensityCell]) -> Vec<HeatPoint> {
    cells
        .iter()
        .map(|cell| HeatPoint {
            lat: cell.center_lat,
            lng: cell.center_lng,
            weight: (cell.density * DENSITY_WEIGHT_SCALE).min(MAX_DENSITY_WEIGHT),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_weights_by_rank_kind() {
        let records = vec![
            LocationRecord::new(0.0, 0.0, "a").with_rank(RankValue::Numeric(1.0)),
            LocationRecord::new(0.0, 0.0, "b").with_rank(RankValue::Numeric(11.0)),
            LocationRecord::new(0.0, 0.0, "c").with_rank(RankValue::Numeric(6.0)),
            LocationRecord::new(0.0, 0.0, "d").with_rank(RankValue::Special),
            LocationRecord::new(0.0, 0.0, "e"),
        ];
        let weights: Vec<f64> = record_heat(&records, &[1.0, 11.0, 6.0])
            .iter()
            .map(|p| p.weight)
            .collect();

        assert!((weights[0] - 2.0).abs() < 1e-9);
        assert!((weights[1] - 1.0).abs() < 1e-9);
        assert!((weights[2] - 1.5).abs() < 1e-9);
        assert!((weights[3] - SPECIAL_WEIGHT).abs() < 1e-9);
        assert!((weights[4] - BASE_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn flat_pool_uses_base_weight() {
        let records =
            vec![LocationRecord::new(0.0, 0.0, "a").with_rank(RankValue::Numeric(4.0))];
        let heat = record_heat(&records, &[4.0]);
        assert!((heat[0].weight - BASE_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn density_weights_are_capped() {
        let cell = |density| DensityCell {
            row: 0,
            col: 0,
            center_lat: 1.0,
            center_lng: 2.0,
            count: 1,
            density,
        };
        let heat = density_heat(&[cell(0.2), cell(40.0)]);
        assert!((heat[0].weight - 2.0).abs() < 1e-9);
        assert!((heat[1].weight - MAX_DENSITY_WEIGHT).abs() < 1e-9);
        assert!((heat[0].lat - 1.0).abs() < f64::EPSILON);
    }
}
