//! Bounding box, center, and initial zoom for a record set.

use rank_map_analysis_models::{Bounds, LocationRecord, ZoomLevel};

use crate::AnalysisError;

/// Zoom step function: the first entry whose spread threshold is strictly
/// exceeded wins. Spreads at or below every threshold get [`MAX_ZOOM`].
const ZOOM_STEPS: &[(f64, u8)] = &[(10.0, 6), (5.0, 8), (1.0, 10), (0.5, 12)];

/// Zoom used when all points sit within half a degree of each other.
const MAX_ZOOM: u8 = 14;

/// Computes the min/max box and the mean center in a single pass.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyInput`] if `records` is empty.
#[allow(clippy::cast_precision_loss)]
pub fn compute_bounds(records: &[LocationRecord]) -> Result<Bounds, AnalysisError> {
    let first = records.first().ok_or(AnalysisError::EmptyInput)?;

    let mut bounds = Bounds {
        north: first.latitude,
        south: first.latitude,
        east: first.longitude,
        west: first.longitude,
        center_lat: 0.0,
        center_lng: 0.0,
    };
    let mut lat_sum = 0.0;
    let mut lng_sum = 0.0;

    for record in records {
        bounds.north = bounds.north.max(record.latitude);
        bounds.south = bounds.south.min(record.latitude);
        bounds.east = bounds.east.max(record.longitude);
        bounds.west = bounds.west.min(record.longitude);
        lat_sum += record.latitude;
        lng_sum += record.longitude;
    }

    let n = records.len() as f64;
    bounds.center_lat = lat_sum / n;
    bounds.center_lng = lng_sum / n;

    Ok(bounds)
}

/// Picks a zoom level from the larger of the two coordinate spreads.
#[must_use]
pub fn compute_zoom(bounds: &Bounds) -> ZoomLevel {
    zoom_for_spread(bounds.max_spread())
}

/// Zoom level for a raw spread in degrees.
#[must_use]
pub fn zoom_for_spread(spread: f64) -> ZoomLevel {
    let zoom = ZOOM_STEPS
        .iter()
        .find(|(threshold, _)| spread > *threshold)
        .map_or(MAX_ZOOM, |&(_, zoom)| zoom);

    ZoomLevel::new(zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(points: &[(f64, f64)]) -> Vec<LocationRecord> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(lat, lng))| LocationRecord::new(lat, lng, format!("p{i}")))
            .collect()
    }

    #[test]
    fn bounds_enclose_every_point() {
        let input = records(&[(40.2, 29.1), (39.8, 28.7), (41.5, 30.2), (40.0, 29.9)]);
        let bounds = compute_bounds(&input).unwrap();

        for r in &input {
            assert!(bounds.south <= r.latitude && r.latitude <= bounds.north);
            assert!(bounds.west <= r.longitude && r.longitude <= bounds.east);
        }
        assert!((bounds.north - 41.5).abs() < f64::EPSILON);
        assert!((bounds.south - 39.8).abs() < f64::EPSILON);
        assert!((bounds.east - 30.2).abs() < f64::EPSILON);
        assert!((bounds.west - 28.7).abs() < f64::EPSILON);
    }

    #[test]
    fn center_is_arithmetic_mean() {
        let input = records(&[(10.0, 20.0), (20.0, 40.0), (30.0, 60.0)]);
        let bounds = compute_bounds(&input).unwrap();
        assert!((bounds.center_lat - 20.0).abs() < 1e-12);
        assert!((bounds.center_lng - 40.0).abs() < 1e-12);
    }

    #[test]
    fn single_record_has_zero_spread() {
        let bounds = compute_bounds(&records(&[(12.5, -3.25)])).unwrap();
        assert!(bounds.max_spread().abs() < f64::EPSILON);
        assert_eq!(compute_zoom(&bounds).value(), MAX_ZOOM);
    }

    #[test]
    fn empty_input_fails() {
        assert_eq!(compute_bounds(&[]), Err(AnalysisError::EmptyInput));
    }

    #[test]
    fn zoom_thresholds_are_strict() {
        assert_eq!(zoom_for_spread(20.0).value(), 6);
        assert_eq!(zoom_for_spread(10.0).value(), 8);
        assert_eq!(zoom_for_spread(5.5).value(), 8);
        assert_eq!(zoom_for_spread(5.0).value(), 10);
        assert_eq!(zoom_for_spread(1.0).value(), 12);
        assert_eq!(zoom_for_spread(0.75).value(), 12);
        assert_eq!(zoom_for_spread(0.5).value(), 14);
        assert_eq!(zoom_for_spread(0.0).value(), 14);
    }

    #[test]
    fn zoom_is_monotonic_in_spread() {
        let spreads = [0.0, 0.1, 0.5, 0.51, 1.0, 1.01, 3.0, 5.0, 5.01, 9.9, 10.0, 10.01, 90.0];
        for pair in spreads.windows(2) {
            assert!(zoom_for_spread(pair[0]) >= zoom_for_spread(pair[1]));
        }
    }

    #[test]
    fn uses_larger_of_the_two_spreads() {
        let input = records(&[(40.0, 29.0), (40.1, 36.0)]);
        let bounds = compute_bounds(&input).unwrap();
        assert_eq!(compute_zoom(&bounds).value(), 8);
    }
}
