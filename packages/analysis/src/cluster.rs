//! Greedy single-pass proximity clustering.
//!
//! Seeds are taken in input order. Each unclaimed seed claims every other
//! unclaimed record within `threshold` degrees (planar Euclidean distance in
//! lat/lng space, not great-circle). Groups of two or more are emitted;
//! a seed that claims nothing stays unclaimed and is simply left out of the
//! output.
//!
//! The grouping is order-dependent and not transitive: `A ~ B ~ C` only ends
//! up in one cluster if the seed reaches both. This is O(n²) and intended
//! for inputs in the hundreds; it does not scale past the low thousands.

use rank_map_analysis_models::{Cluster, LocationRecord};

use crate::AnalysisError;

pub(crate) fn check_threshold(threshold: f64) -> Result<(), AnalysisError> {
    if threshold.is_nan() || threshold <= 0.0 {
        return Err(AnalysisError::InvalidConfig {
            message: format!("cluster threshold must be a positive number, got {threshold}"),
        });
    }
    Ok(())
}

/// Planar distance between two records in degrees.
#[must_use]
pub fn planar_distance(a: &LocationRecord, b: &LocationRecord) -> f64 {
    (a.latitude - b.latitude).hypot(a.longitude - b.longitude)
}

/// Groups records within `threshold` degrees of a seed.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidConfig`] if `threshold` is NaN or not
/// positive. An infinite threshold is allowed and claims every record.
pub fn cluster_by_proximity(
    records: &[LocationRecord],
    threshold: f64,
) -> Result<Vec<Cluster>, AnalysisError> {
    check_threshold(threshold)?;

    let mut claimed = vec![false; records.len()];
    let mut clusters = Vec::new();

    for (seed_idx, seed) in records.iter().enumerate() {
        if claimed[seed_idx] {
            continue;
        }

        let mut members = vec![seed_idx];
        for (idx, other) in records.iter().enumerate() {
            if idx == seed_idx || claimed[idx] {
                continue;
            }
            if planar_distance(seed, other) < threshold {
                members.push(idx);
            }
        }

        if members.len() < 2 {
            continue;
        }

        for &idx in &members {
            claimed[idx] = true;
        }
        clusters.push(build_cluster(records, members));
    }

    log::debug!(
        "Clustered {} of {} records into {} groups",
        claimed.iter().filter(|&&c| c).count(),
        records.len(),
        clusters.len()
    );

    Ok(clusters)
}

#[allow(clippy::cast_precision_loss)]
fn build_cluster(records: &[LocationRecord], members: Vec<usize>) -> Cluster {
    let n = members.len() as f64;
    let (lat_sum, lng_sum) = members.iter().fold((0.0, 0.0), |(lat, lng), &i| {
        (lat + records[i].latitude, lng + records[i].longitude)
    });

    let ranks: Vec<f64> = members
        .iter()
        .filter_map(|&i| records[i].rank.numeric())
        .collect();
    let avg_rank = (!ranks.is_empty()).then(|| ranks.iter().sum::<f64>() / ranks.len() as f64);

    Cluster {
        members,
        center_lat: lat_sum / n,
        center_lng: lng_sum / n,
        avg_rank,
    }
}

#[cfg(test)]
mod tests {
    use rank_map_analysis_models::RankValue;

    use super::*;

    fn at(lat: f64, lng: f64) -> LocationRecord {
        LocationRecord::new(lat, lng, "x")
    }

    #[test]
    fn groups_nearby_pair_and_leaves_far_point_out() {
        let records = vec![
            at(40.0, 29.0).with_rank(RankValue::Numeric(1.0)),
            at(40.001, 29.001).with_rank(RankValue::Numeric(5.0)),
            at(41.0, 30.0).with_rank(RankValue::Special),
        ];
        let clusters = cluster_by_proximity(&records, 0.01).unwrap();

        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.members, vec![0, 1]);
        assert_eq!(cluster.size(), 2);
        assert!((cluster.avg_rank.unwrap() - 3.0).abs() < 1e-9);
        assert!((cluster.center_lat - 40.0005).abs() < 1e-9);
        assert!((cluster.center_lng - 29.0005).abs() < 1e-9);
    }

    #[test]
    fn disjoint_points_produce_no_clusters() {
        let records = vec![at(0.0, 0.0), at(0.5, 0.5), at(1.0, 1.0), at(-1.0, 2.0)];
        assert!(cluster_by_proximity(&records, 0.01).unwrap().is_empty());
    }

    #[test]
    fn grouping_is_not_transitive() {
        // B is within reach of both A and C, but A and C are too far apart.
        let records = vec![at(0.0, 0.0), at(0.0, 0.008), at(0.0, 0.016)];
        let clusters = cluster_by_proximity(&records, 0.01).unwrap();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![0, 1]);
    }

    #[test]
    fn seed_order_changes_grouping() {
        let records = vec![at(0.0, 0.008), at(0.0, 0.0), at(0.0, 0.016)];
        let clusters = cluster_by_proximity(&records, 0.01).unwrap();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![0, 1, 2]);
    }

    #[test]
    fn claimed_records_are_not_reused() {
        let records = vec![
            at(0.0, 0.0),
            at(0.0, 0.005),
            at(0.0, 0.012),
            at(0.0, 0.017),
        ];
        let clusters = cluster_by_proximity(&records, 0.01).unwrap();

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec![0, 1]);
        assert_eq!(clusters[1].members, vec![2, 3]);
    }

    #[test]
    fn avg_rank_skips_special_and_unranked() {
        let records = vec![
            at(0.0, 0.0).with_rank(RankValue::Special),
            at(0.0, 0.001),
            at(0.001, 0.0).with_rank(RankValue::Numeric(4.0)),
        ];
        let clusters = cluster_by_proximity(&records, 0.01).unwrap();
        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].avg_rank.unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn cluster_without_numeric_ranks_has_no_average() {
        let records = vec![at(0.0, 0.0), at(0.0, 0.001)];
        let clusters = cluster_by_proximity(&records, 0.01).unwrap();
        assert_eq!(clusters[0].avg_rank, None);
    }

    #[test]
    fn distance_equal_to_threshold_is_excluded() {
        let records = vec![at(0.0, 0.0), at(0.0, 0.5)];
        assert!(cluster_by_proximity(&records, 0.5).unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_threshold() {
        let records = vec![at(0.0, 0.0)];
        assert!(cluster_by_proximity(&records, 0.0).is_err());
        assert!(cluster_by_proximity(&records, -1.0).is_err());
        assert!(cluster_by_proximity(&records, f64::NAN).is_err());
        assert!(cluster_by_proximity(&records, f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn infinite_threshold_claims_everything() {
        let records = vec![at(0.0, 0.0), at(45.0, 90.0), at(-60.0, -170.0)];
        let clusters = cluster_by_proximity(&records, f64::INFINITY).unwrap();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![0, 1, 2]);
    }
}
