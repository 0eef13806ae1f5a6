//! Rank breakdown and performance figures.

use std::collections::BTreeMap;

use rank_map_analysis_models::{LocationRecord, RankPerformance, RankSummary, RankValue};

use crate::color::rank_label;

/// Tallies ranks into numeric/special/unranked buckets and computes
/// average, best, worst, and population variance over the numeric ones.
///
/// Numeric ranks are bucketed as `"Rank N"` (integer part); specials go
/// under `special_label`. Unranked records are counted but not bucketed.
#[must_use]
pub fn summarize_ranks(records: &[LocationRecord], special_label: &str) -> RankSummary {
    let mut numeric_ranks = Vec::new();
    let mut special_ranks = 0;
    let mut unranked = 0;
    let mut distribution: BTreeMap<String, u64> = BTreeMap::new();

    for record in records {
        match record.rank {
            RankValue::Numeric(v) => {
                numeric_ranks.push(v);
                *distribution
                    .entry(format!("Rank {}", rank_label(v.trunc())))
                    .or_default() += 1;
            }
            RankValue::Special => {
                special_ranks += 1;
                *distribution.entry(special_label.to_string()).or_default() += 1;
            }
            RankValue::Unranked => unranked += 1,
        }
    }

    let performance = performance(&numeric_ranks);

    RankSummary {
        total_locations: records.len(),
        numeric_ranks,
        special_ranks,
        unranked,
        distribution,
        performance,
    }
}

#[allow(clippy::cast_precision_loss)]
fn performance(ranks: &[f64]) -> Option<RankPerformance> {
    if ranks.is_empty() {
        return None;
    }

    let n = ranks.len() as f64;
    let avg_rank = ranks.iter().sum::<f64>() / n;
    let best_rank = ranks.iter().copied().fold(f64::INFINITY, f64::min);
    let worst_rank = ranks.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let rank_variance = if ranks.len() < 2 {
        0.0
    } else {
        ranks.iter().map(|v| (v - avg_rank).powi(2)).sum::<f64>() / n
    };

    Some(RankPerformance {
        avg_rank,
        best_rank,
        worst_rank,
        rank_variance,
    })
}
