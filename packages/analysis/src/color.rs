//! Rank classification: marker color and label for each record.
//!
//! Numeric ranks are placed on a continuous gradient between the pool's
//! minimum (best) and maximum (worst). Special and unranked records get
//! fixed palette colors. A pool without at least two distinct values has
//! no gradient, so every numeric rank gets the best color.

use rank_map_analysis_models::{
    AnalysisConfig, ColorAssignment, LocationRecord, RankValue, UnrankedStyle,
};

/// Label shown on labeled unranked markers.
pub const UNRANKED_LABEL: &str = "?";

/// Collects the numeric ranks of `records` in input order.
#[must_use]
pub fn numeric_pool(records: &[LocationRecord]) -> Vec<f64> {
    records.iter().filter_map(|r| r.rank.numeric()).collect()
}

/// Min and max of a pool, or `None` when it has fewer than two distinct
/// values.
#[must_use]
pub fn pool_range(pool: &[f64]) -> Option<(f64, f64)> {
    let (min, max) = pool
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    (min < max).then_some((min, max))
}

/// Position of `value` within `[min, max]`, clamped to [0, 1].
#[must_use]
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Assigns a color and label to a rank given the current numeric pool.
#[must_use]
pub fn classify(rank: RankValue, pool: &[f64], config: &AnalysisConfig) -> ColorAssignment {
    let palette = &config.palette;

    match rank {
        RankValue::Unranked => ColorAssignment {
            color: palette.unranked,
            label: match config.unranked_style {
                UnrankedStyle::Labeled => UNRANKED_LABEL.to_string(),
                UnrankedStyle::Plain => String::new(),
            },
            scale: None,
        },
        RankValue::Special => ColorAssignment {
            color: palette.special,
            label: config.special_label.clone(),
            scale: None,
        },
        RankValue::Numeric(value) => {
            let label = rank_label(value);
            match pool_range(pool) {
                Some((min, max)) => {
                    let t = normalize(value, min, max);
                    ColorAssignment {
                        color: palette.gradient.at(t),
                        label,
                        scale: Some(t),
                    }
                }
                None => ColorAssignment {
                    color: palette.gradient.best(),
                    label,
                    scale: None,
                },
            }
        }
    }
}

/// Formats a rank as an integer when it is integral.
#[must_use]
pub fn rank_label(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
