//! Rank cell coercion.
//!
//! The special "beyond the ceiling" rank arrives as an encoded token (by
//! default the URL-encoded HTML entity `%26%2310006%3B`). It is matched
//! exactly, before any numeric parsing, and never leaves this module as a
//! string.

use rank_map_analysis_models::RankValue;

/// Default wire token for [`RankValue::Special`].
pub const DEFAULT_SPECIAL_TOKEN: &str = "%26%2310006%3B";

/// Converts a raw rank cell into a [`RankValue`].
///
/// Blank cells are [`RankValue::Unranked`]. A cell equal to
/// `special_token` is [`RankValue::Special`]. Anything else must parse as
/// a finite number.
///
/// # Errors
///
/// Returns the trimmed cell text if it is neither blank, the special
/// token, nor a finite number.
pub fn coerce_rank(raw: &str, special_token: &str) -> Result<RankValue, String> {
    if raw == special_token {
        return Ok(RankValue::Special);
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(RankValue::Unranked);
    }
    if trimmed == special_token {
        return Ok(RankValue::Special);
    }

    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(RankValue::Numeric(v)),
        _ => Err(trimmed.to_string()),
    }
}
