#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Presentation layer for analysis reports.
//!
//! Serializes an [`AnalysisReport`] into a JSON payload and embeds it in a
//! single self-contained HTML page that draws markers, heat, density and
//! cluster layers with Leaflet. The page template is baked into the binary
//! at compile time via [`include_str!`].

use std::path::{Path, PathBuf};

use rank_map_analysis_models::{AnalysisReport, DEFAULT_SPECIAL_LABEL};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTML page template.
const PAGE_TEMPLATE: &str = include_str!("../templates/map.html");

/// Suffix appended to the input file stem for default output paths.
pub const OUTPUT_SUFFIX: &str = "_map.html";

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Serializing the payload failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Page-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    rename_all(serialize = "camelCase", deserialize = "snake_case"),
    default
)]
pub struct RenderConfig {
    /// Page and stats panel title.
    pub title: String,
    /// Slippy-map tile URL template.
    pub tile_url: String,
    /// Tile attribution HTML.
    pub attribution: String,
    /// Label shown for special ranks in the stats panel. Follows the
    /// analysis config rather than being read from the page settings.
    #[serde(skip_deserializing)]
    pub special_label: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "Location Map".to_string(),
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            special_label: DEFAULT_SPECIAL_LABEL.to_string(),
        }
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    page: &'a RenderConfig,
    report: &'a AnalysisReport,
}

/// Serializes the report and page settings as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`RenderError::Json`] if serialization fails.
pub fn render_json(report: &AnalysisReport, config: &RenderConfig) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(&Payload {
        page: config,
        report,
    })?)
}

/// Renders the standalone HTML page.
///
/// # Errors
///
/// Returns [`RenderError::Json`] if the payload cannot be serialized.
pub fn render_html(report: &AnalysisReport, config: &RenderConfig) -> Result<String, RenderError> {
    let payload = serde_json::to_string(&Payload {
        page: config,
        report,
    })?;

    Ok(PAGE_TEMPLATE
        .replace("{{title}}", &escape_html(&config.title))
        .replace("{{payload}}", &escape_script_json(&payload)))
}

/// Renders the page and writes it to `path`.
///
/// # Errors
///
/// Returns [`RenderError`] if rendering or writing fails.
pub fn write_html(
    path: &Path,
    report: &AnalysisReport,
    config: &RenderConfig,
) -> Result<(), RenderError> {
    let html = render_html(report, config)?;
    std::fs::write(path, html)?;
    log::info!("Map written to {}", path.display());
    Ok(())
}

/// Default output path for an input file: `<stem>_map.html` beside it.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("locations");
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Escapes text for an HTML element body.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Makes JSON safe to embed in a `<script>` element.
///
/// Only `<` needs escaping so no `</script>` or `<!--` sequence can end the
/// element early; `\u003c` is still valid JSON.
fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}
