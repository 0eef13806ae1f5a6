//! Menu-driven mode used when `rank_map` runs without a subcommand.
//!
//! Lists the spreadsheets in the working directory, lets the user pick
//! one, and walks through producing a map page or an analysis dump.

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Select};
use rank_map_ingest::find_input_files;
use rank_map_render::default_output_path;

use crate::config::RankMapConfig;
use crate::pipeline;

/// Actions offered once a file is chosen.
enum Action {
    GenerateMap,
    PrintAnalysis,
}

impl Action {
    const ALL: &[Self] = &[Self::GenerateMap, Self::PrintAnalysis];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::GenerateMap => "Generate map page",
            Self::PrintAnalysis => "Print analysis JSON",
        }
    }
}

/// Runs the interactive flow against files in `dir`.
///
/// # Errors
///
/// Returns an error if no input files exist, a prompt fails, or the
/// selected action fails.
pub fn run(dir: &Path, mut config: RankMapConfig) -> Result<(), Box<dyn std::error::Error>> {
    let files = find_input_files(dir)?;
    if files.is_empty() {
        return Err(format!("No spreadsheet or CSV files found in {}", dir.display()).into());
    }

    let input = pick_file(&files)?;

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::GenerateMap => generate_map(input, &mut config)?,
        Action::PrintAnalysis => {
            if let Some(json) = pipeline::export_json(input, None, &config)? {
                println!("{json}");
            }
        }
    }

    Ok(())
}

fn pick_file(files: &[PathBuf]) -> Result<&Path, Box<dyn std::error::Error>> {
    if let [only] = files {
        println!("Using {}", only.display());
        return Ok(only.as_path());
    }

    let labels: Vec<String> = files.iter().map(|f| display_name(f)).collect();
    let idx = Select::new()
        .with_prompt("Select a file")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(files[idx].as_path())
}

fn generate_map(input: &Path, config: &mut RankMapConfig) -> Result<(), Box<dyn std::error::Error>> {
    let title: String = Input::new()
        .with_prompt("Map title")
        .default(config.render.title.clone())
        .interact_text()?;
    config.render.title = title;

    let output = default_output_path(input);
    if output.exists() {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", display_name(&output)))
            .default(true)
            .interact()?;
        if !overwrite {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let (analyzed, path) = pipeline::render_map(input, Some(output.as_path()), config)?;
    pipeline::print_summary(&analyzed);
    println!();
    println!("Map written to {}", path.display());
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
