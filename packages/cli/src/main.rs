#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the rank map tool.
//!
//! Turns a location spreadsheet into a self-contained map page, or dumps
//! the analysis as JSON. Running with no subcommand opens an interactive
//! picker over the spreadsheets in the working directory.

mod config;
mod interactive;
mod pipeline;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rank_map_analysis_models::{Palette, PalettePreset};
use rank_map_ingest::find_input_files;

use crate::config::RankMapConfig;

#[derive(Parser)]
#[command(
    name = "rank_map",
    about = "Ranked location map generator",
    version
)]
struct Cli {
    /// Config file (defaults to `RANK_MAP_CONFIG` or ./rank_map.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a file and print or save the result as JSON
    Analyze {
        /// Input spreadsheet (xlsx, xls, csv or tsv)
        input: PathBuf,
        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Generate the HTML map page for a file
    Render {
        /// Input spreadsheet (xlsx, xls, csv or tsv)
        input: PathBuf,
        /// Output page (defaults to `<stem>_map.html` beside the input)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Page title
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// List candidate input files in a directory
    Files {
        /// Directory to scan
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

/// Flags that take precedence over the config file.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Density grid cells per axis
    #[arg(long)]
    grid_size: Option<usize>,
    /// Clustering distance in degrees
    #[arg(long)]
    threshold: Option<f64>,
    /// Rank cell value meaning "beyond the ceiling"
    #[arg(long)]
    special_token: Option<String>,
    /// Color preset (`modern` or `classic`)
    #[arg(long)]
    palette: Option<PalettePreset>,
}

impl Overrides {
    fn apply(self, config: &mut RankMapConfig) {
        if let Some(grid_size) = self.grid_size {
            config.analysis.grid_size = grid_size;
        }
        if let Some(threshold) = self.threshold {
            config.analysis.cluster_threshold = threshold;
        }
        if let Some(token) = self.special_token {
            config.ingest.special_rank_token = token;
        }
        if let Some(preset) = self.palette {
            config.analysis.palette = Palette::preset(preset);
        }
    }
}

fn init_logger() {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.try_init().ok();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let cli = Cli::parse();
    let mut config = RankMapConfig::load(cli.config.as_deref())?;

    let Some(command) = cli.command else {
        println!("Rank Map");
        println!();
        return interactive::run(Path::new("."), config);
    };

    match command {
        Commands::Analyze {
            input,
            output,
            overrides,
        } => {
            overrides.apply(&mut config);
            if let Some(json) = pipeline::export_json(&input, output.as_deref(), &config)? {
                println!("{json}");
            }
        }
        Commands::Render {
            input,
            output,
            title,
            overrides,
        } => {
            overrides.apply(&mut config);
            if let Some(title) = title {
                config.render.title = title;
            }
            let (analyzed, path) = pipeline::render_map(&input, output.as_deref(), &config)?;
            pipeline::print_summary(&analyzed);
            println!();
            println!("Map written to {}", path.display());
        }
        Commands::Files { dir } => {
            let files = find_input_files(&dir)?;
            if files.is_empty() {
                println!("No spreadsheet or CSV files found in {}", dir.display());
            }
            for file in &files {
                println!("{}", file.display());
            }
        }
    }

    Ok(())
}
