//! Command-line parsing for the house price predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the encoding/prediction code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{ModelPaths, PropertyRecord};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "hcast",
    version,
    about = "Ireland House Price Predictor (pre-trained models)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict the price category and price value for a single property.
    Predict(PredictArgs),
    /// Score a property CSV (or a synthetic sample) and print a table.
    Batch(BatchArgs),
    /// Print each model artifact's resolved input schema.
    Schema(ModelArgs),
    /// Launch the interactive TUI form.
    ///
    /// This uses the same underlying prediction pipeline as `hcast predict`,
    /// but renders the form and results in a terminal UI using Ratatui.
    Tui(ModelArgs),
}

/// Model artifact location options, shared by all subcommands.
#[derive(Debug, Parser, Clone, Default)]
pub struct ModelArgs {
    /// Path to the classification model artifact (JSON).
    #[arg(long, value_name = "JSON")]
    pub classifier: Option<PathBuf>,

    /// Path to the regression model artifact (JSON).
    #[arg(long, value_name = "JSON")]
    pub regressor: Option<PathBuf>,

    /// Directory containing classification_model.json and
    /// regression_model.json (default: $HOMECAST_MODEL_DIR).
    #[arg(short = 'm', long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,
}

impl ModelArgs {
    pub fn to_paths(&self) -> ModelPaths {
        ModelPaths {
            classifier: self.classifier.clone(),
            regressor: self.regressor.clone(),
            model_dir: self.model_dir.clone(),
        }
    }
}

/// Options for one-shot prediction.
#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Floor area in m2 (20-500).
    #[arg(short = 'a', long, default_value_t = 100.0)]
    pub area: f64,

    /// Number of bedrooms (1-10).
    #[arg(short = 'b', long, default_value_t = 3)]
    pub beds: u32,

    /// Number of bathrooms (1-10).
    #[arg(long, default_value_t = 2)]
    pub baths: u32,

    /// Property type label (e.g. "Semi-D", "Apartment").
    #[arg(short = 't', long = "type", default_value = "Semi-D")]
    pub property_type: String,

    /// County label (e.g. "Dublin", "Cork").
    #[arg(short = 'c', long, default_value = "Dublin")]
    pub county: String,

    /// BER energy rating (A1 .. G).
    #[arg(long, default_value = "C1")]
    pub ber: String,

    /// Construction year (1800 - current year).
    #[arg(short = 'y', long, default_value_t = 2000)]
    pub year: i32,

    /// Identifier used in exports.
    #[arg(long, default_value = "property")]
    pub id: String,

    /// Render an ASCII price-vs-floor-area plot.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the scored property to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

impl PredictArgs {
    pub fn to_record(&self) -> PropertyRecord {
        PropertyRecord {
            id: self.id.clone(),
            floor_area_m2: self.area,
            bedrooms: self.beds,
            bathrooms: self.baths,
            property_type: self.property_type.clone(),
            county: self.county.clone(),
            ber_rating: self.ber.clone(),
            year_built: self.year,
        }
    }
}

/// Options for batch scoring.
#[derive(Debug, Parser, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Property CSV to score. When absent, a synthetic sample is generated.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Synthetic sample size (used when no CSV is given).
    #[arg(short = 'n', long, default_value_t = 50)]
    pub sample_count: usize,

    /// Random seed for the synthetic sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Export results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Rows shown in the terminal table.
    #[arg(long, default_value_t = 20)]
    pub show: usize,
}
