//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the model artifacts into a prediction context
//! - runs the encoding + prediction pipeline
//! - prints summaries/tables/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{BatchArgs, Command, ModelArgs, PredictArgs};
use crate::domain::{BatchConfig, PredictConfig, ScoredProperty};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `hcast` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `hcast` (and `hcast -m models/`) to behave like
    // `hcast tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::Batch(args) => handle_batch(args),
        Command::Schema(args) => handle_schema(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = predict_config_from_args(&args);
    let ctx = pipeline::PredictContext::load(&config.paths)?;
    let record = args.to_record();

    let out = pipeline::run_predict(&ctx, &record)?;
    println!("{}", crate::report::format_prediction_summary(&record, &out));

    if config.plot {
        let curve = pipeline::price_curve(&ctx, &record, 120)?;
        let plot = crate::plot::render_ascii_plot(
            &curve,
            Some((record.floor_area_m2, out.price_eur)),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export {
        let scored = vec![ScoredProperty {
            record: record.clone(),
            class_index: out.class_index,
            category: out.category.clone(),
            price_eur: out.price_eur,
            warnings: out.warnings.clone(),
        }];
        crate::io::export::write_results_csv(path, &scored)?;
    }

    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = batch_config_from_args(&args);
    let ctx = pipeline::PredictContext::load(&config.paths)?;

    let records = match &config.input {
        Some(path) => {
            let batch = crate::io::ingest::load_property_csv(path)?;
            if !batch.row_errors.is_empty() {
                eprintln!(
                    "Skipped {} of {} row(s):",
                    batch.row_errors.len(),
                    batch.rows_read
                );
                eprint!("{}", crate::report::format_row_errors(&batch.row_errors));
            }
            batch.records
        }
        None => crate::data::generate_sample(config.sample_count, config.sample_seed)?,
    };

    let scored = pipeline::run_batch(&ctx, &records)?;
    println!("{}", crate::report::format_batch_table(&scored, config.show_n));

    if let Some(path) = &config.export {
        crate::io::export::write_results_csv(path, &scored)?;
    }

    Ok(())
}

fn handle_schema(args: ModelArgs) -> Result<(), AppError> {
    let ctx = pipeline::PredictContext::load(&args.to_paths())?;
    println!(
        "{}",
        crate::report::format_schema_report(&ctx.classifier, &ctx.regressor, &ctx.tables)
    );
    Ok(())
}

fn handle_tui(args: ModelArgs) -> Result<(), AppError> {
    crate::tui::run(&args.to_paths())
}

pub fn predict_config_from_args(args: &PredictArgs) -> PredictConfig {
    PredictConfig {
        paths: args.model.to_paths(),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export: args.export.clone(),
    }
}

pub fn batch_config_from_args(args: &BatchArgs) -> BatchConfig {
    BatchConfig {
        paths: args.model.to_paths(),
        input: args.input.clone(),
        sample_count: args.sample_count,
        sample_seed: args.seed,
        export: args.export.clone(),
        show_n: args.show,
    }
}

/// Rewrite argv so `hcast` defaults to `hcast tui`.
///
/// Rules:
/// - `hcast`                     -> `hcast tui`
/// - `hcast -m models/ ...`      -> `hcast tui -m models/ ...`
/// - `hcast --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "predict" | "batch" | "schema" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
