//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the log subscriber
//! - runs selection / evaluation
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::cli::{Cli, Command, EvaluateArgs, SelectArgs, ShowArgs};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::io::summary::{
    RunSummary, SummaryInputs, evaluation_totals, format_summary, mapping_entries, read_summary_json,
    write_summary_json,
};

pub mod pipeline;

/// Entry point for the `ideal` binary.
pub fn run() -> Result<(), AppError> {
    // Missing `.env` is fine; explicit flags and real env vars still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Select(args) => handle_select(&select_config(&args)),
        Command::Evaluate(args) => handle_evaluate(&evaluate_config(&args)),
        Command::Show(args) => handle_show(&args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    // Ignore the error if a subscriber is already installed (e.g. in tests).
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn select_config(args: &SelectArgs) -> RunConfig {
    RunConfig {
        training_csv: args.inputs.training.clone(),
        ideal_csv: args.inputs.ideal.clone(),
        test_csv: None,
        export_mapping: args.export.clone(),
        export_dir: None,
        export_json: args.json.clone(),
        show_unmatched: 0,
    }
}

pub fn evaluate_config(args: &EvaluateArgs) -> RunConfig {
    RunConfig {
        training_csv: args.inputs.training.clone(),
        ideal_csv: args.inputs.ideal.clone(),
        test_csv: Some(args.test.clone()),
        export_mapping: args.export.clone(),
        export_dir: args.export_dir.clone(),
        export_json: args.json.clone(),
        show_unmatched: args.show_unmatched,
    }
}

fn handle_select(config: &RunConfig) -> Result<(), AppError> {
    let run = pipeline::run_selection(&config.training_csv, &config.ideal_csv)?;

    println!(
        "{}",
        crate::report::format_mapping(&run.matches, None, &run.training.labels, &run.ideal.labels)
    );

    if let Some(path) = &config.export_mapping {
        crate::io::export::write_mapping_csv(path, &run.matches, &run.training.labels, &run.ideal.labels)?;
    }
    if let Some(path) = &config.export_json {
        let summary = RunSummary::new(
            summary_inputs(config, &run),
            mapping_entries(&run.matches, None, &run.training.labels, &run.ideal.labels),
        );
        write_summary_json(path, &summary)?;
    }

    Ok(())
}

fn handle_evaluate(config: &RunConfig) -> Result<(), AppError> {
    let test_csv = config
        .test_csv
        .as_deref()
        .ok_or_else(|| AppError::new(2, "Evaluation requires a test CSV."))?;
    let run = pipeline::run_evaluation(&config.training_csv, &config.ideal_csv, test_csv)?;

    let selection = &run.selection;
    let training_labels = &selection.training.labels;
    let ideal_labels = &selection.ideal.labels;

    println!(
        "{}",
        crate::report::format_mapping(&selection.matches, Some(&run.thresholds), training_labels, ideal_labels)
    );
    println!(
        "{}",
        crate::report::format_outcomes(
            &run.outcomes,
            run.test.observations.len(),
            run.test.row_errors.len(),
            ideal_labels,
            config.show_unmatched,
        )
    );

    for e in &run.test.row_errors {
        tracing::warn!(line = e.line, "{}", e.message);
    }

    // Optional exports.
    if let Some(path) = &config.export_mapping {
        crate::io::export::write_mapping_csv(path, &selection.matches, training_labels, ideal_labels)?;
    }
    if let Some(dir) = &config.export_dir {
        crate::io::export::write_evaluation_bundle(dir, &run.records, &run.outcomes, ideal_labels)?;
    }
    if let Some(path) = &config.export_json {
        let mut summary = RunSummary::new(
            summary_inputs(config, selection),
            mapping_entries(&selection.matches, Some(&run.thresholds), training_labels, ideal_labels),
        );
        summary.evaluation = Some(evaluation_totals(&run.outcomes, &run.test, run.records.len(), ideal_labels));
        write_summary_json(path, &summary)?;
    }

    Ok(())
}

fn handle_show(args: &ShowArgs) -> Result<(), AppError> {
    let summary = read_summary_json(&args.summary)?;
    println!("{}", format_summary(&summary));
    Ok(())
}

fn summary_inputs(config: &RunConfig, run: &pipeline::SelectionRun) -> SummaryInputs {
    SummaryInputs {
        training: config.training_csv.display().to_string(),
        ideal: config.ideal_csv.display().to_string(),
        test: config.test_csv.as_ref().map(|p| p.display().to_string()),
        grid_len: run.ideal.curves.len(),
        ideal_curves: run.ideal.curves.curve_count(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::io::export::{EVALUATION_FILE, MATCHED_FILE, UNMATCHED_FILE};

    fn write_inputs(dir: &Path) {
        fs::write(dir.join("train.csv"), "x,y1\n1,1.0\n2,2.0\n3,3.0\n").unwrap();
        fs::write(dir.join("ideal.csv"), "x,y1,y2\n1,5,1.1\n2,5,2.1\n3,5,3.1\n").unwrap();
        fs::write(dir.join("test.csv"), "x,y\n2,2.15\n2.5,2.0\nbad,1\n").unwrap();
    }

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn evaluate_writes_every_requested_export() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_inputs(root);
        let [train, ideal, test, mapping, out, json] =
            ["train.csv", "ideal.csv", "test.csv", "mapping.csv", "out", "run.json"]
                .map(|name| root.join(name).display().to_string());

        let Command::Evaluate(args) = parse(&[
            "ideal",
            "evaluate",
            "--training",
            train.as_str(),
            "--ideal",
            ideal.as_str(),
            "--test",
            test.as_str(),
            "--export",
            mapping.as_str(),
            "--export-dir",
            out.as_str(),
            "--json",
            json.as_str(),
        ]) else {
            panic!("expected evaluate");
        };

        let config = evaluate_config(&args);
        handle_evaluate(&config).unwrap();

        let mapping = fs::read_to_string(root.join("mapping.csv")).unwrap();
        assert!(mapping.lines().nth(1).unwrap().starts_with("y1,y2,"));
        for file in [EVALUATION_FILE, MATCHED_FILE, UNMATCHED_FILE] {
            assert!(root.join("out").join(file).is_file(), "{file} missing");
        }

        let summary = read_summary_json(&root.join("run.json")).unwrap();
        let totals = summary.evaluation.unwrap();
        assert_eq!(totals.rows_read, 3);
        assert_eq!(totals.observations, 2);
        assert_eq!(totals.skipped_rows, 1);
        assert_eq!(totals.unmatched_observations, 1);
        assert!(summary.mapping[0].max_deviation.is_some());
    }

    #[test]
    fn select_writes_mapping_and_summary_without_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_inputs(root);
        let [train, ideal, mapping, json] = ["train.csv", "ideal.csv", "mapping.csv", "run.json"]
            .map(|name| root.join(name).display().to_string());

        let Command::Select(args) = parse(&[
            "ideal",
            "select",
            "--training",
            train.as_str(),
            "--ideal",
            ideal.as_str(),
            "--export",
            mapping.as_str(),
            "--json",
            json.as_str(),
        ]) else {
            panic!("expected select");
        };

        handle_select(&select_config(&args)).unwrap();

        assert!(root.join("mapping.csv").is_file());
        let summary = read_summary_json(&root.join("run.json")).unwrap();
        assert!(summary.evaluation.is_none());
        assert_eq!(summary.mapping[0].max_deviation, None);
    }
}
