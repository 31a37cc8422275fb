use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::Path;
use std::process::ExitCode;

use headerfix::cli::{Cli, DEFAULT_START_YEAR};
use headerfix::config::{Config, check_year};
use headerfix::header::{Action, LogSink, ModifyAction, RecordingSink, Template, ValidateAction};
use headerfix::models::{Mode, Output};
use headerfix::scanner::{ScanOptions, ScanSummary, UnrecognizedPolicy, count, process};
use headerfix::utils::file::compile_patterns;

/// Validate mode found at least one violation.
const EXIT_VIOLATIONS: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let start_time = Utc::now();

    let config = match &cli.config {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };
    let start_year = cli
        .start_year
        .clone()
        .or_else(|| config.start_year.clone())
        .unwrap_or_else(|| DEFAULT_START_YEAR.to_string());
    check_year(&start_year)?;
    let template = Template::load(Path::new(&cli.template))?;

    let mut exclude = config.exclude.clone();
    exclude.extend(cli.exclude.iter().cloned());
    info!("Exclusion patterns: {exclude:?}");

    if cli.dry_run && !cli.modify {
        warn!("--dry-run has no effect without --modify");
    }
    let options = ScanOptions {
        max_depth: cli.max_depth,
        exclude: compile_patterns(&exclude),
        recognizer: config.recognizer(),
        unrecognized: if cli.dry_run || cli.skip_unrecognized {
            UnrecognizedPolicy::Skip
        } else {
            UnrecognizedPolicy::Halt
        },
    };

    let mut total_files = 0;
    for root in &cli.roots {
        let counted = count(root, options.max_depth, &options.exclude)
            .with_context(|| format!("cannot scan {root}"))?;
        total_files += counted.files;
    }
    info!("Found {total_files} files");

    let (mode, action): (Mode, Box<dyn Action>) = if cli.modify {
        let mode = if cli.dry_run { Mode::DryRun } else { Mode::Modify };
        (mode, Box::new(ModifyAction::new(template, start_year, cli.dry_run)))
    } else {
        (Mode::Validate, Box::new(ValidateAction::new(template, start_year)))
    };

    let progress_bar = create_progress_bar(total_files, cli.no_progress)?;
    let mut recording = RecordingSink::new();
    let mut summary = ScanSummary::default();
    {
        let mut sink = (LogSink::with_progress(progress_bar.clone()), &mut recording);
        for root in &cli.roots {
            summary.absorb(process(root, &options, action.as_ref(), &mut sink, &progress_bar)?);
            if summary.halted {
                break;
            }
        }
    }
    progress_bar.finish_and_clear();
    let end_time = Utc::now();

    info!(
        "Checked {} of {} files ({} skipped, {} unrecognized, {} excluded): {} violations, {} changes",
        summary.files_checked,
        summary.files_visited,
        summary.skipped,
        summary.unrecognized,
        summary.excluded,
        summary.violations,
        summary.changes
    );

    let halted = summary.halted;
    let violations = summary.violations;
    if let Some(output_file) = &cli.output {
        let output = Output::new(
            start_time,
            end_time,
            mode,
            cli.roots.clone(),
            summary,
            recording.into_events(),
        );
        output.write(Path::new(output_file))?;
        info!("JSON report written to {output_file}");
    }

    if halted {
        warn!("Scan stopped before visiting every file");
        return Ok(ExitCode::FAILURE);
    }
    if mode == Mode::Validate && violations > 0 {
        return Ok(ExitCode::from(EXIT_VIOLATIONS));
    }
    Ok(ExitCode::SUCCESS)
}

fn create_progress_bar(total_files: usize, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let progress_bar = ProgressBar::new(total_files as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files checked ({eta})")
            .context("invalid progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(progress_bar)
}
