use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tracing::Level;

use pocket_libimg::batch::{self, convert_all};
use pocket_libimg::cli::{Cli, ProgressReporter, collect_inputs};
use pocket_libimg::core::CancellationToken;

const EXIT_NO_INPUTS: u8 = 1;
const EXIT_OUTPUT_DIR: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let files = collect_inputs(&cli.inputs);
    if files.is_empty() {
        eprintln!("No (valid) input files / directories specified.\n");
        Cli::command().print_help()?;
        return Ok(ExitCode::from(EXIT_NO_INPUTS));
    }

    let options = cli.convert_options();
    if let Err(e) = batch::prepare_output_dir(&options) {
        eprintln!("Cannot create the specified output directory: {}", e);
        return Ok(ExitCode::from(EXIT_OUTPUT_DIR));
    }

    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        handler_token.cancel();
    })
    .context("Failed to set Ctrl+C handler")?;

    let progress = if cli.verbose {
        ProgressReporter::hidden()
    } else {
        ProgressReporter::new(files.len() as u64)
    };
    let progress_cb = |done: usize, _total: usize| progress.set_position(done);

    let report = convert_all(&files, &options, &token, Some(&progress_cb))?;
    progress.finish();

    if token.is_cancelled() {
        eprintln!("Interrupted.");
    }
    print!("{}", report.summary());

    Ok(ExitCode::SUCCESS)
}
