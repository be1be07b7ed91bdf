//! Batch conversion of files
//!
//! Each input is converted independently on a rayon pool. Output is staged in
//! a temporary file inside the target directory and only renamed into place
//! once every byte has been written, so an interrupted or failed item never
//! leaves a file behind.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tempfile::NamedTempFile;

use crate::config::ConvertOptions;
use crate::conversion::ConversionDispatcher;
use crate::core::cancel::{CancellableWriter, CancellationToken};
use crate::core::error::{ConvertError, Result};
use crate::types::OutputKind;

/// Progress callback, invoked with (finished items, total items)
pub type ProgressCallback<'a> = &'a (dyn Fn(usize, usize) + Send + Sync);

/// Result of converting a single input
#[derive(Debug)]
pub enum ItemOutcome {
    Converted {
        input: PathBuf,
        output: PathBuf,
        kind: OutputKind,
    },
    /// Not a library image and not a recognised raster image
    Skipped { input: PathBuf },
    Failed { input: PathBuf, error: ConvertError },
    Cancelled { input: PathBuf },
}

/// Creates the explicitly configured output directory, if any.
///
/// Failure here aborts the whole run.
pub fn prepare_output_dir(options: &ConvertOptions) -> Result<()> {
    match &options.output_dir {
        Some(dir) => ensure_dir(dir),
        None => Ok(()),
    }
}

/// Creates `dir` and its parents; an existing directory counts as success.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        // Another worker may have won the race.
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(source) => Err(ConvertError::OutputDirectoryUnavailable {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// `<dir>/<input stem>.<extension>`
pub fn output_path(input: &Path, dir: &Path, kind: OutputKind) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".");
    name.push(kind.extension());
    dir.join(name)
}

/// Converts one file and writes the result next to it (or into the configured
/// output directory).
pub fn convert_file(
    input: &Path,
    options: &ConvertOptions,
    token: &CancellationToken,
) -> ItemOutcome {
    match try_convert_file(input, options, token) {
        Ok((output, kind)) => {
            tracing::info!("Converted {} -> {}", input.display(), output.display());
            ItemOutcome::Converted {
                input: input.to_path_buf(),
                output,
                kind,
            }
        }
        Err(ConvertError::UnrecognizedFormat) => {
            tracing::debug!("Skipping {}: not an image", input.display());
            ItemOutcome::Skipped {
                input: input.to_path_buf(),
            }
        }
        Err(ConvertError::Cancelled) => {
            tracing::debug!("Abandoned {}: cancelled", input.display());
            ItemOutcome::Cancelled {
                input: input.to_path_buf(),
            }
        }
        Err(error) => {
            tracing::warn!("Error converting \"{}\": {}", input.display(), error);
            ItemOutcome::Failed {
                input: input.to_path_buf(),
                error,
            }
        }
    }
}

fn try_convert_file(
    input: &Path,
    options: &ConvertOptions,
    token: &CancellationToken,
) -> Result<(PathBuf, OutputKind)> {
    token.check()?;

    let file = File::open(input)?;
    tracing::debug!("Converting {}", input.display());

    let dispatcher = ConversionDispatcher::new(options);
    let converted = dispatcher.process(BufReader::new(file), token)?;

    let dir = options.output_dir_for(input);
    ensure_dir(&dir)?;
    let output = output_path(input, &dir, converted.kind);

    write_atomically(&output, &dir, &converted.bytes, token)?;
    Ok((output, converted.kind))
}

/// Writes `bytes` to a temporary file in `dir` and renames it to `target`.
fn write_atomically(
    target: &Path,
    dir: &Path,
    bytes: &[u8],
    token: &CancellationToken,
) -> Result<()> {
    const WRITE_CHUNK: usize = 1024 * 1024;

    let staged = NamedTempFile::new_in(dir)?;
    let mut writer = CancellableWriter::new(staged, token.clone());

    for chunk in bytes.chunks(WRITE_CHUNK) {
        writer.write_all(chunk)?;
    }
    writer.flush()?;

    let staged = writer.into_inner();
    token.check()?;
    staged.as_file().sync_all()?;
    staged.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Aggregated outcome of a batch
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub converted: usize,
    pub converted_by_kind: HashMap<OutputKind, usize>,
    pub skipped: usize,
    pub cancelled: usize,
    /// Inputs that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
    pub outputs: Vec<PathBuf>,
    pub duration: Duration,
}

impl BatchReport {
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Converted { output, kind, .. } => {
                self.converted += 1;
                *self.converted_by_kind.entry(kind).or_insert(0) += 1;
                self.outputs.push(output);
            }
            ItemOutcome::Skipped { .. } => self.skipped += 1,
            ItemOutcome::Cancelled { .. } => self.cancelled += 1,
            ItemOutcome::Failed { input, error } => self.failed.push((input, error.to_string())),
        }
    }

    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.cancelled + self.failed.len()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Converted {} of {} files in {:.2}s\n",
            self.converted,
            self.total(),
            self.duration.as_secs_f64()
        );

        let mut kinds: Vec<_> = self.converted_by_kind.iter().collect();
        kinds.sort_by_key(|(kind, _)| kind.extension());
        for (kind, count) in kinds {
            summary.push_str(&format!("  - {}: {}\n", kind, count));
        }

        if self.skipped > 0 {
            summary.push_str(&format!("{} not an image, skipped\n", self.skipped));
        }
        if !self.failed.is_empty() {
            summary.push_str(&format!("{} failed\n", self.failed.len()));
        }
        if self.cancelled > 0 {
            summary.push_str(&format!("{} cancelled\n", self.cancelled));
        }

        summary
    }
}

/// Converts every input in parallel.
///
/// Per-item errors end up in the report; only failing to build the worker
/// pool is returned as an error.
pub fn convert_all(
    inputs: &[PathBuf],
    options: &ConvertOptions,
    token: &CancellationToken,
    progress: Option<ProgressCallback<'_>>,
) -> anyhow::Result<BatchReport> {
    let start_time = Instant::now();
    let total = inputs.len();

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = options.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    tracing::debug!(
        "Converting {} files on {} threads",
        total,
        pool.current_num_threads()
    );

    let finished = AtomicUsize::new(0);
    let outcomes: Vec<ItemOutcome> = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| {
                let outcome = convert_file(input, options, token);
                let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(callback) = progress {
                    callback(done, total);
                }
                outcome
            })
            .collect()
    });

    let mut report = BatchReport::default();
    for outcome in outcomes {
        report.record(outcome);
    }
    report.duration = start_time.elapsed();

    tracing::info!(
        "Batch complete: {} converted, {} skipped, {} failed",
        report.converted,
        report.skipped,
        report.failed.len()
    );

    Ok(report)
}
