use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConvertOptions;

#[derive(Parser, Debug)]
#[command(name = "pocket-libimg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert between Analogue Pocket library images and common image formats")]
#[command(
    long_about = "Library images (.bin) are converted to BMP, any other image is converted to a \
                  library image. Directories are expanded to the files they contain."
)]
pub struct Cli {
    /// Input files and/or directories
    pub inputs: Vec<PathBuf>,

    /// Do not rotate images
    #[arg(long)]
    pub no_rotate: bool,

    /// Output directory, created if it does not exist. Defaults to "converted"
    /// in each input's directory
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Log every file instead of showing a progress bar
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn convert_options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::new();
        if self.no_rotate {
            options = options.without_rotation();
        }
        if let Some(dir) = &self.output_dir {
            options = options.with_output_dir(dir);
        }
        if let Some(threads) = self.threads {
            options = options.with_threads(threads);
        }
        options
    }
}

/// Expands the command-line paths into the list of files to convert.
///
/// Directories contribute the regular files directly inside them (sorted,
/// not recursive). Paths that do not exist are reported and ignored.
pub fn collect_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            match list_files(path) {
                Ok(mut entries) => {
                    entries.sort();
                    files.extend(entries);
                }
                Err(e) => tracing::warn!("Cannot read directory {}: {}", path.display(), e),
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            tracing::warn!("Ignoring {}: no such file or directory", path.display());
        }
    }

    files
}

fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files ({eta})")
                .expect("invalid progress bar template - this is a bug")
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn set_position(&self, done: usize) {
        self.bar.set_position(done as u64);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "pocket-libimg",
            "--no-rotate",
            "--output-dir",
            "out",
            "-j",
            "2",
            "a.png",
            "library",
        ])
        .unwrap();

        assert_eq!(cli.inputs, vec![PathBuf::from("a.png"), PathBuf::from("library")]);
        let options = cli.convert_options();
        assert!(!options.rotate);
        assert_eq!(options.output_dir, Some(PathBuf::from("out")));
        assert_eq!(options.threads, Some(2));
    }

    #[test]
    fn test_parse_output_dir_with_equals() {
        let cli = Cli::try_parse_from(["pocket-libimg", "--output-dir=converted/pocket", "x.bin"])
            .unwrap();
        assert_eq!(cli.output_dir, Some(PathBuf::from("converted/pocket")));
        assert!(cli.convert_options().rotate);
    }
}
