//! Conversion options

use std::path::{Path, PathBuf};

/// Directory created next to an input when no output directory is given
pub const DEFAULT_OUTPUT_SUBDIR: &str = "converted";

/// Options shared by every item of a conversion run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Apply the quarter-turn orientation correction
    pub rotate: bool,
    /// Explicit output directory; `None` places output beside each input
    pub output_dir: Option<PathBuf>,
    /// Worker thread count; `None` uses the available hardware concurrency
    pub threads: Option<usize>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            rotate: true,
            output_dir: None,
            threads: None,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables the orientation correction in both directions
    pub fn without_rotation(mut self) -> Self {
        self.rotate = false;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Sets the worker thread count, ignoring zero
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = (threads > 0).then_some(threads);
        self
    }

    /// Returns the directory that output for `input` is written to
    pub fn output_dir_for(&self, input: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(DEFAULT_OUTPUT_SUBDIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_rotate() {
        let options = ConvertOptions::default();
        assert!(options.rotate);
        assert!(options.output_dir.is_none());
        assert!(!options.without_rotation().rotate);
    }

    #[test]
    fn test_output_dir_defaults_next_to_input() {
        let options = ConvertOptions::new();
        assert_eq!(
            options.output_dir_for(Path::new("/games/library/cover.png")),
            PathBuf::from("/games/library/converted")
        );
        assert_eq!(
            options.output_dir_for(Path::new("cover.png")),
            PathBuf::from("converted")
        );
    }

    #[test]
    fn test_explicit_output_dir_wins() {
        let options = ConvertOptions::new().with_output_dir("/tmp/out");
        assert_eq!(
            options.output_dir_for(Path::new("/games/cover.png")),
            PathBuf::from("/tmp/out")
        );
    }

    #[test]
    fn test_zero_threads_means_automatic() {
        assert_eq!(ConvertOptions::new().with_threads(0).threads, None);
        assert_eq!(ConvertOptions::new().with_threads(3).threads, Some(3));
    }
}
