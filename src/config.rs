use std::path::{Path, PathBuf};

pub const DEFAULT_MARKER_FILE: &str = "green.hub";
pub const DEFAULT_GRAPHS_DIR: &str = "graphs";

/// Everything the commit driver needs to know about its surroundings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the working tree commits are made in.
    pub repo_root: PathBuf,
    /// Marker file, relative to `repo_root`.
    pub marker_file: PathBuf,
    pub graphs_dir: PathBuf,
    /// Retry a rejected non-forced push once after `git pull --rebase`.
    pub push_retry: bool,
    pub seed: Option<u64>,
    pub progress: bool,
}

impl Config {
    pub fn new<P: Into<PathBuf>>(repo_root: P) -> Self {
        Self {
            repo_root: repo_root.into(),
            marker_file: PathBuf::from(DEFAULT_MARKER_FILE),
            graphs_dir: PathBuf::from(DEFAULT_GRAPHS_DIR),
            push_retry: true,
            seed: None,
            progress: false,
        }
    }

    pub fn with_marker_file<P: Into<PathBuf>>(mut self, marker_file: P) -> Self {
        self.marker_file = marker_file.into();
        self
    }

    pub fn with_graphs_dir<P: Into<PathBuf>>(mut self, graphs_dir: P) -> Self {
        self.graphs_dir = graphs_dir.into();
        self
    }

    pub fn with_push_retry(mut self, push_retry: bool) -> Self {
        self.push_retry = push_retry;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn marker_path(&self) -> PathBuf {
        self.repo_root.join(&self.marker_file)
    }

    pub fn graphs_dir(&self) -> &Path {
        &self.graphs_dir
    }
}
