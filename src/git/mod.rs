pub mod repo;

use crate::date::Date;
use crate::error::Result;
use std::path::Path;

pub use repo::GitRepo;

/// The version-control operations the commit driver needs.
///
/// Every call blocks until the underlying command has finished and reports
/// a failed command as an error.
pub trait Vcs {
    fn stage(&mut self, path: &Path) -> Result<()>;

    /// Commit staged changes with `message`, authored and committed on `date`.
    fn commit(&mut self, message: &str, date: &Date) -> Result<()>;

    /// Set every commit's committer date to its author date.
    fn rewrite_committer_dates(&mut self) -> Result<()>;

    fn push(&mut self, force: bool) -> Result<()>;

    fn pull_rebase(&mut self) -> Result<()>;
}
