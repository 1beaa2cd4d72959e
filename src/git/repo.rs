use super::Vcs;
use crate::date::Date;
use crate::error::{GreenhubError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::debug;

const COMMITTER_DATE_FILTER: &str = r#"export GIT_COMMITTER_DATE="$GIT_AUTHOR_DATE""#;

/// A working tree driven through the system `git` binary.
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Open the repository containing `path`, or the current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let start = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or(std::env::current_dir()?);

        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(&start)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| GreenhubError::NotARepository(format!("{}: {e}", start.display())))?;

        if !output.status.success() {
            return Err(GreenhubError::NotARepository(format!(
                "{}: {}",
                start.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let toplevel = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self {
            path: PathBuf::from(toplevel),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run<I, S>(&self, args: I, envs: &[(&str, &str)]) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        let command = std::iter::once("git".to_string())
            .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ");

        let mut cmd = Command::new("git");
        cmd.args(&args).current_dir(&self.path);
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        for (k, v) in envs {
            cmd.env(k, v);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!(%command, "spawning git");
        let output = cmd.output()?;

        if !output.status.success() {
            let status = output
                .status
                .code()
                .map_or_else(|| "killed by signal".to_string(), |c| format!("exit code {c}"));
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(GreenhubError::Git {
                command,
                status,
                stderr,
            });
        }

        debug!(%command, "git succeeded");
        Ok(output)
    }
}

impl Vcs for GitRepo {
    fn stage(&mut self, path: &Path) -> Result<()> {
        self.run([OsStr::new("add"), OsStr::new("--"), path.as_os_str()], &[])?;
        Ok(())
    }

    fn commit(&mut self, message: &str, date: &Date) -> Result<()> {
        let timestamp = date.git_timestamp();
        let date_arg = format!("--date={timestamp}");
        self.run(
            ["commit", "--quiet", "-m", message, date_arg.as_str()],
            &[("GIT_COMMITTER_DATE", timestamp.as_str())],
        )?;
        Ok(())
    }

    fn rewrite_committer_dates(&mut self) -> Result<()> {
        self.run(
            ["filter-branch", "--env-filter", COMMITTER_DATE_FILTER],
            &[("FILTER_BRANCH_SQUELCH_WARNING", "1")],
        )?;
        Ok(())
    }

    fn push(&mut self, force: bool) -> Result<()> {
        let mut args = vec!["push"];
        if force {
            args.push("--force");
        }
        self.run(args, &[])?;
        Ok(())
    }

    fn pull_rebase(&mut self) -> Result<()> {
        self.run(["pull", "--rebase"], &[])?;
        Ok(())
    }
}
