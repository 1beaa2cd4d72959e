use crate::config::Config;
use crate::date::{get_first_date, Date, DateRange};
use crate::error::{GreenhubError, Result};
use crate::git::{GitRepo, Vcs};
use crate::graph;
use crate::model::{CommitSummary, PlannedDay};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::fs;
use std::str::FromStr;
use tracing::{info, warn};

/// Inclusive bounds for the number of commits drawn per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitCountRange {
    min: u32,
    max: u32,
}

impl CommitCountRange {
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min > max {
            return Err(GreenhubError::InvalidRange(format!(
                "minimum {min} is larger than maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn exactly(count: u32) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

impl Default for CommitCountRange {
    fn default() -> Self {
        Self::exactly(1)
    }
}

impl FromStr for CommitCountRange {
    type Err = GreenhubError;

    /// Accepts `N` or `N-M`.
    fn from_str(s: &str) -> Result<Self> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| GreenhubError::Parse(format!("Invalid commit count '{part}': {e}")))
        };
        match s.split_once('-') {
            Some((min, max)) => Self::new(parse(min)?, parse(max)?),
            None => Ok(Self::exactly(parse(s)?)),
        }
    }
}

impl fmt::Display for CommitCountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Creates backdated commits in a repository by rewriting a marker file.
pub struct Greenhub<V: Vcs> {
    vcs: V,
    config: Config,
    rng: StdRng,
}

impl Greenhub<GitRepo> {
    /// Open the repository at `config.repo_root` through the `git` binary.
    pub fn open(mut config: Config) -> Result<Self> {
        let repo = GitRepo::open(Some(&config.repo_root))?;
        config.repo_root = repo.path().to_path_buf();
        Self::new(repo, config)
    }
}

impl<V: Vcs> Greenhub<V> {
    /// Creates the marker file when it does not exist yet.
    pub fn new(vcs: V, config: Config) -> Result<Self> {
        let marker = config.marker_path();
        if !marker.is_file() {
            if let Some(parent) = marker.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::File::create(&marker)?;
        }

        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Ok(Self { vcs, config, rng })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    /// Draw `name` (or the built-in default) onto the calendar ending today.
    pub fn commit_graph(&mut self, name: Option<&str>, base_commit_times: u32) -> Result<CommitSummary> {
        self.commit_graph_from(get_first_date(), name, base_commit_times)
    }

    pub fn commit_graph_from(
        &mut self,
        first_date: Date,
        name: Option<&str>,
        base_commit_times: u32,
    ) -> Result<CommitSummary> {
        let plan = self.plan_graph(first_date, name, base_commit_times)?;
        self.execute(&plan)
    }

    pub fn plan_graph(
        &self,
        first_date: Date,
        name: Option<&str>,
        base_commit_times: u32,
    ) -> Result<Vec<PlannedDay>> {
        let map = graph::process(first_date, name, self.config.graphs_dir())?;

        let today = Date::today();
        if let Some(last) = map.keys().next_back().filter(|last| **last > today) {
            warn!(%last, "graph extends past today; those days will not be visible yet");
        }

        Ok(map
            .into_iter()
            .map(|(date, count)| PlannedDay {
                date,
                count: count.saturating_add(base_commit_times),
            })
            .collect())
    }

    /// Commit every day from `start_date` (or the calendar's first day) through today.
    pub fn commit_everyday(
        &mut self,
        start_date: Option<Date>,
        commit_count_range: CommitCountRange,
    ) -> Result<CommitSummary> {
        let start = start_date.unwrap_or_else(get_first_date);
        let mut end = Date::today();
        end.tomorrow();
        self.commit_in_range(start, end, commit_count_range)
    }

    /// Commit on each day in `[start_date, end_date)`; nothing happens when
    /// `start_date >= end_date`.
    pub fn commit_in_range(
        &mut self,
        start_date: Date,
        end_date: Date,
        commit_count_range: CommitCountRange,
    ) -> Result<CommitSummary> {
        let plan = self.plan_range(DateRange::new(start_date, end_date), commit_count_range);
        self.execute(&plan)
    }

    pub fn plan_range(&mut self, range: DateRange, commit_count_range: CommitCountRange) -> Vec<PlannedDay> {
        range
            .iter()
            .map(|date| PlannedDay {
                date,
                count: commit_count_range.draw(&mut self.rng),
            })
            .collect()
    }

    /// Run the plan in order, stopping at the first failed commit.
    pub fn execute(&mut self, plan: &[PlannedDay]) -> Result<CommitSummary> {
        let summary = CommitSummary::from_plan(plan);
        if summary.commits == 0 {
            info!("nothing to commit");
            return Ok(summary);
        }

        info!(
            days = summary.days,
            commits = summary.commits,
            "starting commit run"
        );

        let pb = if self.config.progress {
            ProgressBar::new(summary.commits)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.green}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for day in plan {
            pb.set_message(day.date.to_string());
            for _ in 0..day.count {
                if let Err(e) = self.commit(&day.date) {
                    pb.abandon_with_message(format!("failed on {}", day.date));
                    return Err(e);
                }
                pb.inc(1);
            }
        }

        pb.finish_with_message("done");
        Ok(summary)
    }

    /// One commit cycle: rewrite the marker, stage it, commit on `date`.
    pub fn commit(&mut self, date: &Date) -> Result<()> {
        self.write_marker(date)?;
        self.vcs.stage(&self.config.marker_file)?;
        self.vcs.commit(&date.to_string(), date)
    }

    /// Content always differs from what the marker holds, so git sees a change.
    fn write_marker(&mut self, date: &Date) -> Result<()> {
        let path = self.config.marker_path();
        let previous = fs::read_to_string(&path).unwrap_or_default();
        let content = loop {
            let fraction: f64 = self.rng.gen();
            let content = format!("{date}: {fraction:.6}");
            if content != previous {
                break content;
            }
        };
        fs::write(path, content)?;
        Ok(())
    }

    /// Rewrites history: every committer date becomes its author date.
    pub fn filter_commit_date(&mut self) -> Result<()> {
        info!("rewriting committer dates");
        self.vcs.rewrite_committer_dates()
    }

    pub fn push(&mut self, force: bool) -> Result<()> {
        match self.vcs.push(force) {
            Err(e) if !force && self.config.push_retry => {
                warn!(error = %e, "push rejected, rebasing onto remote and retrying");
                self.vcs.pull_rebase()?;
                self.vcs.push(false)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Stage(String),
        Commit(String, Date),
        Rewrite,
        Push(bool),
        PullRebase,
    }

    #[derive(Default)]
    struct RecordingVcs {
        calls: Vec<Call>,
        fail_commit_at: Option<usize>,
        push_failures: usize,
    }

    impl RecordingVcs {
        fn commits(&self) -> Vec<Date> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Commit(_, d) => Some(*d),
                    _ => None,
                })
                .collect()
        }

        fn failure(command: &str) -> GreenhubError {
            GreenhubError::Git {
                command: command.to_string(),
                status: "exit code 1".to_string(),
                stderr: "rejected".to_string(),
            }
        }
    }

    impl Vcs for RecordingVcs {
        fn stage(&mut self, path: &Path) -> Result<()> {
            self.calls.push(Call::Stage(path.display().to_string()));
            Ok(())
        }

        fn commit(&mut self, message: &str, date: &Date) -> Result<()> {
            if self.fail_commit_at == Some(self.commits().len()) {
                return Err(Self::failure("git commit"));
            }
            self.calls.push(Call::Commit(message.to_string(), *date));
            Ok(())
        }

        fn rewrite_committer_dates(&mut self) -> Result<()> {
            self.calls.push(Call::Rewrite);
            Ok(())
        }

        fn push(&mut self, force: bool) -> Result<()> {
            self.calls.push(Call::Push(force));
            if self.push_failures > 0 {
                self.push_failures -= 1;
                return Err(Self::failure("git push"));
            }
            Ok(())
        }

        fn pull_rebase(&mut self) -> Result<()> {
            self.calls.push(Call::PullRebase);
            Ok(())
        }
    }

    fn d(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn driver(vcs: RecordingVcs) -> (TempDir, Greenhub<RecordingVcs>) {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path()).with_seed(Some(7));
        let hub = Greenhub::new(vcs, config).unwrap();
        (dir, hub)
    }

    fn marker(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join("green.hub")).unwrap()
    }

    #[test]
    fn new_creates_empty_marker_file() {
        let (dir, _hub) = driver(RecordingVcs::default());
        assert_eq!(marker(&dir), "");
    }

    #[test]
    fn reversed_range_does_nothing() {
        let (dir, mut hub) = driver(RecordingVcs::default());
        let summary = hub
            .commit_in_range(d("2024-01-05"), d("2024-01-01"), CommitCountRange::exactly(3))
            .unwrap();
        assert_eq!(summary, CommitSummary::default());
        assert!(hub.vcs().calls.is_empty());
        assert_eq!(marker(&dir), "");
    }

    #[test]
    fn empty_range_does_nothing() {
        let (dir, mut hub) = driver(RecordingVcs::default());
        hub.commit_in_range(d("2024-01-01"), d("2024-01-01"), CommitCountRange::default())
            .unwrap();
        assert!(hub.vcs().calls.is_empty());
        assert_eq!(marker(&dir), "");
    }

    #[test]
    fn fixed_count_commits_each_day_in_order() {
        let (dir, mut hub) = driver(RecordingVcs::default());
        let start = d("2024-02-27");
        let summary = hub
            .commit_in_range(start, d("2024-03-03"), CommitCountRange::exactly(2))
            .unwrap();

        assert_eq!(summary.commits, 10);
        assert_eq!(summary.days, 5);
        let expected: Vec<Date> = ["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01", "2024-03-02"]
            .iter()
            .flat_map(|s| [d(s), d(s)])
            .collect();
        assert_eq!(hub.vcs().commits(), expected);
        assert_eq!(start, d("2024-02-27"));

        assert_eq!(hub.vcs().calls[0], Call::Stage("green.hub".to_string()));
        assert_eq!(
            hub.vcs().calls[1],
            Call::Commit("2024-02-27".to_string(), d("2024-02-27"))
        );
        assert!(marker(&dir).starts_with("2024-03-02: 0."));
    }

    #[test]
    fn drawn_counts_stay_within_bounds() {
        let (_dir, mut hub) = driver(RecordingVcs::default());
        let range = DateRange::new(d("2024-01-01"), d("2024-03-01"));
        let plan = hub.plan_range(range, CommitCountRange::new(0, 3).unwrap());
        assert_eq!(plan.len(), 60);
        assert!(plan.iter().all(|p| p.count <= 3));
        assert!(plan.windows(2).all(|w| w[0].date < w[1].date));

        hub.execute(&plan).unwrap();
        let total: u32 = plan.iter().map(|p| p.count).sum();
        assert_eq!(hub.vcs().commits().len(), total as usize);
    }

    #[test]
    fn everyday_runs_through_today() {
        let (_dir, mut hub) = driver(RecordingVcs::default());
        let mut start = Date::today();
        start.days_before(3);
        hub.commit_everyday(Some(start), CommitCountRange::default()).unwrap();

        let commits = hub.vcs().commits();
        assert_eq!(commits.len(), 4);
        assert_eq!(commits.first(), Some(&start));
        assert_eq!(commits.last(), Some(&Date::today()));
    }

    #[test]
    fn graph_adds_base_commits_to_every_cell() {
        let (dir, mut hub) = driver(RecordingVcs::default());
        let graphs = dir.path().join("graphs");
        fs::create_dir_all(&graphs).unwrap();
        fs::write(graphs.join("tiny.txt"), "2\n.\n1\n").unwrap();
        hub.config.graphs_dir = graphs;

        let summary = hub.commit_graph_from(d("2024-01-07"), Some("tiny"), 1).unwrap();
        assert_eq!(summary.commits, 5);
        assert_eq!(summary.first_date, Some(d("2024-01-07")));
        assert_eq!(summary.last_date, Some(d("2024-01-09")));
        assert_eq!(
            hub.vcs().commits(),
            vec![
                d("2024-01-07"),
                d("2024-01-07"),
                d("2024-01-07"),
                d("2024-01-09"),
                d("2024-01-09"),
            ]
        );
    }

    #[test]
    fn missing_graph_fails_before_committing() {
        let (_dir, mut hub) = driver(RecordingVcs::default());
        let err = hub.commit_graph(Some("does-not-exist"), 0).unwrap_err();
        assert!(matches!(err, GreenhubError::Load(_)));
        assert!(hub.vcs().calls.is_empty());
    }

    #[test]
    fn failed_commit_aborts_the_run() {
        let vcs = RecordingVcs {
            fail_commit_at: Some(2),
            ..Default::default()
        };
        let (_dir, mut hub) = driver(vcs);
        let err = hub
            .commit_in_range(d("2024-01-01"), d("2024-01-10"), CommitCountRange::exactly(1))
            .unwrap_err();
        assert!(matches!(err, GreenhubError::Git { .. }));
        assert_eq!(hub.vcs().commits(), vec![d("2024-01-01"), d("2024-01-02")]);
    }

    #[test]
    fn rejected_push_is_retried_once_after_rebase() {
        let vcs = RecordingVcs {
            push_failures: 1,
            ..Default::default()
        };
        let (_dir, mut hub) = driver(vcs);
        hub.push(false).unwrap();
        assert_eq!(
            hub.vcs().calls,
            vec![Call::Push(false), Call::PullRebase, Call::Push(false)]
        );
    }

    #[test]
    fn forced_push_is_not_retried() {
        let vcs = RecordingVcs {
            push_failures: 1,
            ..Default::default()
        };
        let (_dir, mut hub) = driver(vcs);
        assert!(hub.push(true).is_err());
        assert_eq!(hub.vcs().calls, vec![Call::Push(true)]);
    }

    #[test]
    fn push_retry_can_be_disabled() {
        let vcs = RecordingVcs {
            push_failures: 1,
            ..Default::default()
        };
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path()).with_push_retry(false);
        let mut hub = Greenhub::new(vcs, config).unwrap();
        assert!(hub.push(false).is_err());
        assert_eq!(hub.vcs().calls, vec![Call::Push(false)]);
    }

    #[test]
    fn repeated_draw_still_changes_the_marker() {
        let (dir, mut hub) = driver(RecordingVcs::default());
        let date = d("2024-01-01");

        let mut upcoming = hub.rng.clone();
        let fraction: f64 = upcoming.gen();
        let repeated = format!("{date}: {fraction:.6}");
        fs::write(dir.path().join("green.hub"), &repeated).unwrap();

        hub.commit(&date).unwrap();
        let first = marker(&dir);
        assert_ne!(first, repeated);
        assert!(first.starts_with("2024-01-01: "));

        hub.commit(&date).unwrap();
        assert_ne!(marker(&dir), first);
        assert_eq!(hub.vcs().commits(), vec![date, date]);
    }

    #[test]
    fn filter_commit_date_rewrites_once() {
        let (_dir, mut hub) = driver(RecordingVcs::default());
        hub.filter_commit_date().unwrap();
        assert_eq!(hub.vcs().calls, vec![Call::Rewrite]);
    }

    #[test]
    fn commit_count_range_parsing() {
        assert_eq!("3".parse::<CommitCountRange>().unwrap(), CommitCountRange::exactly(3));
        assert_eq!(
            "1-5".parse::<CommitCountRange>().unwrap(),
            CommitCountRange::new(1, 5).unwrap()
        );
        assert_eq!(CommitCountRange::new(1, 5).unwrap().to_string(), "1-5");
        assert!(matches!(
            "5-1".parse::<CommitCountRange>(),
            Err(GreenhubError::InvalidRange(_))
        ));
        assert!(matches!("x".parse::<CommitCountRange>(), Err(GreenhubError::Parse(_))));
    }
}
