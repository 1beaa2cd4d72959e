use crate::cli::CommonArgs;
use crate::date::Date;
use crate::driver::{CommitCountRange, Greenhub};
use crate::git::GitRepo;
use crate::model::CommitSummary;
use anyhow::Context;
use console::style;

fn open(common: &CommonArgs) -> anyhow::Result<Greenhub<GitRepo>> {
    let config = common.config().context("Failed to resolve configuration")?;
    Greenhub::open(config).context("Failed to open git repository")
}

pub fn graph(common: &CommonArgs, name: Option<&str>, base: u32) -> anyhow::Result<()> {
    let mut hub = open(common)?;
    let summary = hub
        .commit_graph(name, base)
        .with_context(|| format!("Failed to commit graph '{}'", name.unwrap_or(crate::graph::DEFAULT_GRAPH)))?;
    output_summary(&summary);
    Ok(())
}

pub fn everyday(common: &CommonArgs, start: Option<Date>, commits: CommitCountRange) -> anyhow::Result<()> {
    let mut hub = open(common)?;
    let summary = hub
        .commit_everyday(start, commits)
        .context("Failed to commit everyday")?;
    output_summary(&summary);
    Ok(())
}

pub fn range(common: &CommonArgs, start: Date, end: Date, commits: CommitCountRange) -> anyhow::Result<()> {
    let mut hub = open(common)?;
    let summary = hub
        .commit_in_range(start, end, commits)
        .with_context(|| format!("Failed to commit from {start} to {end}"))?;
    output_summary(&summary);
    Ok(())
}

pub fn commit(common: &CommonArgs, date: Date) -> anyhow::Result<()> {
    let mut hub = open(common)?;
    hub.commit(&date)
        .with_context(|| format!("Failed to commit on {date}"))?;
    println!("Committed on {}", style(date).green());
    Ok(())
}

pub fn filter_dates(common: &CommonArgs) -> anyhow::Result<()> {
    let mut hub = open(common)?;
    hub.filter_commit_date()
        .context("Failed to rewrite committer dates")?;
    println!("Committer dates now match author dates");
    Ok(())
}

pub fn push(common: &CommonArgs, force: bool, retry: bool) -> anyhow::Result<()> {
    let config = common
        .config()
        .context("Failed to resolve configuration")?
        .with_push_retry(retry);
    let mut hub = Greenhub::open(config).context("Failed to open git repository")?;
    hub.push(force).context("Failed to push")?;
    println!("Pushed{}", if force { " (forced)" } else { "" });
    Ok(())
}

fn plural(count: u64, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

fn summary_line(summary: &CommitSummary) -> String {
    match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => format!(
            "Created {} {} on {} {} ({} to {})",
            style(summary.commits).green().bold(),
            plural(summary.commits, "commit"),
            style(summary.days).cyan(),
            plural(summary.days as u64, "day"),
            style(first).dim(),
            style(last).dim()
        ),
        _ => "Nothing to commit".to_string(),
    }
}

fn output_summary(summary: &CommitSummary) {
    println!("{}", summary_line(summary));
}
