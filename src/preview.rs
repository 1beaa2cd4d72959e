use crate::cli::CommonArgs;
use crate::date::{get_first_date, Date};
use crate::graph::{ContributionGraph, DateCommitMap, DAYS_PER_WEEK, DEFAULT_GRAPH};
use crate::model::{PlannedDay, PreviewOutput, SCHEMA_VERSION};
use anyhow::Context;
use chrono::Utc;
use console::style;
use tracing::warn;

const WEEKDAY_LABELS: [&str; DAYS_PER_WEEK] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn exec(common: &CommonArgs, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let graph = ContributionGraph::load(name, &common.graphs_dir).context("Failed to load graph")?;
    let first_date = get_first_date();
    let map = graph.process(first_date);

    let today = Date::today();
    if let Some(last) = map.keys().next_back().filter(|last| **last > today) {
        warn!(%last, "graph extends past today");
    }

    if json {
        output_json(name.unwrap_or(DEFAULT_GRAPH), first_date, &map)
    } else {
        output_grid(&graph, first_date, today, &map);
        Ok(())
    }
}

fn output_json(name: &str, first_date: Date, map: &DateCommitMap) -> anyhow::Result<()> {
    let output = PreviewOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        graph: name.to_string(),
        first_date,
        last_date: map.keys().next_back().copied(),
        total_commits: map.values().map(|c| u64::from(*c)).sum(),
        days: map
            .iter()
            .map(|(date, count)| PlannedDay {
                date: *date,
                count: *count,
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_grid(graph: &ContributionGraph, first_date: Date, today: Date, map: &DateCommitMap) {
    let total: u64 = map.values().map(|c| u64::from(*c)).sum();
    println!(
        "{} commits from {}",
        style(total).green().bold(),
        style(first_date).dim()
    );

    for (weekday, label) in WEEKDAY_LABELS.iter().enumerate() {
        let mut line = format!("{label} ");
        for week in 0..graph.weeks() {
            let date = first_date.plus_days((week * DAYS_PER_WEEK + weekday) as u64);
            let count = graph.intensity(week, weekday);
            let cell = match count {
                0 => style("·").dim(),
                _ if date > today => style("■").yellow(),
                1..=2 => style("■").green().dim(),
                3..=5 => style("■").green(),
                _ => style("■").green().bright(),
            };
            line.push_str(&cell.to_string());
        }
        println!("{line}");
    }
}
