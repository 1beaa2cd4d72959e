//! Contribution patterns and their placement on the calendar.
//!
//! A pattern is a plain-text grid laid out like the calendar itself:
//!
//! * one line per weekday row, Sunday first, at most seven rows;
//! * one character per week column, left to right;
//! * `0`-`9` is the number of commits for that day, `.` and space mean none;
//! * lines starting with `#` are comments and trailing blank lines are ignored.
//!
//! Short rows are padded with empty cells.

use crate::date::Date;
use crate::error::{GreenhubError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DAYS_PER_WEEK: usize = 7;
pub const DEFAULT_GRAPH: &str = "default";

const BUILTIN_GRAPHS: &[(&str, &str)] = &[
    ("default", include_str!("../graphs/default.txt")),
    ("hi", include_str!("../graphs/hi.txt")),
];

/// Commit counts keyed by day, iterated chronologically.
pub type DateCommitMap = BTreeMap<Date, u32>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionGraph {
    /// `cells[weekday][week]`
    cells: Vec<Vec<u32>>,
}

impl ContributionGraph {
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows: Vec<&str> = text
            .lines()
            .filter(|line| !line.starts_with('#'))
            .collect();
        while rows.last().is_some_and(|row| row.trim().is_empty()) {
            rows.pop();
        }

        if rows.is_empty() {
            return Err(GreenhubError::Load("graph has no rows".to_string()));
        }
        if rows.len() > DAYS_PER_WEEK {
            return Err(GreenhubError::Load(format!(
                "graph has {} rows, at most {DAYS_PER_WEEK} allowed",
                rows.len()
            )));
        }

        let mut cells = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let mut parsed = Vec::with_capacity(row.len());
            for (col_idx, ch) in row.chars().enumerate() {
                let value = match ch {
                    '.' | ' ' => 0,
                    c => c.to_digit(10).ok_or_else(|| {
                        GreenhubError::Load(format!(
                            "unexpected character '{c}' at row {}, column {}",
                            row_idx + 1,
                            col_idx + 1
                        ))
                    })?,
                };
                parsed.push(value);
            }
            cells.push(parsed);
        }

        Ok(Self { cells })
    }

    /// Load `name` from disk or from the built-in set.
    ///
    /// Lookup order: `name` as a path, `<dir>/<name>`, `<dir>/<name>.txt`,
    /// then the built-in patterns. `None` selects the built-in default.
    pub fn load(name: Option<&str>, graphs_dir: &Path) -> Result<Self> {
        let name = name.unwrap_or(DEFAULT_GRAPH);

        for candidate in candidate_paths(name, graphs_dir) {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "loading graph");
                let text = std::fs::read_to_string(&candidate).map_err(|e| {
                    GreenhubError::Load(format!("failed to read {}: {e}", candidate.display()))
                })?;
                return Self::parse(&text).map_err(|e| match e {
                    GreenhubError::Load(msg) => {
                        GreenhubError::Load(format!("{}: {msg}", candidate.display()))
                    }
                    other => other,
                });
            }
        }

        BUILTIN_GRAPHS
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, text)| Self::parse(text))
            .unwrap_or_else(|| Err(GreenhubError::Load(format!("graph '{name}' not found"))))
    }

    pub fn weeks(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn intensity(&self, week: usize, weekday: usize) -> u32 {
        self.cells
            .get(weekday)
            .and_then(|row| row.get(week))
            .copied()
            .unwrap_or(0)
    }

    /// Place the pattern with its top-left cell on `first_date`.
    pub fn process(&self, first_date: Date) -> DateCommitMap {
        let mut map = DateCommitMap::new();
        for week in 0..self.weeks() {
            for weekday in 0..DAYS_PER_WEEK {
                let count = self.intensity(week, weekday);
                if count == 0 {
                    continue;
                }
                let offset = (week * DAYS_PER_WEEK + weekday) as u64;
                map.insert(first_date.plus_days(offset), count);
            }
        }
        map
    }
}

fn candidate_paths(name: &str, graphs_dir: &Path) -> Vec<PathBuf> {
    vec![
        PathBuf::from(name),
        graphs_dir.join(name),
        graphs_dir.join(format!("{name}.txt")),
    ]
}

pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_GRAPHS.iter().map(|(name, _)| *name)
}

/// Load the pattern called `name` and map it onto dates starting at `first_date`.
pub fn process(first_date: Date, name: Option<&str>, graphs_dir: &Path) -> Result<DateCommitMap> {
    Ok(ContributionGraph::load(name, graphs_dir)?.process(first_date))
}
