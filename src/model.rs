use crate::date::Date;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Commits to create on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedDay {
    pub date: Date,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub graph: String,
    pub first_date: Date,
    pub last_date: Option<Date>,
    pub total_commits: u64,
    pub days: Vec<PlannedDay>,
}

/// What a commit run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub days: usize,
    pub commits: u64,
    pub first_date: Option<Date>,
    pub last_date: Option<Date>,
}

impl CommitSummary {
    pub fn from_plan(plan: &[PlannedDay]) -> Self {
        let active: Vec<&PlannedDay> = plan.iter().filter(|p| p.count > 0).collect();
        Self {
            days: active.len(),
            commits: active.iter().map(|p| u64::from(p.count)).sum(),
            first_date: active.first().map(|p| p.date),
            last_date: active.last().map(|p| p.date),
        }
    }
}
