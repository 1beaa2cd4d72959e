use crate::config::{Config, DEFAULT_GRAPHS_DIR, DEFAULT_MARKER_FILE};
use crate::date::Date;
use crate::driver::CommitCountRange;
use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "greenhub")]
#[command(about = "Fill a contribution calendar with backdated git commits")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(long, help = "Marker file rewritten for every commit, relative to the repository root", default_value = DEFAULT_MARKER_FILE)]
    pub marker_file: PathBuf,

    #[arg(long, help = "Directory searched for graph files", default_value = DEFAULT_GRAPHS_DIR)]
    pub graphs_dir: PathBuf,

    #[arg(long, help = "Seed for the random commit counts and marker contents")]
    pub seed: Option<u64>,

    #[arg(short, long, action = ArgAction::Count, help = "Log more (-v info, -vv debug); RUST_LOG overrides")]
    pub verbose: u8,

    #[arg(short, long, help = "Hide the progress bar")]
    pub quiet: bool,
}

impl CommonArgs {
    pub fn config(&self) -> Result<Config> {
        let repo_root = match &self.repo {
            Some(path) => path.clone(),
            None => std::env::current_dir()?,
        };
        Ok(Config::new(repo_root)
            .with_marker_file(&self.marker_file)
            .with_graphs_dir(&self.graphs_dir)
            .with_seed(self.seed)
            .with_progress(!self.quiet))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Draw a graph onto the contribution calendar ending today
    Graph {
        #[arg(help = "Graph name or path (built-in default when omitted)")]
        name: Option<String>,

        #[arg(long, help = "Extra commits added to every non-empty day", default_value_t = 0)]
        base: u32,
    },
    /// Commit every day from a start date through today
    Everyday {
        #[arg(long, help = "First day (YYYY-MM-DD); defaults to the first day the calendar shows")]
        start: Option<Date>,

        #[arg(long, help = "Commits per day, N or MIN-MAX", default_value = "1")]
        commits: CommitCountRange,
    },
    /// Commit every day from START (inclusive) to END (exclusive)
    Range {
        #[arg(long, help = "First day (YYYY-MM-DD)")]
        start: Date,

        #[arg(long, help = "Day after the last one (YYYY-MM-DD)")]
        end: Date,

        #[arg(long, help = "Commits per day, N or MIN-MAX", default_value = "1")]
        commits: CommitCountRange,
    },
    /// Create a single commit on DATE
    Commit {
        #[arg(help = "Commit date (YYYY-MM-DD)")]
        date: Date,
    },
    /// Rewrite every committer date to its author date
    FilterDates,
    /// Push the current branch
    Push {
        #[arg(long, help = "Force push")]
        force: bool,

        #[arg(long, help = "Do not retry a rejected push after pull --rebase")]
        no_retry: bool,
    },
    /// Print the first day shown by the contribution calendar
    FirstDate,
    /// Show where a graph lands without committing
    Preview {
        #[arg(help = "Graph name or path (built-in default when omitted)")]
        name: Option<String>,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Graph { name, base } => crate::actions::graph(&self.common, name.as_deref(), base),
            Commands::Everyday { start, commits } => {
                crate::actions::everyday(&self.common, start, commits)
            }
            Commands::Range { start, end, commits } => {
                crate::actions::range(&self.common, start, end, commits)
            }
            Commands::Commit { date } => crate::actions::commit(&self.common, date),
            Commands::FilterDates => crate::actions::filter_dates(&self.common),
            Commands::Push { force, no_retry } => crate::actions::push(&self.common, force, !no_retry),
            Commands::FirstDate => {
                println!("{}", crate::date::get_first_date());
                Ok(())
            }
            Commands::Preview { name, json } => crate::preview::exec(&self.common, name.as_deref(), json),
        }
    }
}
