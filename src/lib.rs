pub mod actions;
pub mod cli;
pub mod config;
pub mod date;
pub mod driver;
pub mod error;
pub mod git;
pub mod graph;
pub mod model;
pub mod preview;

pub use config::Config;
pub use date::{Date, DateRange};
pub use driver::{CommitCountRange, Greenhub};
pub use error::{GreenhubError, Result};
