use thiserror::Error;

pub type Result<T> = std::result::Result<T, GreenhubError>;

#[derive(Error, Debug)]
pub enum GreenhubError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Graph load error: {0}")]
    Load(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Not a git repository: {0}")]
    NotARepository(String),
    #[error("`{command}` failed ({status}): {stderr}")]
    Git {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
