use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid call record input: {0}")]
    Records(#[from] serde_json::Error),

    #[error("Invalid check configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("A check named `{0}` is already registered")]
    DuplicateCheck(String),

    #[error("Check `{check}` is missing required field `{field}`")]
    MissingField { check: String, field: &'static str },

    #[error("Check `{check}` has a malformed methods table: {detail}")]
    InvalidMethods { check: String, detail: String },
}

pub type Result<T> = std::result::Result<T, ScanError>;
