use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("query returned no rows")]
    EmptyResult,

    #[error("failed to fetch mapping table: {0}")]
    Fetch(String),

    #[error("payload is not valid tabular data: {0}")]
    InvalidFormat(String),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("non-numeric cell in column '{column}', row {row}")]
    NonNumericCell { column: String, row: usize },

    #[error("matched capture is not a number: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
