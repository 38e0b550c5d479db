use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmeltError {
    #[error("failed to parse JSON input: {0}")]
    Parse(#[from] simd_json::Error),

    #[error("failed to read input: {0}")]
    Read(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SmeltError>;
