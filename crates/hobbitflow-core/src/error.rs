use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown backend mode: {0} (expected: swarm, single)")]
    InvalidBackendMode(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
