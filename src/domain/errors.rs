use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Unknown impact level: {0}")]
    UnknownImpactLevel(String),
    #[error("Invalid update {id}: {reason}")]
    InvalidRecord { id: u32, reason: String },
    #[error("Duplicate update id: {0}")]
    DuplicateId(u32),
}

/// Failure raised while the simulated analysis is running.
///
/// Carries only the message; it is stored verbatim in the session and shown
/// in the failure view.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct AnalysisError(pub String);

pub type DomainResult<T> = Result<T, DomainError>;
