use thiserror::Error;

/// Domain-level errors
///
/// These only surface from setup paths (configuration, option parsing).
/// Tagging operations themselves never fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid tagging configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown tag kind: {0}")]
    UnknownTagKind(String),

    #[error("Invalid tag options: {0}")]
    InvalidTagOptions(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
