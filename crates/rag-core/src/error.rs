use thiserror::Error;

pub type RagResult<T> = Result<T, RagError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RagError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}
