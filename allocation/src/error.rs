use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("Parse Error: cannot decode gauge address from choice label '{0}'")]
    ParseError(String),
    #[error("Resolution Error: {0}")]
    ResolutionError(String),
    #[error("Missing Configuration for space '{0}': {1}")]
    MissingConfiguration(String, String),
    #[error("Delegation Inconsistency: {0}")]
    DelegationInconsistency(String),
}
