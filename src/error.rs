use good_lp::ResolutionError;
use thiserror::Error;

/// Errors raised while building, solving or reporting a model.
#[derive(Error, Debug)]
pub enum Error {
    /// The solver proved that no assignment satisfies the constraints
    #[error("model is infeasible")]
    Infeasible,
    /// The objective can be improved without bound
    #[error("model is unbounded")]
    Unbounded,
    /// Any other failure reported by the solver backend
    #[error("solver error: {0}")]
    Solver(String),
    /// Input data that cannot be turned into a model
    #[error("invalid instance: {0}")]
    InvalidInstance(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<ResolutionError> for Error {
    fn from(error: ResolutionError) -> Self {
        match error {
            ResolutionError::Infeasible => Error::Infeasible,
            ResolutionError::Unbounded => Error::Unbounded,
            other => Error::Solver(other.to_string()),
        }
    }
}

#[cfg(feature = "gurobi")]
impl From<grb::Error> for Error {
    fn from(error: grb::Error) -> Self {
        Error::Solver(error.to_string())
    }
}
