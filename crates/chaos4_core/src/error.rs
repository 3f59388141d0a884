use crate::engine::Trajectory;
use thiserror::Error;

/// Failures surfaced by the integration engine, the section extractor and the
/// analysis helpers.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A caller-supplied parameter was rejected before any stepping began.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A produced state contained a NaN or infinite component.
    ///
    /// `partial` holds every finite state recorded before `index`.
    #[error("Numerical divergence at step {index} (t = {time}): state is not finite.")]
    NumericalDivergence {
        index: usize,
        time: f64,
        partial: Trajectory,
    },

    /// Error raised by the snap function itself, passed through untouched.
    #[error(transparent)]
    SnapFunction(#[from] anyhow::Error),
}

impl SolverError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SolverError::InvalidParameter(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;
