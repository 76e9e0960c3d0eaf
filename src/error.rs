use thiserror::Error;

/// Precondition failures raised by the efficiency/frontier core.
///
/// None of these are retried internally; the frontier never mutates before
/// an input has been validated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("signal and background histograms differ in bin count ({signal} vs {background})")]
    DimensionMismatch { signal: usize, background: usize },

    #[error("cut vector has {got} entries but there are {expected} categories")]
    CutCountMismatch { expected: usize, got: usize },

    #[error("occupied range [{min}, {max}] is degenerate, cannot rescale cuts")]
    DegenerateRange { min: f64, max: f64 },

    #[error("the frontier has no accepted operating points")]
    EmptyFrontier,

    #[error("invalid totals: {0}")]
    InvalidTotals(String),

    #[error("invalid binning: {0}")]
    InvalidBinning(String),

    #[error("invalid cut grid: {0}")]
    InvalidGrid(String),

    #[error("cut grid has {candidates} candidates, limit is {limit}")]
    GridTooLarge { candidates: u128, limit: u64 },

    #[error("frontier query value must be finite, got {value}")]
    NonFiniteQuery { value: f64 },

    #[error("operating point has non-finite rates (efficiency={efficiency}, fake rate={fake_rate})")]
    NonFiniteRate { efficiency: f64, fake_rate: f64 },
}

impl CurveError {
    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            CurveError::EmptyFrontier => 3,
            CurveError::DegenerateRange { .. } | CurveError::NonFiniteRate { .. } => 4,
            _ => 2,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<CurveError> for AppError {
    fn from(err: CurveError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
