use thiserror::Error;

/// Numerical failures while fitting the regression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FittingError {
    #[error("no spend channels present in the input")]
    NoChannels,

    #[error("no rows left after aligning spend and revenue dates")]
    EmptyAfterAlignment,

    #[error("{context}: expected {expected} rows, found {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The regularized normal equations could not be factorized
    #[error("singular feature matrix ({columns} columns, alpha={alpha})")]
    Singular { columns: usize, alpha: f64 },

    #[error("non-finite value in {context}")]
    NonFinite { context: &'static str },
}

/// Malformed inputs that are rejected before any computation starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("no channels to allocate budget across")]
    NoChannels,

    #[error("total budget must be non-negative, got {0}")]
    NegativeBudget(f64),

    #[error("non-finite value for {0}")]
    NonFiniteInput(String),

    #[error("channel {channel}: spend bound {value} is negative")]
    NegativeSpend { channel: String, value: f64 },

    #[error("channel {channel}: min spend {min} exceeds max spend {max}")]
    InvertedBounds { channel: String, min: f64, max: f64 },

    /// No allocation can satisfy both the bounds and the budget equality
    #[error(
        "bounds cannot meet total budget {total_budget}: minimums sum to {min_total}, maximums sum to {max_total}"
    )]
    InfeasibleBounds {
        total_budget: f64,
        min_total: f64,
        max_total: f64,
    },

    #[error("confidence level must lie in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("bootstrap count must be at least 1")]
    ZeroBootstrapCount,

    #[error("ridge alpha must be positive and finite, got {0}")]
    InvalidAlpha(f64),

    #[error("forecast horizon must be at least 1 day")]
    InvalidHorizon,
}

/// Errors surfaced by an attribution fit
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttributionError {
    /// Not retryable without more history
    #[error("insufficient data: need at least {required} days, found {found}")]
    InsufficientData { required: usize, found: usize },

    #[error("fitting failed: {0}")]
    Fitting(#[from] FittingError),

    #[error("invalid attribution configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Errors surfaced by a forecaster
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("insufficient data: need at least {required} days for forecasting, found {found}")]
    InsufficientData { required: usize, found: usize },

    #[error("forecast model failed: {0}")]
    Fitting(#[from] FittingError),

    #[error("invalid forecast request: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl From<AttributionError> for ForecastError {
    fn from(err: AttributionError) -> Self {
        match err {
            AttributionError::InsufficientData { required, found } => {
                ForecastError::InsufficientData { required, found }
            }
            AttributionError::Fitting(e) => ForecastError::Fitting(e),
            AttributionError::Configuration(e) => ForecastError::Configuration(e),
        }
    }
}
