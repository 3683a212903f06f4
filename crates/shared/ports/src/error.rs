use thiserror::Error;
use vigil_core::Regime;

/// Fatal configuration problems, detected at startup
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("regime {regime} has no interval for job '{job}'")]
    MissingInterval { regime: Regime, job: String },

    #[error("interval for job '{job}' in regime {regime} must be positive")]
    ZeroInterval { regime: Regime, job: String },

    #[error("stress scenario '{0}' is malformed: {1}")]
    BadScenario(String, String),

    #[error("trading window start {start} is not before end {end}")]
    BadTradingWindow { start: String, end: String },

    #[error("failed to read config file '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Scheduler registration and lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Registering the same job name twice is a programming error.
    #[error("job '{0}' is already registered")]
    DuplicateJob(String),

    #[error("scheduler is shut down")]
    ShutDown,
}

pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;

/// Errors from risk computations, returned to the calling report flow
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("input shape mismatch: {0}")]
    InputShape(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A negative w'.Sigma.w indicates a malformed covariance matrix;
    /// regularize inputs upstream.
    #[error("portfolio variance is negative ({0}); covariance matrix is malformed")]
    NonPositiveVariance(f64),

    #[error("covariance matrix is not positive-definite, even after regularization")]
    IllConditionedCovariance,

    #[error("unsupported confidence level {0}; supported levels are 0.95 and 0.99")]
    UnsupportedConfidence(f64),
}

pub type RiskResult<T> = std::result::Result<T, RiskError>;

/// Transient failures from external data providers
///
/// Always recoverable: the engine skips the current cycle and retries
/// at the next scheduled tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("transient provider failure: {0}")]
    Transient(String),

    #[error("no data available for ticker '{0}'")]
    NoData(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
