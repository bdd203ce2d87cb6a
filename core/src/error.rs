use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("parameter format error: {param}={raw:?}: {reason}")]
    ParameterFormat {
        param: String,
        raw: String,
        reason: String,
    },

    #[error("unknown gate: {0}")]
    UnknownGate(String),

    #[error("unknown trigger {trigger} for gate {gate}")]
    UnknownTrigger { gate: String, trigger: String },

    #[error("version comparison failed: {0}")]
    Comparator(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl CoreError {
    pub fn parameter_format(param: &str, raw: &str, reason: impl Into<String>) -> Self {
        CoreError::ParameterFormat {
            param: param.to_string(),
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
