use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    /// Input has zero peak amplitude, so it cannot be normalized.
    #[error("degenerate signal: peak amplitude is zero")]
    DegenerateSignal,
    #[error("invalid filter design: {0}")]
    InvalidFilterDesign(String),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("transform failed: {0}")]
    Transform(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AnalysisError {
    pub fn malformed<T: Into<String>>(message: T) -> Self {
        Self::MalformedInput(message.into())
    }

    pub fn filter_design<T: Into<String>>(message: T) -> Self {
        Self::InvalidFilterDesign(message.into())
    }

    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config(message.into())
    }
}
