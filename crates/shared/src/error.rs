use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` must be at least {min} characters long")]
    TooShort { field: &'static str, min: usize },
    #[error("switch payload must be 0 or 1, got {0}")]
    InvalidSwitchValue(u8),
    #[error("unknown sensor type `{0}`")]
    UnknownSensorType(String),
}
