use thiserror::Error;

/// Broad classification of a [`TsError`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorKind {
    /// The caller passed parameters that can never succeed.
    Validation,
    /// The parameters are fine, but the series does not hold enough usable data.
    DataQuality,
    /// A series id could not be resolved by the provider.
    NotFound,
}

#[derive(Debug, Clone, Error, PartialEq)]
/// Enum for the errors raised by the analysis engine.
pub enum TsError {
    #[error("Invalid size. Expected {0}, Received {1}.")]
    InvalidSize(usize, usize),

    #[error("Invalid argument. {0}")]
    InvalidArgument(String),

    #[error("Invalid duration. {0}")]
    InvalidDuration(String),

    #[error("Invalid timestamp. {0}")]
    InvalidTimestamp(String),

    #[error("Duplicate sample. {0}")]
    DuplicateSample(String),

    #[error("Insufficient data. Expected at least {required} values, found {found}.")]
    InsufficientData { required: usize, found: usize },

    #[error("Value range is empty - all values are equal or missing.")]
    EmptyValueRange,

    #[error("Missing value. {0}")]
    MissingValue(String),

    #[error("Time series not found: {0}")]
    SeriesNotFound(String),
}

impl TsError {
    pub fn kind(&self) -> ErrorKind {
        use TsError::*;
        match self {
            InvalidSize(..)
            | InvalidArgument(_)
            | InvalidDuration(_)
            | InvalidTimestamp(_)
            | DuplicateSample(_) => ErrorKind::Validation,
            InsufficientData { .. } | EmptyValueRange | MissingValue(_) => ErrorKind::DataQuality,
            SeriesNotFound(_) => ErrorKind::NotFound,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_data_quality(&self) -> bool {
        self.kind() == ErrorKind::DataQuality
    }
}

pub type TsResult<T> = Result<T, TsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds() {
        assert!(TsError::InvalidArgument("x".into()).is_validation());
        assert!(TsError::InvalidSize(1, 2).is_validation());
        assert!(TsError::EmptyValueRange.is_data_quality());
        assert!(TsError::InsufficientData { required: 3, found: 1 }.is_data_quality());
        assert_eq!(TsError::SeriesNotFound("a".into()).kind(), ErrorKind::NotFound);
    }

    #[test]
    fn error_messages() {
        let err = TsError::InsufficientData { required: 5, found: 2 };
        assert_eq!(err.to_string(), "Insufficient data. Expected at least 5 values, found 2.");
    }
}
