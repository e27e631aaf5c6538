use chrono::NaiveDate;

/// Application-level error carrying the process exit code.
///
/// Exit codes:
/// - 2: bad input (CSV schema, malformed rows, unknown region name)
/// - 3: no usable data after loading
/// - 4: fetch or filesystem failure
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

/// Errors raised by the series builder and the ingest layer feeding it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeriesError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Date {0} has no previous calendar day")]
    DateOutOfRange(NaiveDate),
}

impl SeriesError {
    pub fn malformed(message: impl Into<String>) -> Self {
        SeriesError::MalformedInput(message.into())
    }
}

impl From<SeriesError> for AppError {
    fn from(err: SeriesError) -> Self {
        AppError::new(2, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_errors_map_to_input_exit_code() {
        let err: AppError = SeriesError::malformed("line 4: bad date").into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Malformed input: line 4: bad date");
    }
}
