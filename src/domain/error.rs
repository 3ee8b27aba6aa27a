//! Domain error types.

/// Top-level error type for stratlab.
#[derive(Debug, thiserror::Error)]
pub enum StratlabError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error(transparent)]
    SegmentList(#[from] crate::domain::segment::SegmentListError),

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for segment {segment}")]
    NoData { segment: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StratlabError {
    pub fn data(reason: impl Into<String>) -> Self {
        StratlabError::Data {
            reason: reason.into(),
        }
    }
}

impl From<&StratlabError> for std::process::ExitCode {
    fn from(err: &StratlabError) -> Self {
        let code: u8 = match err {
            StratlabError::Io(_) => 1,
            StratlabError::ConfigParse { .. }
            | StratlabError::ConfigMissing { .. }
            | StratlabError::ConfigInvalid { .. }
            | StratlabError::SegmentList(_) => 2,
            StratlabError::Data { .. } => 3,
            StratlabError::UnknownStrategy(_) => 4,
            StratlabError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
