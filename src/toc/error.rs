use thiserror::Error;

#[derive(Error, Debug)]
pub enum TocError {
    #[error("cannot parse '{token}' as a number: {reason}")]
    Parse { token: String, reason: String },

    #[error("invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl TocError {
    pub(crate) fn parse(token: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TocError>;
