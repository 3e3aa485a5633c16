use rpkgcore::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Core(#[from] rpkgcore::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Failure class, following the `rpkgcore` taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Core(e) => e.kind(),
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) | Error::Config(_) => ErrorKind::ParseFailure,
        }
    }

    pub(crate) fn converter_unavailable(reason: &str) -> Self {
        Error::Core(rpkgcore::Error::ConverterUnavailable {
            reason: reason.to_string(),
        })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
