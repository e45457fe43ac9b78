use thiserror::Error;

/// Boxed error raised from user-supplied callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Failure raised inside a handler, factory, timer callback or
    /// `initialize` hook. Passed through to the caller unchanged.
    #[error("{0}")]
    Callback(BoxError),
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),
}

impl Error {
    pub fn callback(err: impl Into<BoxError>) -> Self {
        Self::Callback(err.into())
    }
}

impl From<BoxError> for Error {
    fn from(err: BoxError) -> Self {
        Self::Callback(err)
    }
}
