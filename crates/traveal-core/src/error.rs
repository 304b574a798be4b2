use thiserror::Error;

pub type TravealResult<T> = Result<T, TravealError>;

#[derive(Debug, Error)]
pub enum TravealError {
    #[error("no password or master secret configured")]
    MissingSecret,

    #[error("decryption failed: authentication error")]
    Authentication,

    /// Invalid PKCS7 pad after decryption. Shares its message with
    /// `Authentication`; public decrypt paths return `Authentication` instead.
    #[error("decryption failed: authentication error")]
    Padding,

    #[error("malformed input: {0}")]
    Format(String),

    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("token expired")]
    TokenExpired,

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TravealError {
    /// Collapse the padding failure into an authentication failure so
    /// callers cannot tell the two apart.
    pub fn into_external(self) -> Self {
        match self {
            TravealError::Padding => TravealError::Authentication,
            other => other,
        }
    }
}
