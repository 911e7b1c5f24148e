// Error types for the csrfp request pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Deserialization(_) => 400,
            Error::Internal(_) | Error::Io(_) => 500,
        }
    }
}
