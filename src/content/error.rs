use serde_json::Error as SerdeError;
use sled::Error as SledError;
use std::io::Error as IoError;
use thiserror::Error as ThisError;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// The possible errors raised by the content store
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("unable to access content database")]
    Database(#[source] SledError),
    #[error("failed to encode or decode content")]
    Encoding(#[from] SerdeError),
    #[error("an i/o error occurred")]
    Io(#[from] IoError),
}

impl From<SledError> for Error {
    fn from(error: SledError) -> Error {
        match error {
            SledError::Io(e) => Error::Io(e),
            e => Error::Database(e),
        }
    }
}
