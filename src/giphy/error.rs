use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeError;
use thiserror::Error as ThisError;
use url::ParseError;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Possible errors that can arise when talking to GIPHY
#[derive(Debug, ThisError)]
pub enum Error {
    // initialization errors
    #[error("could not build the HTTP client")]
    Client(#[source] ReqwestError),
    #[error("could not parse URL")]
    InvalidUrl(#[from] ParseError),

    // runtime errors
    #[error("failed to deserialize response body")]
    Deserialize(#[from] SerdeError),
    #[error("failed to read response body")]
    Body(#[source] ReqwestError),
    #[error("unable to connect to GIPHY")]
    Connection(#[source] ReqwestError),
    #[error("request timed out")]
    Timeout(#[source] ReqwestError),
    #[error("an unknown error occurred while sending the request")]
    Unknown(#[source] ReqwestError),
}

impl From<ReqwestError> for Error {
    fn from(error: ReqwestError) -> Error {
        if error.is_timeout() {
            Error::Timeout(error)
        } else if error.is_builder() {
            Error::Client(error)
        } else if error.is_connect() {
            Error::Connection(error)
        } else if error.is_body() || error.is_decode() {
            Error::Body(error)
        } else {
            Error::Unknown(error)
        }
    }
}
