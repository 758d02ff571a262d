use crate::content::{Error as ContentError, PublishStatus};
use thiserror::Error as ThisError;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// The reasons a deployment notification can be rejected
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("missing or invalid token")]
    Unauthorized,
    #[error("configured content key is not a valid UUID")]
    InvalidContentKey,
    #[error("content item could not be found")]
    NotFound,
    #[error("publishing failed: {0}")]
    PublishFailed(PublishStatus),
    #[error("unable to access content")]
    Content(#[from] ContentError),
}
