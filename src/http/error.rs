use crate::{content::Error as ContentError, deployment::Error as DeploymentError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::error::Error as StdError;
use tracing::error;

pub(crate) type Result<T> = std::result::Result<T, Error>;

pub enum Error {
    Unauthorized,
    InvalidContentKey,
    ContentNotFound,
    PublishFailed,
    Content(ContentError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Error::InvalidContentKey => (StatusCode::BAD_REQUEST, "Invalid ContentKey."),
            Error::ContentNotFound => (StatusCode::NOT_FOUND, "content not found"),
            Error::PublishFailed => (StatusCode::INTERNAL_SERVER_ERROR, "Publish failed."),
            Error::Content(e) => {
                error!(error = %e, source = ?e.source(), "error while accessing content");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };

        let body = Json(json!({ "message": message }));
        (status, body).into_response()
    }
}

impl From<DeploymentError> for Error {
    fn from(e: DeploymentError) -> Self {
        match e {
            DeploymentError::Unauthorized => Error::Unauthorized,
            DeploymentError::InvalidContentKey => Error::InvalidContentKey,
            DeploymentError::NotFound => Error::ContentNotFound,
            DeploymentError::PublishFailed(_) => Error::PublishFailed,
            DeploymentError::Content(e) => Error::Content(e),
        }
    }
}
