use reqwest::StatusCode;

use crate::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("invalid url given")]
    Url(#[from] url::ParseError),

    #[error("the given url cannot be used as a base url")]
    CannotBeABase,

    #[error("the user pool id does not contain a region prefix")]
    InvalidUserPool,

    #[error("failed to create http client")]
    Reqwest(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// non 2xx response from the gateway. the message is the one carried by
    /// the response body or the fallback for the request
    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
    },

    /// non 2xx response from the storage pre-signed url
    #[error("S3 upload failed.")]
    Storage {
        status: StatusCode,
    },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

impl RequestError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Api { status, .. } |
            RequestError::Storage { status } => Some(*status),
            RequestError::Reqwest(err) => err.status(),
            RequestError::Url(_) => None,
        }
    }

    /// reads the error body of a failed gateway response
    pub(crate) async fn from_response(res: reqwest::Response, fallback: &str) -> Self {
        let status = res.status();
        let message = match res.json::<ApiError>().await {
            Ok(err) => err.message_or(fallback).to_owned(),
            Err(err) => {
                tracing::debug!("unreadable error body for status {}: {}", status, err);

                fallback.to_owned()
            }
        };

        RequestError::Api { status, message }
    }
}
