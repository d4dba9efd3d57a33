use serde::{Serialize, Deserialize};

/// error body returned by the gateway on any non 2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    error: Option<String>,
}

impl ApiError {
    pub fn new<M>(message: M) -> Self
    where
        M: Into<String>
    {
        ApiError {
            error: Some(message.into())
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.error.as_deref()
            .filter(|v| !v.is_empty())
    }

    /// the message given by the gateway or the provided fallback when the
    /// body did not carry one
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message().unwrap_or(fallback)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message_or("unknown api error"))
    }
}

impl std::error::Error for ApiError {}
