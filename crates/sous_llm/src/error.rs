pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// The model stream was interrupted or carried a malformed frame.
    #[error("stream error: {0}")]
    Stream(String),

    /// The service reported an exception inside the event stream.
    #[error("{kind}: {message}")]
    Exception { kind: String, message: String },

    #[error("client config error: {0}")]
    Config(String),

    #[error("conversation error: {0}")]
    Conversation(#[from] sous_conversation::Error),
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Stream(error.to_string())
    }
}

/// Errors returned by a [`Tool`] invocation.
///
/// [`Tool`]: crate::tool::Tool
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Execution(Box<dyn std::error::Error + Send + Sync>),
}

impl ToolError {
    pub fn execution(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Execution(Box::new(error))
    }
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}

#[cfg(test)]
impl PartialEq for ToolError {
    fn eq(&self, other: &Self) -> bool {
        format!("{self:?}") == format!("{other:?}")
    }
}
