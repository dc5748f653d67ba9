pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("tool result for undeclared tool call: {0}")]
    UnknownToolCall(String),

    #[error("tool call already has a result: {0}")]
    DuplicateToolResult(String),

    #[error("tool call already executed: {0}")]
    AlreadyExecuted(String),

    #[error("tool call not yet executed: {0}")]
    NotExecuted(String),
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
