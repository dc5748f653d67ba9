use std::io;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// CLI Error types
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] sous_config::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] sous_llm::Error),

    #[error("Conversation error: {0}")]
    Conversation(#[from] sous_conversation::Error),

    #[error("Recipe error: {0}")]
    Recipe(#[from] sous_recipe::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
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
