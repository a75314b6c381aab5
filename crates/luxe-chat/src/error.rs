//! Error types for the conversational engine.

/// Errors that escape the chat orchestrator.
///
/// Retrieval and generation failures are absorbed before they get here;
/// what remains are infrastructure faults the caller must report.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::Storage("session lock poisoned".to_string());
        assert_eq!(err.to_string(), "storage error: session lock poisoned");
    }
}
