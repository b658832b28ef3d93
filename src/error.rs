#![deny(clippy::unwrap_used, clippy::expect_used)]

use serde::{Deserialize, Serialize};

/// An error with a context describing what the renderer was doing, and possibly the message of
/// the error that was propagated from a lower-level library (I/O, JSON, PDF backend).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ContextError {
    pub context: String,
    pub source_error: Option<String>,
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_error {
            Some(source_error) => write!(
                formatter,
                "{}: {}",
                self.context,
                minimize_first_letter(source_error),
            ),
            None => write!(formatter, "{}", self.context),
        }
    }
}

impl std::error::Error for ContextError {}

impl ContextError {
    /// Create a new `ContextError` with the given context.
    pub fn with_context<S: Into<String>>(context: S) -> ContextError {
        ContextError {
            context: context.into(),
            source_error: None,
        }
    }

    /// Create a new `ContextError` with the given context and source error.
    pub fn with_error<S: Into<String>>(context: S, error: &dyn std::error::Error) -> ContextError {
        ContextError {
            context: context.into(),
            source_error: Some(error.to_string()),
        }
    }

    /// Whether this error wraps the failure of another library.
    pub fn is_propagated(&self) -> bool {
        self.source_error.is_some()
    }
}

/// Minimizes the first letter of a string, it is used for standardizing the error message.
fn minimize_first_letter(string: &str) -> String {
    let mut characters = string.chars();
    match characters.next() {
        None => String::new(),
        Some(character) => character.to_lowercase().chain(characters).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::ContextError;

    #[test]
    fn context_only_errors_print_the_context() {
        let error = ContextError::with_context("Unable to find the page with index 3");
        assert_eq!(error.to_string(), "Unable to find the page with index 3");
        assert!(!error.is_propagated());
    }

    #[test]
    fn propagated_errors_lowercase_the_source_message() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file");
        let error = ContextError::with_error("Failed to read the schedule", &io_error);
        assert_eq!(error.to_string(), "Failed to read the schedule: no such file");
        assert!(error.is_propagated());
    }
}
