use std::fmt;

/// A policy clause that does not follow the rule grammar.
#[derive(Debug)]
pub struct ParseError {
    clause: String,
    message: String,
}

impl ParseError {
    pub(crate) fn new(clause: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
            message: message.into(),
        }
    }

    /// The offending clause, trimmed.
    #[must_use]
    pub fn clause(&self) -> &str {
        &self.clause
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error in '{}': {}", self.clause, self.message)
    }
}

impl std::error::Error for ParseError {}
