use thiserror::Error;

/// Coarse classification of a [`JmesError`], for hosts that only care about
/// which stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexerError,
    ParserError,
    RuntimeError,
    ArgumentError,
    TypeError,
    UnknownFunction,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JmesError {
    #[error("LexerError: {message} at offset {offset}")]
    Lexer { message: String, offset: usize },

    #[error("ParserError: {message}, got {token} ({value:?}) at offset {offset}")]
    Parser {
        message: String,
        token: &'static str,
        value: String,
        offset: usize,
    },

    #[error("RuntimeError: {0}")]
    Runtime(String),

    #[error("ArgumentError: {function}() takes {expected} but received {actual}")]
    Argument {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("TypeError: {function}() expected argument {position} to be type {expected} but received type {actual} instead")]
    Type {
        function: String,
        position: usize,
        expected: String,
        actual: &'static str,
    },

    #[error("Unknown function: {0}()")]
    UnknownFunction(String),
}

impl JmesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JmesError::Lexer { .. } => ErrorKind::LexerError,
            JmesError::Parser { .. } => ErrorKind::ParserError,
            JmesError::Runtime(_) => ErrorKind::RuntimeError,
            JmesError::Argument { .. } => ErrorKind::ArgumentError,
            JmesError::Type { .. } => ErrorKind::TypeError,
            JmesError::UnknownFunction(_) => ErrorKind::UnknownFunction,
        }
    }

    /// Source offset for lexer and parser errors.
    pub fn offset(&self) -> Option<usize> {
        match self {
            JmesError::Lexer { offset, .. } | JmesError::Parser { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    pub(crate) fn arity(function: &str, expected: usize, variadic: bool, actual: usize) -> Self {
        let plural = if expected == 1 { "argument" } else { "arguments" };
        let at_least = if variadic { "at least " } else { "" };
        JmesError::Argument {
            function: function.to_string(),
            expected: format!("{at_least}{expected} {plural}"),
            actual,
        }
    }

    pub(crate) fn type_error(
        function: &str,
        position: usize,
        expected: impl Into<String>,
        actual: &'static str,
    ) -> Self {
        JmesError::Type {
            function: function.to_string(),
            position,
            expected: expected.into(),
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_error_message_pluralizes() {
        let err = JmesError::arity("length", 1, false, 2);
        assert_eq!(
            err.to_string(),
            "ArgumentError: length() takes 1 argument but received 2"
        );

        let err = JmesError::arity("merge", 1, true, 0);
        assert_eq!(
            err.to_string(),
            "ArgumentError: merge() takes at least 1 argument but received 0"
        );
    }

    #[test]
    fn kind_and_offset() {
        let err = JmesError::Lexer { message: "Unknown character: '~'".into(), offset: 3 };
        assert_eq!(err.kind(), ErrorKind::LexerError);
        assert_eq!(err.offset(), Some(3));
        assert_eq!(JmesError::Runtime("x".into()).offset(), None);
    }
}
