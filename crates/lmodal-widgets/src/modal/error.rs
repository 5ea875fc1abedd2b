#![forbid(unsafe_code)]

//! Errors for configuration, navigation, and opening.
//!
//! Content load failures are [`LoadError`](super::loader::LoadError); they are
//! rendered inside the overlay rather than returned to the caller.

use std::fmt;

/// A trigger attribute could not be decoded into an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// The key is in the `lm-` namespace but not part of the option schema.
    UnknownKey(String),
    /// The value does not parse as the option's type.
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "unknown option attribute '{key}'"),
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "attribute '{key}' = '{value}': expected {expected}"),
        }
    }
}

impl std::error::Error for AttributeError {}

/// A keyword or length did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    value: String,
    expected: &'static str,
}

impl ParseError {
    pub(crate) fn new(value: &str, expected: &'static str) -> Self {
        Self {
            value: value.to_owned(),
            expected,
        }
    }

    /// The rejected input.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// What would have been accepted.
    pub fn expected(&self) -> &'static str {
        self.expected
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': expected {}", self.value, self.expected)
    }
}

impl std::error::Error for ParseError {}

/// An options file could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Toml(String),
    Json(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml(msg) => write!(f, "invalid TOML options: {msg}"),
            Self::Json(msg) => write!(f, "invalid JSON options: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A checked gallery jump was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    OutOfRange { index: usize, len: usize },
    /// The instance is not in a state that accepts navigation.
    NotReady,
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for {len} items")
            }
            Self::NotReady => f.write_str("overlay is not ready for navigation"),
        }
    }
}

impl std::error::Error for NavigationError {}

/// An overlay could not be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenError {
    /// The item list was empty.
    NoItems,
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoItems => f.write_str("cannot open an overlay without items"),
        }
    }
}

impl std::error::Error for OpenError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_input_and_expectation() {
        let err = ParseError::new("pdf", "image, video, ajax or inline");
        assert_eq!(err.value(), "pdf");
        assert_eq!(err.to_string(), "'pdf': expected image, video, ajax or inline");
    }

    #[test]
    fn messages_name_the_offender() {
        let err = AttributeError::InvalidValue {
            key: "lm-close-speed".into(),
            value: "fast".into(),
            expected: "milliseconds",
        };
        assert_eq!(
            err.to_string(),
            "attribute 'lm-close-speed' = 'fast': expected milliseconds"
        );
        assert_eq!(
            NavigationError::OutOfRange { index: 5, len: 3 }.to_string(),
            "index 5 out of range for 3 items"
        );
        assert!(AttributeError::UnknownKey("lm-x".into()).to_string().contains("lm-x"));
    }
}
