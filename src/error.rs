use std::io;

use thiserror::Error;

/// Message reported for every rejected XML input.
pub const PARSE_ERROR_MESSAGE: &str = "String could not be parsed as XML";

/// Errors produced by the formatter.
#[derive(Debug, Error)]
pub enum FormatterError {
    /// The input was not well-formed XML or referenced a custom entity.
    #[error("{msg}", msg = PARSE_ERROR_MESSAGE)]
    Parse,

    #[error(transparent)]
    Io(#[from] io::Error),

    /// The configured base URL is not an absolute URL.
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// A name or value cannot be represented in XML, or a command-line
    /// value could not be interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, FormatterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_is_exact() {
        assert_eq!(FormatterError::Parse.to_string(), PARSE_ERROR_MESSAGE);
    }

    #[test]
    fn test_base_url_error_message() {
        let err = FormatterError::from(url::Url::parse("not a url").unwrap_err());
        assert_eq!(err.to_string(), "invalid base URL: relative URL without a base");
    }

    #[test]
    fn test_io_error_is_transparent() {
        let err = FormatterError::from(io::Error::other("disk full"));
        assert_eq!(err.to_string(), "disk full");
    }
}
