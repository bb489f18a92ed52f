use std::fmt;

use displaydoc::Display;

/// Errors raised while building or evaluating a message.
///
/// Every variant aborts the current call; nothing is substituted in place of
/// the failing placeholder.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatError {
    /// The intl string context variable '{name}' was not provided to the string '{pattern}'
    MissingValue { name: String, pattern: String },
    /// The value of '{name}' cannot be used as {expected}
    InvalidValueType { name: String, expected: &'static str },
    /// Invalid skeleton token '{token}'
    InvalidSkeleton { token: String },
    /// Unknown {category} format style '{name}'
    UnknownFormatStyle { category: FormatCategory, name: String },
    /// Missing 'other' clause in the options of '{name}'
    MissingOtherClause { name: String },
    /// '#' used outside of a plural or selectordinal branch
    PoundOutsidePlural,
    /// Unsupported locale '{locale}'
    UnsupportedLocale { locale: String },
    /// Cannot format {category} value: {reason}
    Primitive { category: FormatCategory, reason: String },
    /// Invalid message pattern: {0}
    Parse(ParseError),
}

impl std::error::Error for FormatError {}

impl From<ParseError> for FormatError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

/// Error produced by the pattern parser.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[displaydoc("{message} at byte {offset}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

impl std::error::Error for ParseError {}

/// Primitive formatter category a style belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatCategory {
    Number,
    Date,
    Time,
}

impl FormatCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Date => "date",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_names_variable_and_pattern() {
        let err = FormatError::MissingValue {
            name: "STATE".to_owned(),
            pattern: "{STATE}".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "The intl string context variable 'STATE' was not provided to the string '{STATE}'"
        );
    }

    #[test]
    fn parse_error_is_wrapped() {
        let err: FormatError = ParseError::new("unbalanced braces", 3).into();
        assert_eq!(
            err.to_string(),
            "Invalid message pattern: unbalanced braces at byte 3"
        );
    }
}
