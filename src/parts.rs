use std::fmt;

use crate::param::ParamValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartType {
    Literal,
    Argument,
}

/// One fragment of a formatted message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Part {
    /// Formatted text.
    Literal(String),
    /// A non-scalar argument passed through untouched.
    Argument(ParamValue),
}

impl Part {
    pub fn part_type(&self) -> PartType {
        match self {
            Self::Literal(_) => PartType::Literal,
            Self::Argument(_) => PartType::Argument,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(text) => Some(text),
            Self::Argument(_) => None,
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Argument(value) => write!(f, "{value}"),
        }
    }
}

/// Collects parts, merging adjacent literals as they arrive.
#[derive(Debug, Default)]
pub(crate) struct PartsBuilder {
    parts: Vec<Part>,
}

impl PartsBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Part::Literal(last)) = self.parts.last_mut() {
            last.push_str(text);
        } else {
            self.parts.push(Part::Literal(text.to_owned()));
        }
    }

    pub(crate) fn push(&mut self, part: Part) {
        match part {
            Part::Literal(text) => self.push_literal(&text),
            argument => self.parts.push(argument),
        }
    }

    pub(crate) fn extend(&mut self, parts: impl IntoIterator<Item = Part>) {
        parts.into_iter().for_each(|part| self.push(part));
    }

    pub(crate) fn finish(self) -> Vec<Part> {
        self.parts
    }
}

/// Concatenates parts into the final string.
pub(crate) fn join(parts: &[Part]) -> String {
    parts.iter().map(ToString::to_string).collect()
}
