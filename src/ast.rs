//! The message tree consumed by the evaluator.
//!
//! Trees are plain data: a parser produces them, [`MessageFormat`] holds them
//! immutably, and they can travel as JSON between a parser written elsewhere
//! and this crate.
//!
//! [`MessageFormat`]: crate::MessageFormat

use std::collections::BTreeMap;
use std::fmt;

use icu::plurals::PluralCategory;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::plural::{category_from_str, category_str};

pub const OTHER: &str = "other";

/// An ordered sequence of nodes.
pub type Message = Vec<MessageNode>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageNode {
    Literal {
        text: String,
    },
    Argument {
        name: String,
    },
    Number {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<FormatStyle>,
    },
    Date {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<FormatStyle>,
    },
    Time {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<FormatStyle>,
    },
    Plural {
        name: String,
        #[serde(default)]
        offset: i64,
        options: BTreeMap<PluralKey, Message>,
        #[serde(default)]
        ordinal: bool,
    },
    Select {
        name: String,
        options: BTreeMap<String, Message>,
    },
    Pound,
    Tag {
        name: String,
        children: Message,
    },
}

impl MessageNode {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal { text: text.into() }
    }

    pub fn argument(name: impl Into<String>) -> Self {
        Self::Argument { name: name.into() }
    }
}

/// Style attached to a `number`, `date` or `time` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatStyle {
    /// Reference to a built-in or caller-supplied preset.
    Named(String),
    /// Inline skeleton such as `::percent` or `yMMMd`, stored without the `::`.
    Skeleton(String),
}

/// Key of a plural branch: `=N` or a CLDR category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PluralKey {
    Exact(i64),
    Category(PluralCategory),
}

impl PluralKey {
    pub const OTHER: Self = Self::Category(PluralCategory::Other);

    pub fn parse(key: &str) -> Result<Self, ParseError> {
        if let Some(exact) = key.strip_prefix('=') {
            return exact
                .trim()
                .parse()
                .map(Self::Exact)
                .map_err(|_| ParseError::new(format!("invalid exact plural key '{key}'"), 0));
        }
        category_from_str(key)
            .map(Self::Category)
            .ok_or_else(|| ParseError::new(format!("invalid plural category '{key}'"), 0))
    }
}

impl fmt::Display for PluralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "={n}"),
            Self::Category(category) => f.write_str(category_str(*category)),
        }
    }
}

impl From<PluralKey> for String {
    fn from(key: PluralKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PluralKey {
    type Error = ParseError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Self::parse(&key)
    }
}

/// Renders nodes back into ICU message syntax. Used for error context when a
/// formatter was built from a tree rather than a pattern string.
pub(crate) struct PatternDisplay<'a>(pub &'a [MessageNode]);

impl fmt::Display for PatternDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|node| write!(f, "{node}"))
    }
}

impl fmt::Display for MessageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { text } => write_escaped(f, text),
            Self::Argument { name } => write!(f, "{{{name}}}"),
            Self::Number { name, style } => write_simple(f, name, "number", style.as_ref()),
            Self::Date { name, style } => write_simple(f, name, "date", style.as_ref()),
            Self::Time { name, style } => write_simple(f, name, "time", style.as_ref()),
            Self::Plural {
                name,
                offset,
                options,
                ordinal,
            } => {
                let kind = if *ordinal { "selectordinal" } else { "plural" };
                write!(f, "{{{name}, {kind},")?;
                if *offset != 0 {
                    write!(f, " offset:{offset}")?;
                }
                for (key, message) in options {
                    write!(f, " {key} {{{}}}", PatternDisplay(message))?;
                }
                f.write_str("}")
            }
            Self::Select { name, options } => {
                write!(f, "{{{name}, select,")?;
                for (key, message) in options {
                    write!(f, " {key} {{{}}}", PatternDisplay(message))?;
                }
                f.write_str("}")
            }
            Self::Pound => f.write_str("#"),
            Self::Tag { name, children } => {
                write!(f, "<{name}>{}</{name}>", PatternDisplay(children))
            }
        }
    }
}

fn write_simple(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    kind: &str,
    style: Option<&FormatStyle>,
) -> fmt::Result {
    match style {
        None => write!(f, "{{{name}, {kind}}}"),
        Some(FormatStyle::Named(style)) => write!(f, "{{{name}, {kind}, {style}}}"),
        Some(FormatStyle::Skeleton(skeleton)) => write!(f, "{{{name}, {kind}, ::{skeleton}}}"),
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for c in text.chars() {
        match c {
            '\'' => f.write_str("''")?,
            '{' | '}' | '#' | '<' => write!(f, "'{c}'")?,
            c => write!(f, "{c}")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_keys_parse() {
        assert_eq!(PluralKey::parse("=1").unwrap(), PluralKey::Exact(1));
        assert_eq!(
            PluralKey::parse("few").unwrap(),
            PluralKey::Category(PluralCategory::Few)
        );
        assert!(PluralKey::parse("several").is_err());
        assert!(PluralKey::parse("=x").is_err());
    }

    #[test]
    fn display_reconstructs_pattern() {
        let mut options = BTreeMap::new();
        options.insert(PluralKey::Exact(1), vec![MessageNode::literal("one book")]);
        options.insert(
            PluralKey::OTHER,
            vec![MessageNode::Pound, MessageNode::literal(" books")],
        );
        let tree = vec![
            MessageNode::literal("I have "),
            MessageNode::Plural {
                name: "n".to_owned(),
                offset: 0,
                options,
                ordinal: false,
            },
            MessageNode::literal(" {ok}"),
        ];
        assert_eq!(
            PatternDisplay(&tree).to_string(),
            "I have {n, plural, =1 {one book} other {# books}} '{'ok'}'"
        );
    }
}
