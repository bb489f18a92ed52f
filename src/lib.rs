//! ICU MessageFormat evaluation.
//!
//! A [`MessageFormat`] is built once from a pattern or a pre-parsed
//! [`Message`] tree, a locale list and optional custom styles, then
//! formatted any number of times against a [`Params`] bag.
//!
//! ```
//! use message_format::{MessageFormat, params};
//!
//! let mf = MessageFormat::with_locale(
//!     "I have {n, plural, =1 {one book} other {# books}}.",
//!     "en-US",
//! )
//! .unwrap();
//! assert_eq!(mf.format(Some(&params! { "n" => 1024 })).unwrap(), "I have 1,024 books.");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use icu::locale::Locale;
use tracing::debug;

pub mod ast;
pub mod cache;
pub mod error;
mod format;
pub mod locale;
mod param;
pub mod parse;
pub mod parts;
pub mod plural;
pub mod registry;
pub mod skeleton;

pub use ast::{FormatStyle, Message, MessageNode, PluralKey};
pub use cache::FormatterCache;
pub use error::{FormatCategory, FormatError, ParseError};
pub use format::{TagPolicy, TagTransform};
pub use param::{ParamValue, Params, RichValue};
pub use parts::{Part, PartType};
pub use plural::{PluralCategory, PluralRuleType};
pub use registry::{FormatRegistry, IcuFormatRegistry};
pub use skeleton::CustomFormats;

use crate::ast::{OTHER, PatternDisplay};
use crate::format::{Formatter, StyleCache, TagHandling};

/// What a formatter is built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageSource {
    Pattern(String),
    Tree(Message),
}

impl From<&str> for MessageSource {
    fn from(pattern: &str) -> Self {
        Self::Pattern(pattern.to_owned())
    }
}

impl From<String> for MessageSource {
    fn from(pattern: String) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<Message> for MessageSource {
    fn from(tree: Message) -> Self {
        Self::Tree(tree)
    }
}

/// Construction options besides locale and custom styles.
#[derive(Clone)]
pub struct FormatterOptions {
    pub registry: Arc<dyn FormatRegistry>,
    /// Applies to tags without an entry in `tag_transforms`.
    pub unknown_tags: TagPolicy,
    pub tag_transforms: HashMap<String, TagTransform>,
    /// Parse `<...>` as literal text.
    pub ignore_tag: bool,
}

impl FormatterOptions {
    pub fn with_registry(mut self, registry: Arc<dyn FormatRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_unknown_tags(mut self, policy: TagPolicy) -> Self {
        self.unknown_tags = policy;
        self
    }

    pub fn with_tag<F>(mut self, name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(Vec<Part>) -> Vec<Part> + Send + Sync + 'static,
    {
        self.tag_transforms.insert(name.into(), Arc::new(transform));
        self
    }

    pub fn with_ignore_tag(mut self, ignore_tag: bool) -> Self {
        self.ignore_tag = ignore_tag;
        self
    }
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            registry: Arc::new(IcuFormatRegistry),
            unknown_tags: TagPolicy::default(),
            tag_transforms: HashMap::new(),
            ignore_tag: false,
        }
    }
}

impl fmt::Debug for FormatterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.tag_transforms.keys().collect();
        tags.sort();
        f.debug_struct("FormatterOptions")
            .field("registry", &self.registry)
            .field("unknown_tags", &self.unknown_tags)
            .field("tag_transforms", &tags)
            .field("ignore_tag", &self.ignore_tag)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// Canonical tag of the locale in effect.
    pub locale: String,
}

#[derive(Debug)]
pub struct MessageFormat {
    pattern: String,
    tree: Message,
    locale: Locale,
    registry: Arc<dyn FormatRegistry>,
    custom_formats: CustomFormats,
    styles: StyleCache,
    tags: TagHandling,
}

impl MessageFormat {
    /// Builds an English formatter.
    pub fn new(source: impl Into<MessageSource>) -> Result<Self, FormatError> {
        Self::try_new(
            source,
            &[] as &[&str],
            CustomFormats::default(),
            FormatterOptions::default(),
        )
    }

    pub fn with_locale(
        source: impl Into<MessageSource>,
        locale: &str,
    ) -> Result<Self, FormatError> {
        Self::try_new(
            source,
            &[locale],
            CustomFormats::default(),
            FormatterOptions::default(),
        )
    }

    /// Builds a formatter for the first usable locale in `locales`.
    ///
    /// Unusable locales are skipped with a warning and `en` is used when none
    /// remain. Parse errors, missing `other` options and unresolvable styles
    /// are reported here rather than on first use.
    pub fn try_new<S: AsRef<str>>(
        source: impl Into<MessageSource>,
        locales: &[S],
        custom_formats: CustomFormats,
        options: FormatterOptions,
    ) -> Result<Self, FormatError> {
        let (pattern, tree) = match source.into() {
            MessageSource::Pattern(pattern) => {
                let tree = parse::parse_with(&pattern, options.ignore_tag)?;
                (pattern, tree)
            }
            MessageSource::Tree(tree) => (PatternDisplay(&tree).to_string(), tree),
        };

        let locale = locale::negotiate(locales, options.registry.as_ref());

        let mut styles = StyleCache::new();
        validate(&tree, &custom_formats, &mut styles)?;

        debug!(
            locale = %locale,
            nodes = tree.len(),
            styles = styles.len(),
            "message format created"
        );

        Ok(Self {
            pattern,
            tree,
            locale,
            registry: options.registry,
            custom_formats,
            styles,
            tags: TagHandling {
                unknown: options.unknown_tags,
                transforms: options.tag_transforms,
            },
        })
    }

    pub fn format(&self, values: Option<&Params>) -> Result<String, FormatError> {
        self.format_to_parts(values).map(|parts| parts::join(&parts))
    }

    pub fn format_to_parts(&self, values: Option<&Params>) -> Result<Vec<Part>, FormatError> {
        let empty = Params::new();
        self.formatter()
            .format_to_parts(&self.tree, values.unwrap_or(&empty))
    }

    pub fn resolved_options(&self) -> ResolvedOptions {
        ResolvedOptions {
            locale: self.locale.to_string(),
        }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn tree(&self) -> &[MessageNode] {
        &self.tree
    }

    fn formatter(&self) -> Formatter<'_> {
        Formatter::new(
            &self.locale,
            self.registry.as_ref(),
            &self.styles,
            &self.custom_formats,
            &self.tags,
            &self.pattern,
        )
    }
}

/// Checks every select and plural for `other` and resolves every style.
fn validate(
    message: &[MessageNode],
    custom_formats: &CustomFormats,
    styles: &mut StyleCache,
) -> Result<(), FormatError> {
    for node in message {
        let (category, style) = match node {
            MessageNode::Number { style, .. } => (FormatCategory::Number, style),
            MessageNode::Date { style, .. } => (FormatCategory::Date, style),
            MessageNode::Time { style, .. } => (FormatCategory::Time, style),
            MessageNode::Plural { name, options, .. } => {
                if !options.contains_key(&PluralKey::OTHER) {
                    return Err(FormatError::MissingOtherClause { name: name.clone() });
                }
                for branch in options.values() {
                    validate(branch, custom_formats, styles)?;
                }
                continue;
            }
            MessageNode::Select { name, options } => {
                if !options.contains_key(OTHER) {
                    return Err(FormatError::MissingOtherClause { name: name.clone() });
                }
                for branch in options.values() {
                    validate(branch, custom_formats, styles)?;
                }
                continue;
            }
            MessageNode::Tag { children, .. } => {
                validate(children, custom_formats, styles)?;
                continue;
            }
            MessageNode::Literal { .. } | MessageNode::Argument { .. } | MessageNode::Pound => {
                continue;
            }
        };
        styles.resolve(category, style.as_ref(), custom_formats)?;
    }
    Ok(())
}
