use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use icu::locale::Locale;
use tracing::trace;

use crate::ast::{FormatStyle, MessageNode, OTHER};
use crate::error::{FormatCategory, FormatError};
use crate::param::{ParamValue, Params};
use crate::parts::{Part, PartsBuilder};
use crate::plural::{PluralResolver, PluralRuleType};
use crate::registry::FormatRegistry;
use crate::skeleton::{
    CustomFormats, DateTimeFormatOptions, NumberFormatOptions, translate_date_time,
    translate_number,
};

/// What to do with a tag that has no transform registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TagPolicy {
    /// Re-emit `<name>` and `</name>` around the children.
    #[default]
    Literal,
    /// Drop the markers and keep the children.
    Ignore,
}

/// Caller transform applied to a tag's formatted children.
pub type TagTransform = Arc<dyn Fn(Vec<Part>) -> Vec<Part> + Send + Sync>;

/// Tag handling configured on a formatter.
#[derive(Clone, Default)]
pub struct TagHandling {
    pub unknown: TagPolicy,
    pub transforms: HashMap<String, TagTransform>,
}

impl fmt::Debug for TagHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.transforms.keys().collect();
        names.sort();
        f.debug_struct("TagHandling")
            .field("unknown", &self.unknown)
            .field("transforms", &names)
            .finish()
    }
}

/// Option sets resolved once per formatter.
#[derive(Debug, Default)]
pub(crate) struct StyleCache {
    numbers: HashMap<Option<FormatStyle>, NumberFormatOptions>,
    date_times: HashMap<(FormatCategory, Option<FormatStyle>), DateTimeFormatOptions>,
}

impl StyleCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Translates `style` for `category` unless it is already cached.
    pub(crate) fn resolve(
        &mut self,
        category: FormatCategory,
        style: Option<&FormatStyle>,
        formats: &CustomFormats,
    ) -> Result<(), FormatError> {
        match category {
            FormatCategory::Number => {
                if !self.numbers.contains_key(&style.cloned()) {
                    let options = translate_number(style, formats)?;
                    self.numbers.insert(style.cloned(), options);
                }
            }
            FormatCategory::Date | FormatCategory::Time => {
                let key = (category, style.cloned());
                if !self.date_times.contains_key(&key) {
                    let options = translate_date_time(category, style, formats)?;
                    self.date_times.insert(key, options);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.numbers.len() + self.date_times.len()
    }
}

/// Evaluates a message tree for a single call.
pub(crate) struct Formatter<'a> {
    locale: &'a Locale,
    registry: &'a dyn FormatRegistry,
    styles: &'a StyleCache,
    custom_formats: &'a CustomFormats,
    tags: &'a TagHandling,
    pattern: &'a str,
}

impl<'a> Formatter<'a> {
    pub(crate) fn new(
        locale: &'a Locale,
        registry: &'a dyn FormatRegistry,
        styles: &'a StyleCache,
        custom_formats: &'a CustomFormats,
        tags: &'a TagHandling,
        pattern: &'a str,
    ) -> Self {
        Self {
            locale,
            registry,
            styles,
            custom_formats,
            tags,
            pattern,
        }
    }

    pub(crate) fn format_to_parts(
        &self,
        message: &[MessageNode],
        named_parameters: &Params,
    ) -> Result<Vec<Part>, FormatError> {
        let mut result = PartsBuilder::new();
        self.format_block(message, named_parameters, None, &mut result)?;
        Ok(result.finish())
    }

    /// `pound` is the offset-adjusted value of the nearest enclosing plural.
    fn format_block(
        &self,
        parsed_blocks: &[MessageNode],
        named_parameters: &Params,
        pound: Option<f64>,
        result: &mut PartsBuilder,
    ) -> Result<(), FormatError> {
        for node in parsed_blocks {
            match node {
                MessageNode::Literal { text } => result.push_literal(text),
                MessageNode::Argument { name } => {
                    let value = self.lookup(name, named_parameters)?;
                    self.format_argument(value, result)?;
                }
                MessageNode::Number { name, style } => {
                    let value = self.lookup(name, named_parameters)?;
                    if value.is_blank() {
                        continue;
                    }
                    let number = value.as_decimal().ok_or_else(|| invalid(name, "a number"))?;
                    let options = self.number_options(style.as_ref())?;
                    let text = self.registry.format_number(self.locale, number, &options)?;
                    result.push_literal(&text);
                }
                MessageNode::Date { name, style } => {
                    let text = self.format_date_time(
                        FormatCategory::Date,
                        name,
                        style.as_ref(),
                        named_parameters,
                    )?;
                    result.push_literal(&text);
                }
                MessageNode::Time { name, style } => {
                    let text = self.format_date_time(
                        FormatCategory::Time,
                        name,
                        style.as_ref(),
                        named_parameters,
                    )?;
                    result.push_literal(&text);
                }
                MessageNode::Plural {
                    name,
                    offset,
                    options,
                    ordinal,
                } => {
                    let value = self.lookup(name, named_parameters)?;
                    let value = value.as_decimal().ok_or_else(|| invalid(name, "a number"))?;
                    let adjusted = value - *offset as f64;
                    let resolver = PluralResolver::new(self.registry, self.locale);
                    let branch = resolver.select(
                        name,
                        options,
                        adjusted,
                        PluralRuleType::from_ordinal_flag(*ordinal),
                    )?;
                    self.format_block(branch, named_parameters, Some(adjusted), result)?;
                }
                MessageNode::Select { name, options } => {
                    let value = self.lookup(name, named_parameters)?;
                    let key = value.select_key().ok_or_else(|| invalid(name, "a string"))?;
                    let branch = options
                        .get(&key)
                        .or_else(|| options.get(OTHER))
                        .ok_or_else(|| FormatError::MissingOtherClause { name: name.clone() })?;
                    trace!(name = name.as_str(), key = key.as_str(), "select branch");
                    self.format_block(branch, named_parameters, pound, result)?;
                }
                MessageNode::Pound => {
                    let value = pound.ok_or(FormatError::PoundOutsidePlural)?;
                    let text = self.registry.format_number(
                        self.locale,
                        value,
                        &NumberFormatOptions::default(),
                    )?;
                    result.push_literal(&text);
                }
                MessageNode::Tag { name, children } => {
                    let mut inner = PartsBuilder::new();
                    self.format_block(children, named_parameters, pound, &mut inner)?;
                    self.format_tag(name, inner.finish(), result);
                }
            }
        }
        Ok(())
    }

    fn lookup<'p>(
        &self,
        name: &str,
        named_parameters: &'p Params,
    ) -> Result<&'p ParamValue, FormatError> {
        named_parameters
            .get(name)
            .ok_or_else(|| FormatError::MissingValue {
                name: name.to_owned(),
                pattern: self.pattern.to_owned(),
            })
    }

    fn format_argument(
        &self,
        value: &ParamValue,
        result: &mut PartsBuilder,
    ) -> Result<(), FormatError> {
        if value.is_blank() {
            return Ok(());
        }
        if value.as_rich().is_some() {
            result.push(Part::Argument(value.clone()));
        } else if let (true, Some(millis)) = (value.is_date(), value.as_epoch_millis()) {
            let options = self.date_time_options(FormatCategory::Date, None)?;
            let text = self.registry.format_date(self.locale, millis, &options)?;
            result.push_literal(&text);
        } else {
            result.push_literal(&value.to_string());
        }
        Ok(())
    }

    fn format_date_time(
        &self,
        category: FormatCategory,
        name: &str,
        style: Option<&FormatStyle>,
        named_parameters: &Params,
    ) -> Result<String, FormatError> {
        let value = self.lookup(name, named_parameters)?;
        if value.is_blank() {
            return Ok(String::new());
        }
        let millis = value.as_epoch_millis().ok_or_else(|| invalid(name, "a date"))?;
        let options = self.date_time_options(category, style)?;
        match category {
            FormatCategory::Time => self.registry.format_time(self.locale, millis, &options),
            _ => self.registry.format_date(self.locale, millis, &options),
        }
    }

    fn format_tag(&self, name: &str, children: Vec<Part>, result: &mut PartsBuilder) {
        if let Some(transform) = self.tags.transforms.get(name) {
            result.extend(transform(children));
            return;
        }
        match self.tags.unknown {
            TagPolicy::Literal => {
                result.push_literal(&format!("<{name}>"));
                result.extend(children);
                result.push_literal(&format!("</{name}>"));
            }
            TagPolicy::Ignore => result.extend(children),
        }
    }

    fn number_options(
        &self,
        style: Option<&FormatStyle>,
    ) -> Result<NumberFormatOptions, FormatError> {
        match self.styles.numbers.get(&style.cloned()) {
            Some(options) => Ok(options.clone()),
            None => translate_number(style, self.custom_formats),
        }
    }

    fn date_time_options(
        &self,
        category: FormatCategory,
        style: Option<&FormatStyle>,
    ) -> Result<DateTimeFormatOptions, FormatError> {
        match self.styles.date_times.get(&(category, style.cloned())) {
            Some(options) => Ok(options.clone()),
            None => translate_date_time(category, style, self.custom_formats),
        }
    }
}

fn invalid(name: &str, expected: &'static str) -> FormatError {
    FormatError::InvalidValueType {
        name: name.to_owned(),
        expected,
    }
}
