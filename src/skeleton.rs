//! Translation of format styles into option sets.
//!
//! A style is either a name, looked up in the caller's [`CustomFormats`] and
//! then in the built-in presets, or an inline skeleton. Number skeletons are
//! whitespace separated tokens (`currency/EUR .00 group-off`); date and time
//! skeletons are runs of pattern letters whose length selects the field width
//! (`yMMMd`, `EEEE`, `hms`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::FormatStyle;
use crate::error::{FormatCategory, FormatError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberStyle {
    Decimal,
    Percent,
    Currency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignDisplayOption {
    Auto,
    Always,
    Never,
    ExceptZero,
}

/// Options for the number primitive formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberFormatOptions {
    pub style: Option<NumberStyle>,
    /// ISO 4217 code, used with [`NumberStyle::Currency`].
    pub currency: Option<String>,
    pub minimum_integer_digits: Option<u8>,
    pub minimum_fraction_digits: Option<u8>,
    pub maximum_fraction_digits: Option<u8>,
    pub use_grouping: Option<bool>,
    pub sign_display: Option<SignDisplayOption>,
}

impl NumberFormatOptions {
    pub fn style(&self) -> NumberStyle {
        self.style.unwrap_or(NumberStyle::Decimal)
    }

    /// Fraction digit bounds after applying the per-style defaults.
    pub fn fraction_digits(&self) -> (u8, u8) {
        let (default_min, default_max) = match self.style() {
            NumberStyle::Decimal => (0, 3),
            NumberStyle::Percent => (0, 0),
            NumberStyle::Currency => (2, 2),
        };
        let min = self.minimum_fraction_digits.unwrap_or(default_min);
        let max = self
            .maximum_fraction_digits
            .unwrap_or(default_max.max(min))
            .max(min);
        (min, max)
    }
}

/// Width of a date or time field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldWidth {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "narrow")]
    Narrow,
}

/// Options for the date and time primitive formatters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateTimeFormatOptions {
    pub weekday: Option<FieldWidth>,
    pub era: Option<FieldWidth>,
    pub year: Option<FieldWidth>,
    pub month: Option<FieldWidth>,
    pub day: Option<FieldWidth>,
    pub hour: Option<FieldWidth>,
    pub minute: Option<FieldWidth>,
    pub second: Option<FieldWidth>,
    pub time_zone_name: Option<FieldWidth>,
    pub hour12: Option<bool>,
}

impl DateTimeFormatOptions {
    pub fn has_date_fields(&self) -> bool {
        self.weekday.is_some()
            || self.era.is_some()
            || self.year.is_some()
            || self.month.is_some()
            || self.day.is_some()
    }

    pub fn has_time_fields(&self) -> bool {
        self.hour.is_some() || self.minute.is_some() || self.second.is_some()
    }
}

/// Option set produced by the translator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormatOptions {
    Number(NumberFormatOptions),
    DateTime(DateTimeFormatOptions),
}

/// Caller-supplied named styles, merged over the built-in presets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomFormats {
    pub number: BTreeMap<String, NumberFormatOptions>,
    pub date: BTreeMap<String, DateTimeFormatOptions>,
    pub time: BTreeMap<String, DateTimeFormatOptions>,
}

impl CustomFormats {
    pub fn with_number(mut self, name: impl Into<String>, options: NumberFormatOptions) -> Self {
        self.number.insert(name.into(), options);
        self
    }

    pub fn with_date(mut self, name: impl Into<String>, options: DateTimeFormatOptions) -> Self {
        self.date.insert(name.into(), options);
        self
    }

    pub fn with_time(mut self, name: impl Into<String>, options: DateTimeFormatOptions) -> Self {
        self.time.insert(name.into(), options);
        self
    }
}

/// Resolves the style of a `number`, `date` or `time` node into options.
///
/// `None` selects the category default.
pub fn translate(
    category: FormatCategory,
    style: Option<&FormatStyle>,
    formats: &CustomFormats,
) -> Result<FormatOptions, FormatError> {
    match category {
        FormatCategory::Number => translate_number(style, formats).map(FormatOptions::Number),
        FormatCategory::Date | FormatCategory::Time => {
            translate_date_time(category, style, formats).map(FormatOptions::DateTime)
        }
    }
}

pub fn translate_number(
    style: Option<&FormatStyle>,
    formats: &CustomFormats,
) -> Result<NumberFormatOptions, FormatError> {
    match style {
        None => Ok(NumberFormatOptions::default()),
        Some(FormatStyle::Named(name)) => match formats.number.get(name) {
            Some(options) => Ok(options.clone()),
            None => number_preset(name),
        },
        Some(FormatStyle::Skeleton(skeleton)) => parse_number_skeleton(skeleton),
    }
}

/// Date and time counterpart of [`translate_number`].
///
/// [`FormatCategory::Time`] reads the time presets; any other category reads
/// the date presets.
pub fn translate_date_time(
    category: FormatCategory,
    style: Option<&FormatStyle>,
    formats: &CustomFormats,
) -> Result<DateTimeFormatOptions, FormatError> {
    let time = category == FormatCategory::Time;
    match style {
        None if time => time_preset("medium"),
        None => Ok(default_date()),
        Some(FormatStyle::Named(name)) => {
            let custom = if time { &formats.time } else { &formats.date };
            match custom.get(name) {
                Some(options) => Ok(options.clone()),
                None if time => time_preset(name),
                None => date_preset(name),
            }
        }
        Some(FormatStyle::Skeleton(skeleton)) => parse_date_time_skeleton(skeleton),
    }
}

fn unknown(category: FormatCategory, name: &str) -> FormatError {
    FormatError::UnknownFormatStyle {
        category,
        name: name.to_owned(),
    }
}

fn number_preset(name: &str) -> Result<NumberFormatOptions, FormatError> {
    let options = match name {
        "integer" => NumberFormatOptions {
            maximum_fraction_digits: Some(0),
            ..Default::default()
        },
        "currency" => NumberFormatOptions {
            style: Some(NumberStyle::Currency),
            ..Default::default()
        },
        "percent" => NumberFormatOptions {
            style: Some(NumberStyle::Percent),
            ..Default::default()
        },
        _ => return Err(unknown(FormatCategory::Number, name)),
    };
    Ok(options)
}

fn default_date() -> DateTimeFormatOptions {
    DateTimeFormatOptions {
        year: Some(FieldWidth::Numeric),
        month: Some(FieldWidth::Numeric),
        day: Some(FieldWidth::Numeric),
        ..Default::default()
    }
}

fn date_preset(name: &str) -> Result<DateTimeFormatOptions, FormatError> {
    let options = match name {
        "short" => DateTimeFormatOptions {
            year: Some(FieldWidth::TwoDigit),
            ..default_date()
        },
        "medium" => DateTimeFormatOptions {
            month: Some(FieldWidth::Short),
            ..default_date()
        },
        "long" => DateTimeFormatOptions {
            month: Some(FieldWidth::Long),
            ..default_date()
        },
        "full" => DateTimeFormatOptions {
            weekday: Some(FieldWidth::Long),
            month: Some(FieldWidth::Long),
            ..default_date()
        },
        _ => return Err(unknown(FormatCategory::Date, name)),
    };
    Ok(options)
}

fn time_preset(name: &str) -> Result<DateTimeFormatOptions, FormatError> {
    let short = DateTimeFormatOptions {
        hour: Some(FieldWidth::Numeric),
        minute: Some(FieldWidth::TwoDigit),
        ..Default::default()
    };
    let options = match name {
        "short" => short,
        "medium" => DateTimeFormatOptions {
            second: Some(FieldWidth::TwoDigit),
            ..short
        },
        "long" | "full" => DateTimeFormatOptions {
            second: Some(FieldWidth::TwoDigit),
            time_zone_name: Some(FieldWidth::Short),
            ..short
        },
        _ => return Err(unknown(FormatCategory::Time, name)),
    };
    Ok(options)
}

fn invalid(token: &str) -> FormatError {
    FormatError::InvalidSkeleton {
        token: token.to_owned(),
    }
}

pub fn parse_number_skeleton(skeleton: &str) -> Result<NumberFormatOptions, FormatError> {
    let skeleton = skeleton.trim().trim_start_matches("::");
    let mut options = NumberFormatOptions::default();

    for token in skeleton.split_whitespace() {
        match token {
            "percent" | "%" => options.style = Some(NumberStyle::Percent),
            "group-off" | ",_" => options.use_grouping = Some(false),
            "group-auto" => options.use_grouping = Some(true),
            "precision-integer" => options.maximum_fraction_digits = Some(0),
            "sign-auto" => options.sign_display = Some(SignDisplayOption::Auto),
            "sign-always" | "+!" => options.sign_display = Some(SignDisplayOption::Always),
            "sign-never" | "+_" => options.sign_display = Some(SignDisplayOption::Never),
            "sign-except-zero" | "+?" => {
                options.sign_display = Some(SignDisplayOption::ExceptZero)
            }
            _ => {
                if let Some(code) = token.strip_prefix("currency/") {
                    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                        return Err(invalid(token));
                    }
                    options.style = Some(NumberStyle::Currency);
                    options.currency = Some(code.to_ascii_uppercase());
                } else if let Some(fraction) = token.strip_prefix('.') {
                    let (min, max) = fraction_precision(fraction).ok_or_else(|| invalid(token))?;
                    options.minimum_fraction_digits = Some(min);
                    options.maximum_fraction_digits = Some(max);
                } else if let Some(width) = token.strip_prefix("integer-width/") {
                    let width = width.trim_start_matches(['*', '+']);
                    options.minimum_integer_digits =
                        Some(count_zeros(width).ok_or_else(|| invalid(token))?);
                } else if let Some(digits) = count_zeros(token) {
                    options.minimum_integer_digits = Some(digits);
                } else {
                    return Err(invalid(token));
                }
            }
        }
    }

    Ok(options)
}

/// `00##` → two required and two optional fraction digits.
fn fraction_precision(fraction: &str) -> Option<(u8, u8)> {
    let required = fraction.chars().take_while(|c| *c == '0').count();
    let optional = fraction[required..].chars().take_while(|c| *c == '#').count();
    if required + optional != fraction.len() {
        return None;
    }
    let min = u8::try_from(required).ok()?;
    let max = u8::try_from(required + optional).ok()?;
    Some((min, max))
}

fn count_zeros(s: &str) -> Option<u8> {
    if s.is_empty() || !s.chars().all(|c| c == '0') {
        return None;
    }
    u8::try_from(s.len()).ok()
}

pub fn parse_date_time_skeleton(skeleton: &str) -> Result<DateTimeFormatOptions, FormatError> {
    let skeleton = skeleton.trim().trim_start_matches("::");
    let mut options = DateTimeFormatOptions::default();

    let mut rest = skeleton;
    while let Some(symbol) = rest.chars().next() {
        let len = rest.find(|c: char| c != symbol).unwrap_or(rest.len());
        let run = &rest[..len];
        let count = run.chars().count();
        rest = &rest[len..];

        match symbol {
            c if c.is_whitespace() => {}
            'G' => options.era = Some(text_width(run, count)?),
            'y' => {
                options.year = Some(if count == 2 {
                    FieldWidth::TwoDigit
                } else {
                    FieldWidth::Numeric
                })
            }
            'M' | 'L' => {
                options.month = Some(match count {
                    1 => FieldWidth::Numeric,
                    2 => FieldWidth::TwoDigit,
                    3 => FieldWidth::Short,
                    4 => FieldWidth::Long,
                    5 => FieldWidth::Narrow,
                    _ => return Err(invalid(run)),
                })
            }
            'd' => options.day = Some(numeric_width(run, count)?),
            'E' | 'c' => options.weekday = Some(text_width(run, count)?),
            'h' | 'K' => {
                options.hour = Some(numeric_width(run, count)?);
                options.hour12 = Some(true);
            }
            'H' | 'k' => {
                options.hour = Some(numeric_width(run, count)?);
                options.hour12 = Some(false);
            }
            'j' => options.hour = Some(numeric_width(run, count)?),
            'm' => options.minute = Some(numeric_width(run, count)?),
            's' => options.second = Some(numeric_width(run, count)?),
            'a' if count <= 5 => {}
            'z' | 'v' | 'O' => {
                options.time_zone_name = Some(match count {
                    1..=3 => FieldWidth::Short,
                    4 => FieldWidth::Long,
                    _ => return Err(invalid(run)),
                })
            }
            _ => return Err(invalid(run)),
        }
    }

    Ok(options)
}

fn numeric_width(run: &str, count: usize) -> Result<FieldWidth, FormatError> {
    match count {
        1 => Ok(FieldWidth::Numeric),
        2 => Ok(FieldWidth::TwoDigit),
        _ => Err(invalid(run)),
    }
}

fn text_width(run: &str, count: usize) -> Result<FieldWidth, FormatError> {
    match count {
        1..=3 => Ok(FieldWidth::Short),
        4 => Ok(FieldWidth::Long),
        5 => Ok(FieldWidth::Narrow),
        _ => Err(invalid(run)),
    }
}
