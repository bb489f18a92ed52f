//! Primitive formatters the evaluator delegates to.
//!
//! [`FormatRegistry`] is the seam for locale data: the evaluator never reads
//! CLDR data itself. [`IcuFormatRegistry`] is the default, backed by ICU4X
//! compiled data for numbers, dates, times and plural rules.

use std::fmt;
use std::str::FromStr;

use fixed_decimal::{Decimal, Sign, SignDisplay, SignedRoundingMode, UnsignedRoundingMode};
use icu::calendar::Date;
use icu::datetime::fieldsets::builder::{DateFields, FieldSetBuilder};
use icu::datetime::fieldsets::enums::CompositeDateTimeFieldSet;
use icu::datetime::input::{DateTime, Time};
use icu::datetime::options::{Length, TimePrecision, YearStyle};
use icu::datetime::preferences::HourCycle;
use icu::datetime::{DateTimeFormatter, DateTimeFormatterPreferences};
use icu::locale::Locale;
use icu::locale::provider::{Baked, LocaleExemplarCharactersMainV1};
use icu::locale::subtags::Language;
use icu::plurals::{PluralCategory, PluralOperands, PluralRules};
use icu_decimal::DecimalFormatter;
use icu_decimal::options::GroupingStrategy;
use icu_provider::{DataIdentifierBorrowed, DataLocale, DataProvider, DataRequest, DataResponse};
use time::OffsetDateTime;

use crate::error::{FormatCategory, FormatError};
use crate::plural::PluralRuleType;
use crate::skeleton::{
    DateTimeFormatOptions, FieldWidth, NumberFormatOptions, NumberStyle, SignDisplayOption,
};

/// Locale-sensitive primitive formatting.
///
/// Implementations must be safe to share between threads; a formatter holds
/// one behind an `Arc` and only ever reads through it.
pub trait FormatRegistry: fmt::Debug + Send + Sync {
    fn format_number(
        &self,
        locale: &Locale,
        value: f64,
        options: &NumberFormatOptions,
    ) -> Result<String, FormatError>;

    /// `epoch_millis` is milliseconds since the Unix epoch.
    fn format_date(
        &self,
        locale: &Locale,
        epoch_millis: i64,
        options: &DateTimeFormatOptions,
    ) -> Result<String, FormatError>;

    fn format_time(
        &self,
        locale: &Locale,
        epoch_millis: i64,
        options: &DateTimeFormatOptions,
    ) -> Result<String, FormatError>;

    fn plural_category(
        &self,
        locale: &Locale,
        value: f64,
        rule_type: PluralRuleType,
    ) -> Result<PluralCategory, FormatError>;

    /// Whether this registry has data for `locale`.
    fn supports_locale(&self, locale: &Locale) -> bool {
        locale.id.language != Language::UNKNOWN
    }
}

/// Default registry on ICU4X compiled data.
///
/// Dates and times are rendered in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct IcuFormatRegistry;

fn primitive(category: FormatCategory, reason: impl fmt::Display) -> FormatError {
    FormatError::Primitive {
        category,
        reason: reason.to_string(),
    }
}

impl FormatRegistry for IcuFormatRegistry {
    fn format_number(
        &self,
        locale: &Locale,
        value: f64,
        options: &NumberFormatOptions,
    ) -> Result<String, FormatError> {
        if value.is_nan() {
            return Ok("NaN".to_owned());
        }
        if value.is_infinite() {
            let sign = if value < 0.0 { "-" } else { "" };
            return Ok(format!("{sign}∞"));
        }

        let style = options.style();
        let (min_fraction, max_fraction) = options.fraction_digits();

        let mut decimal = Decimal::from_str(&value.to_string())
            .map_err(|err| primitive(FormatCategory::Number, format!("{err:?}")))?;
        if style == NumberStyle::Percent {
            decimal.multiply_pow10(2);
            decimal.trim_start();
        }
        decimal.round_with_mode(
            -i16::from(max_fraction),
            SignedRoundingMode::Unsigned(UnsignedRoundingMode::HalfExpand),
        );
        decimal.pad_end(-i16::from(min_fraction));
        if let Some(digits) = options.minimum_integer_digits {
            decimal.pad_start(i16::from(digits));
        }
        if let Some(sign) = options.sign_display {
            decimal.apply_sign_display(match sign {
                SignDisplayOption::Auto => SignDisplay::Auto,
                SignDisplayOption::Always => SignDisplay::Always,
                SignDisplayOption::Never => SignDisplay::Never,
                SignDisplayOption::ExceptZero => SignDisplay::ExceptZero,
            });
        }

        // The sign goes in front of the currency symbol, so it is written here.
        let sign = match style {
            NumberStyle::Currency => {
                let sign = decimal.sign();
                decimal.set_sign(Sign::None);
                match sign {
                    Sign::Negative => "-",
                    Sign::Positive => "+",
                    Sign::None => "",
                }
            }
            NumberStyle::Decimal | NumberStyle::Percent => "",
        };

        let grouping = if options.use_grouping == Some(false) {
            GroupingStrategy::Never
        } else {
            GroupingStrategy::Auto
        };
        let formatter = DecimalFormatter::try_new(locale.into(), grouping.into())
            .map_err(|err| primitive(FormatCategory::Number, err))?;
        let number = formatter.format(&decimal).to_string();

        Ok(match style {
            NumberStyle::Decimal => number,
            NumberStyle::Percent => format!("{number}%"),
            NumberStyle::Currency => {
                let code = options.currency.as_deref().unwrap_or("USD");
                match currency_symbol(code) {
                    Some(symbol) => format!("{sign}{symbol}{number}"),
                    None => format!("{sign}{code}\u{a0}{number}"),
                }
            }
        })
    }

    fn format_date(
        &self,
        locale: &Locale,
        epoch_millis: i64,
        options: &DateTimeFormatOptions,
    ) -> Result<String, FormatError> {
        render_date_time(locale, FormatCategory::Date, epoch_millis, options)
    }

    fn format_time(
        &self,
        locale: &Locale,
        epoch_millis: i64,
        options: &DateTimeFormatOptions,
    ) -> Result<String, FormatError> {
        render_date_time(locale, FormatCategory::Time, epoch_millis, options)
    }

    fn plural_category(
        &self,
        locale: &Locale,
        value: f64,
        rule_type: PluralRuleType,
    ) -> Result<PluralCategory, FormatError> {
        let operands: PluralOperands = value
            .abs()
            .to_string()
            .parse()
            .map_err(|err| primitive(FormatCategory::Number, format!("{err:?}")))?;
        let rules = match rule_type {
            PluralRuleType::Cardinal => PluralRules::try_new_cardinal(locale.into()),
            PluralRuleType::Ordinal => PluralRules::try_new_ordinal(locale.into()),
        }
        .map_err(|err| primitive(FormatCategory::Number, err))?;
        Ok(rules.category_for(operands))
    }

    /// A locale is supported when the compiled data has an entry for its
    /// language, directly or through a parent such as `fr` for `fr-FR`.
    /// Lookups that only reach the root locale are rejected.
    fn supports_locale(&self, locale: &Locale) -> bool {
        if locale.id.language == Language::UNKNOWN {
            return false;
        }
        let data_locale = DataLocale::from(locale);
        let request = DataRequest {
            id: DataIdentifierBorrowed::for_locale(&data_locale),
            ..Default::default()
        };
        let response: Result<DataResponse<LocaleExemplarCharactersMainV1>, _> = Baked.load(request);
        match response {
            Ok(response) => response
                .metadata
                .locale
                .is_none_or(|resolved| !resolved.language.is_unknown()),
            Err(_) => false,
        }
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "INR" => Some("₹"),
        "KRW" => Some("₩"),
        _ => None,
    }
}

fn render_date_time(
    locale: &Locale,
    category: FormatCategory,
    epoch_millis: i64,
    options: &DateTimeFormatOptions,
) -> Result<String, FormatError> {
    let utc = OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_millis) * 1_000_000)
        .map_err(|err| primitive(category, err))?;
    let date = Date::try_new_iso(utc.year(), u8::from(utc.month()), utc.day())
        .map_err(|err| primitive(category, err))?;
    let time = Time::try_new(utc.hour(), utc.minute(), utc.second(), 0)
        .map_err(|err| primitive(category, err))?;

    let defaults;
    let options = if options.has_date_fields() || options.has_time_fields() {
        options
    } else {
        defaults = match category {
            FormatCategory::Time => default_time_fields(),
            _ => default_date_fields(),
        };
        &defaults
    };

    let mut prefs = DateTimeFormatterPreferences::from(locale);
    if let Some(twelve_hour) = options.hour12 {
        prefs.hour_cycle = Some(if twelve_hour {
            HourCycle::H12
        } else {
            HourCycle::H23
        });
    }
    let formatter = DateTimeFormatter::try_new(prefs, field_set(category, options)?)
        .map_err(|err| primitive(category, err))?;
    let mut rendered = formatter.format(&DateTime { date, time }).to_string();

    if options.time_zone_name.is_some() {
        rendered.push_str(" UTC");
    }
    Ok(rendered)
}

/// Maps the requested fields onto an ICU4X field set.
fn field_set(
    category: FormatCategory,
    options: &DateTimeFormatOptions,
) -> Result<CompositeDateTimeFieldSet, FormatError> {
    let time_precision = if options.second.is_some() {
        Some(TimePrecision::Second)
    } else if options.minute.is_some() {
        Some(TimePrecision::Minute)
    } else if options.hour.is_some() {
        Some(TimePrecision::Hour)
    } else {
        None
    };

    let year = options.year.is_some() || options.era.is_some();
    let date_fields = match pick_date_fields(
        year,
        options.month.is_some(),
        options.day.is_some(),
        options.weekday.is_some(),
    ) {
        // Calendar periods cannot carry a time of day.
        Some(DateFields::Y | DateFields::YM) if time_precision.is_some() => Some(DateFields::YMD),
        Some(DateFields::M) if time_precision.is_some() => Some(DateFields::MD),
        fields => fields,
    };

    let mut builder = FieldSetBuilder::new();
    builder.length = Some(length(options));
    builder.date_fields = date_fields;
    builder.time_precision = time_precision;
    if matches!(
        date_fields,
        Some(DateFields::Y | DateFields::YM | DateFields::YMD | DateFields::YMDE)
    ) {
        builder.year_style = Some(match (options.era, options.year) {
            (Some(_), _) => YearStyle::WithEra,
            (None, Some(FieldWidth::TwoDigit)) => YearStyle::Auto,
            (None, _) => YearStyle::Full,
        });
    }
    builder
        .build_composite_datetime()
        .map_err(|err| primitive(category, err))
}

fn pick_date_fields(year: bool, month: bool, day: bool, weekday: bool) -> Option<DateFields> {
    let fields = match (year, month, day, weekday) {
        (false, false, false, false) => return None,
        (false, false, false, true) => DateFields::E,
        (false, false, true, false) => DateFields::D,
        (false, false, true, true) => DateFields::DE,
        (false, true, false, false) => DateFields::M,
        (false, true, true, false) => DateFields::MD,
        (false, true, _, true) => DateFields::MDE,
        (true, false, false, false) => DateFields::Y,
        (true, true, false, false) => DateFields::YM,
        (true, _, _, false) => DateFields::YMD,
        (true, _, _, true) => DateFields::YMDE,
    };
    Some(fields)
}

/// Textual months and weekdays pick the pattern length; numeric fields
/// use the short patterns.
fn length(options: &DateTimeFormatOptions) -> Length {
    match (options.month, options.weekday) {
        (Some(FieldWidth::Long), _) => Length::Long,
        (Some(FieldWidth::Short | FieldWidth::Narrow), _) => Length::Medium,
        (None, Some(FieldWidth::Long)) => Length::Long,
        (None, Some(_)) => Length::Medium,
        (Some(FieldWidth::Numeric | FieldWidth::TwoDigit), _) => Length::Short,
        (None, None) if options.has_time_fields() => Length::Medium,
        (None, None) => Length::Short,
    }
}

fn default_date_fields() -> DateTimeFormatOptions {
    DateTimeFormatOptions {
        year: Some(FieldWidth::Numeric),
        month: Some(FieldWidth::Numeric),
        day: Some(FieldWidth::Numeric),
        ..Default::default()
    }
}

fn default_time_fields() -> DateTimeFormatOptions {
    DateTimeFormatOptions {
        hour: Some(FieldWidth::Numeric),
        minute: Some(FieldWidth::TwoDigit),
        second: Some(FieldWidth::TwoDigit),
        ..Default::default()
    }
}
