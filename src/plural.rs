use std::collections::BTreeMap;

use icu::locale::Locale;
pub use icu::plurals::PluralCategory;
use tracing::trace;

use crate::ast::{Message, PluralKey};
use crate::error::FormatError;
use crate::registry::FormatRegistry;

/// Rule set used to categorize a number: `plural` uses cardinal rules,
/// `selectordinal` ordinal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralRuleType {
    Cardinal,
    Ordinal,
}

impl PluralRuleType {
    pub fn from_ordinal_flag(ordinal: bool) -> Self {
        if ordinal { Self::Ordinal } else { Self::Cardinal }
    }
}

pub fn category_str(category: PluralCategory) -> &'static str {
    match category {
        PluralCategory::Zero => "zero",
        PluralCategory::One => "one",
        PluralCategory::Two => "two",
        PluralCategory::Few => "few",
        PluralCategory::Many => "many",
        PluralCategory::Other => "other",
    }
}

pub fn category_from_str(category: &str) -> Option<PluralCategory> {
    match category {
        "zero" => Some(PluralCategory::Zero),
        "one" => Some(PluralCategory::One),
        "two" => Some(PluralCategory::Two),
        "few" => Some(PluralCategory::Few),
        "many" => Some(PluralCategory::Many),
        "other" => Some(PluralCategory::Other),
        _ => None,
    }
}

/// Chooses plural branches for one locale.
pub struct PluralResolver<'a> {
    registry: &'a dyn FormatRegistry,
    locale: &'a Locale,
}

impl<'a> PluralResolver<'a> {
    pub fn new(registry: &'a dyn FormatRegistry, locale: &'a Locale) -> Self {
        Self { registry, locale }
    }

    pub fn resolve(
        &self,
        value: f64,
        rule_type: PluralRuleType,
    ) -> Result<PluralCategory, FormatError> {
        self.registry.plural_category(self.locale, value, rule_type)
    }

    /// Picks the branch for the offset-adjusted value.
    ///
    /// An `=N` key equal to `adjusted` wins over any category; otherwise the
    /// locale's category is used, then `other`.
    pub fn select<'m>(
        &self,
        name: &str,
        options: &'m BTreeMap<PluralKey, Message>,
        adjusted: f64,
        rule_type: PluralRuleType,
    ) -> Result<&'m Message, FormatError> {
        if let Some(exact) = exact_key(adjusted) {
            if let Some(branch) = options.get(&PluralKey::Exact(exact)) {
                trace!(name, exact, "exact plural match");
                return Ok(branch);
            }
        }

        let category = self.resolve(adjusted, rule_type)?;
        trace!(
            name,
            value = adjusted,
            category = category_str(category),
            ?rule_type,
            "plural category"
        );
        options
            .get(&PluralKey::Category(category))
            .or_else(|| options.get(&PluralKey::OTHER))
            .ok_or_else(|| FormatError::MissingOtherClause {
                name: name.to_owned(),
            })
    }
}

fn exact_key(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use icu::locale::locale;

    use super::*;
    use crate::ast::MessageNode;
    use crate::registry::IcuFormatRegistry;

    fn options(keys: &[&str]) -> BTreeMap<PluralKey, Message> {
        keys.iter()
            .map(|key| {
                (
                    PluralKey::parse(key).unwrap(),
                    vec![MessageNode::literal(*key)],
                )
            })
            .collect()
    }

    fn chosen(branch: &Message) -> &str {
        match &branch[0] {
            MessageNode::Literal { text } => text,
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn welsh_uses_all_six_categories() {
        let registry = IcuFormatRegistry;
        let locale = locale!("cy");
        let resolver = PluralResolver::new(&registry, &locale);
        let options = options(&["zero", "one", "two", "few", "many", "other"]);
        let picked: Vec<_> = [0.0, 1.0, 2.0, 3.0, 6.0, 100.0]
            .into_iter()
            .map(|n| {
                chosen(resolver.select("n", &options, n, PluralRuleType::Cardinal).unwrap())
                    .to_owned()
            })
            .collect();
        assert_eq!(picked, ["zero", "one", "two", "few", "many", "other"]);
    }

    #[test]
    fn exact_match_beats_category() {
        let registry = IcuFormatRegistry;
        let locale = locale!("en");
        let resolver = PluralResolver::new(&registry, &locale);
        let options = options(&["=1", "one", "other"]);
        let branch = resolver
            .select("n", &options, 1.0, PluralRuleType::Cardinal)
            .unwrap();
        assert_eq!(chosen(branch), "=1");
        let branch = resolver
            .select("n", &options, 1.5, PluralRuleType::Cardinal)
            .unwrap();
        assert_eq!(chosen(branch), "other");
    }

    #[test]
    fn english_ordinals() {
        let registry = IcuFormatRegistry;
        let locale = locale!("en");
        let resolver = PluralResolver::new(&registry, &locale);
        let categories: Vec<_> = [1.0, 2.0, 3.0, 4.0, 11.0, 21.0, 22.0, 33.0]
            .into_iter()
            .map(|n| category_str(resolver.resolve(n, PluralRuleType::Ordinal).unwrap()))
            .collect();
        assert_eq!(
            categories,
            ["one", "two", "few", "other", "other", "one", "two", "few"]
        );
    }

    #[test]
    fn missing_other_is_reported() {
        let registry = IcuFormatRegistry;
        let locale = locale!("en");
        let resolver = PluralResolver::new(&registry, &locale);
        let options = options(&["one"]);
        assert_eq!(
            resolver.select("n", &options, 5.0, PluralRuleType::Cardinal),
            Err(FormatError::MissingOtherClause {
                name: "n".to_owned()
            })
        );
    }
}
