use icu::locale::{Locale, locale};
use tracing::warn;

use crate::error::FormatError;
use crate::registry::FormatRegistry;

/// Locale used when none of the requested ones can be used.
pub const DEFAULT_LOCALE: Locale = locale!("en");

/// Parses a BCP-47 tag and normalizes its casing (`en-us` → `en-US`).
pub fn canonicalize(tag: &str) -> Result<Locale, FormatError> {
    let normalized = tag.trim().replace('_', "-");
    Locale::try_from_str(&normalized).map_err(|_| FormatError::UnsupportedLocale {
        locale: tag.to_owned(),
    })
}

/// Picks the first requested locale the registry supports, else
/// [`DEFAULT_LOCALE`].
pub(crate) fn negotiate<S: AsRef<str>>(
    requested: &[S],
    registry: &dyn FormatRegistry,
) -> Locale {
    for tag in requested {
        let tag = tag.as_ref();
        let err = match canonicalize(tag) {
            Ok(locale) if registry.supports_locale(&locale) => return locale,
            Ok(locale) => FormatError::UnsupportedLocale {
                locale: locale.to_string(),
            },
            Err(err) => err,
        };
        warn!(requested = tag, error = %err, "ignoring requested locale");
    }
    DEFAULT_LOCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::IcuFormatRegistry;

    #[test]
    fn casing_is_normalized() {
        assert_eq!(canonicalize("en-us").unwrap().to_string(), "en-US");
        assert_eq!(canonicalize("EN-US").unwrap().to_string(), "en-US");
        assert_eq!(canonicalize("pt_mz").unwrap().to_string(), "pt-MZ");
    }

    #[test]
    fn falls_back_to_english() {
        let registry = IcuFormatRegistry;
        assert_eq!(negotiate::<&str>(&[], &registry), DEFAULT_LOCALE);
        assert_eq!(negotiate(&["fu-baz"], &registry), DEFAULT_LOCALE);
        assert_eq!(negotiate(&["und"], &registry), DEFAULT_LOCALE);
        assert_eq!(
            negotiate(&["not a tag", "fr-fr"], &registry).to_string(),
            "fr-FR"
        );
    }

    #[test]
    fn well_formed_tags_without_data_fall_back() {
        let registry = IcuFormatRegistry;
        assert_eq!(negotiate(&["zz"], &registry), DEFAULT_LOCALE);
        assert_eq!(negotiate(&["xx-YY"], &registry), DEFAULT_LOCALE);
        assert_eq!(negotiate(&["zz", "ja"], &registry).to_string(), "ja");
    }
}
