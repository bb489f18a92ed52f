use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::FormatError;
use crate::skeleton::CustomFormats;
use crate::{FormatterOptions, MessageFormat, MessageSource};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source: MessageSource,
    locales: Vec<String>,
    custom_formats: CustomFormats,
}

/// Memoizes [`MessageFormat`] construction.
///
/// Equal `(source, locales, custom_formats)` keys share one instance. Every
/// instance is built with the options the cache was created with.
#[derive(Debug, Default)]
pub struct FormatterCache {
    options: FormatterOptions,
    entries: Mutex<HashMap<CacheKey, Arc<MessageFormat>>>,
}

impl FormatterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FormatterOptions) -> Self {
        Self {
            options,
            entries: Mutex::default(),
        }
    }

    /// Returns the cached formatter for the key, building it on first use.
    ///
    /// Construction errors are returned and nothing is cached.
    pub fn get_or_create<S: AsRef<str>>(
        &self,
        source: impl Into<MessageSource>,
        locales: &[S],
        custom_formats: CustomFormats,
    ) -> Result<Arc<MessageFormat>, FormatError> {
        let key = CacheKey {
            source: source.into(),
            locales: locales.iter().map(|l| l.as_ref().to_owned()).collect(),
            custom_formats,
        };

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(format) = entries.get(&key) {
            return Ok(Arc::clone(format));
        }

        let format = Arc::new(MessageFormat::try_new(
            key.source.clone(),
            key.locales.as_slice(),
            key.custom_formats.clone(),
            self.options.clone(),
        )?);
        debug!(
            locales = ?key.locales,
            cached = entries.len() + 1,
            "cached new message format"
        );
        entries.insert(key, Arc::clone(&format));
        Ok(format)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
