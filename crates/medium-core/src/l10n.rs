//! Translations: the string dictionary and localized field schemas.

use std::collections::BTreeMap;
use std::sync::Arc;

use medium_common::cache::{self, Cache};
use serde_json::Value;

use crate::params::merge_deep;
use crate::platform::Dictionary;
use crate::schema::{Semantics, parse_semantics};

/// Language whose strings the base schema already carries.
pub const BASE_LANGUAGE: &str = "en";

/// Distinct `(language, library)` pairs kept before eviction.
const SCHEMA_CACHE_CAPACITY: u64 = 64;

/// Source of translation documents.
pub trait SchemaStore {
    /// The translation of `library` into `language`, shaped
    /// `{ "semantics": [...] }`, or `None` on any lookup or parse failure.
    fn fetch(&self, language: &str, library: &str) -> impl Future<Output = Option<Value>>;
}

/// Localized schemas, fetched once per language and library.
///
/// Failed lookups are cached as well, so a missing translation is never
/// requested twice.
pub struct LocalizedSchemas {
    base: Arc<Semantics>,
    cache: Cache<(String, String), Option<Arc<Semantics>>>,
}

impl LocalizedSchemas {
    pub fn new(base: Semantics) -> Self {
        Self {
            base: Arc::new(base),
            cache: cache::new_cache(SCHEMA_CACHE_CAPACITY),
        }
    }

    pub fn base(&self) -> Arc<Semantics> {
        self.base.clone()
    }

    /// The schema for `language`. `None` means no usable translation exists
    /// and the caller keeps whatever schema it has.
    pub async fn get(
        &self,
        store: &impl SchemaStore,
        language: &str,
        library: &str,
    ) -> Option<Arc<Semantics>> {
        if language.is_empty() || language == BASE_LANGUAGE {
            return Some(self.base.clone());
        }

        let key = (language.to_owned(), library.replace(' ', "-"));
        if let Some(hit) = cache::get(&self.cache, &key) {
            return hit;
        }

        let localized = match store.fetch(&key.0, &key.1).await {
            Some(translation) => self.overlay(&translation, language),
            None => {
                tracing::debug!(target: "medium::l10n", %language, %library, "no translation");
                None
            }
        };
        cache::insert(&self.cache, key, localized.clone());
        localized
    }

    fn overlay(&self, translation: &Value, language: &str) -> Option<Arc<Semantics>> {
        let Some(overlay) = translation.get("semantics") else {
            // A translation without schema strings changes nothing.
            return Some(self.base.clone());
        };
        let base = match serde_json::to_value(self.base.as_ref()) {
            Ok(base) => base,
            Err(error) => {
                tracing::warn!(target: "medium::l10n", %error, "base schema does not serialize");
                return None;
            }
        };

        match parse_semantics(merge_deep(&base, overlay)) {
            Ok(semantics) => Some(Arc::new(semantics)),
            Err(error) => {
                tracing::warn!(target: "medium::l10n", %language, %error, "translated schema rejected");
                None
            }
        }
    }
}

impl std::fmt::Debug for LocalizedSchemas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizedSchemas")
            .field("base_fields", &self.base.len())
            .finish_non_exhaustive()
    }
}

/// Dictionary over the `l10n` and `a11y` tables of the parameters.
///
/// Keys are namespaced, e.g. `l10n.save` or `a11y.close`. Unknown keys
/// come back verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct L10nDictionary {
    entries: BTreeMap<String, String>,
}

impl L10nDictionary {
    pub fn new(l10n: &BTreeMap<String, String>, a11y: &BTreeMap<String, String>) -> Self {
        let namespaced = |prefix: &str, table: &BTreeMap<String, String>| {
            table
                .iter()
                .map(|(k, v)| (format!("{prefix}.{k}"), v.clone()))
                .collect::<Vec<_>>()
        };
        let mut entries = BTreeMap::new();
        entries.extend(namespaced("l10n", l10n));
        entries.extend(namespaced("a11y", a11y));
        Self { entries }
    }
}

impl Dictionary for L10nDictionary {
    fn get(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use serde_json::json;

    struct CountingStore {
        calls: Cell<u32>,
        reply: Option<Value>,
    }

    impl SchemaStore for CountingStore {
        async fn fetch(&self, _language: &str, library: &str) -> Option<Value> {
            assert!(!library.contains(' '));
            self.calls.set(self.calls.get() + 1);
            self.reply.clone()
        }
    }

    fn base() -> Semantics {
        parse_semantics(json!([
            { "name": "viewFieldsImage", "type": "group", "label": "Image",
              "fields": [{ "name": "sourceURL", "type": "text", "label": "Source" }] }
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn translation_is_fetched_once_and_overlaid() {
        let store = CountingStore {
            calls: Cell::new(0),
            reply: Some(json!({
                "semantics": [{ "label": "Bild", "fields": [{ "label": "Quelle" }] }]
            })),
        };
        let schemas = LocalizedSchemas::new(base());

        let de = schemas.get(&store, "de", "H5P.EditableMedium 1.0").await.unwrap();
        assert_eq!(de[0].label, "Bild");
        assert_eq!(de[0].fields[0].label, "Quelle");
        assert_eq!(de[0].fields[0].name, "sourceURL");

        schemas.get(&store, "de", "H5P.EditableMedium 1.0").await;
        assert_eq!(store.calls.get(), 1);
    }

    #[tokio::test]
    async fn failures_are_cached_too() {
        let store = CountingStore {
            calls: Cell::new(0),
            reply: None,
        };
        let schemas = LocalizedSchemas::new(base());
        assert!(schemas.get(&store, "fr", "H5P.EditableMedium 1.0").await.is_none());
        assert!(schemas.get(&store, "fr", "H5P.EditableMedium 1.0").await.is_none());
        assert_eq!(store.calls.get(), 1);
    }

    #[tokio::test]
    async fn base_language_needs_no_fetch() {
        let store = CountingStore {
            calls: Cell::new(0),
            reply: None,
        };
        let schemas = LocalizedSchemas::new(base());
        assert_eq!(schemas.get(&store, "en", "x").await.unwrap()[0].label, "Image");
        assert_eq!(schemas.get(&store, "", "x").await.unwrap()[0].label, "Image");
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn dictionary_namespaces_tables() {
        let l10n = BTreeMap::from([("save".to_owned(), "Speichern".to_owned())]);
        let a11y = BTreeMap::from([("image".to_owned(), "Bild".to_owned())]);
        let dictionary = L10nDictionary::new(&l10n, &a11y);
        assert_eq!(dictionary.get("l10n.save"), "Speichern");
        assert_eq!(dictionary.get("a11y.image"), "Bild");
        assert_eq!(dictionary.get("l10n.cancel"), "l10n.cancel");
    }
}
