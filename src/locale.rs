//! Translation catalog and its resource search path.
//!
//! Translations live in one JSON file per locale (`<dir>/<locale>.json`).
//! A file may wrap its keys in a top-level object named after the locale;
//! nested objects are flattened into dotted keys (`posts.index.title`).
//!
//! The catalog is shared through application state. The active locale is
//! never stored here, it belongs to the request.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("locale '{0}' is not available")]
    Unavailable(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} must contain a JSON object")]
    NotAnObject { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct LocaleSettings {
    pub dir: PathBuf,
    pub default_locale: String,
    pub available: Vec<String>,
}

impl LocaleSettings {
    pub fn is_available(&self, locale: &str) -> bool {
        self.available.iter().any(|l| l == locale)
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    search_path: Vec<PathBuf>,
    translations: HashMap<String, HashMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct TranslationCatalog {
    settings: Arc<LocaleSettings>,
    state: Arc<RwLock<CatalogState>>,
}

impl TranslationCatalog {
    pub fn new(settings: LocaleSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            state: Arc::default(),
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.settings.default_locale
    }

    pub fn resource_path(&self, locale: &str) -> PathBuf {
        self.settings.dir.join(format!("{locale}.json"))
    }

    /// Snapshot of the loaded resource paths, in load order.
    pub fn search_path(&self) -> Vec<PathBuf> {
        self.state.read().search_path.clone()
    }

    /// Makes sure `locale` is loaded.
    ///
    /// The resource path is appended only when it is not already on the
    /// search path, so repeated calls never load a file twice. Nothing is
    /// appended when loading fails.
    pub async fn ensure_loaded(&self, locale: &str) -> Result<(), LocaleError> {
        if !self.settings.is_available(locale) {
            return Err(LocaleError::Unavailable(locale.to_string()));
        }

        let path = self.resource_path(locale);
        if self.state.read().search_path.contains(&path) {
            return Ok(());
        }

        let entries = read_translations(&path, locale).await?;

        let mut state = self.state.write();
        // Another request may have loaded it while the file was being read
        if !state.search_path.contains(&path) {
            state.search_path.push(path.clone());
            state.translations.insert(locale.to_string(), entries);
            tracing::info!(locale, path = %path.display(), "translations loaded");
        }
        Ok(())
    }

    /// Drops a locale's resource path and any translations loaded from it.
    pub fn discard(&self, locale: &str) {
        let path = self.resource_path(locale);
        let mut state = self.state.write();
        state.search_path.retain(|p| p != &path);
        state.translations.remove(locale);
    }

    /// Looks `key` up in `locale`, then the default locale, then gives back
    /// the key itself.
    pub fn translate(&self, locale: &str, key: &str) -> String {
        let state = self.state.read();
        [locale, self.settings.default_locale.as_str()]
            .iter()
            .find_map(|l| state.translations.get(*l).and_then(|t| t.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

async fn read_translations(
    path: &Path,
    locale: &str,
) -> Result<HashMap<String, String>, LocaleError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LocaleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let value: Value = serde_json::from_str(&raw).map_err(|source| LocaleError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let root = match value {
        Value::Object(mut map) => match map.remove(locale) {
            Some(Value::Object(inner)) if map.is_empty() => inner,
            Some(other) => {
                map.insert(locale.to_string(), other);
                map
            }
            None => map,
        },
        _ => {
            return Err(LocaleError::NotAnObject {
                path: path.to_path_buf(),
            })
        }
    };

    let mut flat = HashMap::new();
    flatten("", &Value::Object(root), &mut flat);
    Ok(flat)
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, child, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Null => {}
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_in(dir: &Path) -> TranslationCatalog {
        TranslationCatalog::new(LocaleSettings {
            dir: dir.to_path_buf(),
            default_locale: "en".to_string(),
            available: vec!["en".to_string(), "cy".to_string(), "xx".to_string()],
        })
    }

    #[tokio::test]
    async fn loads_nested_keys_under_locale_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("cy.json"),
            r#"{"cy": {"posts": {"index": {"title": "Negeseuon"}}}}"#,
        )
        .unwrap();
        let catalog = catalog_in(dir.path());

        catalog.ensure_loaded("cy").await.unwrap();
        assert_eq!(catalog.translate("cy", "posts.index.title"), "Negeseuon");
        assert_eq!(catalog.translate("cy", "missing.key"), "missing.key");
    }

    #[tokio::test]
    async fn loading_twice_keeps_one_search_path_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"hello": "Hello"}"#).unwrap();
        let catalog = catalog_in(dir.path());

        catalog.ensure_loaded("en").await.unwrap();
        catalog.ensure_loaded("en").await.unwrap();
        assert_eq!(catalog.search_path(), vec![dir.path().join("en.json")]);
    }

    #[tokio::test]
    async fn failures_leave_search_path_untouched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("xx.json"), "{ not json").unwrap();
        let catalog = catalog_in(dir.path());

        assert!(matches!(
            catalog.ensure_loaded("xx").await,
            Err(LocaleError::Parse { .. })
        ));
        assert!(matches!(
            catalog.ensure_loaded("cy").await,
            Err(LocaleError::Read { .. })
        ));
        assert!(matches!(
            catalog.ensure_loaded("fr").await,
            Err(LocaleError::Unavailable(_))
        ));
        assert!(catalog.search_path().is_empty());
    }

    #[tokio::test]
    async fn falls_back_to_default_locale_translation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"nav": {"home": "Home"}}"#).unwrap();
        std::fs::write(dir.path().join("cy.json"), r#"{"nav": {}}"#).unwrap();
        let catalog = catalog_in(dir.path());
        catalog.ensure_loaded("en").await.unwrap();
        catalog.ensure_loaded("cy").await.unwrap();

        assert_eq!(catalog.translate("cy", "nav.home"), "Home");

        catalog.discard("en");
        assert_eq!(catalog.translate("cy", "nav.home"), "nav.home");
        assert_eq!(catalog.search_path(), vec![dir.path().join("cy.json")]);
    }
}
