//! Nested key lookup over the static ar/fr/en translation table.
//!
//! A dotted key such as `faq.0.question` is walked one segment at a
//! time from the language's sub-table. Whenever the walk cannot continue the
//! key itself is returned, so a missing translation shows up on the page as
//! its key rather than as an error.

use std::{collections::HashMap, fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use super::icons::{Feature, ServiceItem};

const BUILTIN_TABLE: &str = include_str!("../../assets/translations.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ar,
    Fr,
    En,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Ar, Language::Fr, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::Fr => "fr",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ar" => Ok(Language::Ar),
            "fr" => Ok(Language::Fr),
            "en" => Ok(Language::En),
            other => Err(TranslateError::UnknownLanguage(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("unknown language {0:?}")]
    UnknownLanguage(String),

    #[error("translation key {0:?} not found")]
    Missing(String),

    #[error("translation key {key:?} has the wrong shape: {source}")]
    Shape {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid translation table: {0}")]
    Table(String),

    #[error("failed to read translation table: {0}")]
    Io(#[from] std::io::Error),
}

/// Immutable per-language translation trees.
#[derive(Debug, Clone)]
pub struct Translator {
    tables: HashMap<Language, Value>,
    default_language: Language,
}

impl Translator {
    /// Build a translator from a `{ "ar": {...}, "fr": {...}, "en": {...} }` document.
    /// Languages missing from the document fall back to the default language.
    pub fn from_value(doc: Value) -> Result<Self, TranslateError> {
        let Value::Object(map) = doc else {
            return Err(TranslateError::Table("top level must be an object".into()));
        };

        let mut tables = HashMap::new();
        for (code, table) in map {
            let lang: Language = code.parse()?;
            if !table.is_object() {
                return Err(TranslateError::Table(format!("{code} table must be an object")));
            }
            tables.insert(lang, table);
        }

        let translator = Self {
            tables,
            default_language: Language::default(),
        };
        translator.validate()?;
        Ok(translator)
    }

    pub fn from_json(raw: &str) -> Result<Self, TranslateError> {
        let doc: Value = serde_json::from_str(raw)
            .map_err(|e| TranslateError::Table(e.to_string()))?;
        Self::from_value(doc)
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Result<Self, TranslateError> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Load from `path` when given, otherwise use the built-in table.
    pub fn load(path: Option<&Path>) -> Result<Self, TranslateError> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                tracing::info!("loaded translations from {}", path.display());
                Self::from_json(&raw)
            }
            None => Self::builtin(),
        }
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    /// Whole tree for a language, after default-language fallback.
    pub fn table(&self, lang: Language) -> Option<&Value> {
        self.tables
            .get(&lang)
            .or_else(|| self.tables.get(&self.default_language))
    }

    /// Resolve `key` without the identity fallback.
    pub fn lookup(&self, key: &str, lang: Language) -> Option<&Value> {
        let mut current = self.table(lang)?;
        for segment in key.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
            if current.is_null() {
                return None;
            }
        }
        Some(current)
    }

    /// Resolve `key`, returning the key itself as a string when it does not resolve.
    pub fn translate(&self, key: &str, lang: Language) -> Value {
        self.lookup(key, lang)
            .cloned()
            .unwrap_or_else(|| Value::String(key.to_string()))
    }

    /// Resolve a key that must be a string.
    pub fn text(&self, key: &str, lang: Language) -> String {
        match self.lookup(key, lang) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                if cfg!(debug_assertions) {
                    panic!("translation {key:?} is not a string: {other}");
                }
                tracing::error!("translation {key:?} is not a string");
                key.to_string()
            }
            None => key.to_string(),
        }
    }

    /// Resolve a key that must be a list of strings. A missing key yields an empty list.
    pub fn list(&self, key: &str, lang: Language) -> Vec<String> {
        match self.lookup(key, lang) {
            Some(value) => match serde_json::from_value::<Vec<String>>(value.clone()) {
                Ok(items) => items,
                Err(e) => {
                    if cfg!(debug_assertions) {
                        panic!("translation {key:?} is not a string list: {e}");
                    }
                    tracing::error!("translation {key:?} is not a string list: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        }
    }

    /// Resolve a key and deserialize it into the shape the caller expects.
    pub fn shaped<T: DeserializeOwned>(&self, key: &str, lang: Language) -> Result<T, TranslateError> {
        let value = self
            .lookup(key, lang)
            .ok_or_else(|| TranslateError::Missing(key.to_string()))?;
        serde_json::from_value(value.clone()).map_err(|source| TranslateError::Shape {
            key: key.to_string(),
            source,
        })
    }

    // Structured sections carry icon names; check them once so a typo fails at startup.
    fn validate(&self) -> Result<(), TranslateError> {
        for (&lang, _) in self.tables.iter() {
            if self.lookup("practice_areas", lang).is_some() {
                self.shaped::<Vec<ServiceItem>>("practice_areas", lang)?;
            }
            if self.lookup("why_choose_us", lang).is_some() {
                self.shaped::<Vec<Feature>>("why_choose_us", lang)?;
            }
        }
        Ok(())
    }
}
