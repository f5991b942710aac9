//! Article snapshots and the edits the admin can make to them.
//!
//! Articles are stored as three parallel arrays, one per language. Index `i`
//! of each array describes the same article, so every edit touches all three.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::translator::Language;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub image_url: String,
    pub category: String,
    pub title: String,
    pub excerpt: String,
}

/// One logical article in every language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleEntry {
    pub ar: Article,
    pub fr: Article,
    pub en: Article,
}

impl ArticleEntry {
    /// The image is shared by all languages; the Arabic one is authoritative.
    fn with_shared_image(mut self) -> Self {
        let image = self.ar.image_url.clone();
        self.fr.image_url = image.clone();
        self.en.image_url = image;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSet {
    pub ar: Vec<Article>,
    pub fr: Vec<Article>,
    pub en: Vec<Article>,
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("article {index} does not exist ({len} articles)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("articles changed since version {expected} (now {current})")]
    StaleVersion { expected: u64, current: u64 },

    #[error("failed to write articles: {0}")]
    Io(#[from] std::io::Error),
}

impl ArticleSet {
    pub fn len(&self) -> usize {
        self.ar.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ar.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        self.ar.len() == self.fr.len() && self.ar.len() == self.en.len()
    }

    pub fn for_language(&self, lang: Language) -> &[Article] {
        match lang {
            Language::Ar => &self.ar,
            Language::Fr => &self.fr,
            Language::En => &self.en,
        }
    }

    /// Cut every language down to the shortest one. Returns how many entries were dropped.
    pub fn truncate_to_aligned(&mut self) -> usize {
        let shortest = self.ar.len().min(self.fr.len()).min(self.en.len());
        let dropped = self.ar.len() + self.fr.len() + self.en.len() - 3 * shortest;
        self.ar.truncate(shortest);
        self.fr.truncate(shortest);
        self.en.truncate(shortest);
        dropped
    }

    fn check_index(&self, index: usize) -> Result<(), EditError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(EditError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }
}

/// Append `entry` when `index` is `None`, otherwise replace the article at `index`.
pub fn upsert(set: &ArticleSet, index: Option<usize>, entry: ArticleEntry) -> Result<ArticleSet, EditError> {
    let entry = entry.with_shared_image();
    let mut next = set.clone();

    match index {
        None => {
            next.ar.push(entry.ar);
            next.fr.push(entry.fr);
            next.en.push(entry.en);
        }
        Some(i) => {
            set.check_index(i)?;
            next.ar[i] = entry.ar;
            next.fr[i] = entry.fr;
            next.en[i] = entry.en;
        }
    }
    Ok(next)
}

pub fn delete(set: &ArticleSet, index: usize) -> Result<ArticleSet, EditError> {
    set.check_index(index)?;
    let mut next = set.clone();
    next.ar.remove(index);
    next.fr.remove(index);
    next.en.remove(index);
    Ok(next)
}

/// The document as it should be pasted into `articles.json`.
pub fn export_json(set: &ArticleSet) -> String {
    // Plain structs of strings always serialize.
    serde_json::to_string_pretty(set).unwrap_or_default()
}
