// src/services/article_store.rs
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::article_editor::{Article, ArticleSet, EditError, export_json};

/// Snapshot plus the version admin edits must be based on.
#[derive(Debug, Clone, Default)]
struct Versioned {
    version: u64,
    articles: ArticleSet,
}

/// The article document on disk, held in memory behind a version counter.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    path: PathBuf,
    inner: Arc<RwLock<Versioned>>,
}

#[derive(Deserialize)]
struct RawDocument {
    ar: Option<Vec<Article>>,
    fr: Option<Vec<Article>>,
    en: Option<Vec<Article>>,
}

/// Read the document. Never fails: anything unreadable is treated as "no articles yet".
pub async fn load_document(path: &Path) -> ArticleSet {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("{} not found, starting with no articles", path.display());
            return ArticleSet::default();
        }
        Err(e) => {
            error!("failed to read {}: {e}", path.display());
            return ArticleSet::default();
        }
    };

    if text.trim().is_empty() {
        return ArticleSet::default();
    }

    let mut set = match serde_json::from_str::<RawDocument>(&text) {
        Ok(RawDocument {
            ar: Some(ar),
            fr: Some(fr),
            en: Some(en),
        }) => ArticleSet { ar, fr, en },
        Ok(_) => {
            warn!("{} is missing a language array, ignoring it", path.display());
            return ArticleSet::default();
        }
        Err(e) => {
            warn!("{} is malformed ({e}), ignoring it", path.display());
            return ArticleSet::default();
        }
    };

    if !set.is_aligned() {
        let dropped = set.truncate_to_aligned();
        warn!(
            "{} has language arrays of different lengths, dropped {dropped} unmatched article(s)",
            path.display()
        );
    }
    set
}

impl ArticleStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let articles = load_document(&path).await;
        info!("loaded {} article(s) from {}", articles.len(), path.display());
        Self {
            path,
            inner: Arc::new(RwLock::new(Versioned {
                version: 0,
                articles,
            })),
        }
    }

    pub async fn snapshot(&self) -> (u64, ArticleSet) {
        let guard = self.inner.read().await;
        (guard.version, guard.articles.clone())
    }

    pub async fn articles(&self) -> ArticleSet {
        self.inner.read().await.articles.clone()
    }

    /// Apply an edit made against `expected_version`, write it to disk and bump the version.
    pub async fn apply<F>(&self, expected_version: u64, edit: F) -> Result<(u64, ArticleSet), EditError>
    where
        F: FnOnce(&ArticleSet) -> Result<ArticleSet, EditError>,
    {
        let mut guard = self.inner.write().await;
        if guard.version != expected_version {
            return Err(EditError::StaleVersion {
                expected: expected_version,
                current: guard.version,
            });
        }

        let next = edit(&guard.articles)?;
        self.persist(&next).await?;

        guard.version += 1;
        guard.articles = next;
        info!(version = guard.version, count = guard.articles.len(), "articles updated");
        Ok((guard.version, guard.articles.clone()))
    }

    // Write to a sibling temp file and rename over the original.
    async fn persist(&self, set: &ArticleSet) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let written = match tokio::fs::write(&tmp, export_json(set)).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &written {
            error!("failed to save {}: {e}", self.path.display());
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("could not remove {}: {cleanup}", tmp.display());
                }
            }
        }
        written
    }
}
