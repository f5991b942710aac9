use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    message::{ArticlesSnapshot, LanguageQuery, UpsertArticleRequest, VersionQuery},
    services::article_editor::{self, Article, ArticleSet},
    state::SharedState,
};

pub async fn list_articles_handler(
    State(state): State<SharedState>,
    Query(query): Query<LanguageQuery>,
) -> Json<Vec<Article>> {
    let lang = query.lang.unwrap_or(state.translator.default_language());
    let articles = state.articles.articles().await;
    Json(articles.for_language(lang).to_vec())
}

/// The whole `{ ar, fr, en }` document, as the static file would serve it.
pub async fn document_handler(State(state): State<SharedState>) -> Json<ArticleSet> {
    Json(state.articles.articles().await)
}

pub async fn admin_snapshot_handler(State(state): State<SharedState>) -> Json<ArticlesSnapshot> {
    let (version, articles) = state.articles.snapshot().await;
    Json(ArticlesSnapshot { version, articles })
}

pub async fn upsert_article_handler(
    State(state): State<SharedState>,
    Json(payload): Json<UpsertArticleRequest>,
) -> Result<Json<ArticlesSnapshot>, AppError> {
    let UpsertArticleRequest {
        index,
        article,
        version,
    } = payload;

    let (version, articles) = state
        .articles
        .apply(version, |set| article_editor::upsert(set, index, article))
        .await?;
    Ok(Json(ArticlesSnapshot { version, articles }))
}

pub async fn delete_article_handler(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
    Query(query): Query<VersionQuery>,
) -> Result<Json<ArticlesSnapshot>, AppError> {
    let (version, articles) = state
        .articles
        .apply(query.version, |set| article_editor::delete(set, index))
        .await?;
    Ok(Json(ArticlesSnapshot { version, articles }))
}

pub async fn export_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let articles = state.articles.articles().await;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        article_editor::export_json(&articles),
    )
}
