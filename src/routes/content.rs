use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::AppError,
    services::{
        icons::{FaqItem, Feature, IconRef, ServiceItem, Testimonial},
        translator::Language,
    },
    state::SharedState,
};

#[derive(Serialize)]
pub struct Card {
    pub icon: IconRef,
    pub title: String,
    pub description: String,
}

impl From<ServiceItem> for Card {
    fn from(item: ServiceItem) -> Self {
        Self {
            icon: item.icon.into(),
            title: item.title,
            description: item.description,
        }
    }
}

impl From<Feature> for Card {
    fn from(item: Feature) -> Self {
        Self {
            icon: item.icon.into(),
            title: item.title,
            description: item.description,
        }
    }
}

pub async fn table_handler(
    State(state): State<SharedState>,
    Path(lang): Path<Language>,
) -> Result<Json<Value>, AppError> {
    state
        .translator
        .table(lang)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("translations for {lang}")))
}

/// Always succeeds: an unknown key comes back as the key itself.
pub async fn translate_handler(
    State(state): State<SharedState>,
    Path((lang, key)): Path<(Language, String)>,
) -> Json<Value> {
    Json(state.translator.translate(&key, lang))
}

pub async fn practice_areas_handler(
    State(state): State<SharedState>,
    Path(lang): Path<Language>,
) -> Result<Json<Vec<Card>>, AppError> {
    let items: Vec<ServiceItem> = state.translator.shaped("practice_areas", lang)?;
    Ok(Json(items.into_iter().map(Card::from).collect()))
}

pub async fn features_handler(
    State(state): State<SharedState>,
    Path(lang): Path<Language>,
) -> Result<Json<Vec<Card>>, AppError> {
    let items: Vec<Feature> = state.translator.shaped("why_choose_us", lang)?;
    Ok(Json(items.into_iter().map(Card::from).collect()))
}

pub async fn faq_handler(
    State(state): State<SharedState>,
    Path(lang): Path<Language>,
) -> Result<Json<Vec<FaqItem>>, AppError> {
    Ok(Json(state.translator.shaped("faq", lang)?))
}

pub async fn testimonials_handler(
    State(state): State<SharedState>,
    Path(lang): Path<Language>,
) -> Result<Json<Vec<Testimonial>>, AppError> {
    Ok(Json(state.translator.shaped("testimonials", lang)?))
}
