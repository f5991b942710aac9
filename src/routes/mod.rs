// src/routes/mod.rs
pub mod admin;
pub mod articles;
pub mod chat;
pub mod content;
pub mod forms;

use crate::state::SharedState;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn create_router(state: SharedState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/articles",
            get(articles::admin_snapshot_handler).post(articles::upsert_article_handler),
        )
        .route("/articles/{index}", delete(articles::delete_article_handler))
        .route("/articles/export", get(articles::export_handler))
        .route("/appointments", get(admin::appointments_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin::auth_middleware,
        ))
        .route("/login", post(admin::login_handler))
        .route("/logout", post(admin::logout_handler));

    let api_routes = Router::new()
        .route("/chat", post(chat::chat_handler))
        .route("/chat/sessions", post(chat::create_session_handler))
        .route(
            "/chat/sessions/{id}",
            get(chat::get_session_handler).delete(chat::close_session_handler),
        )
        .route("/i18n/{lang}", get(content::table_handler))
        .route("/i18n/{lang}/{key}", get(content::translate_handler))
        .route("/content/{lang}/practice-areas", get(content::practice_areas_handler))
        .route("/content/{lang}/features", get(content::features_handler))
        .route("/content/{lang}/faq", get(content::faq_handler))
        .route("/content/{lang}/testimonials", get(content::testimonials_handler))
        .route("/articles", get(articles::list_articles_handler))
        .route("/contact", post(forms::contact_handler))
        .route("/appointments", post(forms::appointment_handler))
        .route("/visitors/{id}/flags/{flag}", post(forms::visitor_flag_handler));

    let public_dir = state.config.public_dir.clone();

    Router::new()
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .route("/articles.json", get(articles::document_handler))
        .route("/health", get(|| async { "OK" }))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
