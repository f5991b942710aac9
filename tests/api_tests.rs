use lawfirm_backend::config::Config;
use lawfirm_backend::message::{AdminLoginResponse, ArticlesSnapshot, ChatResponse, FlagResponse};
use lawfirm_backend::routes::create_router;
use lawfirm_backend::services::gemini::{ChatBackend, RemoteError};
use lawfirm_backend::state::AppState;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;
use uuid::Uuid;

const PASSWORD: &str = "letmein";

fn test_config() -> Config {
    let dir = std::env::temp_dir().join(format!("lawfirm-api-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    Config {
        public_dir: dir.join("public"),
        articles_path: dir.join("articles.json"),
        appointments_path: dir.join("appointments.json"),
        admin_password: Some(PASSWORD.to_string()),
        chat_backoff: Duration::from_millis(1),
        ..Config::default()
    }
}

async fn app_with(config: Config) -> Router {
    let state = Arc::new(AppState::with_backend(config, None).await.unwrap());
    create_router(state)
}

async fn app() -> Router {
    app_with(test_config()).await
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = send(app, post_json("/admin/login", json!({ "password": PASSWORD }))).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value::<AdminLoginResponse>(body).unwrap().token
}

fn with_token(mut req: Request<Body>, token: &str) -> Request<Body> {
    req.headers_mut()
        .insert("x-admin-token", token.parse().unwrap());
    req
}

fn entry(title: &str) -> Value {
    let article = |lang: &str| {
        json!({
            "image_url": "/img/lease.jpg",
            "category": "immobilier",
            "title": format!("{title} {lang}"),
            "excerpt": "..."
        })
    };
    json!({ "ar": article("ar"), "fr": article("fr"), "en": article("en") })
}

#[tokio::test]
async fn health_check() {
    let response = app().await.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_chat_endpoint() {
    let app = app().await;
    let (status, body) = send(
        &app,
        post_json("/api/chat", json!({ "message": "كم تكلفة الاستشارة؟", "session_id": null })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let chat_resp: ChatResponse = serde_json::from_value(body).unwrap();
    assert!(chat_resp.reply.starts_with("تختلف أتعاب المحاماة"));
    assert!(chat_resp.fallback);
    assert!(!chat_resp.session_id.is_empty());
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let app = app().await;
    let (status, body) = send(&app, post_json("/api/chat", json!({ "message": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message cannot be empty");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = app().await;
    let (status, _) = send(
        &app,
        post_json("/api/chat", json!({ "message": "hi", "session_id": "gone" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn widget_session_flow() {
    let app = app().await;

    let (status, view) = send(&app, post_json("/api/chat/sessions", json!({ "language": "en" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = view["session_id"].as_str().unwrap().to_string();
    assert_eq!(view["messages"][0]["sender"], "bot");
    let first_chip = view["messages"][0]["suggestions"][0].as_str().unwrap().to_string();

    // Clicking a suggestion chip sends its text.
    let (status, body) = send(
        &app,
        post_json("/api/chat", json!({ "message": first_chip, "session_id": session_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"].as_str().unwrap().starts_with("Our areas of expertise"));

    let (_, view) = send(&app, get(&format!("/api/chat/sessions/{session_id}"))).await;
    let messages = view["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert!(messages.iter().all(|m| m.get("suggestions").is_none()));
    assert_eq!(view["pending"], false);
    assert_eq!(view["last_error"], "api_key");

    let close = Request::builder()
        .method("DELETE")
        .uri(format!("/api/chat/sessions/{session_id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, close).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/api/chat/sessions/{session_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// A model that never answers in time.
struct StalledBackend;

#[async_trait]
impl ChatBackend for StalledBackend {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn generate(&self, _system_prompt: &str, _utterance: &str) -> Result<String, RemoteError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("too late".to_string())
    }
}

async fn session_pending(app: &Router, session_id: &str) -> bool {
    let (_, view) = send(app, get(&format!("/api/chat/sessions/{session_id}"))).await;
    view["pending"].as_bool().unwrap()
}

#[tokio::test]
async fn dropped_chat_request_releases_session() {
    let backend: Arc<dyn ChatBackend> = Arc::new(StalledBackend);
    let state = Arc::new(AppState::with_backend(test_config(), Some(backend)).await.unwrap());
    let app = create_router(state);

    let (_, view) = send(&app, post_json("/api/chat/sessions", json!({ "language": "en" }))).await;
    let session_id = view["session_id"].as_str().unwrap().to_string();

    let request = app.clone().oneshot(post_json(
        "/api/chat",
        json!({ "message": "hello", "session_id": session_id }),
    ));
    let in_flight = tokio::spawn(request);

    let mut pending = false;
    for _ in 0..100 {
        pending = session_pending(&app, &session_id).await;
        if pending {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(pending, "chat turn never started");

    in_flight.abort();
    assert!(in_flight.await.unwrap_err().is_cancelled());

    for _ in 0..100 {
        pending = session_pending(&app, &session_id).await;
        if !pending {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!pending, "session still waiting on a dropped request");

    let (_, view) = send(&app, get(&format!("/api/chat/sessions/{session_id}"))).await;
    let senders: Vec<&str> = view["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["sender"].as_str().unwrap())
        .collect();
    assert_eq!(senders, vec!["bot", "user"]);
}

#[tokio::test]
async fn translation_lookup_and_fallback() {
    let app = app().await;

    let (status, value) = send(&app, get("/api/i18n/fr/hero.cta")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!("Prendre rendez-vous"));

    let (_, value) = send(&app, get("/api/i18n/fr/no.such.key")).await;
    assert_eq!(value, json!("no.such.key"));

    let (_, value) = send(&app, get("/api/i18n/ar/chatbot_suggestions")).await;
    assert!(value.is_array());

    let (status, _) = send(&app, get("/api/i18n/de/hero.cta")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn practice_areas_resolve_icons() {
    let app = app().await;
    let (status, cards) = send(&app, get("/api/content/en/practice-areas")).await;
    assert_eq!(status, StatusCode::OK);
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), 6);
    assert_eq!(cards[0]["icon"]["name"], "document");
    assert_eq!(cards[0]["icon"]["src"], "/icons/document.svg");

    let (status, faq) = send(&app, get("/api/content/ar/faq")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(faq[0]["question"].is_string());
}

#[tokio::test]
async fn missing_article_file_is_an_empty_list() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/articles?lang=fr")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, get("/articles.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ar": [], "fr": [], "en": [] }));
}

#[tokio::test]
async fn admin_requires_login() {
    let app = app().await;

    let (status, _) = send(&app, get("/admin/articles")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, post_json("/admin/login", json!({ "password": "guess" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = admin_token(&app).await;
    let (status, _) = send(&app, with_token(get("/admin/articles"), &token)).await;
    assert_eq!(status, StatusCode::OK);

    let logout = with_token(post_json("/admin/logout", json!({})), &token);
    let (status, _) = send(&app, logout).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, with_token(get("/admin/articles"), &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_login_disabled_without_password() {
    let config = Config {
        admin_password: None,
        ..test_config()
    };
    let app = app_with(config).await;
    let (status, _) = send(&app, post_json("/admin/login", json!({ "password": "" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_article_editing() {
    let config = test_config();
    let articles_path = config.articles_path.clone();
    let app = app_with(config).await;
    let token = admin_token(&app).await;

    let add = |version: u64, title: &str| {
        with_token(
            post_json(
                "/admin/articles",
                json!({ "index": null, "article": entry(title), "version": version }),
            ),
            &token,
        )
    };

    let (status, body) = send(&app, add(0, "Bail")).await;
    assert_eq!(status, StatusCode::OK);
    let snap: ArticlesSnapshot = serde_json::from_value(body).unwrap();
    assert_eq!(snap.version, 1);
    assert_eq!(snap.articles.len(), 1);

    let (_, body) = send(&app, add(1, "Divorce")).await;
    let snap: ArticlesSnapshot = serde_json::from_value(body).unwrap();
    assert_eq!(snap.version, 2);
    assert!(snap.articles.is_aligned());

    // Stale editor.
    let (status, _) = send(&app, add(1, "Late")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Replace index 0.
    let replace = with_token(
        post_json(
            "/admin/articles",
            json!({ "index": 0, "article": entry("Bail commercial"), "version": 2 }),
        ),
        &token,
    );
    let (status, body) = send(&app, replace).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articles"]["fr"][0]["title"], "Bail commercial fr");

    // Public listing sees the change.
    let (_, list) = send(&app, get("/api/articles?lang=en")).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert_eq!(list[1]["title"], "Divorce en");

    let delete = |uri: &str| {
        with_token(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
            &token,
        )
    };
    let (status, _) = send(&app, delete("/admin/articles/9?version=3")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, delete("/admin/articles/0?version=3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 4);
    assert_eq!(body["articles"]["ar"][0]["title"], "Divorce ar");

    let (status, exported) = send(&app, with_token(get("/admin/articles/export"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&articles_path).unwrap()).unwrap();
    assert_eq!(exported, on_disk);
}

#[tokio::test]
async fn appointment_booking() {
    let app = app().await;
    let next_week = (chrono::Utc::now().date_naive() + chrono::Days::new(7)).to_string();

    let (status, body) = send(
        &app,
        post_json(
            "/api/appointments?lang=en",
            json!({
                "name": "Yacine",
                "email": "yacine@example.dz",
                "phone": "0555 12 34 56",
                "date": next_week,
                "time": "12:15",
                "service": "civil"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("time"));

    let (status, body) = send(
        &app,
        post_json(
            "/api/appointments?lang=en",
            json!({
                "name": "Yacine",
                "email": "yacine@example.dz",
                "phone": "0555 12 34 56",
                "date": next_week,
                "time": "14:30",
                "service": "real-estate",
                "message": "Lease dispute"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["status"].as_str().unwrap().contains("received"));
    let id = body["id"].as_str().unwrap().to_string();

    let token = admin_token(&app).await;
    let (_, list) = send(&app, with_token(get("/admin/appointments"), &token)).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["service"], "real-estate");
}

#[tokio::test]
async fn appointment_in_the_past_is_rejected() {
    let app = app().await;
    let (status, body) = send(
        &app,
        post_json(
            "/api/appointments",
            json!({
                "name": "Yacine",
                "email": "yacine@example.dz",
                "phone": "0555 12 34 56",
                "date": "1999-01-01",
                "time": "14:30",
                "service": "civil"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "date: in the past");

    let token = admin_token(&app).await;
    let (_, list) = send(&app, with_token(get("/admin/appointments"), &token)).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn contact_without_relay_reports_error_status() {
    let app = app().await;
    let (status, body) = send(
        &app,
        post_json(
            "/api/contact?lang=en",
            json!({ "name": "N", "email": "n@example.dz", "message": "hello" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert!(body["status"].as_str().unwrap().starts_with("Something went wrong"));
}

#[tokio::test]
async fn visitor_flags_fire_once() {
    let app = app().await;
    let uri = "/api/visitors/abc/flags/welcome_modal";

    let (status, body) = send(&app, post_json(uri, json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(serde_json::from_value::<FlagResponse>(body).unwrap().first_time);

    let (_, body) = send(&app, post_json(uri, json!({}))).await;
    assert!(!serde_json::from_value::<FlagResponse>(body).unwrap().first_time);

    let (status, _) = send(&app, post_json("/api/visitors/abc/flags/popup", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
