//! HTTP server: application state, router, page and API handlers.

use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect},
    routing::get,
    Router,
};

use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use askama::Template;
use moka::future::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::views::{build_family_page, build_series_page, FamilyPage, SeriesPage};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::featured::{featured_for_week, week_key_now, FeaturedCard, FeaturedDebug};
use crate::forms::{contact, message_ref, order};
use crate::mail::Mailer;
use crate::studies::{Study, StudyPage, StudyStore};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub studies: Arc<StudyStore>,
    pub mailer: Arc<Mailer>,
    pub cache: Cache<String, serde_json::Value>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        tracing::info!("Loading catalog...");
        let catalog = Arc::new(Catalog::load(&config.data_dir.join("products.json"))?);
        tracing::info!(
            "Loaded {} families across {} series",
            catalog.family_count(),
            catalog.series().len()
        );

        let studies_path = config.data_dir.join("studies.json");
        let studies = match StudyStore::load(&studies_path) {
            Ok(s) => {
                tracing::info!("Loaded {} clinical studies", s.len());
                Arc::new(s)
            }
            Err(e) => {
                tracing::warn!("No clinical studies available: {}", e);
                Arc::new(StudyStore::default())
            }
        };

        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(Duration::from_secs(300))
            .build();

        let mailer = Arc::new(Mailer::new(config.mail.clone()));

        Ok(Self {
            config: Arc::new(config),
            catalog,
            studies,
            mailer,
            cache,
        })
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Pages
        .route("/", get(home_page))
        .route("/catalog/series/:series", get(series_page))
        .route("/catalog/:family", get(family_page))
        .route("/clinical", get(studies_index))
        .route("/clinical/:slug", get(study_page))
        .route("/contact", get(contact_page).post(contact_submit))
        .route("/contact/thank-you", get(thank_you_page))
        .route("/ordering", get(ordering_page).post(ordering_submit))
        // JSON API
        .route("/api/featured", get(api_featured))
        .route("/api/catalog/:family", get(api_family))
        // Static assets
        .nest_service("/images", ServeDir::new(static_dir))
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Debug, Clone)]
pub struct SeriesLink {
    pub slug: String,
    pub label: String,
    pub description: String,
}

#[derive(Template)]
#[template(path = "pages/home.html")]
struct HomeTemplate {
    featured: Vec<FeaturedCard>,
    series: Vec<SeriesLink>,
}

#[derive(Template)]
#[template(path = "pages/series.html")]
struct SeriesTemplate {
    page: SeriesPage,
}

#[derive(Template)]
#[template(path = "pages/family.html")]
struct FamilyTemplate {
    page: FamilyPage,
    series_label: String,
    series_slug: String,
    selected_sku: String,
}

#[derive(Template)]
#[template(path = "pages/studies.html")]
struct StudiesTemplate {
    studies: Vec<Study>,
}

#[derive(Template)]
#[template(path = "pages/study.html")]
struct StudyTemplate {
    page: StudyPage,
}

#[derive(Template)]
#[template(path = "pages/contact.html")]
struct ContactTemplate {
    error: String,
}

#[derive(Template)]
#[template(path = "pages/ordering.html")]
struct OrderingTemplate {}

#[derive(Template)]
#[template(path = "pages/thank_you.html")]
struct ThankYouTemplate {
    msg_ref: String,
}

fn render<T: Template>(template: T) -> Html<String> {
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

// ============================================================================
// Page Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn home_page(State(state): State<AppState>) -> impl IntoResponse {
    let week = week_key_now();
    let featured = featured_for_week(&state.catalog, &week);
    let series = state
        .catalog
        .series()
        .iter()
        .map(|s| SeriesLink {
            slug: s.slug.clone(),
            label: if s.label.is_empty() {
                s.slug.clone()
            } else {
                s.label.clone()
            },
            description: s.description.clone(),
        })
        .collect();
    render(HomeTemplate { featured, series })
}

async fn series_page(
    State(state): State<AppState>,
    Path(series): Path<String>,
) -> Result<Html<String>, AppError> {
    let raw = state
        .catalog
        .series_by_slug(&series)
        .ok_or_else(|| AppError::NotFound(format!("Series {} not found", series)))?;
    let page = build_series_page(&state.catalog, raw);
    Ok(render(SeriesTemplate { page }))
}

#[derive(Deserialize, Default)]
struct FamilyQuery {
    sku: Option<String>,
}

async fn family_page(
    State(state): State<AppState>,
    Path(family): Path<String>,
    Query(q): Query<FamilyQuery>,
) -> Result<Html<String>, AppError> {
    let (series, fam) = state
        .catalog
        .find_family(&family)
        .ok_or_else(|| AppError::NotFound(format!("Product family {} not found", family)))?;
    let page = build_family_page(&state.catalog, fam);
    Ok(render(FamilyTemplate {
        page,
        series_label: series.map(|s| s.label.clone()).unwrap_or_default(),
        series_slug: series.map(|s| s.slug.clone()).unwrap_or_default(),
        selected_sku: q.sku.unwrap_or_default(),
    }))
}

async fn studies_index(State(state): State<AppState>) -> impl IntoResponse {
    render(StudiesTemplate {
        studies: state.studies.all().to_vec(),
    })
}

async fn study_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let page = state
        .studies
        .page(&slug)
        .ok_or_else(|| AppError::NotFound(format!("Study {} not found", slug)))?;
    Ok(render(StudyTemplate { page }))
}

async fn contact_page() -> impl IntoResponse {
    render(ContactTemplate {
        error: String::new(),
    })
}

#[derive(Deserialize, Default)]
struct ThankYouQuery {
    #[serde(rename = "ref")]
    msg_ref: Option<String>,
}

async fn thank_you_page(Query(q): Query<ThankYouQuery>) -> impl IntoResponse {
    render(ThankYouTemplate {
        msg_ref: q.msg_ref.unwrap_or_default(),
    })
}

async fn ordering_page() -> impl IntoResponse {
    render(OrderingTemplate {})
}

// ============================================================================
// Form Handlers
// ============================================================================

async fn contact_submit(
    State(state): State<AppState>,
    Form(form): Form<contact::ContactForm>,
) -> Result<axum::response::Response, AppError> {
    // Bots that fill the honeypot get a convincing thank-you and nothing
    // is sent.
    if form.is_honeypot_tripped() {
        tracing::info!("contact honeypot tripped, dropping submission");
        let fake_ref = message_ref();
        return Ok(
            Redirect::to(&format!("/contact/thank-you?ref={}", fake_ref)).into_response(),
        );
    }

    // Validation failures re-render the form with the message inline.
    if let Err(msg) = contact::validate(&form) {
        return Ok((
            StatusCode::BAD_REQUEST,
            render(ContactTemplate {
                error: msg.to_string(),
            }),
        )
            .into_response());
    }

    let msg_ref = message_ref();
    let mail = contact::build_email(
        &form,
        &msg_ref,
        state.mailer.config(),
        &state.config.site_host,
    );
    let outcome = state
        .mailer
        .send(&mail)
        .await
        .map_err(|e| AppError::Mail(e.to_string()))?;
    tracing::info!(
        transport = outcome.transport,
        msg_ref = %msg_ref,
        "contact submission sent"
    );

    Ok(Redirect::to(&format!("/contact/thank-you?ref={}", msg_ref)).into_response())
}

async fn ordering_submit(
    State(state): State<AppState>,
    Form(form): Form<order::OrderForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    if form.is_honeypot_tripped() {
        return Err(AppError::BadRequest("Invalid submission.".to_string()));
    }

    if let Err(msg) = order::validate(&form) {
        return Err(AppError::BadRequest(msg.to_string()));
    }

    let msg_ref = message_ref();
    let (support, confirmation) =
        order::build_emails(&form, state.mailer.config(), &state.config.site_host);

    let outcome = state
        .mailer
        .send(&support)
        .await
        .map_err(|e| AppError::Mail(e.to_string()))?;

    // The customer confirmation is best-effort: the order already reached
    // support, so a bounce here only gets logged.
    let confirmation_preview = match state.mailer.send(&confirmation).await {
        Ok(o) => o.preview_url,
        Err(e) => {
            tracing::warn!("order confirmation email failed: {}", e);
            None
        }
    };

    tracing::info!(
        transport = outcome.transport,
        msg_ref = %msg_ref,
        "order request sent"
    );

    Ok(Json(serde_json::json!({
        "ok": true,
        "ref": msg_ref,
        "message_id": outcome.message_id,
        "preview_url": outcome.preview_url,
        "confirmation_preview_url": confirmation_preview,
    })))
}

// ============================================================================
// JSON API Handlers
// ============================================================================

#[derive(Deserialize, Default)]
struct FeaturedQuery {
    debug: Option<String>,
}

async fn api_featured(
    State(state): State<AppState>,
    Query(q): Query<FeaturedQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let week = week_key_now();
    let cache_key = format!("featured:{}", week);

    let body = if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for featured week {}", week);
        cached
    } else {
        let pool = crate::featured::build_pool(&state.catalog);
        let featured = featured_for_week(&state.catalog, &week);
        let value = serde_json::json!({
            "week": week,
            "pool_count": pool.len(),
            "featured": featured,
        });
        state.cache.insert(cache_key, value.clone()).await;
        value
    };

    if q.debug.as_deref() == Some("1") {
        let featured = body["featured"].as_array().cloned().unwrap_or_default();
        let debug = FeaturedDebug {
            week: week.clone(),
            pool_count: body["pool_count"].as_u64().unwrap_or(0) as usize,
            featured_count: featured.len(),
            first: featured
                .first()
                .and_then(|c| c["name"].as_str())
                .map(String::from),
        };
        let mut body = body;
        body["debug"] = serde_json::to_value(&debug)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        return Ok(Json(body));
    }

    Ok(Json(body))
}

async fn api_family(
    State(state): State<AppState>,
    Path(family): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cache_key = format!("family:{}", family.to_uppercase());
    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for family {}", family);
        return Ok(Json(cached));
    }

    let (series, fam) = state
        .catalog
        .find_family(&family)
        .ok_or_else(|| AppError::NotFound(format!("Product family {} not found", family)))?;
    let page = build_family_page(&state.catalog, fam);
    let value = serde_json::json!({
        "series": series.map(|s| s.slug.clone()),
        "page": page,
    });
    state.cache.insert(cache_key, value.clone()).await;
    Ok(Json(value))
}

// ============================================================================
// Error Handling
// ============================================================================

pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Mail(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Mail(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "ok": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
