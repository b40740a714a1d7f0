// HTTP surface for the scheduling engine: JSON in, JSON out. The handlers
// translate request bodies into typed contexts, run the assembly pipeline
// against the active catalog, and shape the result for rendering layers.

use std::collections::HashMap;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use serde_json::json;
use tracing::info;

use crate::algorithm;
use crate::api_json::{
    AssembleRequest, AssembleResponse, CourseSummary, CourseView, EligibleRequest,
    SessionUpdateRequest,
};
use crate::catalog::{Catalog, CatalogHandle};
use crate::config::Config;
use crate::models::CourseId;
use crate::session::SessionStore;

pub struct AppState {
    pub catalog: CatalogHandle,
    pub sessions: Arc<dyn SessionStore>,
    pub catalog_path: String,
}

fn catalog_unavailable(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(json!({
        "error": format!("{e}"),
        "retryable": true
    }))
}

/// POST /assemble
/// Build a conflict-free schedule from the requested candidates.
async fn assemble_handler(
    state: web::Data<AppState>,
    body: web::Json<AssembleRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let catalog = match state.catalog.current() {
        Ok(c) => c,
        Err(e) => return catalog_unavailable(e),
    };

    let session_completed = match &request.session_id {
        Some(id) => state.sessions.completed(id),
        None => Vec::new(),
    };
    let context = match request.context(&session_completed) {
        Ok(c) => c,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": e.to_string()})),
    };

    let outcome = algorithm::assemble(
        &catalog,
        &request.candidate_ids(),
        &context,
        request.auto_fill,
    );
    HttpResponse::Ok().json(AssembleResponse::build(&outcome, &catalog))
}

/// POST /courses/eligible
/// Courses the student may take, optionally narrowed by subject or core.
async fn eligible_handler(
    state: web::Data<AppState>,
    body: web::Json<EligibleRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let catalog = match state.catalog.current() {
        Ok(c) => c,
        Err(e) => return catalog_unavailable(e),
    };

    let filter = match request.filter() {
        Ok(f) => f,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": e.to_string()})),
    };
    let session_completed = match &request.session_id {
        Some(id) => state.sessions.completed(id),
        None => Vec::new(),
    };
    let context = request.context(&session_completed);

    let courses: Vec<CourseSummary> = algorithm::eligible_courses(&catalog, &context, &filter)
        .into_iter()
        .map(CourseSummary::from_course)
        .collect();
    HttpResponse::Ok().json(json!({"count": courses.len(), "courses": courses}))
}

/// GET /courses/{id}
/// Full listing for one course, non-schedulable meetings included.
async fn course_info_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let raw_id = path.into_inner();
    let catalog = match state.catalog.current() {
        Ok(c) => c,
        Err(e) => return catalog_unavailable(e),
    };
    match catalog.lookup(&raw_id) {
        Some(course) => HttpResponse::Ok().json(CourseView::from_course(course)),
        None => HttpResponse::NotFound().json(json!({"error": format!("course {raw_id:?} not found")})),
    }
}

/// GET /resolve?name=intro+microeconomics
/// Name→identifier resolution for the interpretation layer.
async fn resolve_handler(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let qm = query.into_inner();
    let name = match qm.get("name").map(|s| s.trim()) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => {
            return HttpResponse::BadRequest()
                .json(json!({"error": "name query parameter is required"}));
        }
    };
    let catalog = match state.catalog.current() {
        Ok(c) => c,
        Err(e) => return catalog_unavailable(e),
    };
    match catalog.resolve_name(&name) {
        Some(course) => HttpResponse::Ok().json(json!({
            "course_id": course.id,
            "title": course.title
        })),
        None => HttpResponse::NotFound().json(json!({"error": format!("no course matches {name:?}")})),
    }
}

/// GET /sessions/{id}/completed
async fn session_get_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let session_id = path.into_inner();
    HttpResponse::Ok().json(json!({
        "session_id": session_id,
        "completed": state.sessions.completed(&session_id),
        "updated_at": state.sessions.updated_at(&session_id),
    }))
}

/// POST /sessions/{id}/completed
/// Append to the session's already-taken history.
async fn session_post_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SessionUpdateRequest>,
) -> impl Responder {
    let session_id = path.into_inner();
    let courses: Vec<CourseId> = body.courses.iter().map(|s| CourseId::new(s)).collect();
    let completed = state.sessions.add_completed(&session_id, &courses);
    HttpResponse::Ok().json(json!({
        "session_id": session_id,
        "completed": completed,
    }))
}

/// DELETE /sessions/{id}/completed
async fn session_clear_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let session_id = path.into_inner();
    state.sessions.clear(&session_id);
    HttpResponse::Ok().json(json!({"session_id": session_id, "completed": []}))
}

/// POST /catalog/refresh
/// Rebuild the catalog from the configured feed and swap it in wholesale.
async fn refresh_handler(state: web::Data<AppState>) -> impl Responder {
    let path = state.catalog_path.clone();
    let data = match tokio::fs::read_to_string(&path).await {
        Ok(d) => d,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(json!({"error": format!("failed to read catalog feed {path}: {e}")}));
        }
    };
    match Catalog::from_json_str(&path, &data) {
        Ok(catalog) => {
            let courses = catalog.len();
            state.catalog.replace(catalog);
            info!(courses, path = %path, "catalog refreshed");
            HttpResponse::Ok().json(json!({"status": "ok", "courses": courses}))
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": e.to_string()})),
    }
}

/// GET /health
async fn health_handler(state: web::Data<AppState>) -> impl Responder {
    let courses = state.catalog.current().map(|c| c.len()).unwrap_or(0);
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "catalog_loaded": state.catalog.is_loaded(),
        "courses": courses,
    }))
}

/// Route table, shared by the server and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/assemble", web::post().to(assemble_handler))
        .route("/courses/eligible", web::post().to(eligible_handler))
        .route("/courses/{id}", web::get().to(course_info_handler))
        .route("/resolve", web::get().to(resolve_handler))
        .route("/sessions/{id}/completed", web::get().to(session_get_handler))
        .route("/sessions/{id}/completed", web::post().to(session_post_handler))
        .route(
            "/sessions/{id}/completed",
            web::delete().to(session_clear_handler),
        )
        .route("/catalog/refresh", web::post().to(refresh_handler))
        .route("/health", web::get().to(health_handler));
}

pub async fn run_server(
    config: Config,
    catalog: CatalogHandle,
    sessions: Arc<dyn SessionStore>,
) -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        catalog,
        sessions,
        catalog_path: config.catalog_path.clone(),
    });
    let bind = config.bind_addr.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(configure)
    })
    .workers(num_cpus::get())
    .bind(bind.as_str())?
    .run()
    .await
}
