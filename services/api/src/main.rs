//! API Service - HTTP surface for route sheet imports
//!
//! Endpoints:
//! - GET /health - Health check
//! - POST /hojas-ruta/parse - Parse sheet text without storing it
//! - POST /hojas-ruta?name= - Parse and store sheet text
//! - GET /hojas-ruta?limit= - List stored sheets
//! - GET /hojas-ruta/:id - Stored sheet, children in spreadsheet order

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use hoja_parser::pipeline::{placeholder_client, SheetRejection};
use hoja_parser::source::{content_hash, decode_text};
use hoja_parser::{store, Extraction, Pipeline, ServiceSheet, Strategy};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
struct AppState {
    pool: PgPool,
    pipeline: Pipeline,
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseResponse {
    strategy: Strategy,
    strict_rejection: Option<SheetRejection>,
    placeholder_client: bool,
    sheet: ServiceSheet,
}

#[derive(Serialize)]
struct ImportResponse {
    hoja_id: Uuid,
    strategy: Strategy,
    duplicate: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Query params
// ============================================================================

#[derive(Deserialize)]
struct ImportQuery {
    name: Option<String>,
    #[serde(default)]
    force: bool,
}

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<i64>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Decode and parse an uploaded sheet, filling in a placeholder client when
/// none was found. Non-UTF-8 uploads are read as Windows-1252.
fn parse_upload(pipeline: &Pipeline, name: &str, body: &[u8]) -> (Extraction, bool) {
    let mut extraction = pipeline.process_text(&decode_text(body));
    let placeholder = extraction.sheet.client.trim().is_empty();
    if placeholder {
        extraction.sheet.client = placeholder_client(name);
    }
    (extraction, placeholder)
}

fn internal_error(e: impl std::fmt::Display) -> axum::response::Response {
    error!("request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: "0.1.0",
    })
}

async fn parse_handler(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    if body.iter().all(u8::is_ascii_whitespace) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Empty sheet body".to_string(),
            }),
        )
            .into_response();
    }

    let (extraction, placeholder) = parse_upload(&state.pipeline, "", &body);
    Json(ParseResponse {
        strategy: extraction.strategy,
        strict_rejection: extraction.strict_rejection,
        placeholder_client: placeholder,
        sheet: extraction.sheet,
    })
    .into_response()
}

async fn import_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImportQuery>,
    body: Bytes,
) -> impl IntoResponse {
    if body.iter().all(u8::is_ascii_whitespace) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Empty sheet body".to_string(),
            }),
        )
            .into_response();
    }

    let name = params.name.unwrap_or_else(|| "upload.csv".to_string());
    let hash = content_hash(&body);
    let (extraction, _) = parse_upload(&state.pipeline, &name, &body);

    if !params.force {
        match store::find_by_hash(&state.pool, &hash).await {
            Ok(Some(existing)) => {
                return Json(ImportResponse {
                    hoja_id: existing,
                    strategy: extraction.strategy,
                    duplicate: true,
                })
                .into_response();
            }
            Ok(None) => {}
            Err(e) => return internal_error(e),
        }
    }

    match store::save_sheet(&state.pool, &name, &hash, &extraction).await {
        Ok(hoja_id) => (
            StatusCode::CREATED,
            Json(ImportResponse {
                hoja_id,
                strategy: extraction.strategy,
                duplicate: false,
            }),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    match store::list_sheets(&state.pool, limit).await {
        Ok(sheets) => Json(serde_json::json!({ "hojas_ruta": sheets })).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn sheet_handler(
    State(state): State<Arc<AppState>>,
    Path(hoja_id): Path<Uuid>,
) -> impl IntoResponse {
    match store::load_sheet(&state.pool, hoja_id).await {
        Ok(Some(sheet)) => Json(sheet).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Hoja de ruta {} not found", hoja_id),
            }),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let db_url = std::env::var("DB_URL").context("DB_URL env var missing")?;
    let bind = std::env::var("API_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    println!("=== Hoja de Ruta API ===");
    println!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await
        .context("Failed to connect to database")?;

    println!("Database connected");

    let state = Arc::new(AppState {
        pool,
        pipeline: Pipeline::default(),
    });

    // CORS for the desktop/web frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/hojas-ruta/parse", post(parse_handler))
        .route("/hojas-ruta", get(list_handler).post(import_handler))
        .route("/hojas-ruta/:id", get(sheet_handler))
        .layer(cors)
        .with_state(state);

    info!(%bind, "api listening");
    println!("API listening on http://{}", bind);
    println!("\nEndpoints:");
    println!("  GET  /health");
    println!("  POST /hojas-ruta/parse");
    println!("  POST /hojas-ruta?name=&force=");
    println!("  GET  /hojas-ruta?limit=");
    println!("  GET  /hojas-ruta/:id");

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_keeps_found_client() {
        let body = b"Cliente,,,Acme Corp\nRESPONSABLE,Juan Perez,,\n";
        let (extraction, placeholder) = parse_upload(&Pipeline::default(), "x.csv", body);
        assert!(!placeholder);
        assert_eq!(extraction.sheet.client, "Acme Corp");
        assert_eq!(extraction.strategy, Strategy::Strict);
    }

    #[test]
    fn test_parse_upload_placeholder_client() {
        let body = b"Mesas,4\nSillas,20\n";
        let (extraction, placeholder) = parse_upload(&Pipeline::default(), "boda_puig.csv", body);
        assert!(placeholder);
        assert_eq!(extraction.sheet.client, "boda puig");
        assert_eq!(extraction.strategy, Strategy::Flexible);
    }

    #[test]
    fn test_parse_upload_decodes_windows_1252() {
        let body = b"Cliente,,,Caf\xE9 Nou\nRESPONSABLE,Juan,,\nDirecci\xF3n,,,Carrer Major 1\nN\xBA de personas,40,,\n";
        let (extraction, placeholder) = parse_upload(&Pipeline::default(), "x.csv", body);
        assert!(!placeholder);
        assert_eq!(extraction.strategy, Strategy::Strict);
        assert_eq!(extraction.sheet.client, "Café Nou");
        assert_eq!(extraction.sheet.address, "Carrer Major 1");
        assert_eq!(extraction.sheet.person_count, 40);
    }
}
