//! # HTTP Routes
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  /health               "OK"                                        │
//! │  GET  /api/catalog          add-on catalog (also /seeds/add_ons.json)   │
//! │  POST /api/compose          Proposal   → {subtotal, tax, total, skipped}│
//! │  POST /api/quote            QuoteRequest → {rows, totals, tax_rate}     │
//! │  POST /api/export/html      Proposal   → text/html                      │
//! │  POST /api/export/csv       QuoteRequest → text/csv attachment          │
//! │  POST /api/export/docx      Proposal   → .docx attachment               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All amounts in responses are integer cents.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use cavefire_core::proposal::compose;
use cavefire_core::session::{ItemRow, SessionMeta};
use cavefire_core::validation::validate_tax_rate;
use cavefire_core::{
    Amount, Catalog, CoreError, Money, PricingSession, Proposal, TaxRate, Totals,
};
use cavefire_export::{
    export_csv, render_proposal_docx, render_proposal_html, CSV_FILE_NAME, DOCX_CONTENT_TYPE,
    DOCX_FILE_NAME,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Router
// =============================================================================

/// Builds the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors_allow_any = state.config.cors_allow_any;

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/seeds/add_ons.json", get(catalog_handler))
        .route("/api/compose", post(compose_handler))
        .route("/api/quote", post(quote_handler))
        .route("/api/export/html", post(export_html_handler))
        .route("/api/export/csv", post(export_csv_handler))
        .route("/api/export/docx", post(export_docx_handler))
        .with_state(state);

    if cors_allow_any {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

// =============================================================================
// Request / Response Bodies
// =============================================================================

/// Totals returned by `/api/compose`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComposeResponse {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub skipped: Vec<String>,
}

/// Edits applied on top of the catalog's default selection.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteRequest {
    /// Percent; omitted means the configured rate, `""` means 0%.
    #[serde(default)]
    pub tax_rate: Option<Amount>,

    #[serde(default)]
    pub items: Vec<QuoteItem>,

    #[serde(default)]
    pub meta: Option<SessionMeta>,

    #[serde(default)]
    pub logo_data_url: Option<String>,

    #[serde(default)]
    pub signature_data_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteItem {
    pub code: String,

    #[serde(default)]
    pub quantity: Option<Amount>,

    #[serde(default)]
    pub included: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub rows: Vec<ItemRow>,
    pub totals: Totals,
    /// Applied rate, e.g. `"8.75%"`.
    pub tax_rate: String,
}

/// Builds a session from the default selection plus the request's edits.
fn build_session(state: &AppState, request: QuoteRequest) -> Result<PricingSession, ApiError> {
    let rate = match &request.tax_rate {
        None => state.tax_rate,
        Some(Amount::Text(text)) if text.trim().is_empty() => TaxRate::zero(),
        Some(Amount::Text(text)) => TaxRate::parse_percentage(text).ok_or_else(|| {
            ApiError::validation(format!("tax_rate is not a percentage: '{}'", text))
        })?,
        Some(Amount::Number(n)) if !n.is_finite() || *n < 0.0 => {
            return Err(ApiError::validation(format!(
                "tax_rate is not a percentage: {}",
                n
            )));
        }
        Some(amount) => TaxRate::from_amount(amount),
    };
    validate_tax_rate(rate).map_err(CoreError::from)?;

    let mut session = state.new_session(rate);

    for item in &request.items {
        if let Some(quantity) = &item.quantity {
            session.set_quantity(&item.code, quantity)?;
        }
        if let Some(included) = item.included {
            session.set_included(&item.code, included)?;
        }
        if item.quantity.is_none() && item.included.is_none() {
            // A bare code still has to exist
            state.catalog.get(&item.code)?;
        }
    }

    if let Some(meta) = request.meta {
        session.set_meta(meta);
    }
    if let Some(logo) = request.logo_data_url {
        session.attach_logo(logo)?;
    }
    if let Some(signature) = request.signature_data_url {
        session.save_signature(signature)?;
    }

    Ok(session)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    "OK"
}

async fn catalog_handler(State(state): State<Arc<AppState>>) -> Json<Catalog> {
    Json(state.catalog.clone())
}

async fn compose_handler(
    State(state): State<Arc<AppState>>,
    Json(proposal): Json<Proposal>,
) -> Json<ComposeResponse> {
    let composition = compose(&proposal, &state.catalog, &state.calculator, state.tax_rate);

    info!(
        proposal_id = proposal.id.as_deref().unwrap_or("-"),
        lines = composition.lines.len(),
        skipped = composition.skipped.len(),
        total = composition.totals.total.cents(),
        "Composed proposal"
    );

    Json(ComposeResponse {
        subtotal: composition.totals.subtotal,
        tax: composition.totals.tax,
        total: composition.totals.total,
        skipped: composition.skipped,
    })
}

async fn quote_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let session = build_session(&state, request)?;
    let totals = session.totals();

    debug!(session_id = %session.id(), total = totals.total.cents(), "Quoted selection");

    Ok(Json(QuoteResponse {
        rows: session.rows(),
        totals,
        tax_rate: session.tax_rate().to_string(),
    }))
}

async fn export_html_handler(
    State(state): State<Arc<AppState>>,
    Json(proposal): Json<Proposal>,
) -> Result<Html<String>, ApiError> {
    let composition = compose(&proposal, &state.catalog, &state.calculator, state.tax_rate);
    let html = render_proposal_html(&proposal, &composition)?;
    Ok(Html(html))
}

async fn export_csv_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = build_session(&state, request)?;
    let csv = export_csv(&session)?;

    let disposition = format!("attachment; filename=\"{}\"", CSV_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

async fn export_docx_handler(
    State(state): State<Arc<AppState>>,
    Json(proposal): Json<Proposal>,
) -> Result<impl IntoResponse, ApiError> {
    let composition = compose(&proposal, &state.catalog, &state.calculator, state.tax_rate);
    let docx = render_proposal_docx(&proposal, &composition)?;

    let disposition = format!("attachment; filename=\"{}\"", DOCX_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        docx,
    ))
}

// =============================================================================
// Router Tests
// =============================================================================
