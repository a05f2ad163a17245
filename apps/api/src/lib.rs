//! # Cave Fire Proposals API
//!
//! HTTP server for proposal composition, quoting and exports. The browser
//! pricing UIs call it to cross-check their client-side totals.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Proposals API Server                             │
//! │                                                                         │
//! │  Pricing UI ───► HTTP (8003) ───► routes ───► cavefire-core (compose)   │
//! │                                      │                                  │
//! │                                      └──────► cavefire-export (csv/html)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};
pub use routes::build_router;
pub use state::AppState;
