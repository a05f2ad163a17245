//! # cavefire-core: Pure Pricing Logic for Cave Fire Proposals
//!
//! This crate holds the one money/tax calculator every Cave Fire surface
//! prices through, plus the catalog, proposal and session types around it.
//! It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cave Fire Proposals Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Browser pricing UIs (plain + React, ts-rs bindings)       │   │
//! │  └──────────────────────────────┬──────────────────────────────────┘   │
//! │                                 │ HTTP                                   │
//! │  ┌──────────────────────────────▼──────────────┐  ┌─────────────────┐   │
//! │  │   apps/api (axum)  /api/compose, /quote ... │  │ apps/cli (clap) │   │
//! │  └──────────────────────────────┬──────────────┘  └────────┬────────┘   │
//! │                                 │                          │            │
//! │  ┌──────────────────────────────▼──────────────────────────▼────────┐   │
//! │  │             cavefire-export   CSV writer, HTML template          │   │
//! │  └──────────────────────────────┬───────────────────────────────────┘   │
//! │                                 │                                        │
//! │  ┌──────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ cavefire-core (THIS CRATE) ★                      │   │
//! │  │                                                                  │   │
//! │  │   money ── types ── pricing ── catalog ── proposal ── session   │   │
//! │  │                                                                  │   │
//! │  │   NO I/O • NO NETWORK • INTEGER CENTS EVERYWHERE                 │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - `Money` (i64 cents), `Amount`, [`to_cents`], rounding policy
//! - [`types`] - `TaxRate`, `Addon`, `LineItem`, `LineTotals`, `Totals`
//! - [`pricing`] - the calculator: [`line_totals`], [`aggregate`]
//! - [`validation`] - quantity normalization and catalog checks
//! - [`catalog`] - add-on catalog and default selection
//! - [`proposal`] - proposal documents and [`compose`]
//! - [`session`] - [`PricingSession`], the state behind a pricing screen
//! - [`error`] - domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cavefire_core::{aggregate, to_cents, Amount, LineItem, TaxRate};
//!
//! assert_eq!(to_cents(&Amount::from(19.99)).cents(), 1999);
//!
//! let items = vec![
//!     LineItem::new("19.99", 3, true),
//!     LineItem::new("5.00", 1, false).excluded(),
//! ];
//! let totals = aggregate(&items, TaxRate::from_percentage(8.75));
//!
//! assert_eq!(totals.subtotal.cents(), 5997);
//! assert_eq!(totals.tax.cents(), 525);
//! assert_eq!(totals.total.cents(), 6522);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod proposal;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{to_cents, Amount, Money, Rounding};
pub use pricing::{aggregate, line_totals, Calculator};
pub use proposal::{compose, Composition, Proposal};
pub use session::PricingSession;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tax rate the pricing screens start with (8.75%).
pub const DEFAULT_TAX_RATE: TaxRate = TaxRate::from_bps(875);
