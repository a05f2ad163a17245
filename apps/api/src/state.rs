//! Shared application state.
//!
//! Everything here is read-only after startup. Handlers build their own
//! [`PricingSession`] per request, so no locking is needed.

use cavefire_core::{Calculator, Catalog, PricingSession, TaxRate};

use crate::config::ApiConfig;

#[derive(Debug)]
pub struct AppState {
    pub catalog: Catalog,
    pub calculator: Calculator,
    pub tax_rate: TaxRate,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(config: ApiConfig, catalog: Catalog) -> Self {
        AppState {
            catalog,
            calculator: config.calculator(),
            tax_rate: config.tax_rate(),
            config,
        }
    }

    /// A fresh session over the catalog's default selection.
    pub fn new_session(&self, tax_rate: TaxRate) -> PricingSession {
        PricingSession::from_catalog(&self.catalog, tax_rate).with_calculator(self.calculator)
    }
}
