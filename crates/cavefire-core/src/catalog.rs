//! # Add-on Catalog
//!
//! The list of purchasable add-ons (`seeds/add_ons.json`) and the default
//! selection every pricing surface starts from.
//!
//! ## Catalog Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_ons.json ──from_json──► Catalog ──find(code)──► &Addon             │
//! │                                  │                                      │
//! │                                  └──default_line_items──► Vec<LineItem> │
//! │                                       included = default_quantity > 0   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog does no I/O: callers read the file and hand over the text.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::types::{Addon, LineItem};
use crate::validation::{validate_code, validate_name};

/// An ordered, code-unique collection of add-ons.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    addons: Vec<Addon>,
}

impl Catalog {
    /// Parses a JSON array of add-on records.
    ///
    /// ```rust
    /// use cavefire_core::catalog::Catalog;
    ///
    /// let catalog = Catalog::from_json(
    ///     r#"[{"code": "EXT-5LB", "name": "5 lb extinguisher", "unit_price": 15.95, "taxable": true}]"#,
    /// ).unwrap();
    /// assert_eq!(catalog.len(), 1);
    /// assert!(catalog.find("EXT-5LB").is_some());
    /// ```
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let addons: Vec<Addon> =
            serde_json::from_str(json).map_err(|e| CoreError::InvalidCatalog(e.to_string()))?;
        Self::from_addons(addons)
    }

    /// Builds a catalog, validating codes and names and rejecting duplicates.
    pub fn from_addons(addons: Vec<Addon>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(addons.len());

        for addon in &addons {
            validate_code(&addon.code)?;
            validate_name(&addon.name)?;
            if !seen.insert(addon.code.as_str()) {
                return Err(CoreError::DuplicateCode(addon.code.clone()));
            }
        }

        Ok(Catalog { addons })
    }

    /// Looks up an add-on by exact code.
    pub fn find(&self, code: &str) -> Option<&Addon> {
        self.addons.iter().find(|a| a.code == code)
    }

    /// Looks up an add-on, failing with [`CoreError::UnknownAddon`].
    pub fn get(&self, code: &str) -> CoreResult<&Addon> {
        self.find(code)
            .ok_or_else(|| CoreError::UnknownAddon(code.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Addon> {
        self.addons.iter()
    }

    pub fn addons(&self) -> &[Addon] {
        &self.addons
    }

    pub fn len(&self) -> usize {
        self.addons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addons.is_empty()
    }

    /// One line item per add-on, in catalog order, with the default
    /// selection applied (see [`Addon::default_line_item`]).
    pub fn default_line_items(&self) -> Vec<LineItem> {
        self.addons.iter().map(Addon::default_line_item).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
