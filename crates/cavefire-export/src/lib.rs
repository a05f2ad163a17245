//! # cavefire-export: Proposal Exports
//!
//! CSV, HTML and DOCX renderings of priced proposals. All functions return
//! the document in memory (`String`, or bytes for DOCX); callers decide where
//! it goes (file, HTTP body).
//!
//! ## Modules
//!
//! - [`csv`] - add-on sheet for a [`PricingSession`](cavefire_core::PricingSession)
//! - [`html`] - printable proposal page for a composed [`Proposal`](cavefire_core::Proposal)
//! - [`docx`] - the same proposal as a Word document
//! - [`error`] - [`ExportError`]

pub mod csv;
pub mod docx;
pub mod error;
pub mod html;

pub use crate::csv::{export_csv, CSV_FILE_NAME};
pub use crate::docx::{render_proposal_docx, DOCX_CONTENT_TYPE, DOCX_FILE_NAME};
pub use crate::error::{ExportError, ExportResult};
pub use crate::html::{render_proposal_html, render_proposal_html_at, HTML_FILE_NAME};
