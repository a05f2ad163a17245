//! # HTML Export
//!
//! Renders a composed proposal as one self-contained HTML page.
//!
//! ## Rendering Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Proposal ──┐                                                           │
//! │             ├──► HtmlContext (strings, "$0.00") ──► proposal.html       │
//! │  Composition┘         minijinja, HTML auto-escaping on                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are formatted in Rust before they reach the template, so the
//! template never does arithmetic.

use cavefire_core::proposal::{Composition, Proposal};
use chrono::{DateTime, Utc};
use minijinja::Environment;
use serde::Serialize;
use tracing::debug;

use crate::error::ExportResult;

const TEMPLATE_NAME: &str = "proposal.html";
const TEMPLATE_SOURCE: &str = include_str!("templates/proposal.html");

/// Default file name for HTML exports.
pub const HTML_FILE_NAME: &str = "proposal.html";

#[derive(Debug, Serialize)]
struct HtmlContext<'a> {
    title: &'a str,
    proposal_id: Option<&'a str>,
    date: Option<&'a str>,
    notes: Option<&'a str>,
    logo_data_url: Option<&'a str>,
    sections: Vec<SectionContext<'a>>,
    skipped: &'a [String],
    totals: TotalsContext,
    generated_at: String,
}

#[derive(Debug, Serialize)]
struct SectionContext<'a> {
    title: &'a str,
    lines: Vec<LineContext<'a>>,
}

#[derive(Debug, Serialize)]
struct LineContext<'a> {
    description: &'a str,
    quantity: u32,
    unit_price: String,
    tax: String,
    total: String,
}

#[derive(Debug, Serialize)]
struct TotalsContext {
    subtotal: String,
    tax: String,
    total: String,
}

/// Renders the proposal, stamped with the current time.
pub fn render_proposal_html(proposal: &Proposal, composition: &Composition) -> ExportResult<String> {
    render_proposal_html_at(proposal, composition, Utc::now())
}

/// Renders the proposal with an explicit "generated" timestamp.
pub fn render_proposal_html_at(
    proposal: &Proposal,
    composition: &Composition,
    generated_at: DateTime<Utc>,
) -> ExportResult<String> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE_SOURCE)?;
    let template = env.get_template(TEMPLATE_NAME)?;

    let meta = proposal.meta.as_ref();
    let sections = proposal
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| SectionContext {
            title: section.title.as_deref().unwrap_or("Section"),
            lines: composition
                .section_lines(index)
                .map(|line| LineContext {
                    description: &line.description,
                    quantity: line.quantity,
                    unit_price: line.unit_price.to_string(),
                    tax: line.totals.tax.to_string(),
                    total: line.totals.total.to_string(),
                })
                .collect(),
        })
        .collect();

    let context = HtmlContext {
        title: proposal.display_title(),
        proposal_id: meta
            .and_then(|m| m.proposal_id.as_deref())
            .or(proposal.id.as_deref()),
        date: meta.and_then(|m| m.date.as_deref()),
        notes: proposal.notes.as_deref(),
        logo_data_url: meta.and_then(|m| m.logo_data_url.as_deref()),
        sections,
        skipped: &composition.skipped,
        totals: TotalsContext {
            subtotal: composition.totals.subtotal.to_string(),
            tax: composition.totals.tax.to_string(),
            total: composition.totals.total.to_string(),
        },
        generated_at: generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    };

    let html = template.render(&context)?;
    debug!(title = context.title, bytes = html.len(), "Rendered HTML export");
    Ok(html)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cavefire_core::{compose, Calculator, Catalog, TaxRate};
    use chrono::TimeZone;

    fn render(json: &str) -> String {
        let catalog = Catalog::from_json(
            r#"[
                {"code": "F-A-ANNUAL", "name": "Annual fire alarm inspection",
                 "unit_price": "6.00", "taxable": false},
                {"code": "EXT-5LB", "name": "5 lb ABC extinguisher",
                 "unit_price": "15.95", "taxable": true}
            ]"#,
        )
        .unwrap();
        let proposal = Proposal::from_json(json).unwrap();
        let composition = compose(&proposal, &catalog, &Calculator::default(), TaxRate::from_bps(875));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        render_proposal_html_at(&proposal, &composition, at).unwrap()
    }

    #[test]
    fn test_renders_lines_and_totals() {
        let html = render(
            r#"{"name": "Warehouse Retrofit", "meta": {"proposal_id": "P-7", "date": "2024-05-01"},
                "sections": [
                  {"title": "Alarm", "line_items": [{"code": "F-A-ANNUAL", "quantity": 10}]},
                  {"title": "Extinguishers", "add_ons": [{"code": "EXT-5LB", "quantity": 2}]}
                ]}"#,
        );

        assert!(html.contains("<h1>Warehouse Retrofit</h1>"));
        assert!(html.contains("Proposal ID: P-7"));
        assert!(html.contains("<h2>Alarm</h2>"));
        assert!(html.contains("Annual fire alarm inspection"));
        assert!(html.contains("$60.00"));
        assert!(html.contains("$34.69"));
        assert!(html.contains("$91.90"));
        assert!(html.contains("$2.79"));
        assert!(html.contains("$94.69"));
        assert!(html.contains("Generated 2024-05-01 09:30 UTC"));
    }

    #[test]
    fn test_escapes_user_text() {
        let html = render(r#"{"notes": "<script>alert(1)</script>", "sections": []}"#);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_lists_skipped_codes() {
        let html = render(r#"{"sections": [{"add_ons": [{"code": "MYSTERY"}]}]}"#);
        assert!(html.contains("Not priced (unknown codes): MYSTERY"));
        assert!(html.contains("No priced items"));
        assert!(html.contains("<h2>Section</h2>"));
    }
}
