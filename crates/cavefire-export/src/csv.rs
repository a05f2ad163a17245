//! # CSV Export
//!
//! Writes the add-on selection of a [`PricingSession`] as the CSV sheet the
//! pricing UI offers for download.
//!
//! ## Layout
//! ```text
//! code,name,unit_price,quantity,taxable,line_tax,line_total
//! proposal_id,,P-2024-001                     ┐
//! date,,2024-05-01                            │ only the ones that are set
//! logo_data_url,,"data:image/png;base64,..."  │
//! signature_data,,"data:image/png;base64,..." ┘
//! EXT-5LB,5 lb ABC extinguisher,15.95,2,yes,2.79,34.69   ← included items
//!                                                         ← blank separator
//! subtotal,,91.90
//! tax,,2.79
//! total,,94.69
//! ```
//! Rows have different widths, so the writer runs in flexible mode.

use cavefire_core::session::PricingSession;
use cavefire_core::Money;
use ::csv::WriterBuilder;
use tracing::debug;

use crate::error::{ExportError, ExportResult};

/// Download name used by the pricing UI.
pub const CSV_FILE_NAME: &str = "proposal_addons_export.csv";

/// Header row of the item table.
pub const CSV_HEADER: [&str; 7] = [
    "code",
    "name",
    "unit_price",
    "quantity",
    "taxable",
    "line_tax",
    "line_total",
];

/// Renders the session as CSV text.
pub fn export_csv(session: &PricingSession) -> ExportResult<String> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;

    let meta = session.meta();
    let attachments = session.attachments();
    let metadata = [
        ("proposal_id", meta.proposal_id.as_deref()),
        ("date", meta.date.as_deref()),
        ("logo_data_url", attachments.logo_data_url.as_deref()),
        ("signature_data", attachments.signature_data_url.as_deref()),
    ];
    for (key, value) in metadata {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            writer.write_record([key, "", value])?;
        }
    }

    let rows = session.included_rows();
    for row in &rows {
        writer.write_record([
            row.code.as_str(),
            row.name.as_str(),
            row.unit_price.to_decimal_string().as_str(),
            row.quantity.to_string().as_str(),
            if row.taxable { "yes" } else { "no" },
            row.totals.tax.to_decimal_string().as_str(),
            row.totals.total.to_decimal_string().as_str(),
        ])?;
    }

    // A zero-field record is not representable through the writer, so the
    // blank separator goes straight into the flushed buffer.
    let mut buffer = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    buffer.push(b'\n');
    let mut writer = WriterBuilder::new().flexible(true).from_writer(buffer);

    let totals = session.totals();
    write_summary(&mut writer, "subtotal", totals.subtotal)?;
    write_summary(&mut writer, "tax", totals.tax)?;
    write_summary(&mut writer, "total", totals.total)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;

    debug!(session_id = %session.id(), rows = rows.len(), bytes = bytes.len(), "Rendered CSV export");

    String::from_utf8(bytes).map_err(|_| ExportError::Encoding)
}

fn write_summary(
    writer: &mut ::csv::Writer<Vec<u8>>,
    label: &str,
    amount: Money,
) -> ExportResult<()> {
    writer.write_record([label, "", amount.to_decimal_string().as_str()])?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cavefire_core::session::SessionMeta;
    use cavefire_core::{Catalog, TaxRate};

    const LOGO: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn session() -> PricingSession {
        let catalog = Catalog::from_json(
            r#"[
                {"code": "F-A-ANNUAL", "name": "Annual fire alarm inspection",
                 "unit_price": "6.00", "default_quantity": 10, "taxable": false},
                {"code": "EXT-5LB", "name": "Extinguisher, 5 lb ABC",
                 "unit_price": 15.95, "default_quantity": 2, "taxable": true},
                {"code": "EXIT-SIGN", "name": "LED exit sign",
                 "unit_price": "89.00", "default_quantity": 0, "taxable": true}
            ]"#,
        )
        .unwrap();
        PricingSession::from_catalog(&catalog, TaxRate::from_bps(875))
    }

    #[test]
    fn test_layout_without_metadata() {
        let csv = export_csv(&session()).unwrap();
        let expected = "\
code,name,unit_price,quantity,taxable,line_tax,line_total
F-A-ANNUAL,Annual fire alarm inspection,6.00,10,no,0.00,60.00
EXT-5LB,\"Extinguisher, 5 lb ABC\",15.95,2,yes,2.79,34.69

subtotal,,91.90
tax,,2.79
total,,94.69
";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_metadata_rows_follow_header() {
        let mut session = session();
        session.set_meta(SessionMeta {
            proposal_id: Some("P-2024-001".to_string()),
            date: Some("2024-05-01".to_string()),
        });
        session.attach_logo(LOGO).unwrap();
        session.save_signature(LOGO).unwrap();

        let csv = export_csv(&session).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[1], "proposal_id,,P-2024-001");
        assert_eq!(lines[2], "date,,2024-05-01");
        // Data URLs contain a comma and must be quoted
        assert_eq!(lines[3], format!("logo_data_url,,\"{}\"", LOGO));
        assert_eq!(lines[4], format!("signature_data,,\"{}\"", LOGO));
        assert!(lines[5].starts_with("F-A-ANNUAL,"));
    }

    #[test]
    fn test_blank_row_separates_items_from_summary() {
        let mut session = session();
        session.set_meta(SessionMeta {
            proposal_id: Some("P-7".to_string()),
            date: None,
        });

        let csv = export_csv(&session).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[3].starts_with("EXT-5LB,"));
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "subtotal,,91.90");

        // Nothing included: the separator still sits before the summary
        for code in ["F-A-ANNUAL", "EXT-5LB"] {
            session.set_included(code, false).unwrap();
        }
        let csv = export_csv(&session).unwrap();
        assert!(csv.ends_with("proposal_id,,P-7\n\nsubtotal,,0.00\ntax,,0.00\ntotal,,0.00\n"));
    }

    #[test]
    fn test_excluded_items_are_not_exported() {
        let mut session = session();
        session.set_included("EXT-5LB", false).unwrap();

        let csv = export_csv(&session).unwrap();
        assert!(!csv.contains("EXT-5LB"));
        assert!(!csv.contains("EXIT-SIGN"));
        assert!(csv.ends_with("subtotal,,60.00\ntax,,0.00\ntotal,,60.00\n"));
    }

    #[test]
    fn test_cleared_signature_is_omitted() {
        let mut session = session();
        session.save_signature(LOGO).unwrap();
        session.clear_signature();

        let csv = export_csv(&session).unwrap();
        assert!(!csv.contains("signature_data"));
    }
}
