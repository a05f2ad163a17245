//! # DOCX Export
//!
//! Renders a composed proposal as a Word document.
//!
//! ## Document Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Title                                          (meta.title → name)     │
//! │  [logo, 1.5 in wide]                            (meta.logo_data_url)    │
//! │  Proposal ID: CF-2024-001    Date: 2024-05-01                           │
//! │  notes                                                                  │
//! │                                                                         │
//! │  Section title                                                          │
//! │  ┌──────────────┬─────┬────────────┬──────────┐                         │
//! │  │ Description  │ Qty │ Unit price │ Total    │  one table per section  │
//! │  └──────────────┴─────┴────────────┴──────────┘                         │
//! │                                                                         │
//! │  Totals: Subtotal / Tax / Total                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A logo that is not a decodable image is left out with a warning; the
//! rest of the document is still produced.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cavefire_core::proposal::{Composition, Proposal};
use docx_rs::{AlignmentType, Docx, Paragraph, Pic, Run, Table, TableCell, TableRow};
use image::GenericImageView;
use tracing::{debug, warn};

use crate::error::{ExportError, ExportResult};

/// Default file name for DOCX exports.
pub const DOCX_FILE_NAME: &str = "proposal.docx";

/// MIME type of a `.docx` file.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Logo width: 1.5 inches in EMU (914_400 per inch).
const LOGO_WIDTH_EMU: u32 = 1_371_600;

// Run sizes are in half-points.
const TITLE_SIZE: usize = 36;
const HEADING_SIZE: usize = 28;

/// Renders the proposal as DOCX bytes.
pub fn render_proposal_docx(proposal: &Proposal, composition: &Composition) -> ExportResult<Vec<u8>> {
    let meta = proposal.meta.as_ref();
    let mut docx = Docx::new().add_paragraph(heading(proposal.display_title(), TITLE_SIZE));

    if let Some(logo) = meta.and_then(|m| m.logo_data_url.as_deref()) {
        match logo_picture(logo) {
            Ok(pic) => docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic))),
            Err(reason) => warn!(reason = %reason, "Skipping logo in DOCX export"),
        }
    }

    let proposal_id = meta
        .and_then(|m| m.proposal_id.as_deref())
        .or(proposal.id.as_deref());
    let date = meta.and_then(|m| m.date.as_deref());
    if proposal_id.is_some() || date.is_some() {
        let mut header = Paragraph::new();
        if let Some(id) = proposal_id {
            header = header
                .add_run(Run::new().add_text(format!("Proposal ID: {}", id)).bold())
                .add_run(Run::new().add_text("    "));
        }
        if let Some(date) = date {
            header = header.add_run(Run::new().add_text(format!("Date: {}", date)));
        }
        docx = docx.add_paragraph(header);
    }

    if let Some(notes) = proposal.notes.as_deref() {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(notes)));
    }

    for (index, section) in proposal.sections.iter().enumerate() {
        let title = section.title.as_deref().unwrap_or("Section");
        docx = docx.add_paragraph(heading(title, HEADING_SIZE));

        let mut rows = vec![TableRow::new(vec![
            cell("Description", true),
            cell("Qty", true),
            cell("Unit price", true),
            cell("Total", true),
        ])];
        rows.extend(composition.section_lines(index).map(|line| {
            TableRow::new(vec![
                cell(&line.description, false),
                cell(&line.quantity.to_string(), false),
                cell(&line.unit_price.to_string(), false),
                cell(&line.totals.total.to_string(), false),
            ])
        }));
        docx = docx.add_table(Table::new(rows));
    }

    if !composition.skipped.is_empty() {
        let note = format!("Not priced: {}", composition.skipped.join(", "));
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(note).italic()));
    }

    docx = docx.add_paragraph(heading("Totals", HEADING_SIZE));
    for (label, amount) in [
        ("Subtotal", composition.totals.subtotal),
        ("Tax", composition.totals.tax),
        ("Total", composition.totals.total),
    ] {
        docx = docx.add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Right)
                .add_run(Run::new().add_text(format!("{}: {}", label, amount))),
        );
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    let bytes = buffer.into_inner();

    debug!(title = proposal.display_title(), bytes = bytes.len(), "Rendered DOCX export");
    Ok(bytes)
}

fn heading(text: &str, size: usize) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).bold().size(size))
}

fn cell(text: &str, bold: bool) -> TableCell {
    let run = Run::new().add_text(text);
    let run = if bold { run.bold() } else { run };
    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
}

/// Decodes a base64 `data:` URL into a picture scaled to the logo width.
fn logo_picture(data_url: &str) -> Result<Pic, String> {
    let (header, payload) = data_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or("not a data: URL")?;
    if !header.ends_with(";base64") {
        return Err("data URL is not base64 encoded".to_string());
    }

    let bytes = STANDARD.decode(payload.trim()).map_err(|e| e.to_string())?;
    // Decode fully first: `Pic::new` re-encodes the image and panics on bad data
    let decoded = image::load_from_memory(&bytes).map_err(|e| e.to_string())?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err("image has no pixels".to_string());
    }

    let scaled_height = (LOGO_WIDTH_EMU as u64 * height as u64 / width as u64) as u32;
    Ok(Pic::new(&bytes).size(LOGO_WIDTH_EMU, scaled_height))
}

// =============================================================================
// Unit Tests
// =============================================================================
