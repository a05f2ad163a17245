//! Subcommand implementations.
//!
//! Every command works off a [`Pricing`] context (catalog, calculator, tax
//! rate) built from the global arguments. Commands write their report to
//! the supplied writer so tests can capture it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use cavefire_core::proposal::compose;
use cavefire_core::session::SessionMeta;
use cavefire_core::{Amount, Calculator, Catalog, Composition, PricingSession, Proposal, TaxRate};
use cavefire_export::{
    export_csv, render_proposal_docx, render_proposal_html, CSV_FILE_NAME, DOCX_FILE_NAME,
    HTML_FILE_NAME,
};
use tracing::{info, warn};

use crate::args::Cli;
use crate::remote::{Comparison, RemoteComposer};

// =============================================================================
// Pricing Context
// =============================================================================

#[derive(Debug, Clone)]
pub struct Pricing {
    pub catalog: Catalog,
    pub calculator: Calculator,
    pub tax_rate: TaxRate,
}

impl Pricing {
    pub fn from_args(cli: &Cli) -> anyhow::Result<Self> {
        let tax_rate = TaxRate::parse_percentage(&cli.tax_rate)
            .with_context(|| format!("invalid tax rate '{}'", cli.tax_rate))?;

        let json = fs::read_to_string(&cli.catalog)
            .with_context(|| format!("failed to read catalog {}", cli.catalog.display()))?;
        let catalog = Catalog::from_json(&json)?;
        info!(path = %cli.catalog.display(), addons = catalog.len(), "Loaded catalog");

        Ok(Pricing {
            catalog,
            calculator: Calculator::new(cli.rounding),
            tax_rate,
        })
    }

    pub fn session(&self) -> PricingSession {
        PricingSession::from_catalog(&self.catalog, self.tax_rate).with_calculator(self.calculator)
    }

    pub fn compose(&self, proposal: &Proposal) -> Composition {
        compose(proposal, &self.catalog, &self.calculator, self.tax_rate)
    }

    /// A session holding exactly the catalog add-ons a proposal references.
    ///
    /// Codes missing from the catalog have no session row and are left out
    /// of the CSV; they still appear in the composed HTML if priced inline.
    /// A code listed in several sections gets one row with the summed quantity.
    pub fn session_for(&self, proposal: &Proposal) -> anyhow::Result<PricingSession> {
        let mut session = self.session();
        for addon in self.catalog.iter() {
            session.set_included(&addon.code, false)?;
        }

        let mut quantities: Vec<(&str, u32)> = Vec::new();
        let lines = proposal
            .sections
            .iter()
            .flat_map(|s| s.line_items.iter().chain(s.add_ons.iter()))
            .filter(|line| self.catalog.find(&line.code).is_some());
        for line in lines {
            match quantities.iter_mut().find(|(code, _)| *code == line.code) {
                Some((_, total)) => *total = total.saturating_add(line.quantity()),
                None => quantities.push((line.code.as_str(), line.quantity())),
            }
        }

        for (code, quantity) in quantities {
            session.set_quantity(code, &Amount::Number(f64::from(quantity)))?;
            session.set_included(code, true)?;
        }

        if let Some(meta) = &proposal.meta {
            session.set_meta(SessionMeta {
                proposal_id: meta.proposal_id.clone().or_else(|| proposal.id.clone()),
                date: meta.date.clone(),
            });
            if let Some(logo) = &meta.logo_data_url {
                if let Err(e) = session.attach_logo(logo.clone()) {
                    warn!(error = %e, "Ignoring proposal logo");
                }
            }
        }

        Ok(session)
    }
}

pub fn load_proposal(path: &Path) -> anyhow::Result<Proposal> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read proposal {}", path.display()))?;
    Ok(Proposal::from_json(&json)?)
}

// =============================================================================
// totals
// =============================================================================

pub fn totals(pricing: &Pricing, json: bool, out: &mut impl Write) -> anyhow::Result<()> {
    let session = pricing.session();
    let rows = session.rows();
    let totals = session.totals();

    if json {
        let body = serde_json::json!({
            "tax_rate": pricing.tax_rate.to_string(),
            "rows": rows,
            "totals": totals,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<16} {:<32} {:>5} {:>10} {:>10} {:>10}",
        "CODE", "NAME", "QTY", "LINE", "TAX", "TOTAL"
    )?;
    for row in &rows {
        let mark = if row.included { ' ' } else { '-' };
        writeln!(
            out,
            "{}{:<15} {:<32} {:>5} {:>10} {:>10} {:>10}",
            mark,
            row.code,
            row.name,
            row.quantity,
            row.totals.line.to_string(),
            row.totals.tax.to_string(),
            row.totals.total.to_string()
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Subtotal: {}", totals.subtotal)?;
    writeln!(out, "Tax ({}): {}", pricing.tax_rate, totals.tax)?;
    writeln!(out, "Total: {}", totals.total)?;
    Ok(())
}

// =============================================================================
// compose
// =============================================================================

pub fn compose_file(
    pricing: &Pricing,
    file: &Path,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<Composition> {
    let proposal = load_proposal(file)?;
    let composition = pricing.compose(&proposal);

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&composition)?)?;
    } else {
        writeln!(out, "{}", proposal.display_title())?;
        for line in &composition.lines {
            writeln!(
                out,
                "  {:<16} x{:<4} {:>10}",
                line.code,
                line.quantity,
                line.totals.total.to_string()
            )?;
        }
        if !composition.skipped.is_empty() {
            writeln!(out, "  skipped: {}", composition.skipped.join(", "))?;
        }
        writeln!(out, "Subtotal: {}", composition.totals.subtotal)?;
        writeln!(out, "Tax: {}", composition.totals.tax)?;
        writeln!(out, "Total: {}", composition.totals.total)?;
    }

    Ok(composition)
}

// =============================================================================
// export
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Writes `proposal.html`, `proposal.docx` and the CSV export into `out_dir`.
pub fn export(pricing: &Pricing, file: &Path, out_dir: &Path) -> anyhow::Result<Vec<Artifact>> {
    let proposal = load_proposal(file)?;
    let composition = pricing.compose(&proposal);
    let session = pricing.session_for(&proposal)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let html = render_proposal_html(&proposal, &composition)?;
    let docx = render_proposal_docx(&proposal, &composition)?;
    let csv = export_csv(&session)?;

    let mut artifacts = Vec::new();
    for (name, contents) in [
        (HTML_FILE_NAME, html.into_bytes()),
        (DOCX_FILE_NAME, docx),
        (CSV_FILE_NAME, csv.into_bytes()),
    ] {
        let path = out_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        artifacts.push(stat(path)?);
    }

    Ok(artifacts)
}

fn stat(path: PathBuf) -> anyhow::Result<Artifact> {
    let bytes = fs::metadata(&path)
        .with_context(|| format!("missing artifact {}", path.display()))?
        .len();
    Ok(Artifact { path, bytes })
}

/// Fails when any artifact is missing or empty.
pub fn verify_artifacts(artifacts: &[Artifact]) -> anyhow::Result<()> {
    let empty: Vec<String> = artifacts
        .iter()
        .filter(|a| a.bytes == 0 || !a.path.exists())
        .map(|a| a.path.display().to_string())
        .collect();

    if !empty.is_empty() {
        bail!("missing or empty artifacts: {}", empty.join(", "));
    }
    Ok(())
}

// =============================================================================
// compare
// =============================================================================

pub async fn compare(pricing: &Pricing, file: &Path, server: &str) -> anyhow::Result<Comparison> {
    let proposal = load_proposal(file)?;
    let local = pricing.compose(&proposal).totals;

    let composer = RemoteComposer::new(server)?;
    let remote = composer
        .compose(&proposal)
        .await
        .with_context(|| format!("compose request to {} failed", composer.compose_url()))?;

    Ok(Comparison::new(local, remote.totals()))
}
