//! # Remote Compose Client
//!
//! Posts a proposal to a running proposals API and compares its totals with
//! the ones computed locally.
//!
//! ```text
//! ┌──────────────┐   POST {server}/api/compose    ┌──────────────────┐
//! │ cavefire CLI │ ─────────────────────────────► │  cavefire-api    │
//! │              │ ◄───────────────────────────── │                  │
//! └──────┬───────┘   {subtotal, tax, total}       └──────────────────┘
//!        │           (integer cents)
//!        ▼
//!   Comparison { local, remote } ──► per-field differences
//! ```

use std::fmt;
use std::time::Duration;

use cavefire_core::{Money, Proposal, Totals};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Body of a successful `/api/compose` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTotals {
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
    #[serde(default)]
    pub skipped: Vec<String>,
}

impl RemoteTotals {
    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: Money::from_cents(self.subtotal),
            tax: Money::from_cents(self.tax),
            total: Money::from_cents(self.total),
        }
    }
}

pub struct RemoteComposer {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteComposer {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(RemoteComposer {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn compose_url(&self) -> String {
        format!("{}/api/compose", self.base_url)
    }

    pub async fn compose(&self, proposal: &Proposal) -> Result<RemoteTotals, RemoteError> {
        let url = self.compose_url();
        debug!(url = %url, "Posting proposal");

        let response = self.client.post(&url).json(proposal).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<RemoteTotals>().await?)
    }
}

// =============================================================================
// Comparison
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDiff {
    pub field: &'static str,
    pub local: Money,
    pub remote: Money,
}

impl FieldDiff {
    /// `remote - local` in cents.
    pub fn delta_cents(&self) -> i64 {
        self.remote.cents() - self.local.cents()
    }
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: local {} ({}) vs remote {} ({}), off by {} cents",
            self.field,
            self.local.cents(),
            self.local,
            self.remote.cents(),
            self.remote,
            self.delta_cents()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub local: Totals,
    pub remote: Totals,
}

impl Comparison {
    pub fn new(local: Totals, remote: Totals) -> Self {
        Comparison { local, remote }
    }

    pub fn differences(&self) -> Vec<FieldDiff> {
        [
            ("subtotal", self.local.subtotal, self.remote.subtotal),
            ("tax", self.local.tax, self.remote.tax),
            ("total", self.local.total, self.remote.total),
        ]
        .into_iter()
        .filter(|(_, local, remote)| local != remote)
        .map(|(field, local, remote)| FieldDiff {
            field,
            local,
            remote,
        })
        .collect()
    }

    pub fn matches(&self) -> bool {
        self.local == self.remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn totals(subtotal: i64, tax: i64) -> Totals {
        Totals {
            subtotal: Money::from_cents(subtotal),
            tax: Money::from_cents(tax),
            total: Money::from_cents(subtotal + tax),
        }
    }

    #[test]
    fn test_comparison_reports_each_field() {
        let cmp = Comparison::new(totals(9190, 279), totals(9190, 280));
        assert!(!cmp.matches());

        let diffs = cmp.differences();
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].field, "tax");
        assert_eq!(diffs[0].delta_cents(), 1);
        assert_eq!(diffs[1].field, "total");
        assert_eq!(
            diffs[0].to_string(),
            "tax: local 279 ($2.79) vs remote 280 ($2.80), off by 1 cents"
        );
    }

    #[test]
    fn test_comparison_matches() {
        let cmp = Comparison::new(totals(2000, 175), totals(2000, 175));
        assert!(cmp.matches());
        assert!(cmp.differences().is_empty());
    }

    #[test]
    fn test_compose_url_trims_slash() {
        let composer = RemoteComposer::new("http://localhost:8003/").unwrap();
        assert_eq!(composer.compose_url(), "http://localhost:8003/api/compose");
    }

    #[tokio::test]
    async fn test_compose_posts_proposal() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/compose")
                    .json_body_partial(r#"{"id": "ui-prop"}"#);
                then.status(200)
                    .json_body(json!({"subtotal": 9190, "tax": 279, "total": 9469, "skipped": []}));
            })
            .await;

        let composer = RemoteComposer::new(server.base_url()).unwrap();
        let proposal = Proposal::from_selection([("F-A-ANNUAL", 10), ("EXT-5LB", 2)]);
        let remote = composer.compose(&proposal).await.unwrap();

        mock.assert_async().await;
        assert_eq!(remote.totals(), totals(9190, 279));
        assert!(remote.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_compose_surfaces_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/compose");
                then.status(400)
                    .json_body(json!({"code": "VALIDATION_ERROR", "message": "bad"}));
            })
            .await;

        let composer = RemoteComposer::new(server.base_url()).unwrap();
        let err = composer.compose(&Proposal::default()).await.unwrap_err();

        match err {
            RemoteError::Status { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("VALIDATION_ERROR"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
