//! auditmond - audit probe daemon entry point.
//!
//! Runs one probe over the current window, folds the sample into the
//! persisted baseline, and emits the summary as JSON on stdout for the
//! reporter.

use std::process::ExitCode;
use tracing::{info, warn};

use sentinel_auditmond::{AuditProbe, Ausearch};
use sentinel_common::logging;

/// Probe window: one day, matching the collector's `today` filter.
const WINDOW_SECONDS: i64 = 86_400;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_logging_pretty("info");

    info!("--- Starting auditmond ---");

    let mut probe = AuditProbe::new(Ausearch);
    let summary = probe.probe(WINDOW_SECONDS).await;

    if summary.enabled {
        let store = probe.store().clone();
        let mut baseline = store.load().unwrap_or_default();
        baseline.update(&summary);
        if !store.save(&baseline) {
            warn!("Baseline not persisted");
        }
    } else {
        info!("Probe disabled, baseline left untouched");
    }

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Summary serialization failed");
            ExitCode::FAILURE
        }
    }
}
