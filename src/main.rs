//! ACWD Water Usage Forwarder
//!
//! Signs in to the Alameda County Water District customer portal, pulls the
//! last few days of hourly water usage together with the current bill, and
//! logs the result.
//!
//! # Modes
//!
//! - **Oneshot** (`COLLECTOR_ONESHOT=true`): run once, print the result as JSON
//!   and exit
//! - **Polling** (default): run every `COLLECTOR_INTERVAL_SEC` until SIGTERM or
//!   SIGINT
//!
//! Every run is bounded by `COLLECTOR_RUN_TIMEOUT_SEC`. A crashed polling task
//! is logged and restarted.

mod acwd;
mod config;
mod error;
mod model;

#[cfg(test)]
mod test_utils;

use crate::model::{AcquisitionResult, UsageSource};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinError;
use tokio::time::{self, sleep, Duration};

#[tokio::main]
async fn main() {
    let app_config = config::load_app_config().expect("Failed to load AppConfig");
    tracing_subscriber::fmt()
        .with_max_level(app_config.log_level())
        .init();

    let collector_config =
        Arc::new(config::load_collector_config().expect("Failed to load CollectorConfig"));
    let acwd_config = config::load_acwd_config().expect("Failed to load AcwdConfig");
    let acwd_client =
        Arc::new(acwd::Client::new(&acwd_config).expect("Failed to build portal client"));

    let source: Arc<dyn UsageSource> = Arc::new(acwd::WaterUsageCollector::new(
        acwd_client,
        acwd_config.account(),
        collector_config.days,
        collector_config.concurrency,
    ));

    if collector_config.oneshot {
        let result = run_once(
            source.as_ref(),
            Local::now().date_naive(),
            collector_config.run_timeout(),
        )
        .await;
        match result.map(|r| serde_json::to_string_pretty(&r)) {
            Some(Ok(json)) => println!("{}", json),
            Some(Err(e)) => {
                tracing::error!("Failed to serialize result: {:?}", e);
                std::process::exit(1);
            }
            None => std::process::exit(1),
        }
        return;
    }

    let spawn_collect_task = || -> tokio::task::JoinHandle<()> {
        tokio::spawn(create_collect_task(
            Arc::clone(&source),
            collector_config.interval(),
            collector_config.run_timeout(),
        ))
    };
    let mut collect_task = spawn_collect_task();

    let mut sig_term = signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
    tracing::info!("Running... Press Ctrl-C or send SIGTERM to terminate.");
    loop {
        tokio::select! {
            _ = sig_term.recv() => {
                tracing::info!("Received SIGTERM. Exiting...");
                break;
            }
            _ = ctrl_c() => {
                tracing::info!("Received SIGINT. Exiting...");
                break;
            }
            result = &mut collect_task => {
                handle_task_result("usage_collector", result);
                collect_task = spawn_collect_task();
            }
        }
    }
}

/// Runs one acquisition bounded by `run_timeout` and logs its outcome.
///
/// Returns `None` when the run failed or timed out.
async fn run_once(
    source: &dyn UsageSource,
    today: NaiveDate,
    run_timeout: Duration,
) -> Option<AcquisitionResult> {
    match time::timeout(run_timeout, source.acquire(today)).await {
        Ok(Ok(result)) => {
            log_summary(&result);
            Some(result)
        }
        Ok(Err(e)) => {
            if e.is_rejected_credentials() {
                tracing::error!("Portal rejected the credentials: {}", e);
            } else if e.is_contract_change() {
                tracing::error!("Portal responses changed shape: {}", e);
            } else {
                tracing::error!("Acquisition failed: {}", e);
            }
            None
        }
        Err(_) => {
            tracing::error!("Acquisition timed out after {:?}", run_timeout);
            None
        }
    }
}

fn log_summary(result: &AcquisitionResult) {
    tracing::info!(
        meter = %result.meter(),
        start = %result.range().start_label(),
        end = %result.range().end_label(),
        records = result.records().len(),
        total_gallons = result.total_gallons(),
        malformed = result.malformed().len(),
        complete = result.is_complete(),
        "Acquisition finished"
    );
    if let Some(latest) = result.records().last().and_then(|r| r.local_timestamp()) {
        tracing::info!("Latest hourly reading at {}", latest.to_rfc3339());
    }
    for gap in result.missing_days() {
        tracing::warn!(date = %gap.date, reason = ?gap.reason, "Day missing from result");
    }
    match (result.billing(), result.billing_error()) {
        (Some(billing), _) => tracing::info!(
            due_date = %billing.due_date,
            amount_due = %billing.amount_due,
            "Current bill"
        ),
        (None, Some(error)) => tracing::warn!("No billing snapshot: {}", error),
        (None, None) => {}
    }
    for point in result.cumulative() {
        tracing::debug!("{:?}", point);
    }
}

/// One polling cycle: acquire, then sleep for `interval`.
async fn create_collect_task(
    source: Arc<dyn UsageSource>,
    interval: Duration,
    run_timeout: Duration,
) {
    run_once(source.as_ref(), Local::now().date_naive(), run_timeout).await;
    sleep(interval).await;
}

/// Logs how a polling task ended, so crashes are visible before the restart.
fn handle_task_result(task_name: &str, result: Result<(), JoinError>) {
    match result {
        Ok(_) => {
            tracing::debug!("Task {} completed.", task_name);
        }
        Err(e) => {
            tracing::error!("Task {} failed: {:?}", task_name, e);
        }
    }
}
