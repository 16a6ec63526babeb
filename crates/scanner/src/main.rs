mod commands;
mod config;
mod connection;
mod progress;
mod protocol;
mod store;
// The full derivation surface belongs to the renderer binding; the
// headless summary below only exercises part of it.
#[allow(dead_code)]
mod views;

use anyhow::Result;
use commands::CommandGateway;
use common::types::LoadingStage;
use config::DisplayConfig;
use connection::ConnectionManager;
use std::sync::Arc;
use store::StateStore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Config comes first; logging is not up yet, so failures surface
    // through anyhow on stderr.
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(config::ScannerConfig::default_config_path);
    let cfg = config::ScannerConfig::load(&config_path)?;

    let (dispatch, _otel_guard) =
        common::observability::build_dispatch("scanner", &cfg.observability.default_level);
    tracing::dispatcher::set_global_default(dispatch)?;

    info!(path = %config_path, url = %cfg.connection.url, "scanner starting");

    let store = Arc::new(StateStore::new());
    let cancel = CancellationToken::new();
    let (manager, handle) = ConnectionManager::new(cfg.connection.clone(), Arc::clone(&store));
    let connection_task = tokio::spawn(manager.run(cancel.clone()));
    let gateway = CommandGateway::new(handle.clone());

    // Addresses passed after the config path get scanned once the
    // connection opens, like the original page's ?address= bootstrap.
    let bootstrap: Vec<String> = std::env::args().skip(2).collect();
    let mut bootstrapped = bootstrap.is_empty();

    let mut generation = store.watch_generation();
    let mut status = handle.watch_status();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow();
                info!(status = current.label(), "connection status");
                if current == connection::ConnectionStatus::Open && !bootstrapped {
                    for address in &bootstrap {
                        match gateway.request_account(address) {
                            Ok(true) => info!(address = %views::format::shorten_address(address), "bootstrap scan requested"),
                            Ok(false) => debug!(address = %address, "bootstrap scan dropped, connection not open"),
                            Err(e) => warn!(address = %address, error = %e, "bootstrap address rejected"),
                        }
                    }
                    bootstrapped = true;
                }
            }
            changed = generation.changed() => {
                if changed.is_err() {
                    break;
                }
                log_summary(&store, &cfg.display);
            }
        }
    }

    cancel.cancel();
    let _ = connection_task.await;
    Ok(())
}

/// Headless stand-in for the renderer: one summary per store change.
fn log_summary(store: &StateStore, display: &DisplayConfig) {
    let ranked = views::rank_addresses(store.all());
    let loading = ranked
        .iter()
        .filter(|r| matches!(r.loading_stage, Some(s) if s != LoadingStage::Complete))
        .count();
    info!(addresses = ranked.len(), loading, "mirror updated");

    for record in &ranked {
        if let Some(stage) = progress::stage_info(record.loading_stage) {
            debug!(
                address = %views::format::shorten_address(&record.address),
                percent = stage.percent,
                stage = stage.label,
                "loading"
            );
        }
    }

    let Some(top) = ranked.first() else { return };
    let sol_usd = views::sol_usd_estimate(&top.portfolio, display.sol_usd_fallback);
    let total = views::aggregate_total(top);
    let holdings =
        views::portfolio::sort_portfolio(top.portfolio.clone(), display.default_sort, top.total_value);
    debug!(
        address = %views::format::shorten_address(&top.address),
        balance = top.balance,
        usd_estimate = top.balance * sol_usd,
        total_usd = total,
        tokens = holdings.len(),
        top_token = holdings.first().map_or("-", |t| t.symbol.as_str()),
        "top balance"
    );
}
