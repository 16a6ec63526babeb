//! Pure view derivation over store snapshots.
//!
//! Nothing here mutates state or talks to the transport; every function
//! takes a snapshot (plus the current time where relative formatting
//! needs it) and returns a renderable view model. The reactive binding
//! that calls these on each store notification lives outside the core.

pub mod format;
pub mod portfolio;
pub mod security;

use chrono::{DateTime, Utc};
use common::types::{AddressRecord, NftAsset, SecurityStatus, TokenHolding, TransactionSummary};
use serde::Serialize;
use std::cmp::Ordering;

/// NFT gallery cap; anything past it is reported as a remaining count.
pub const MAX_NFT_DISPLAY: usize = 12;

/// Rank addresses by SOL balance, highest first. Stable: equal balances
/// keep their insertion order.
pub fn rank_addresses(mut records: Vec<AddressRecord>) -> Vec<AddressRecord> {
    records.sort_by(|a, b| b.balance.partial_cmp(&a.balance).unwrap_or(Ordering::Equal));
    records
}

/// Aggregate USD value for one record: the server's figure when present,
/// otherwise the sum of the portfolio.
pub fn aggregate_total(record: &AddressRecord) -> f64 {
    record
        .total_value
        .unwrap_or_else(|| record.portfolio.iter().map(|t| t.usd_value).sum())
}

/// SOL price implied by the portfolio's own SOL holding, falling back to
/// the configured estimate when the holding is absent or unpriced.
pub fn sol_usd_estimate(portfolio: &[TokenHolding], fallback: f64) -> f64 {
    portfolio
        .iter()
        .find(|t| t.symbol == "SOL" && t.balance > 0.0)
        .map_or(fallback, |sol| sol.usd_value / sol.balance)
}

/// One entry of the ranked address list.
#[derive(Debug, Clone, Serialize)]
pub struct AddressCard {
    pub address: String,
    pub address_short: String,
    pub balance_sol: f64,
    pub usd_estimate: f64,
    pub transaction_count: usize,
    pub last_activity: String,
    pub security_status: Option<SecurityStatus>,
}

/// Build list cards in the given (already ranked) order.
pub fn address_cards(records: &[AddressRecord], sol_usd: f64, now: DateTime<Utc>) -> Vec<AddressCard> {
    records
        .iter()
        .map(|record| {
            let last_activity = record
                .recent_transactions
                .first()
                .map_or_else(
                    || "No recent activity".to_string(),
                    |tx| format!("Last activity: {}", format::format_time_ago(tx.block_time, now)),
                );
            AddressCard {
                address: record.address.clone(),
                address_short: format::shorten_address(&record.address),
                balance_sol: record.balance,
                usd_estimate: record.balance * sol_usd,
                transaction_count: record.recent_transactions.len(),
                last_activity,
                security_status: record.security.as_ref().map(|s| s.status),
            }
        })
        .collect()
}

/// Historical value series, or a signal that there is not enough of it.
#[derive(Debug, Clone, PartialEq)]
pub enum HistorySeries {
    /// Fewer than two usable points — not an error, just nothing to chart.
    Insufficient,
    Series(Vec<(DateTime<Utc>, f64)>),
}

/// Chronologically sorted series from a record's history. Points with
/// unparsable timestamps are skipped.
pub fn history_series(record: &AddressRecord) -> HistorySeries {
    let mut points: Vec<(DateTime<Utc>, f64)> = record
        .historical_data
        .iter()
        .filter_map(|p| format::parse_timestamp(&p.timestamp).map(|ts| (ts, p.value)))
        .collect();
    if points.len() < 2 {
        return HistorySeries::Insufficient;
    }
    points.sort_by_key(|(ts, _)| *ts);
    HistorySeries::Series(points)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NftCard {
    pub name: String,
    pub collection: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NftGallery {
    pub items: Vec<NftCard>,
    /// How many assets were cut off by the display cap.
    pub remaining: usize,
}

/// First twelve NFTs in server order; the rest is a count.
pub fn nft_gallery(nfts: &[NftAsset]) -> NftGallery {
    let items = nfts
        .iter()
        .take(MAX_NFT_DISPLAY)
        .map(|nft| {
            let metadata = nft.content.as_ref().and_then(|c| c.metadata.as_ref());
            NftCard {
                name: metadata
                    .and_then(|m| m.name.clone())
                    .unwrap_or_else(|| "Unnamed NFT".to_string()),
                collection: metadata
                    .and_then(|m| m.collection.as_ref())
                    .and_then(|c| c.name.clone())
                    .unwrap_or_else(|| "Unknown Collection".to_string()),
                image: nft
                    .content
                    .as_ref()
                    .and_then(|c| c.links.as_ref())
                    .and_then(|l| l.image.clone()),
            }
        })
        .collect();
    NftGallery {
        items,
        remaining: nfts.len().saturating_sub(MAX_NFT_DISPLAY),
    }
}

/// One row of the recent-transactions list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRow {
    pub signature: String,
    pub signature_short: String,
    pub confirmed: bool,
    pub time_ago: String,
}

/// Rows in server order (newest first, as pushed).
pub fn transaction_rows(transactions: &[TransactionSummary], now: DateTime<Utc>) -> Vec<TransactionRow> {
    transactions
        .iter()
        .map(|tx| TransactionRow {
            signature: tx.signature.clone(),
            signature_short: format::shorten_address(&tx.signature),
            confirmed: tx.confirmed(),
            time_ago: format::format_time_ago(tx.block_time, now),
        })
        .collect()
}
