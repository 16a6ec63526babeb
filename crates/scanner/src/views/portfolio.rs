use common::types::TokenHolding;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Holdings whose value is at or below this fraction of the total are
/// dropped from the chart.
const CHART_MIN_FRACTION: f64 = 0.01;
/// Above this many post-filter slices, the tail folds into "Other".
const CHART_MAX_SLICES: usize = 7;
const CHART_TOP_SLICES: usize = 6;

/// Selectable portfolio sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioSort {
    Value,
    Name,
    Percent,
}

impl fmt::Display for PortfolioSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => write!(f, "value"),
            Self::Name => write!(f, "name"),
            Self::Percent => write!(f, "percent"),
        }
    }
}

impl PortfolioSort {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "value" => Some(Self::Value),
            "name" => Some(Self::Name),
            "percent" => Some(Self::Percent),
            _ => None,
        }
    }
}

/// Percent of total, with a zero (or negative) total yielding 0 rather
/// than a division by zero.
pub fn percent_of_total(usd_value: f64, total_value: f64) -> f64 {
    if total_value > 0.0 {
        usd_value / total_value * 100.0
    } else {
        0.0
    }
}

fn by_value_desc(a: &TokenHolding, b: &TokenHolding) -> Ordering {
    b.usd_value
        .partial_cmp(&a.usd_value)
        .unwrap_or(Ordering::Equal)
}

/// Sort a portfolio by the selected key. All sorts are stable, so equal
/// keys keep their insertion order.
///
/// For `Percent` the divisor is `total_value` when the server supplied
/// one, else the sum of the holdings' values; a zero total makes every
/// percent 0 and leaves the order unchanged.
pub fn sort_portfolio(
    mut holdings: Vec<TokenHolding>,
    key: PortfolioSort,
    total_value: Option<f64>,
) -> Vec<TokenHolding> {
    match key {
        PortfolioSort::Value => holdings.sort_by(by_value_desc),
        PortfolioSort::Name => holdings.sort_by(|a, b| a.symbol.cmp(&b.symbol)),
        PortfolioSort::Percent => {
            let total =
                total_value.unwrap_or_else(|| holdings.iter().map(|t| t.usd_value).sum());
            holdings.sort_by(|a, b| {
                let pa = percent_of_total(a.usd_value, total);
                let pb = percent_of_total(b.usd_value, total);
                pb.partial_cmp(&pa).unwrap_or(Ordering::Equal)
            });
        }
    }
    holdings
}

/// One row of the portfolio list, shaped for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingRow {
    pub symbol: String,
    pub balance: f64,
    pub balance_display: String,
    pub usd_value: f64,
    pub value_display: String,
    pub percent: f64,
    pub percent_display: String,
    pub logo: Option<String>,
}

pub fn holding_rows(holdings: &[TokenHolding], total_value: f64) -> Vec<HoldingRow> {
    holdings
        .iter()
        .map(|token| {
            let percent = percent_of_total(token.usd_value, total_value);
            // SOL balances get more precision than SPL tokens.
            let decimals = if token.symbol == "SOL" { 4 } else { 2 };
            HoldingRow {
                symbol: token.symbol.clone(),
                balance: token.balance,
                balance_display: format!(
                    "{:.decimals$} {}",
                    token.balance,
                    token.symbol,
                    decimals = decimals
                ),
                usd_value: token.usd_value,
                value_display: format!("{:.2}", token.usd_value),
                percent,
                percent_display: format!("{percent:.2}%"),
                logo: token.logo.clone(),
            }
        })
        .collect()
}

/// One slice of the portfolio doughnut chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub label: String,
    pub usd_value: f64,
}

/// Bucket holdings for the chart: drop anything worth 1% of the total or
/// less, and when more than seven slices remain, keep the top six by
/// value and fold the rest into a single "Other" slice — omitted entirely
/// when the folded sum is not strictly positive.
pub fn chart_slices(holdings: &[TokenHolding], total_value: f64) -> Vec<ChartSlice> {
    let filtered: Vec<&TokenHolding> = holdings
        .iter()
        .filter(|t| t.usd_value > total_value * CHART_MIN_FRACTION)
        .collect();

    if filtered.len() <= CHART_MAX_SLICES {
        return filtered
            .into_iter()
            .map(|t| ChartSlice {
                label: t.symbol.clone(),
                usd_value: t.usd_value,
            })
            .collect();
    }

    let mut sorted = filtered;
    sorted.sort_by(|a, b| by_value_desc(a, b));

    let mut slices: Vec<ChartSlice> = sorted[..CHART_TOP_SLICES]
        .iter()
        .map(|t| ChartSlice {
            label: t.symbol.clone(),
            usd_value: t.usd_value,
        })
        .collect();

    let other_value: f64 = sorted[CHART_TOP_SLICES..].iter().map(|t| t.usd_value).sum();
    if other_value > 0.0 {
        slices.push(ChartSlice {
            label: "Other".to_string(),
            usd_value: other_value,
        });
    }

    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(symbol: &str, usd_value: f64) -> TokenHolding {
        TokenHolding {
            kind: None,
            mint: None,
            name: None,
            symbol: symbol.to_string(),
            balance: 1.0,
            usd_value,
            logo: None,
        }
    }

    #[test]
    fn test_sort_by_value_descending() {
        let sorted = sort_portfolio(
            vec![holding("A", 1.0), holding("B", 3.0), holding("C", 2.0)],
            PortfolioSort::Value,
            None,
        );
        let symbols: Vec<&str> = sorted.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sort_by_name_ascending() {
        let sorted = sort_portfolio(
            vec![holding("SOL", 1.0), holding("BONK", 3.0), holding("RAY", 2.0)],
            PortfolioSort::Name,
            None,
        );
        let symbols: Vec<&str> = sorted.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BONK", "RAY", "SOL"]);
    }

    #[test]
    fn test_sort_equal_values_keep_insertion_order() {
        let sorted = sort_portfolio(
            vec![holding("X", 2.0), holding("Y", 2.0), holding("Z", 5.0)],
            PortfolioSort::Value,
            None,
        );
        let symbols: Vec<&str> = sorted.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Z", "X", "Y"]);
    }

    #[test]
    fn test_sort_by_percent_zero_total_is_stable_noop() {
        let sorted = sort_portfolio(
            vec![holding("A", 0.0), holding("B", 0.0), holding("C", 0.0)],
            PortfolioSort::Percent,
            None,
        );
        let symbols: Vec<&str> = sorted.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_percent_of_total_zero_total() {
        assert_eq!(percent_of_total(10.0, 0.0), 0.0);
        assert_eq!(percent_of_total(0.0, 0.0), 0.0);
        assert_eq!(percent_of_total(25.0, 100.0), 25.0);
    }

    #[test]
    fn test_holding_rows_percent_and_precision() {
        let rows = holding_rows(&[holding("SOL", 50.0), holding("RAY", 50.0)], 100.0);
        assert_eq!(rows[0].percent_display, "50.00%");
        // SOL shows 4 decimals, other tokens 2.
        assert_eq!(rows[0].balance_display, "1.0000 SOL");
        assert_eq!(rows[1].balance_display, "1.00 RAY");
    }

    #[test]
    fn test_holding_rows_zero_total_no_division() {
        let rows = holding_rows(&[holding("A", 0.0)], 0.0);
        assert_eq!(rows[0].percent, 0.0);
        assert_eq!(rows[0].percent_display, "0.00%");
    }

    #[test]
    fn test_chart_drops_dust_per_item() {
        // 9 holdings summing to 100; the 3 smallest are at or below the 1%
        // threshold individually and disappear. 6 remain: no "Other".
        let holdings = vec![
            holding("A", 30.0),
            holding("B", 25.0),
            holding("C", 20.0),
            holding("D", 12.0),
            holding("E", 6.0),
            holding("F", 5.0),
            holding("G", 1.0),
            holding("H", 0.6),
            holding("I", 0.4),
        ];
        let slices = chart_slices(&holdings, 100.0);
        assert_eq!(slices.len(), 6);
        assert!(slices.iter().all(|s| s.label != "Other"));
        assert!(slices.iter().all(|s| s.usd_value > 1.0));
    }

    #[test]
    fn test_chart_folds_tail_into_other_above_seven() {
        // 9 holdings all above the 1% threshold: top 6 kept, tail folded.
        let holdings = vec![
            holding("A", 30.0),
            holding("B", 20.0),
            holding("C", 15.0),
            holding("D", 10.0),
            holding("E", 8.0),
            holding("F", 7.0),
            holding("G", 4.0),
            holding("H", 3.5),
            holding("I", 2.5),
        ];
        let slices = chart_slices(&holdings, 100.0);
        assert_eq!(slices.len(), 7);
        assert_eq!(slices[0].label, "A");
        assert_eq!(slices[5].label, "F");
        assert_eq!(slices[6].label, "Other");
        assert_eq!(slices[6].usd_value, 10.0);
    }

    #[test]
    fn test_chart_exactly_seven_keeps_all() {
        let holdings: Vec<TokenHolding> = (0..7)
            .map(|i| holding(&format!("T{i}"), 10.0 + f64::from(i)))
            .collect();
        let slices = chart_slices(&holdings, 100.0);
        assert_eq!(slices.len(), 7);
        assert!(slices.iter().all(|s| s.label != "Other"));
        // At or below the cap the incoming order is preserved, not re-sorted.
        assert_eq!(slices[0].label, "T0");
    }

    #[test]
    fn test_chart_zero_total_keeps_nothing_positive_filter() {
        // With a zero total every positive holding passes the filter
        // (anything > 0), and bucketing still applies.
        let holdings = vec![holding("A", 1.0), holding("B", 2.0)];
        let slices = chart_slices(&holdings, 0.0);
        assert_eq!(slices.len(), 2);
    }

    #[test]
    fn test_chart_zero_sum_other_is_omitted() {
        // Nine worthless holdings that still pass the filter: folding
        // would produce a zero-value "Other" slice, which must be omitted
        // rather than rendered as an empty sliver.
        let holdings: Vec<TokenHolding> =
            (0..9).map(|i| holding(&format!("T{i}"), 0.0)).collect();
        let slices = chart_slices(&holdings, -1.0);
        assert_eq!(slices.len(), CHART_TOP_SLICES);
        assert!(slices.iter().all(|s| s.label != "Other"));
    }

    #[test]
    fn test_sort_key_display_and_parse() {
        for key in [
            PortfolioSort::Value,
            PortfolioSort::Name,
            PortfolioSort::Percent,
        ] {
            let s = key.to_string();
            assert_eq!(PortfolioSort::from_str_loose(&s), Some(key));
        }
        assert_eq!(PortfolioSort::from_str_loose("volume"), None);
    }
}
