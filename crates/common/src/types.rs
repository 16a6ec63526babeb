use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete progress marker for a single address's data load.
/// Stages arrive from the server; each maps to a fixed percent and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingStage {
    BasicInfo,
    Transactions,
    Tokens,
    Complete,
}

impl LoadingStage {
    pub fn percent(self) -> u8 {
        match self {
            Self::BasicInfo => 25,
            Self::Transactions => 50,
            Self::Tokens => 75,
            Self::Complete => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic info",
            Self::Transactions => "Transactions",
            Self::Tokens => "Token balances",
            Self::Complete => "Complete!",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "basic_info" => Some(Self::BasicInfo),
            "transactions" => Some(Self::Transactions),
            "tokens" => Some(Self::Tokens),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for LoadingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BasicInfo => write!(f, "basic_info"),
            Self::Transactions => write!(f, "transactions"),
            Self::Tokens => write!(f, "tokens"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityStatus {
    Secure,
    Warning,
    Critical,
}

impl fmt::Display for SecurityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secure => write!(f, "secure"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// One flagged issue from the server-side security scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityIssue {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: IssueSeverity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: String,
}

/// Security scan result attached to an address record.
/// `risk_score` is 0-100, higher is riskier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityReport {
    pub status: SecurityStatus,
    #[serde(default)]
    pub issues: Vec<SecurityIssue>,
    pub risk_score: u8,
    #[serde(default)]
    pub last_checked: Option<String>,
}

/// One token position in an address's portfolio.
/// `symbol` is a display key only, not guaranteed unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenHolding {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub mint: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub symbol: String,
    pub balance: f64,
    #[serde(default)]
    pub usd_value: f64,
    #[serde(default)]
    pub logo: Option<String>,
}

/// A recent transaction signature as reported by the RPC.
/// `err` is non-null when the transaction failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub signature: String,
    #[serde(rename = "blockTime", default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
}

impl TransactionSummary {
    pub fn confirmed(&self) -> bool {
        self.err.is_none()
    }
}

/// One point of the historical portfolio-value series.
/// Timestamps are ISO-8601 strings as emitted by the server; the view
/// layer parses them leniently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NftCollection {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NftMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub collection: Option<NftCollection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NftLinks {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NftContent {
    #[serde(default)]
    pub metadata: Option<NftMetadata>,
    #[serde(default)]
    pub links: Option<NftLinks>,
}

/// An NFT asset in DAS shape, passed through from the server untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NftAsset {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Option<NftContent>,
}

/// The full server-side record for one address. Incoming records always
/// replace the stored one wholesale; there is no per-field merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    pub address: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub portfolio: Vec<TokenHolding>,
    #[serde(default)]
    pub recent_transactions: Vec<TransactionSummary>,
    #[serde(default)]
    pub security: Option<SecurityReport>,
    #[serde(default)]
    pub historical_data: Vec<HistoryPoint>,
    #[serde(default)]
    pub total_value: Option<f64>,
    #[serde(default)]
    pub nfts: Vec<NftAsset>,
    #[serde(default)]
    pub loading_stage: Option<LoadingStage>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl AddressRecord {
    /// Minimal record with just an address, used as a test fixture base
    /// and for records first seen through a partial update.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            balance: 0.0,
            portfolio: Vec::new(),
            recent_transactions: Vec::new(),
            security: None,
            historical_data: Vec::new(),
            total_value: None,
            nfts: Vec::new(),
            loading_stage: None,
            last_updated: None,
        }
    }
}
