use common::types::{IssueSeverity, SecurityReport, SecurityStatus};
use serde::Serialize;

/// Security panel view model for one address.
#[derive(Debug, Clone, Serialize)]
pub struct SecuritySummary {
    pub status: SecurityStatus,
    pub badge: &'static str,
    pub risk_display: String,
    /// Fraction of the risk meter that stays lit: 1 at no risk, 0 at 100.
    pub meter_fraction: f64,
    pub issues: Vec<IssueRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueRow {
    pub severity: IssueSeverity,
    pub title: String,
    pub description: String,
    pub details: String,
}

pub fn badge_label(status: SecurityStatus) -> &'static str {
    match status {
        SecurityStatus::Secure => "Secure",
        SecurityStatus::Warning => "Warning",
        SecurityStatus::Critical => "Critical",
    }
}

pub fn severity_label(severity: IssueSeverity) -> &'static str {
    match severity {
        IssueSeverity::Info => "Info",
        IssueSeverity::Warning => "Warning",
        IssueSeverity::Critical => "Critical",
    }
}

/// Human label for a machine issue type. Known kinds get fixed names;
/// anything else is title-cased with underscores turned into spaces.
pub fn issue_type_label(kind: &str) -> String {
    match kind {
        "address_leak" => "Address Leak".to_string(),
        "suspicious_transactions" => "Suspicious Transactions".to_string(),
        "token_approvals" => "Token Approvals".to_string(),
        "inactive_wallet" => "Inactive Wallet".to_string(),
        "new_wallet" => "New Wallet".to_string(),
        "scan_error" => "Scan Error".to_string(),
        other => other
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

pub fn security_summary(report: &SecurityReport) -> SecuritySummary {
    SecuritySummary {
        status: report.status,
        badge: badge_label(report.status),
        risk_display: format!("{}/100", report.risk_score),
        meter_fraction: 1.0 - f64::from(report.risk_score) / 100.0,
        issues: report
            .issues
            .iter()
            .map(|issue| IssueRow {
                severity: issue.severity,
                title: format!(
                    "{}: {}",
                    severity_label(issue.severity),
                    issue_type_label(&issue.kind)
                ),
                description: issue.description.clone(),
                details: issue.details.clone(),
            })
            .collect(),
    }
}
