use common::types::AddressRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Messages pushed by the server over the WebSocket.
///
/// `full_update` replaces the entire address collection; `account_update`
/// upserts exactly one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    FullUpdate { data: Vec<AddressRecord> },
    AccountUpdate { data: Box<AddressRecord> },
}

/// Commands the client sends upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    GetAccount { address: String },
    RefreshAll,
}

impl ClientCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetAccount { .. } => "get_account",
            Self::RefreshAll => "refresh_all",
        }
    }
}

/// Parse one inbound frame. Malformed JSON and unrecognized `type` values
/// are dropped (fail open), counted on `scanner_messages_dropped_total`.
pub fn parse_server_message(text: &str) -> Option<ServerMessage> {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(message) => Some(message),
        Err(e) => {
            metrics::counter!("scanner_messages_dropped_total").increment(1);
            debug!(error = %e, "dropping malformed or unrecognized message");
            None
        }
    }
}
