use crate::connection::ConnectionHandle;
use crate::protocol::ClientCommand;
use thiserror::Error;
use tracing::debug;

/// Local validation failures. These never reach the transport and never
/// touch the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("address must not be empty")]
    EmptyAddress,
}

/// Validates outbound intents and dispatches them against the connection.
pub struct CommandGateway {
    connection: ConnectionHandle,
}

impl CommandGateway {
    pub fn new(connection: ConnectionHandle) -> Self {
        Self { connection }
    }

    /// Request a (re)load of one address. Input is trimmed; an empty
    /// address is rejected locally. When the connection is not open the
    /// command is silently dropped — the returned `false` is the only
    /// trace, nothing retries.
    pub fn request_account(&self, input: &str) -> Result<bool, CommandError> {
        let address = input.trim();
        if address.is_empty() {
            return Err(CommandError::EmptyAddress);
        }
        debug!(address = %address, "requesting account scan");
        Ok(self.connection.send(ClientCommand::GetAccount {
            address: address.to_string(),
        }))
    }

    /// Ask the server to re-push every known record. No-op when not
    /// connected.
    pub fn refresh_all(&self) -> bool {
        debug!("requesting full refresh");
        self.connection.send(ClientCommand::RefreshAll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::connection::ConnectionManager;
    use crate::store::StateStore;
    use std::sync::Arc;

    fn offline_gateway() -> CommandGateway {
        // A manager that is never run: the connection stays Idle, so every
        // dispatch exercises the not-open path.
        let (_manager, handle) = ConnectionManager::new(
            ConnectionConfig {
                url: "ws://127.0.0.1:1".to_string(),
                reconnect_delay_ms: 5000,
            },
            Arc::new(StateStore::new()),
        );
        CommandGateway::new(handle)
    }

    #[tokio::test]
    async fn test_empty_address_rejected_before_transport() {
        let gateway = offline_gateway();
        assert_eq!(gateway.request_account(""), Err(CommandError::EmptyAddress));
        assert_eq!(
            gateway.request_account("   \t  "),
            Err(CommandError::EmptyAddress)
        );
    }

    #[tokio::test]
    async fn test_valid_address_is_trimmed_and_dispatched() {
        let gateway = offline_gateway();
        // Valid input passes validation; with the connection not open the
        // dispatch itself reports the silent drop.
        assert_eq!(gateway.request_account("  addr1  "), Ok(false));
    }

    #[tokio::test]
    async fn test_refresh_all_noop_when_disconnected() {
        let gateway = offline_gateway();
        assert!(!gateway.refresh_all());
    }

    #[test]
    fn test_command_error_message() {
        assert_eq!(
            CommandError::EmptyAddress.to_string(),
            "address must not be empty"
        );
    }
}
