//! Connection state machine over an injected provider
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::address::Address;
use crate::error::ClientError;
use crate::provider::Provider;

/// Cached connection state. Written only by `connect` and the account-watch
/// task; read by everyone else without a network round trip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Connection {
    pub active_address: Option<Address>,
    pub is_connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    AddressChanged(Address),
    Disconnected,
}

/// Holds the provider handle and keeps the cached [`Connection`] consistent
/// with ledger-side account changes.
///
/// State changes are published on a broadcast channel; subscribe through
/// [`ProviderConnector::events`]. Redundant account notifications with
/// unchanged data produce no state write and no event.
pub struct ProviderConnector {
    provider: Arc<dyn Provider>,
    state: Arc<watch::Sender<Connection>>,
    events: broadcast::Sender<ConnectionEvent>,
    watch_task: Mutex<Option<JoinHandle<()>>>,
}

impl ProviderConnector {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        let (state, _) = watch::channel(Connection::default());
        let (events, _) = broadcast::channel(16);
        Self {
            provider,
            state: Arc::new(state),
            events,
            watch_task: Mutex::new(None),
        }
    }

    /// Request account access and cache the resulting connection.
    ///
    /// The first successful connect also starts the account-watch task that
    /// consumes the provider's account-change stream.
    pub async fn connect(&self) -> Result<Connection, ClientError> {
        let accounts = self.provider.request_accounts().await?;
        if accounts.is_empty() {
            warn!("provider granted access but reported no accounts");
            return Err(ClientError::ProviderUnavailable);
        }

        apply_accounts(&self.state, &self.events, &accounts);
        self.ensure_watch_task();

        let connection = self.state.borrow().clone();
        info!(address = %accounts[0], "connected to provider");
        Ok(connection)
    }

    /// The cached active address; `None` if never connected or disconnected.
    pub fn current_address(&self) -> Option<Address> {
        self.state.borrow().active_address
    }

    pub fn connection(&self) -> Connection {
        self.state.borrow().clone()
    }

    /// New subscription to connection-state-change events.
    pub fn events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    fn ensure_watch_task(&self) {
        let mut slot = self.watch_task.lock().unwrap();
        if slot.is_some() {
            return;
        }

        let mut changes = self.provider.subscribe_accounts();
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        *slot = Some(tokio::spawn(async move {
            while let Some(accounts) = changes.recv().await {
                debug!(count = accounts.len(), "account list changed");
                apply_accounts(&state, &events, &accounts);
            }
        }));
    }
}

impl Drop for ProviderConnector {
    fn drop(&mut self) {
        if let Some(task) = self.watch_task.lock().unwrap().take() {
            task.abort();
        }
    }
}

// Idempotent: writes state and emits an event only when something changed.
// An empty account list always lands on the disconnected state.
fn apply_accounts(
    state: &watch::Sender<Connection>,
    events: &broadcast::Sender<ConnectionEvent>,
    accounts: &[Address],
) {
    let next = match accounts.first() {
        Some(address) => Connection {
            active_address: Some(*address),
            is_connected: true,
        },
        None => Connection::default(),
    };

    let changed = state.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next.clone();
            true
        }
    });
    if !changed {
        return;
    }

    let event = match next.active_address {
        Some(address) => ConnectionEvent::AddressChanged(address),
        None => {
            warn!("account list emptied, connection dropped");
            ConnectionEvent::Disconnected
        }
    };
    // Nobody listening is fine.
    let _ = events.send(event);
}
