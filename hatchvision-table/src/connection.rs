//! Connection context for the shared store
//!
//! Owns the connection flag and the table registry. The transport that talks
//! to the remote server reports state changes through a [`ConnectionListener`];
//! the vision loop waits for the first "connected" notification once, with a
//! timeout, and afterwards only polls [`TableConnection::is_connected`].

use crate::table::SharedTable;
use dashmap::DashMap;
use hatchvision_core::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Connection to a shared store server
pub struct TableConnection {
    server: String,
    tables: DashMap<String, Arc<SharedTable>>,
    connected: Arc<watch::Sender<bool>>,
}

impl TableConnection {
    /// Create a disconnected context for `server`
    pub fn new(server: impl Into<String>) -> Self {
        let (connected, _) = watch::channel(false);
        Self {
            server: server.into(),
            tables: DashMap::new(),
            connected: Arc::new(connected),
        }
    }

    /// In-process store that is connected from the start
    pub fn loopback() -> Self {
        let connection = Self::new("loopback");
        connection.listener().notify(true, "in-process table");
        connection
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Handle for the transport to report connection changes
    pub fn listener(&self) -> ConnectionListener {
        ConnectionListener {
            server: self.server.clone(),
            connected: self.connected.clone(),
        }
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Wait until the transport reports a connection, at most `timeout`
    pub async fn connect(&self, timeout: Duration) -> Result<()> {
        let mut receiver = self.connected.subscribe();
        info!("Waiting for connection to {}...", self.server);

        let waited = tokio::time::timeout(timeout, receiver.wait_for(|connected| *connected))
            .await
            .map(|result| result.map(|_| ()));

        match waited {
            Ok(Ok(())) => {
                info!("Connected to {}", self.server);
                Ok(())
            }
            Ok(Err(_)) => Err(Error::SinkUnavailable(format!(
                "connection to {} was closed",
                self.server
            ))),
            Err(_) => {
                warn!("No connection to {} after {:?}", self.server, timeout);
                Err(Error::SinkTimeout(timeout.as_millis() as u64))
            }
        }
    }

    /// Get or create the table at `path`
    pub fn get_table(&self, path: &str) -> Arc<SharedTable> {
        self.tables
            .entry(path.to_string())
            .or_insert_with(|| Arc::new(SharedTable::new(path)))
            .clone()
    }

    /// Paths of every table opened so far
    pub fn table_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.tables.iter().map(|entry| entry.key().clone()).collect();
        paths.sort();
        paths
    }
}

/// Transport-side handle that flips the connection flag
#[derive(Clone)]
pub struct ConnectionListener {
    server: String,
    connected: Arc<watch::Sender<bool>>,
}

impl ConnectionListener {
    /// Record a connection state change reported by the transport
    pub fn notify(&self, connected: bool, info: &str) {
        info!("{}: {}; Connected={}", self.server, info, connected);
        self.connected.send_replace(connected);
    }
}
