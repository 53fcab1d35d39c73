//! Live-reload notifier: WebSocket channel plus file watcher.
//!
//! Connected browsers hold a WebSocket open to the reload channel. Any
//! change under a watched folder closes every connection; the client snippet
//! reacts to the close by reloading the page. No diffs are pushed over the
//! wire, disconnect is the entire protocol.

mod server;
mod watch;

use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::RecommendedWatcher;
use parking_lot::Mutex;
use tungstenite::WebSocket;

use crate::log;

/// Connected reload clients, shared between the acceptor thread and the
/// watcher callback.
pub type SharedClients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Running notifier. Dropping it stops the watcher.
pub struct Notifier {
    port: u16,
    _watcher: RecommendedWatcher,
}

impl Notifier {
    /// Actual port the reload channel is listening on (may differ from the
    /// configured port if it was already in use).
    pub fn port(&self) -> u16 {
        self.port
    }

}

/// Start the reload channel and watch the given folders.
pub fn start(base_port: u16, folders: &[PathBuf]) -> Result<Notifier> {
    let clients: SharedClients = Arc::new(Mutex::new(Vec::new()));

    let port = server::start_ws_server(base_port, Arc::clone(&clients))?;
    let watcher = watch::spawn_watcher(folders, Arc::clone(&clients))?;

    log!("watch"; "auto-reload enabled on ws://localhost:{}", port);

    Ok(Notifier {
        port,
        _watcher: watcher,
    })
}

/// Close every connected client and clear the list.
///
/// Clients reconnect-or-reload on their own; a close frame failing to send
/// just means that client is already gone.
pub fn close_all(clients: &SharedClients) {
    let mut clients = clients.lock();
    for mut client in clients.drain(..) {
        let _ = client.close(None);
    }
}
