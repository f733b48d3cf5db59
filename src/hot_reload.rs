use std::{path::Path, sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use notify_debouncer_full::{
    new_debouncer, DebouncedEvent,
    notify::{RecursiveMode, Watcher, Error as NotifyError},
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info};

use crate::content_loader::reload_content;
use crate::state::{AppState, RefreshBroadcaster};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(tx): State<RefreshBroadcaster>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, tx))
}

async fn handle_socket(mut socket: WebSocket, tx: RefreshBroadcaster) {
    let mut rx = tx.subscribe();

    if rx.recv().await.is_ok() {
        if socket.send(Message::Text("reload".to_string().into())).await.is_err() {
            debug!("Client disconnected before reload message could be sent");
        }
    }
}

/// Queues a reload unless one is already pending. Returns false once the
/// reload loop has gone away.
fn queue_reload(tx: &mpsc::Sender<()>) -> bool {
    match tx.try_send(()) {
        Ok(()) | Err(TrySendError::Full(())) => true,
        Err(TrySendError::Closed(())) => {
            error!("Reload loop has stopped; dropping content change");
            false
        }
    }
}

/// Emacs lock files (`.#name`) and backups (`name~`).
fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |s| s.starts_with(".#") || s.ends_with('~'))
}

fn is_relevant(event: &DebouncedEvent) -> bool {
    let is_relevant_kind = event.kind.is_modify()
        || event.kind.is_create()
        || event.kind.is_remove();

    is_relevant_kind && !event.event.paths.iter().any(|p| is_temp_file(p))
}

pub fn start_content_watcher(tx: RefreshBroadcaster, app_state: Arc<AppState>) {
    info!("Starting content watcher for hot-reload...");
    tokio::spawn(async move {
        let (watcher_tx, mut watcher_rx) = mpsc::channel(1);

        let debouncer = new_debouncer(Duration::from_millis(200), None, move |res: Result<Vec<DebouncedEvent>, Vec<NotifyError>>| {
            match res {
                Ok(events) => {
                    let relevant: Vec<&DebouncedEvent> = events.iter().filter(|e| is_relevant(e)).collect();
                    if !relevant.is_empty() {
                        debug!("Relevant file change detected: {:?}", relevant.iter().flat_map(|e| &e.event.paths).map(|p| p.display()).collect::<Vec<_>>());
                        queue_reload(&watcher_tx);
                    }
                }
                Err(errors) => {
                    for e in errors {
                        error!("Watcher error: {}", e);
                    }
                }
            }
        });
        let mut debouncer = match debouncer {
            Ok(d) => d,
            Err(e) => {
                error!("Failed to create debouncer: {}", e);
                return;
            }
        };

        let content_dir = app_state.config.content_dir.clone();
        if let Err(e) = debouncer.watcher().watch(&content_dir, RecursiveMode::Recursive) {
            error!("Failed to watch {}: {}", content_dir.display(), e);
            return;
        }

        while watcher_rx.recv().await.is_some() {
            info!("Content change detected, reloading content and sending signal...");

            reload_content(&app_state).await;

            // No receivers just means no browser is connected.
            if tx.send(()).is_err() {
                debug!("No clients waiting for reload");
            }
        }
    });
}
