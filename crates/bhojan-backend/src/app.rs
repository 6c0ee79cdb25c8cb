//! Application context and message dispatching utilities.
//!
//! The context contains the shared state and provides helpers for sending
//! snapshots, alerts and settled mutations back to the frontend bridge.

use std::sync::Arc;

use bhojan_bridge::{
    MessageFromBackend, MessageToBackend, Mutation,
    alert::{AlertKind, AlertMessage},
};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::{api::NotificationApi, services, sound::SoundEngine, state::SharedState};

/// Shared application context passed to services and message handlers.
pub(crate) struct AppContext {
    /// Mutable runtime application state shared across services.
    pub state: SharedState,
    /// Outbound channel to the frontend bridge.
    pub tx: Sender<MessageFromBackend>,
    /// Alert sound playback, owning the mute preference.
    pub sound: SoundEngine,
}

impl AppContext {
    /// Read and dispatch messages from the frontend bridge until it closes
    /// or asks for shutdown.
    pub async fn consume_bridge_messages(self: &Arc<Self>, mut rx: Receiver<MessageToBackend>) {
        while let Some(message) = rx.recv().await {
            log::debug!("Got a frontend message: {message:?}");
            if matches!(message, MessageToBackend::Shutdown) {
                log::info!("Frontend requested shutdown");
                break;
            }
            self.dispatch_message(message).await;
        }
    }

    /// Dispatches the received message from frontend down to individual
    /// service handlers.
    async fn dispatch_message(self: &Arc<Self>, message: MessageToBackend) {
        match message {
            MessageToBackend::ConfigurationRequest => {
                services::config_service::handle_config_request(self.clone()).await;
            }
            MessageToBackend::RefreshRequest => {
                services::feed_service::handle_refresh_request(self.clone());
            }
            MessageToBackend::MarkReadRequest { id, silent } => {
                services::read_state_service::handle_mark_read_request(self.clone(), id, silent);
            }
            MessageToBackend::MarkAllReadRequest => {
                services::read_state_service::handle_mark_all_read_request(self.clone());
            }
            MessageToBackend::DeleteRequest(id) => {
                services::read_state_service::handle_delete_request(self.clone(), id);
            }
            MessageToBackend::BulkActionRequest { action, ids } => {
                services::read_state_service::handle_bulk_action_request(self.clone(), action, ids)
                    .await;
            }
            MessageToBackend::ToggleMuteRequest => {
                services::config_service::handle_toggle_mute_request(self.clone()).await;
            }
            MessageToBackend::Shutdown => {}
        }
    }

    /// Clone of the API client, taken without holding the state lock across
    /// a request.
    pub async fn api(&self) -> NotificationApi {
        self.state.read().await.api.clone()
    }

    /// Send a message to the frontend bridge. Messages for a frontend that
    /// already went away are dropped.
    pub async fn send(&self, message: MessageFromBackend) {
        if self.tx.send(message).await.is_err() {
            log::debug!("Frontend bridge closed, dropping message");
        }
    }

    /// Send a transient alert to the frontend bridge.
    pub async fn send_alert(&self, kind: AlertKind, content: impl Into<String>) {
        self.send(MessageFromBackend::Alert(AlertMessage::new(kind, content)))
            .await;
    }

    /// Tells the frontend that `mutation` finished, so it can restore the
    /// control that started it.
    pub async fn settle(&self, mutation: Mutation, success: bool) {
        self.send(MessageFromBackend::MutationSettled { mutation, success })
            .await;
    }
}
