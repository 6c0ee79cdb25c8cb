//! Communication bridge between frontend and backend.
//!
//! This crate defines the notification model and the protocol used to
//! connect the presenter with the asynchronous backend responsible for
//! polling, read-state mutations and alert sounds.
//!
//! The design is deliberately lightweight and unidirectional:
//! - The frontend sends commands (e.g., mark a notification read, delete
//!   one, toggle the mute preference).
//! - The backend pushes events (e.g., fresh snapshots, transient alerts,
//!   settled mutations).
//!
//! Communication happens over bounded [`tokio::sync::mpsc`] channels wrapped
//! in [`BridgeChannels`], providing back-pressure, async compatibility, and
//! clean separation of concerns.

pub mod alert;
pub mod config;
pub mod feed;
pub mod sound;

use serde::Serialize;
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::feed::{NotificationId, NotificationSnapshot};

/// Bulk operation available to admins on a selection of notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    MarkRead,
    MarkUnread,
    Delete,
}

impl std::str::FromStr for BulkAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mark_read" | "read" => Ok(BulkAction::MarkRead),
            "mark_unread" | "unread" => Ok(BulkAction::MarkUnread),
            "delete" => Ok(BulkAction::Delete),
            other => Err(format!("unknown bulk action `{other}`")),
        }
    }
}

/// Identifies a read-state mutation, so the frontend can restore the control
/// that triggered it once it settles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mutation {
    MarkRead(NotificationId),
    MarkAllRead,
    Delete(NotificationId),
    Bulk(BulkAction),
}

/// Messages emitted by the backend to inform the frontend of state updates.
///
/// These are typically sent in response to frontend requests or to push
/// asynchronous events (e.g., accepted polls, alerts).
#[derive(Debug, Clone)]
pub enum MessageFromBackend {
    /// The current snapshot changed, either by a poll or a local patch.
    SnapshotUpdated(NotificationSnapshot),
    /// Transient alert for the user.
    Alert(alert::AlertMessage),
    /// A read-state mutation finished, successfully or not.
    MutationSettled { mutation: Mutation, success: bool },
    /// Current value of the mute preference.
    MuteStateChanged(bool),
    /// Response to the configuration request from the frontend.
    ConfigurationResponse(config::Config),
}

/// Commands issued by the frontend to control or query the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageToBackend {
    /// Request for the application configuration.
    ConfigurationRequest,
    /// Poll now, outside of the regular schedule.
    RefreshRequest,
    /// Mark a single notification read. Silent requests only report failures.
    MarkReadRequest { id: NotificationId, silent: bool },
    MarkAllReadRequest,
    /// Delete a notification. The frontend confirms with the user first.
    DeleteRequest(NotificationId),
    BulkActionRequest {
        action: BulkAction,
        ids: Vec<NotificationId>,
    },
    ToggleMuteRequest,
    /// Stop polling and end the backend message loop.
    Shutdown,
}

/// Paired `tokio::mpsc` channels for bidirectional communication between
/// frontend and backend.
pub struct BridgeChannels {
    /// Receiver used by the frontend to get messages from the backend.
    pub frontend_rx: Receiver<MessageFromBackend>,
    /// Sender used by the frontend to send commands to the backend.
    pub frontend_tx: Sender<MessageToBackend>,

    /// Receiver used by the backend to get commands from the frontend.
    pub backend_rx: Receiver<MessageToBackend>,
    /// Sender used by the backend to send events/responses to the frontend.
    pub backend_tx: Sender<MessageFromBackend>,
}

impl BridgeChannels {
    /// Creates a new pair of bridged channels with the given buffer capacity.
    pub fn new(buffer: usize) -> Self {
        let (to_backend_tx, to_backend_rx) = mpsc::channel(buffer);
        let (to_frontend_tx, to_frontend_rx) = mpsc::channel(buffer);
        Self {
            frontend_tx: to_backend_tx,
            frontend_rx: to_frontend_rx,
            backend_rx: to_backend_rx,
            backend_tx: to_frontend_tx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
