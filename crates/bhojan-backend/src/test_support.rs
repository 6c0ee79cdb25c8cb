//! In-process stand-in for the web application's notification endpoints and
//! a context builder for service tests.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State as Extract},
    http::StatusCode,
    routing::{get, post},
};
use bhojan_bridge::{
    MessageFromBackend,
    config::{Config, SoundConfig},
    feed::Role,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::{RwLock, mpsc};

use crate::{
    api::NotificationApi,
    app::AppContext,
    feed_state::FeedState,
    services::AppContextHandle,
    sound::{MutePreference, SoundEngine},
    state::State,
};

/// What the fake server holds and what it was asked.
#[derive(Debug, Default)]
pub struct FakeServer {
    pub notifications: Vec<Value>,
    /// Reported instead of counting unread records when set.
    pub unread_override: Option<u32>,
    pub reject_mutations: bool,
    /// Report the number of summaries served so far as the unread count, so
    /// every poll response differs.
    pub count_polls: bool,
    /// Request log, one short line per request.
    pub requests: Vec<String>,
}

impl FakeServer {
    pub fn with_notifications(notifications: Vec<Value>) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self {
            notifications,
            ..Self::default()
        }))
    }

    fn unread(&self) -> u32 {
        self.unread_override.unwrap_or_else(|| {
            self.notifications
                .iter()
                .filter(|n| !n["is_read"].as_bool().unwrap_or(false))
                .count() as u32
        })
    }

    fn rejection(&self) -> Option<Json<Value>> {
        self.reject_mutations
            .then(|| Json(json!({ "success": false, "message": "Not allowed" })))
    }
}

pub fn notification(id: u64, kind: &str, is_read: bool) -> Value {
    json!({
        "id": id,
        "type": kind,
        "title": format!("Notification {id}"),
        "message": "Your order is being prepared",
        "created_at": format!("2025-03-20T11:{:02}:00", id % 60),
        "is_read": is_read,
        "reference_id": id,
    })
}

pub type Shared = Arc<Mutex<FakeServer>>;

async fn summary(Extract(server): Extract<Shared>) -> Json<Value> {
    let mut server = server.lock().unwrap();
    server.requests.push("summary".to_string());
    if server.count_polls {
        let served = server.requests.iter().filter(|r| *r == "summary").count();
        server.unread_override = Some(served as u32);
    }
    Json(json!({
        "success": true,
        "unread_count": server.unread(),
        "notifications": server.notifications,
    }))
}

async fn mark_read(Extract(server): Extract<Shared>, Path(id): Path<String>) -> Json<Value> {
    let mut server = server.lock().unwrap();
    server.requests.push(format!("mark-read {id}"));
    if let Some(rejection) = server.rejection() {
        return rejection;
    }
    for notification in &mut server.notifications {
        if notification["id"].to_string() == id {
            notification["is_read"] = json!(true);
        }
    }
    Json(json!({ "success": true }))
}

async fn mark_all_read(Extract(server): Extract<Shared>) -> Json<Value> {
    let mut server = server.lock().unwrap();
    server.requests.push("mark-all-read".to_string());
    if let Some(rejection) = server.rejection() {
        return rejection;
    }
    for notification in &mut server.notifications {
        notification["is_read"] = json!(true);
    }
    server.unread_override = None;
    Json(json!({ "success": true }))
}

async fn delete(Extract(server): Extract<Shared>, Path(id): Path<String>) -> Json<Value> {
    let mut server = server.lock().unwrap();
    server.requests.push(format!("delete {id}"));
    if let Some(rejection) = server.rejection() {
        return rejection;
    }
    server
        .notifications
        .retain(|notification| notification["id"].to_string() != id);
    Json(json!({ "success": true, "message": "Notification deleted" }))
}

async fn bulk_action(Extract(server): Extract<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut server = server.lock().unwrap();
    server.requests.push(format!("bulk {body}"));
    if let Some(rejection) = server.rejection() {
        return rejection;
    }
    let count = body["notification_ids"].as_array().map_or(0, Vec::len);
    Json(json!({ "success": true, "message": format!("{count} notifications updated") }))
}

async fn sound(Extract(server): Extract<Shared>, Path(file): Path<String>) -> StatusCode {
    server.lock().unwrap().requests.push(format!("sound {file}"));
    StatusCode::NOT_FOUND
}

/// Serves `server` on an ephemeral local port for `role`'s endpoints and
/// returns the base URL.
pub async fn serve(server: Shared, role: Role) -> String {
    let prefix = format!("/{}notifications", role.path_prefix());
    let router = Router::new()
        .route(&format!("{prefix}/api/get"), get(summary))
        .route(&format!("{prefix}/{{id}}/mark-read"), post(mark_read))
        .route(&format!("{prefix}/mark-all-read"), post(mark_all_read))
        .route(&format!("{prefix}/{{id}}/delete"), post(delete))
        .route("/admin/notifications/bulk-action", post(bulk_action))
        .route("/static/sounds/{file}", get(sound))
        .with_state(server);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{address}/")
}

/// Context for `role` talking to `base_url`, with a frontend channel of
/// `capacity` messages.
pub fn context(
    role: Role,
    base_url: &str,
    muted: bool,
    capacity: usize,
) -> (AppContextHandle, mpsc::Receiver<MessageFromBackend>, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let api = NotificationApi::new(reqwest::Client::new(), base_url, role).unwrap();
    let mut config = Config::default();
    config.server.role = role;
    config.server.base_url = base_url.to_string();

    let (tx, rx) = mpsc::channel(capacity);
    let sound = SoundEngine::new(api.clone(), MutePreference::new(muted), &SoundConfig::default());
    let state = State {
        config,
        config_path: temp_dir.path().join("config.toml"),
        api,
        feed: FeedState::default(),
    };
    let context = Arc::new(AppContext {
        state: Arc::new(RwLock::new(state)),
        tx,
        sound,
    });
    (context, rx, temp_dir)
}

/// Waits for the next message to the frontend.
pub async fn next(rx: &mut mpsc::Receiver<MessageFromBackend>) -> MessageFromBackend {
    tokio::time::timeout(std::time::Duration::from_secs(20), rx.recv())
        .await
        .unwrap()
        .unwrap()
}

/// Requests the fake server has seen so far.
pub fn requests(server: &Shared) -> Vec<String> {
    server.lock().unwrap().requests.clone()
}
