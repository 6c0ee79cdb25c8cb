use std::path::PathBuf;

use bhojan_bridge::config::Config;

use crate::{api::NotificationApi, feed_state::FeedState};

/// The core application state that holds configuration, the notification
/// feed and the API client.
///
/// This struct contains all the data that needs to be shared across async
/// tasks in the application. It is wrapped in [`SharedState`] so that poll
/// tasks and mutation tasks can update the feed concurrently.
#[derive(Debug)]
pub struct State {
    /// Effective configuration, including command-line overrides.
    pub config: Config,
    /// Where the configuration file lives, for persisting preferences.
    pub config_path: PathBuf,
    /// Role-scoped client for the notification endpoints.
    pub api: NotificationApi,
    /// Current snapshot and poll bookkeeping.
    pub feed: FeedState,
}

/// Thread-safe, async-friendly shared reference to the application [`State`].
pub type SharedState = std::sync::Arc<tokio::sync::RwLock<State>>;
