//! Backend runtime setup and orchestration.
//!
//! This module wires together configuration, the API client, shared state,
//! the poller and the message dispatch loop that listens to frontend bridge
//! requests.

use std::{path::PathBuf, sync::Arc, thread, time::Duration};

use bhojan_bridge::{
    MessageFromBackend, MessageToBackend,
    config::{Config, ServerConfig},
    feed::Role,
};
use reqwest::header::{self, HeaderMap, HeaderValue};
use tokio::sync::{
    RwLock,
    mpsc::{Receiver, Sender},
};

use crate::{
    api::{ApiError, NotificationApi},
    app::AppContext,
    config::ConfigError,
    feed_state::FeedState,
    poller, services,
    sound::{MutePreference, SoundEngine},
    state::State,
};

/// Session overrides taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// Configuration file to use instead of the platform default.
    pub config_path: Option<PathBuf>,
    pub role: Option<Role>,
    pub base_url: Option<String>,
}

/// Errors that prevent the backend from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The configured session cookie is not a valid header value.
    #[error("invalid session cookie: {0}")]
    InvalidCookie(#[from] header::InvalidHeaderValue),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

fn apply_overrides(config: &mut Config, options: &RuntimeOptions) {
    if let Some(role) = options.role {
        config.server.role = role;
    }
    if let Some(base_url) = &options.base_url {
        config.server.base_url = base_url.clone();
    }
}

fn build_request_client(server: &ServerConfig) -> Result<reqwest::Client, StartupError> {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = server.session_cookie.as_deref().filter(|c| !c.is_empty()) {
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie)?);
    }

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(server.request_timeout_secs.max(1)))
        .build()?)
}

/// Configured token, else the one embedded in the configured page. A missing
/// token only costs mutations their protection header.
async fn resolve_csrf_token(api: &NotificationApi, server: &ServerConfig) -> Option<String> {
    if let Some(token) = server.csrf_token.clone().filter(|t| !t.is_empty()) {
        return Some(token);
    }

    match api.fetch_page(&server.csrf_page).await {
        Ok(page) => {
            let token = crate::csrf::extract_token(&page);
            if token.is_none() {
                log::warn!("No anti-forgery token found on `{}`", server.csrf_page);
            }
            token
        }
        Err(error) => {
            log::warn!("Could not fetch anti-forgery token: {error}");
            None
        }
    }
}

/// Initialize backend state, start polling and process frontend messages
/// until shutdown.
async fn setup_backend(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
    options: RuntimeOptions,
) -> Result<(), StartupError> {
    let config_path = match options.config_path.clone() {
        Some(config_path) => config_path,
        None => crate::config::default_config_path()?,
    };
    let mut config = crate::config::load_config(&config_path).await?;
    apply_overrides(&mut config, &options);

    let role = config.server.role;
    let request_client = build_request_client(&config.server)?;
    let api = NotificationApi::new(request_client, &config.server.base_url, role)?;
    let csrf_token = resolve_csrf_token(&api, &config.server).await;
    let api = api.with_csrf_token(csrf_token);

    let sound = SoundEngine::new(
        api.clone(),
        MutePreference::new(config.sound.muted),
        &config.sound,
    );
    let interval = config.polling.interval(role);
    log::info!("Watching {role} notifications at {}", config.server.base_url);

    let state = Arc::new(RwLock::new(State {
        config,
        config_path,
        api,
        feed: FeedState::default(),
    }));
    let context = Arc::new(AppContext { state, tx, sound });

    let poll_context = context.clone();
    let poller = poller::start(interval, move || {
        tokio::spawn(services::feed_service::poll_once(poll_context.clone()));
    });

    context.consume_bridge_messages(rx).await;
    poller.shutdown().await;
    Ok(())
}

/// Spawn the backend runtime on its own thread and begin processing bridge
/// messages. The thread ends once the frontend asks for shutdown or drops its
/// sender.
pub fn run(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
    options: RuntimeOptions,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("backend-worker")
            .build()
            .expect("failed to build tokio runtime");
        runtime.block_on(async {
            if let Err(error) = setup_backend(rx, tx, options).await {
                log::error!("Backend failed to start: {error}");
            }
        });
        log::info!("Backend stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_file_values() {
        let mut config = Config::default();
        let options = RuntimeOptions {
            config_path: None,
            role: Some(Role::Admin),
            base_url: Some("https://bhojan.test/".to_string()),
        };
        apply_overrides(&mut config, &options);

        assert_eq!(config.server.role, Role::Admin);
        assert_eq!(config.server.base_url, "https://bhojan.test/");
    }

    #[test]
    fn invalid_cookie_is_rejected() {
        let server = ServerConfig {
            session_cookie: Some("session=abc\n".to_string()),
            ..ServerConfig::default()
        };
        assert!(matches!(
            build_request_client(&server),
            Err(StartupError::InvalidCookie(_))
        ));
    }

    #[tokio::test]
    async fn configured_token_wins_over_scraping() {
        let server = ServerConfig {
            csrf_token: Some("configured".to_string()),
            ..ServerConfig::default()
        };
        let api = NotificationApi::new(reqwest::Client::new(), &server.base_url, server.role)
            .unwrap();
        assert_eq!(
            resolve_csrf_token(&api, &server).await.as_deref(),
            Some("configured")
        );
    }

    #[tokio::test]
    async fn shutdown_message_ends_the_backend() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut channels = bhojan_bridge::BridgeChannels::default();
        let options = RuntimeOptions {
            config_path: Some(temp_dir.path().join("config.toml")),
            role: None,
            base_url: Some("http://127.0.0.1:9".to_string()),
        };

        let backend = tokio::spawn(setup_backend(
            channels.backend_rx,
            channels.backend_tx,
            options,
        ));
        channels
            .frontend_tx
            .send(MessageToBackend::ConfigurationRequest)
            .await
            .unwrap();
        match channels.frontend_rx.recv().await {
            Some(MessageFromBackend::ConfigurationResponse(config)) => {
                assert_eq!(config.server.base_url, "http://127.0.0.1:9");
            }
            other => panic!("unexpected message {other:?}"),
        }

        channels
            .frontend_tx
            .send(MessageToBackend::Shutdown)
            .await
            .unwrap();
        backend.await.unwrap().unwrap();
    }
}
