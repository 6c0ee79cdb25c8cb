use std::time::{Duration, Instant};

use anyhow::Context;
use bhojan_bridge::{MessageFromBackend, MessageToBackend, feed::Role};
use gpui::{
    App, AppContext, Application, AsyncApp, Global, SharedString, TitlebarOptions, WindowOptions,
};
use gpui_component::Root;
use tokio::sync::mpsc;

use crate::entities::{
    DataEntities, panel_entity::NotificationPanel, settings_entity::SettingsEntity,
};

pub mod components;
pub mod entities;
pub mod formatting;
pub mod routes;
mod views;

/// How often transitions and alert timers are advanced.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct BackendBridge {
    pub to_backend: mpsc::Sender<MessageToBackend>,
}

impl BackendBridge {
    pub async fn request_config(&self) -> anyhow::Result<()> {
        self.send(MessageToBackend::ConfigurationRequest)
            .await
            .context("failed to request config")
    }

    pub async fn send(&self, message: MessageToBackend) -> anyhow::Result<()> {
        self.to_backend
            .send(message)
            .await
            .context("backend is no longer running")
    }
}

impl Global for BackendBridge {}

/// Sends `message` to the backend without blocking the UI.
pub(crate) fn dispatch(message: MessageToBackend, cx: &mut App) {
    let bridge = cx.global::<BackendBridge>().clone();
    cx.spawn(async move |_| bridge.send(message).await)
        .detach_and_log_err(cx);
}

fn receive(data: &DataEntities, message: MessageFromBackend, cx: &mut AsyncApp) -> anyhow::Result<()> {
    log::debug!("Got a message from backend: {message:?}");
    if let MessageFromBackend::ConfigurationResponse(config) = &message {
        SettingsEntity::update(&data.settings, config.clone(), cx)?;
    }

    let target = data.panel.update(cx, |panel, cx| {
        let target = panel.receive(message, Instant::now());
        cx.notify();
        target
    })?;

    if let Some(target) = target {
        let url = data
            .settings
            .read_with(cx, |settings, _| settings.absolute_url(&target))?;
        log::info!("Opening {url}");
        cx.update(|cx| cx.open_url(&url))?;
    }
    Ok(())
}

/// Runs the notification window on the calling thread until it is closed.
pub fn run(
    mut rx: mpsc::Receiver<MessageFromBackend>,
    tx: mpsc::Sender<MessageToBackend>,
) -> anyhow::Result<()> {
    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(move |cx| {
        gpui_component::init(cx);

        let data = DataEntities {
            settings: cx.new(|_| SettingsEntity::default()),
            panel: cx.new(|_| NotificationPanel::new(Role::default())),
        };

        let bridge = BackendBridge { to_backend: tx };
        cx.set_global(bridge.clone());

        cx.on_app_quit({
            let bridge = bridge.clone();
            move |_| {
                if bridge.to_backend.try_send(MessageToBackend::Shutdown).is_err() {
                    log::warn!("Could not ask the backend to shut down");
                }
                async {}
            }
        })
        .detach();
        cx.on_window_closed(|cx| {
            if cx.windows().is_empty() {
                cx.quit();
            }
        })
        .detach();

        let listener_data = data.clone();
        cx.spawn(async move |cx| {
            while let Some(message) = rx.recv().await {
                if let Err(error) = receive(&listener_data, message, cx) {
                    log::error!("Failed to apply a backend message: {error:#}");
                }
            }
            log::info!("Backend closed the bridge");
        })
        .detach();

        let ticking_panel = data.panel.clone();
        cx.spawn(async move |cx| {
            loop {
                cx.background_executor().timer(TICK_INTERVAL).await;
                let ticked = ticking_panel.update(cx, |panel, cx| {
                    if panel.tick(Instant::now()) {
                        cx.notify();
                    }
                });
                if ticked.is_err() {
                    break;
                }
            }
        })
        .detach();

        cx.spawn(async move |cx| {
            bridge.request_config().await?;

            let options = WindowOptions {
                titlebar: Some(TitlebarOptions {
                    title: Some(SharedString::from("BhojanXpress notifications")),
                    ..Default::default()
                }),
                ..Default::default()
            };
            cx.open_window(options, |window, cx| {
                let view = cx.new(|cx| crate::views::FrontendUi::new(&data, window, cx));
                cx.new(|cx| Root::new(view, window, cx))
            })?;

            Ok::<_, anyhow::Error>(())
        })
        .detach_and_log_err(cx);
    });

    Ok(())
}
