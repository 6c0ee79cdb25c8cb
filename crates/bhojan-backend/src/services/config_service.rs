use bhojan_bridge::{MessageFromBackend, alert::AlertKind, sound::SoundCue};

use crate::config::{load_config, save_config};

/// Handles an incoming configuration request (see
/// [`bhojan_bridge::MessageToBackend::ConfigurationRequest`]).
pub async fn handle_config_request(context: super::AppContextHandle) {
    let mut config = {
        let state = context.state.read().await;
        state.config.clone()
    };
    config.sound.muted = context.sound.mute().is_muted();
    context
        .send(MessageFromBackend::ConfigurationResponse(config))
        .await;
}

/// Flips the mute preference, persists it and previews the default alert
/// when sound was turned back on.
pub async fn handle_toggle_mute_request(context: super::AppContextHandle) {
    let muted = context.sound.mute().toggle();
    log::info!("Alert sounds {}", if muted { "muted" } else { "unmuted" });

    let (config_path, role) = {
        let mut state = context.state.write().await;
        state.config.sound.muted = muted;
        (state.config_path.clone(), state.config.server.role)
    };

    // Only the preference is written back; session overrides stay out of the file.
    let persisted = match load_config(&config_path).await {
        Ok(mut stored) => {
            stored.sound.muted = muted;
            save_config(&config_path, &stored).await
        }
        Err(error) => Err(error),
    };
    if let Err(error) = persisted {
        log::warn!("Failed to persist mute preference: {error}");
        context
            .send_alert(AlertKind::Warning, "Sound preference will not be remembered")
            .await;
    }

    context.send(MessageFromBackend::MuteStateChanged(muted)).await;
    if !muted {
        context.sound.play(role, SoundCue::Default);
    }
}
