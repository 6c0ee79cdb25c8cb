use bhojan_bridge::MessageFromBackend;

/// Runs one poll: fetch, order check, publish, then sound-trigger diff.
///
/// Failures only skip this cycle; the next tick tries again.
pub async fn poll_once(context: super::AppContextHandle) {
    let (sequence, api, limit) = {
        let mut state = context.state.write().await;
        (state.feed.issue(), state.api.clone(), state.config.polling.limit)
    };

    let snapshot = match api.fetch_summary(limit).await {
        Ok(snapshot) => snapshot,
        Err(error) => {
            log::warn!("Skipping notification poll #{sequence}: {error}");
            return;
        }
    };

    let snapshot = {
        let mut state = context.state.write().await;
        let Some(snapshot) = state.feed.accept(sequence, snapshot) else {
            log::debug!("Discarding stale poll response #{sequence}");
            return;
        };

        log::debug!(
            "Poll #{sequence} accepted: {} unread, {} records",
            snapshot.unread_total,
            snapshot.records.len()
        );
        // Published under the lock, so the frontend receives snapshots in the
        // order they were accepted.
        context
            .send(MessageFromBackend::SnapshotUpdated(snapshot.clone()))
            .await;
        snapshot
    };

    let cues = {
        let mut state = context.state.write().await;
        state.feed.evaluate(sequence, &snapshot)
    };
    for cue in cues {
        log::info!("New {} notifications, playing {cue:?}", snapshot.role);
        context.sound.play(snapshot.role, cue);
    }
}

/// Handles an out-of-schedule poll request (see
/// [`bhojan_bridge::MessageToBackend::RefreshRequest`]).
pub fn handle_refresh_request(context: super::AppContextHandle) {
    tokio::spawn(poll_once(context));
}
