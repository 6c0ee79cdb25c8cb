//! Read-state mutations: mark read, mark all read, delete and bulk actions.
//!
//! Every mutation runs in its own task and ends with exactly one
//! [`bhojan_bridge::MessageFromBackend::MutationSettled`]. Failures leave the
//! snapshot untouched and raise one error alert. Successes make every poll
//! still in flight stale, so an older response cannot undo them.

use bhojan_bridge::{
    BulkAction, MessageFromBackend, Mutation,
    alert::AlertKind,
    feed::{NotificationId, NotificationSnapshot, Role},
};

use super::{AppContextHandle, feed_service};

/// Records a successful mutation, patches the current snapshot and, when
/// `publish` is set, sends the result while still holding the lock so it
/// cannot overtake a snapshot accepted earlier.
async fn apply_success(
    context: &AppContextHandle,
    publish: bool,
    patch: impl FnOnce(&mut NotificationSnapshot),
) {
    let mut state = context.state.write().await;
    state.feed.mark_mutation();
    if let Some(snapshot) = state.feed.patch(patch)
        && publish
    {
        context
            .send(MessageFromBackend::SnapshotUpdated(snapshot))
            .await;
    }
}

/// Handles [`bhojan_bridge::MessageToBackend::MarkReadRequest`]. Silent
/// requests come from opening an item and only report failures.
pub fn handle_mark_read_request(context: AppContextHandle, id: NotificationId, silent: bool) {
    tokio::spawn(async move {
        let api = context.api().await;
        match api.mark_read(&id).await {
            Ok(acknowledgement) => {
                log::info!("Marked notification {id} as read");
                apply_success(&context, true, |snapshot| {
                    snapshot.mark_read(&id);
                })
                .await;
                if !silent {
                    let message = acknowledgement
                        .message
                        .unwrap_or_else(|| "Notification marked as read".to_string());
                    context.send_alert(AlertKind::Success, message).await;
                }
                context.settle(Mutation::MarkRead(id), true).await;
            }
            Err(error) => {
                log::warn!("Failed to mark notification {id} as read: {error}");
                context
                    .send_alert(
                        AlertKind::Error,
                        error.user_message("Failed to mark notification as read"),
                    )
                    .await;
                context.settle(Mutation::MarkRead(id), false).await;
            }
        }
    });
}

/// Handles [`bhojan_bridge::MessageToBackend::MarkAllReadRequest`].
pub fn handle_mark_all_read_request(context: AppContextHandle) {
    tokio::spawn(async move {
        let api = context.api().await;
        match api.mark_all_read().await {
            Ok(_) => {
                log::info!("Marked all notifications as read");
                apply_success(&context, true, NotificationSnapshot::mark_all_read).await;
                context
                    .send_alert(AlertKind::Success, "All notifications marked as read")
                    .await;
                context.settle(Mutation::MarkAllRead, true).await;
            }
            Err(error) => {
                log::warn!("Failed to mark all notifications as read: {error}");
                context
                    .send_alert(
                        AlertKind::Error,
                        error.user_message("Failed to mark all notifications as read"),
                    )
                    .await;
                context.settle(Mutation::MarkAllRead, false).await;
            }
        }
    });
}

/// Handles [`bhojan_bridge::MessageToBackend::DeleteRequest`].
///
/// The frontend animates the removal once the mutation settles; counts are
/// re-derived by an immediate poll.
pub fn handle_delete_request(context: AppContextHandle, id: NotificationId) {
    tokio::spawn(async move {
        let api = context.api().await;
        match api.delete(&id).await {
            Ok(acknowledgement) => {
                log::info!("Deleted notification {id}");
                apply_success(&context, false, |snapshot| {
                    snapshot.remove(&id);
                })
                .await;
                context.settle(Mutation::Delete(id), true).await;
                let message = acknowledgement
                    .message
                    .unwrap_or_else(|| "Notification deleted successfully".to_string());
                context.send_alert(AlertKind::Success, message).await;
                feed_service::poll_once(context).await;
            }
            Err(error) => {
                log::warn!("Failed to delete notification {id}: {error}");
                context
                    .send_alert(
                        AlertKind::Error,
                        error.user_message("Failed to delete notification"),
                    )
                    .await;
                context.settle(Mutation::Delete(id), false).await;
            }
        }
    });
}

/// Handles [`bhojan_bridge::MessageToBackend::BulkActionRequest`]. Only
/// admins have the endpoint; an empty selection never reaches the server.
pub async fn handle_bulk_action_request(
    context: AppContextHandle,
    action: BulkAction,
    ids: Vec<NotificationId>,
) {
    let role = context.state.read().await.config.server.role;
    if role != Role::Admin {
        context
            .send_alert(AlertKind::Warning, "Bulk actions are only available to admins")
            .await;
        context.settle(Mutation::Bulk(action), false).await;
        return;
    }
    if ids.is_empty() {
        context
            .send_alert(
                AlertKind::Warning,
                "Please select notifications to perform bulk actions",
            )
            .await;
        context.settle(Mutation::Bulk(action), false).await;
        return;
    }

    tokio::spawn(async move {
        let api = context.api().await;
        match api.bulk_action(action, &ids).await {
            Ok(acknowledgement) => {
                log::info!("Applied {action:?} to {} notifications", ids.len());
                apply_success(&context, false, |_| {}).await;
                let message = acknowledgement
                    .message
                    .unwrap_or_else(|| "Bulk action completed".to_string());
                context.send_alert(AlertKind::Success, message).await;
                context.settle(Mutation::Bulk(action), true).await;
                feed_service::poll_once(context).await;
            }
            Err(error) => {
                log::warn!("Bulk {action:?} failed: {error}");
                context
                    .send_alert(AlertKind::Error, error.user_message("Bulk action failed"))
                    .await;
                context.settle(Mutation::Bulk(action), false).await;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use bhojan_bridge::alert::AlertMessage;

    use super::*;
    use crate::test_support::{self, FakeServer, next, notification, requests};

    /// Context whose server refuses every connection, holding a snapshot
    /// with three unread notifications.
    async fn unreachable_context(
        role: Role,
    ) -> (
        AppContextHandle,
        tokio::sync::mpsc::Receiver<MessageFromBackend>,
        tempfile::TempDir,
    ) {
        let (context, rx, dir) = test_support::context(role, "http://127.0.0.1:9", true, 16);
        {
            let mut state = context.state.write().await;
            let sequence = state.feed.issue();
            let mut snapshot = NotificationSnapshot::empty(role);
            snapshot.unread_total = 3;
            state.feed.accept(sequence, snapshot);
        }
        (context, rx, dir)
    }

    fn snapshot_of(message: MessageFromBackend) -> NotificationSnapshot {
        match message {
            MessageFromBackend::SnapshotUpdated(snapshot) => snapshot,
            other => panic!("expected a snapshot, got {other:?}"),
        }
    }

    fn settled(message: MessageFromBackend) -> (Mutation, bool) {
        match message {
            MessageFromBackend::MutationSettled { mutation, success } => (mutation, success),
            other => panic!("expected a settled mutation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_mark_read_alerts_once_and_keeps_counts() {
        let (context, mut rx, _dir) = unreachable_context(Role::Customer).await;
        handle_mark_read_request(context.clone(), NotificationId::from(4), true);

        match next(&mut rx).await {
            MessageFromBackend::Alert(AlertMessage { kind, message }) => {
                assert_eq!(kind, AlertKind::Error);
                assert_eq!(message, "Failed to mark notification as read");
            }
            other => panic!("unexpected message {other:?}"),
        }
        assert_eq!(
            settled(next(&mut rx).await),
            (Mutation::MarkRead(NotificationId::from(4)), false)
        );

        let state = context.state.read().await;
        assert_eq!(state.feed.snapshot().map(|s| s.unread_total), Some(3));
    }

    #[tokio::test]
    async fn failed_delete_settles_unsuccessfully() {
        let (context, mut rx, _dir) = unreachable_context(Role::Delivery).await;
        handle_delete_request(context, NotificationId::from(8));

        assert!(matches!(next(&mut rx).await, MessageFromBackend::Alert(_)));
        assert!(matches!(
            next(&mut rx).await,
            MessageFromBackend::MutationSettled { success: false, .. }
        ));
    }

    #[tokio::test]
    async fn bulk_action_requires_admin() {
        let (context, mut rx, _dir) = unreachable_context(Role::Customer).await;
        handle_bulk_action_request(context, BulkAction::Delete, vec![NotificationId::from(1)])
            .await;

        match next(&mut rx).await {
            MessageFromBackend::Alert(alert) => assert_eq!(alert.kind, AlertKind::Warning),
            other => panic!("unexpected message {other:?}"),
        }
        assert!(matches!(
            next(&mut rx).await,
            MessageFromBackend::MutationSettled { success: false, .. }
        ));
    }

    #[tokio::test]
    async fn empty_bulk_selection_warns_without_request() {
        let (context, mut rx, _dir) = unreachable_context(Role::Admin).await;
        handle_bulk_action_request(context, BulkAction::MarkRead, Vec::new()).await;

        match next(&mut rx).await {
            MessageFromBackend::Alert(alert) => {
                assert_eq!(alert.kind, AlertKind::Warning);
                assert_eq!(
                    alert.message,
                    "Please select notifications to perform bulk actions"
                );
            }
            other => panic!("unexpected message {other:?}"),
        }
        assert!(matches!(
            next(&mut rx).await,
            MessageFromBackend::MutationSettled {
                mutation: Mutation::Bulk(BulkAction::MarkRead),
                success: false
            }
        ));
        assert!(rx.try_recv().is_err());
    }

    /// Customer context against a fake server with three unread orders,
    /// after the first poll was published.
    async fn primed_customer() -> (
        test_support::Shared,
        AppContextHandle,
        tokio::sync::mpsc::Receiver<MessageFromBackend>,
        tempfile::TempDir,
    ) {
        let server = FakeServer::with_notifications(vec![
            notification(1, "order", false),
            notification(2, "order", false),
            notification(3, "order", false),
        ]);
        let base_url = test_support::serve(server.clone(), Role::Customer).await;
        let (context, mut rx, dir) = test_support::context(Role::Customer, &base_url, true, 16);

        feed_service::poll_once(context.clone()).await;
        assert_eq!(snapshot_of(next(&mut rx).await).unread_total, 3);
        (server, context, rx, dir)
    }

    #[tokio::test]
    async fn mark_read_patches_the_snapshot_then_settles() {
        let (server, context, mut rx, _dir) = primed_customer().await;
        let id = NotificationId::from(2);
        handle_mark_read_request(context.clone(), id.clone(), false);

        let snapshot = snapshot_of(next(&mut rx).await);
        assert_eq!(snapshot.unread_total, 2);
        assert!(snapshot.record(&id).is_some_and(|record| record.is_read));
        assert!(matches!(
            next(&mut rx).await,
            MessageFromBackend::Alert(AlertMessage { kind: AlertKind::Success, .. })
        ));
        assert_eq!(settled(next(&mut rx).await), (Mutation::MarkRead(id), true));
        assert!(requests(&server).contains(&"mark-read 2".to_string()));

        // A repeated acknowledgement must not count the same record twice.
        handle_mark_read_request(context, NotificationId::from(2), true);
        assert_eq!(snapshot_of(next(&mut rx).await).unread_total, 2);
    }

    #[tokio::test]
    async fn mark_all_read_clears_every_count() {
        let (_server, context, mut rx, _dir) = primed_customer().await;
        handle_mark_all_read_request(context);

        let snapshot = snapshot_of(next(&mut rx).await);
        assert_eq!(snapshot.unread_total, 0);
        assert!(snapshot.category_counts.values().all(|count| *count == 0));
        assert!(snapshot.records.iter().all(|record| record.is_read));
        assert!(matches!(next(&mut rx).await, MessageFromBackend::Alert(_)));
        assert_eq!(settled(next(&mut rx).await), (Mutation::MarkAllRead, true));
    }

    #[tokio::test]
    async fn successful_delete_settles_then_polls_again() {
        let (server, context, mut rx, _dir) = primed_customer().await;
        let id = NotificationId::from(3);
        handle_delete_request(context, id.clone());

        assert_eq!(settled(next(&mut rx).await), (Mutation::Delete(id.clone()), true));
        match next(&mut rx).await {
            MessageFromBackend::Alert(alert) => {
                assert_eq!(alert.kind, AlertKind::Success);
                assert_eq!(alert.message, "Notification deleted");
            }
            other => panic!("unexpected message {other:?}"),
        }

        let refreshed = snapshot_of(next(&mut rx).await);
        assert_eq!(refreshed.unread_total, 2);
        assert!(refreshed.record(&id).is_none());
        assert_eq!(
            requests(&server)[1..],
            ["delete 3".to_string(), "summary".to_string()]
        );
    }

    #[tokio::test]
    async fn rejected_mutation_shows_the_server_message() {
        let (server, context, mut rx, _dir) = primed_customer().await;
        server.lock().unwrap().reject_mutations = true;
        handle_mark_read_request(context.clone(), NotificationId::from(1), false);

        match next(&mut rx).await {
            MessageFromBackend::Alert(alert) => {
                assert_eq!(alert.kind, AlertKind::Error);
                assert_eq!(alert.message, "Not allowed");
            }
            other => panic!("unexpected message {other:?}"),
        }
        assert_eq!(
            settled(next(&mut rx).await),
            (Mutation::MarkRead(NotificationId::from(1)), false)
        );
        let state = context.state.read().await;
        assert_eq!(state.feed.snapshot().map(|s| s.unread_total), Some(3));
    }

    #[tokio::test]
    async fn admin_bulk_action_sends_ids_and_polls_again() {
        let server = FakeServer::with_notifications(vec![
            notification(7, "order", false),
            notification(9, "message", false),
        ]);
        let base_url = test_support::serve(server.clone(), Role::Admin).await;
        let (context, mut rx, _dir) = test_support::context(Role::Admin, &base_url, true, 16);

        let ids = vec![NotificationId::from(7), NotificationId::from(9)];
        handle_bulk_action_request(context, BulkAction::MarkRead, ids).await;

        match next(&mut rx).await {
            MessageFromBackend::Alert(alert) => {
                assert_eq!(alert.kind, AlertKind::Success);
                assert_eq!(alert.message, "2 notifications updated");
            }
            other => panic!("unexpected message {other:?}"),
        }
        assert_eq!(
            settled(next(&mut rx).await),
            (Mutation::Bulk(BulkAction::MarkRead), true)
        );
        assert_eq!(snapshot_of(next(&mut rx).await).unread_total, 2);
        assert_eq!(
            requests(&server),
            [
                r#"bulk {"action":"mark_read","notification_ids":["7","9"]}"#.to_string(),
                "summary".to_string(),
            ]
        );
    }
}
