use std::{
    collections::{BTreeSet, HashMap, HashSet},
    time::{Duration, Instant},
};

use bhojan_bridge::{
    BulkAction, MessageFromBackend, MessageToBackend, Mutation,
    alert::{ALERT_DURATION, AlertMessage},
    config::{Config, DropdownConfig},
    feed::{NotificationId, NotificationRecord, NotificationSnapshot, Role},
};

use crate::routes::deep_link;

/// How long a deleted item stays visible while it fades out.
pub const REMOVAL_TRANSITION: Duration = Duration::from_millis(300);

/// Label and availability of a control that starts a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: String,
    pub enabled: bool,
}

/// A mutation the user has to confirm before it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Delete(NotificationId),
    MarkAllRead,
    Bulk {
        action: BulkAction,
        ids: Vec<NotificationId>,
    },
}

impl Confirmation {
    pub fn prompt(&self) -> String {
        match self {
            Confirmation::Delete(_) => {
                "Are you sure you want to delete this notification?".to_string()
            }
            Confirmation::MarkAllRead => "Mark all notifications as read?".to_string(),
            Confirmation::Bulk { action, ids } => {
                let verb = match action {
                    BulkAction::MarkRead => "Mark as read",
                    BulkAction::MarkUnread => "Mark as unread",
                    BulkAction::Delete => "Delete",
                };
                format!("{verb} {} selected notifications?", ids.len())
            }
        }
    }

    fn mutation(&self) -> Mutation {
        match self {
            Confirmation::Delete(id) => Mutation::Delete(id.clone()),
            Confirmation::MarkAllRead => Mutation::MarkAllRead,
            Confirmation::Bulk { action, .. } => Mutation::Bulk(*action),
        }
    }

    fn into_message(self) -> MessageToBackend {
        match self {
            Confirmation::Delete(id) => MessageToBackend::DeleteRequest(id),
            Confirmation::MarkAllRead => MessageToBackend::MarkAllReadRequest,
            Confirmation::Bulk { action, ids } => {
                MessageToBackend::BulkActionRequest { action, ids }
            }
        }
    }
}

/// What a user interaction with the panel asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Send(MessageToBackend),
    Confirm(Confirmation),
    /// In-app path to open.
    Navigate(String),
    /// Nothing to do, e.g. the control is already busy.
    Nothing,
}

#[derive(Debug, Clone, Copy)]
struct Removal {
    started: Instant,
    finished: bool,
}

fn idle_label(mutation: &Mutation) -> String {
    match mutation {
        Mutation::MarkRead(_) => "Mark as read".to_string(),
        Mutation::MarkAllRead => "Mark all as read".to_string(),
        Mutation::Delete(_) => "Delete".to_string(),
        Mutation::Bulk(BulkAction::MarkRead) => "Mark selected as read".to_string(),
        Mutation::Bulk(BulkAction::MarkUnread) => "Mark selected as unread".to_string(),
        Mutation::Bulk(BulkAction::Delete) => "Delete selected".to_string(),
    }
}

fn busy_label(mutation: &Mutation) -> String {
    match mutation {
        Mutation::MarkRead(_) => "Marking…".to_string(),
        Mutation::MarkAllRead => "Marking all as read...".to_string(),
        Mutation::Delete(_) => "Deleting…".to_string(),
        Mutation::Bulk(_) => "Processing…".to_string(),
    }
}

/// Client-side state of the notification dropdown.
///
/// The snapshot itself only changes through the backend; everything else
/// here is presentation: controls waiting for a mutation, fading deletions,
/// the admin selection, the transient alert and navigations waiting for a
/// mark-read.
#[derive(Debug, Clone)]
pub struct NotificationPanel {
    snapshot: NotificationSnapshot,
    dropdown: DropdownConfig,
    muted: bool,
    in_flight: HashSet<Mutation>,
    removals: HashMap<NotificationId, Removal>,
    selected: BTreeSet<NotificationId>,
    alert: Option<(AlertMessage, Instant)>,
    navigations: HashMap<NotificationId, String>,
}

impl NotificationPanel {
    pub fn new(role: Role) -> Self {
        Self {
            snapshot: NotificationSnapshot::empty(role),
            dropdown: DropdownConfig::default(),
            muted: false,
            in_flight: HashSet::new(),
            removals: HashMap::new(),
            selected: BTreeSet::new(),
            alert: None,
            navigations: HashMap::new(),
        }
    }

    pub fn apply_config(&mut self, config: &Config) {
        self.dropdown = config.dropdown.clone();
        self.muted = config.sound.muted;
        if config.server.role != self.snapshot.role {
            self.snapshot = NotificationSnapshot::empty(config.server.role);
            self.selected.clear();
        }
    }

    pub fn role(&self) -> Role {
        self.snapshot.role
    }

    pub fn snapshot(&self) -> &NotificationSnapshot {
        &self.snapshot
    }

    pub fn dropdown(&self) -> &DropdownConfig {
        &self.dropdown
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Replaces the snapshot. Removal transitions and selections of records
    /// that are gone from it are dropped.
    pub fn apply_snapshot(&mut self, snapshot: NotificationSnapshot) {
        self.removals.retain(|id, _| snapshot.record(id).is_some());
        self.selected.retain(|id| snapshot.record(id).is_some());
        self.snapshot = snapshot;
    }

    /// Records that are still shown, including ones fading out.
    pub fn visible_records(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.snapshot.records.iter().filter(|record| {
            !self
                .removals
                .get(&record.id)
                .is_some_and(|removal| removal.finished)
        })
    }

    pub fn is_removing(&self, id: &NotificationId) -> bool {
        self.removals
            .get(id)
            .is_some_and(|removal| !removal.finished)
    }

    pub fn is_selected(&self, id: &NotificationId) -> bool {
        self.selected.contains(id)
    }

    pub fn set_selected(&mut self, id: NotificationId, selected: bool) {
        if selected {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
    }

    /// Marks the control of `mutation` busy. Returns `false` when it already
    /// is, in which case no request should be sent.
    fn begin(&mut self, mutation: Mutation) -> bool {
        self.in_flight.insert(mutation)
    }

    pub fn control(&self, mutation: &Mutation) -> Control {
        if self.in_flight.contains(mutation) {
            Control {
                label: busy_label(mutation),
                enabled: false,
            }
        } else {
            Control {
                label: idle_label(mutation),
                enabled: true,
            }
        }
    }

    /// Opens the record `id`. Unread records are marked read first and the
    /// navigation follows once that settles.
    pub fn request_open(&mut self, id: &NotificationId) -> Request {
        let Some(record) = self.snapshot.record(id) else {
            return Request::Nothing;
        };
        let target = deep_link(record, self.snapshot.role);
        if record.is_read {
            return Request::Navigate(target);
        }

        self.navigations.insert(id.clone(), target);
        if self.begin(Mutation::MarkRead(id.clone())) {
            Request::Send(MessageToBackend::MarkReadRequest {
                id: id.clone(),
                silent: true,
            })
        } else {
            Request::Nothing
        }
    }

    pub fn request_mark_read(&mut self, id: &NotificationId) -> Request {
        let unread = self.snapshot.record(id).is_some_and(|record| !record.is_read);
        if !unread || !self.begin(Mutation::MarkRead(id.clone())) {
            return Request::Nothing;
        }
        Request::Send(MessageToBackend::MarkReadRequest {
            id: id.clone(),
            silent: false,
        })
    }

    pub fn request_mark_all_read(&self) -> Request {
        self.confirmation(Confirmation::MarkAllRead)
    }

    pub fn request_delete(&self, id: &NotificationId) -> Request {
        self.confirmation(Confirmation::Delete(id.clone()))
    }

    /// Applies `action` to the selection. An empty selection goes straight
    /// to the backend, which warns about it.
    pub fn request_bulk(&mut self, action: BulkAction) -> Request {
        let ids: Vec<NotificationId> = self.selected.iter().cloned().collect();
        if !ids.is_empty() {
            return self.confirmation(Confirmation::Bulk { action, ids });
        }
        if self.begin(Mutation::Bulk(action)) {
            Request::Send(MessageToBackend::BulkActionRequest { action, ids })
        } else {
            Request::Nothing
        }
    }

    fn confirmation(&self, confirmation: Confirmation) -> Request {
        if self.in_flight.contains(&confirmation.mutation()) {
            Request::Nothing
        } else {
            Request::Confirm(confirmation)
        }
    }

    /// The user accepted `confirmation`.
    pub fn confirm(&mut self, confirmation: Confirmation) -> Request {
        if self.begin(confirmation.mutation()) {
            Request::Send(confirmation.into_message())
        } else {
            Request::Nothing
        }
    }

    /// Restores the control of a finished mutation. A successful delete
    /// starts the removal transition, a successful bulk action clears the
    /// selection. Returns the navigation target waiting on a mark-read.
    fn settle(&mut self, mutation: Mutation, success: bool, now: Instant) -> Option<String> {
        self.in_flight.remove(&mutation);
        match mutation {
            Mutation::Delete(id) if success => {
                self.selected.remove(&id);
                self.removals.insert(
                    id,
                    Removal {
                        started: now,
                        finished: false,
                    },
                );
                None
            }
            Mutation::Bulk(_) if success => {
                self.selected.clear();
                None
            }
            Mutation::MarkRead(id) => self.navigations.remove(&id),
            _ => None,
        }
    }

    /// Applies one message from the backend. Returns the in-app path to
    /// open, if a navigation became due.
    pub fn receive(&mut self, message: MessageFromBackend, now: Instant) -> Option<String> {
        match message {
            MessageFromBackend::ConfigurationResponse(config) => {
                self.apply_config(&config);
                None
            }
            MessageFromBackend::SnapshotUpdated(snapshot) => {
                self.apply_snapshot(snapshot);
                None
            }
            MessageFromBackend::Alert(alert) => {
                self.alert = Some((alert, now));
                None
            }
            MessageFromBackend::MutationSettled { mutation, success } => {
                self.settle(mutation, success, now)
            }
            MessageFromBackend::MuteStateChanged(muted) => {
                self.muted = muted;
                None
            }
        }
    }

    pub fn active_alert(&self, now: Instant) -> Option<&AlertMessage> {
        self.alert
            .as_ref()
            .filter(|(_, shown)| now.duration_since(*shown) < ALERT_DURATION)
            .map(|(alert, _)| alert)
    }

    /// Advances timers. Returns whether the visible state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if self
            .alert
            .as_ref()
            .is_some_and(|(_, shown)| now.duration_since(*shown) >= ALERT_DURATION)
        {
            self.alert = None;
            changed = true;
        }

        for removal in self.removals.values_mut() {
            if !removal.finished && now.duration_since(removal.started) >= REMOVAL_TRANSITION {
                removal.finished = true;
                changed = true;
            }
        }

        changed
    }
}
