//! Snapshot ownership, poll ordering and count diffing.

use std::collections::BTreeMap;

use bhojan_bridge::{
    feed::{Category, NotificationSnapshot},
    sound::SoundCue,
};

/// Last category counts seen by the poller. Only used to detect growth.
#[derive(Debug, Default, Clone)]
pub struct PollState {
    last_counts: Option<BTreeMap<Category, u32>>,
}

impl PollState {
    /// `true` until the first snapshot was observed.
    #[cfg(test)]
    pub fn is_cold(&self) -> bool {
        self.last_counts.is_none()
    }

    /// Compares `snapshot` with the previous observation and returns one cue
    /// per category whose count strictly increased. The first observation
    /// only primes the state.
    pub fn observe(&mut self, snapshot: &NotificationSnapshot) -> Vec<SoundCue> {
        let role = snapshot.role;
        let current: BTreeMap<Category, u32> = role
            .categories()
            .iter()
            .map(|category| (*category, snapshot.category_count(*category)))
            .collect();

        let cues = match &self.last_counts {
            None => Vec::new(),
            Some(previous) => current
                .iter()
                .filter(|(category, count)| {
                    **count > previous.get(category).copied().unwrap_or(0)
                })
                .map(|(category, _)| SoundCue::for_category(role, *category, snapshot))
                .collect(),
        };

        self.last_counts = Some(current);
        cues
    }
}

/// Current snapshot plus the bookkeeping that keeps out-of-order and
/// pre-mutation poll responses from being applied.
#[derive(Debug, Default)]
pub struct FeedState {
    issued: u64,
    applied: u64,
    stale_through: u64,
    evaluated: u64,
    snapshot: Option<NotificationSnapshot>,
    poll_state: PollState,
}

impl FeedState {
    /// Hands out the sequence number for a poll about to be sent.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Applies the response of poll `sequence` unless something newer was
    /// applied already or a mutation succeeded after it was issued.
    pub fn accept(
        &mut self,
        sequence: u64,
        snapshot: NotificationSnapshot,
    ) -> Option<NotificationSnapshot> {
        if sequence <= self.applied || sequence <= self.stale_through {
            return None;
        }
        self.applied = sequence;
        self.snapshot = Some(snapshot.clone());
        Some(snapshot)
    }

    /// Runs the sound-trigger diff for an accepted poll. Must be called after
    /// the snapshot was published.
    pub fn evaluate(&mut self, sequence: u64, snapshot: &NotificationSnapshot) -> Vec<SoundCue> {
        if sequence <= self.evaluated {
            return Vec::new();
        }
        self.evaluated = sequence;
        self.poll_state.observe(snapshot)
    }

    /// Marks every poll issued so far as stale.
    pub fn mark_mutation(&mut self) {
        self.stale_through = self.issued;
    }

    /// Patches the current snapshot in place and returns the result. `None`
    /// when no poll was accepted yet.
    pub fn patch(
        &mut self,
        apply: impl FnOnce(&mut NotificationSnapshot),
    ) -> Option<NotificationSnapshot> {
        let snapshot = self.snapshot.as_mut()?;
        apply(snapshot);
        Some(snapshot.clone())
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Option<&NotificationSnapshot> {
        self.snapshot.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhojan_bridge::feed::{NotificationId, NotificationKind, NotificationRecord, Role};

    fn record(id: u64, kind: NotificationKind, is_read: bool) -> NotificationRecord {
        NotificationRecord {
            id: NotificationId::from(id),
            kind,
            title: format!("Notification {id}"),
            body: String::new(),
            created_at: None,
            time_ago: None,
            is_read,
            reference_id: None,
            url: None,
        }
    }

    fn admin(orders: u32, messages: u32, reviews: u32) -> NotificationSnapshot {
        let mut snapshot = NotificationSnapshot::empty(Role::Admin);
        snapshot.category_counts.insert(Category::Orders, orders);
        snapshot.category_counts.insert(Category::Messages, messages);
        snapshot.category_counts.insert(Category::Reviews, reviews);
        snapshot.unread_total = orders + messages + reviews;
        snapshot
    }

    fn customer(unread: u32, records: Vec<NotificationRecord>) -> NotificationSnapshot {
        let mut snapshot = NotificationSnapshot::empty(Role::Customer);
        snapshot.category_counts.insert(Category::General, unread);
        snapshot.unread_total = unread;
        snapshot.records = records;
        snapshot
    }

    #[test]
    fn cold_start_emits_nothing() {
        let mut poll_state = PollState::default();
        assert!(poll_state.is_cold());
        assert!(poll_state.observe(&admin(4, 2, 1)).is_empty());
        assert!(!poll_state.is_cold());
    }

    #[test]
    fn only_growing_categories_trigger() {
        let mut poll_state = PollState::default();
        poll_state.observe(&admin(1, 2, 3));

        let cues = poll_state.observe(&admin(2, 1, 5));
        assert_eq!(cues, vec![SoundCue::NewOrder, SoundCue::NewReview]);

        assert!(poll_state.observe(&admin(2, 1, 5)).is_empty());
        assert!(poll_state.observe(&admin(0, 0, 0)).is_empty());
        assert_eq!(
            poll_state.observe(&admin(0, 1, 0)),
            vec![SoundCue::UserMessage]
        );
    }

    #[test]
    fn customer_cue_follows_newest_unread_record() {
        let mut poll_state = PollState::default();
        poll_state.observe(&customer(0, Vec::new()));

        let snapshot = customer(
            1,
            vec![
                record(9, NotificationKind::Review, false),
                record(8, NotificationKind::Order, true),
            ],
        );
        assert_eq!(poll_state.observe(&snapshot), vec![SoundCue::ReviewReply]);
    }

    #[test]
    fn polls_resolving_out_of_order_keep_the_newest() {
        let mut feed = FeedState::default();
        let first = feed.issue();
        let second = feed.issue();

        assert!(feed.accept(second, admin(2, 0, 0)).is_some());
        assert!(feed.accept(first, admin(1, 0, 0)).is_none());
        assert_eq!(
            feed.snapshot().map(|s| s.category_count(Category::Orders)),
            Some(2)
        );
    }

    #[test]
    fn polls_issued_before_a_mutation_are_stale() {
        let mut feed = FeedState::default();
        let sequence = feed.issue();
        let unread = customer(1, vec![record(5, NotificationKind::Order, false)]);
        assert!(feed.accept(sequence, unread).is_some());

        let in_flight = feed.issue();
        feed.patch(|snapshot| {
            snapshot.mark_read(&NotificationId::from(5));
        });
        feed.mark_mutation();

        let resurrected = customer(1, vec![record(5, NotificationKind::Order, false)]);
        assert!(feed.accept(in_flight, resurrected).is_none());
        assert_eq!(feed.snapshot().map(|s| s.unread_total), Some(0));

        let fresh = feed.issue();
        assert!(feed.accept(fresh, customer(0, Vec::new())).is_some());
    }

    #[test]
    fn patch_without_snapshot_is_none() {
        let mut feed = FeedState::default();
        assert!(feed.patch(|snapshot| snapshot.mark_all_read()).is_none());
    }

    #[test]
    fn admin_poll_sequence_triggers_once_per_growth() {
        let mut feed = FeedState::default();
        let polls = [admin(1, 0, 0), admin(2, 0, 0), admin(2, 0, 0)];
        let mut triggered = Vec::new();

        for snapshot in polls {
            let sequence = feed.issue();
            let accepted = feed.accept(sequence, snapshot).unwrap();
            triggered.extend(feed.evaluate(sequence, &accepted));
        }

        assert_eq!(triggered, vec![SoundCue::NewOrder]);
    }

    #[test]
    fn evaluation_never_goes_backwards() {
        let mut feed = FeedState::default();
        let first = feed.issue();
        let second = feed.issue();
        let older = feed.accept(first, admin(0, 0, 0)).unwrap();
        let newer = feed.accept(second, admin(3, 0, 0)).unwrap();

        assert!(feed.evaluate(second, &newer).is_empty());
        assert!(feed.evaluate(first, &older).is_empty());

        let third = feed.issue();
        let same = feed.accept(third, admin(3, 0, 0)).unwrap();
        assert!(feed.evaluate(third, &same).is_empty());
    }
}
