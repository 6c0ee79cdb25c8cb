use crate::feed::{Category, NotificationKind, NotificationSnapshot, Role};

/// Alert sound event raised by the poller when a category grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    NewOrder,
    UserMessage,
    NewReview,
    OrderUpdate,
    AdminMessage,
    ReviewReply,
    NewAssignment,
    PaymentUpdate,
    Default,
}

impl SoundCue {
    /// Picks the cue for a grown `category`. Roles with a single category
    /// derive it from the newest unread record of the snapshot.
    pub fn for_category(
        role: Role,
        category: Category,
        snapshot: &NotificationSnapshot,
    ) -> SoundCue {
        let newest_kind = || snapshot.newest_unread().map(|record| record.kind);
        match role {
            Role::Admin => match category {
                Category::Orders => SoundCue::NewOrder,
                Category::Messages => SoundCue::UserMessage,
                Category::Reviews => SoundCue::NewReview,
                Category::General => SoundCue::Default,
            },
            Role::Customer => match newest_kind() {
                Some(NotificationKind::Order) => SoundCue::OrderUpdate,
                Some(NotificationKind::Message) => SoundCue::AdminMessage,
                Some(NotificationKind::Review) => SoundCue::ReviewReply,
                _ => SoundCue::Default,
            },
            Role::Delivery => match newest_kind() {
                Some(NotificationKind::Order) => SoundCue::NewAssignment,
                Some(NotificationKind::Payment) => SoundCue::PaymentUpdate,
                _ => SoundCue::Default,
            },
        }
    }

    /// Name of the pre-recorded asset for this cue, without extension. Cues
    /// a role has no recording for use the role's default asset.
    pub fn asset_key(self, role: Role) -> &'static str {
        match (role, self) {
            (Role::Admin, SoundCue::NewOrder) => "admin-new-order",
            (Role::Admin, SoundCue::UserMessage) => "admin-user-message",
            (Role::Admin, SoundCue::NewReview) => "admin-new-review",
            (Role::Customer, SoundCue::OrderUpdate) => "user-order-update",
            (Role::Customer, SoundCue::AdminMessage) => "user-admin-message",
            (Role::Customer, SoundCue::ReviewReply) => "user-review-reply",
            (Role::Delivery, SoundCue::NewAssignment) => "delivery-new-assignment",
            (Role::Delivery, SoundCue::PaymentUpdate) => "delivery-payment",
            (role, _) => Self::default_asset_key(role),
        }
    }

    pub fn default_asset_key(role: Role) -> &'static str {
        match role {
            Role::Admin => "admin-notification",
            Role::Delivery => "delivery-notification",
            Role::Customer => "user-notification",
        }
    }

    /// Frequency multiplier applied to the synthetic tones of this cue.
    pub fn pitch_shift(self) -> f32 {
        match self {
            SoundCue::NewOrder | SoundCue::OrderUpdate => 1.1,
            SoundCue::NewReview | SoundCue::ReviewReply => 0.9,
            SoundCue::UserMessage | SoundCue::AdminMessage => 1.05,
            _ => 1.0,
        }
    }
}
