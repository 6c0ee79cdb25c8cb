//! Projection of the panel state into what the dropdown shows.

use std::time::Instant;

use bhojan_bridge::{
    BulkAction, Mutation,
    alert::AlertMessage,
    feed::{Category, NotificationId, NotificationKind, Role},
};
use chrono::{DateTime, Utc};

use crate::{
    entities::panel_entity::{Control, NotificationPanel},
    formatting::{format_badge, format_time_ago, truncate_body},
};

/// Item icon, one per notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Cart,
    Envelope,
    Star,
    Money,
    Info,
    Bell,
}

impl Icon {
    pub fn for_kind(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Order => Icon::Cart,
            NotificationKind::Message => Icon::Envelope,
            NotificationKind::Review => Icon::Star,
            NotificationKind::Payment => Icon::Money,
            NotificationKind::Update => Icon::Info,
            NotificationKind::Generic => Icon::Bell,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Icon::Cart => "🛒",
            Icon::Envelope => "✉",
            Icon::Star => "★",
            Icon::Money => "💵",
            Icon::Info => "ℹ",
            Icon::Bell => "🔔",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeView {
    /// Main badge text; `None` hides it.
    pub main: Option<String>,
    /// Admin per-category badges, in display order.
    pub categories: Vec<(Category, Option<String>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    /// 1-based position, also used for element ids.
    pub position: usize,
    pub id: NotificationId,
    pub icon: Icon,
    pub title: String,
    pub body: String,
    pub time_label: Option<String>,
    pub unread: bool,
    pub selected: bool,
    /// Fading out after a delete.
    pub removing: bool,
    pub mark_read: Control,
    pub delete: Control,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub badge: BadgeView,
    /// Empty means the "No notifications" placeholder.
    pub items: Vec<ItemView>,
    pub mark_all_read: Control,
    /// Admin bulk controls. Empty for every other role, which also means
    /// items have no selection checkbox.
    pub bulk: Vec<(BulkAction, Control)>,
    pub muted: bool,
    pub alert: Option<AlertMessage>,
}

fn badge_view(panel: &NotificationPanel) -> BadgeView {
    let snapshot = panel.snapshot();
    let cap = panel.dropdown().badge_cap(snapshot.role);

    let categories = match snapshot.role {
        Role::Admin => snapshot
            .role
            .categories()
            .iter()
            .map(|category| (*category, format_badge(snapshot.category_count(*category), cap)))
            .collect(),
        Role::Delivery | Role::Customer => Vec::new(),
    };

    BadgeView {
        main: format_badge(snapshot.unread_total, cap),
        categories,
    }
}

/// Builds the dropdown from scratch from the panel's current state.
pub fn render_panel(panel: &NotificationPanel, clock: DateTime<Utc>, now: Instant) -> PanelView {
    let role = panel.role();
    let body_max_chars = panel.dropdown().body_max_chars;

    let items = panel
        .visible_records()
        .enumerate()
        .map(|(index, record)| ItemView {
            position: index + 1,
            id: record.id.clone(),
            icon: Icon::for_kind(record.kind),
            title: record.title.clone(),
            body: truncate_body(&record.body, body_max_chars),
            time_label: format_time_ago(record.created_at, record.time_ago.as_deref(), clock),
            unread: !record.is_read,
            selected: panel.is_selected(&record.id),
            removing: panel.is_removing(&record.id),
            mark_read: panel.control(&Mutation::MarkRead(record.id.clone())),
            delete: panel.control(&Mutation::Delete(record.id.clone())),
        })
        .collect();

    let bulk = match role {
        Role::Admin => [BulkAction::MarkRead, BulkAction::MarkUnread, BulkAction::Delete]
            .into_iter()
            .map(|action| (action, panel.control(&Mutation::Bulk(action))))
            .collect(),
        Role::Delivery | Role::Customer => Vec::new(),
    };

    PanelView {
        badge: badge_view(panel),
        items,
        mark_all_read: panel.control(&Mutation::MarkAllRead),
        bulk,
        muted: panel.is_muted(),
        alert: panel.active_alert(now).cloned(),
    }
}
