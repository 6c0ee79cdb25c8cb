//! Notification feed model shared by the poller, the read-state mutator and
//! the renderer.
//!
//! The server speaks a loosely-shaped JSON dialect that differs per role
//! (field aliases, integer or string identifiers, several count fields).
//! [`SummaryResponse`] absorbs those differences and turns a response into a
//! [`NotificationSnapshot`], which is the only form the rest of the
//! application works with.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Account role the client is signed in as.
///
/// The role selects the API path prefix, the polling period, the notification
/// categories and the sound profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Restaurant staff. Tracks orders, contact messages and reviews separately.
    Admin,
    /// Delivery agent.
    Delivery,
    /// Regular customer. Default value.
    #[default]
    Customer,
}

impl Role {
    /// Prefix prepended to every notification endpoint of this role.
    pub fn path_prefix(self) -> &'static str {
        match self {
            Role::Admin => "admin/",
            Role::Delivery => "delivery/",
            Role::Customer => "",
        }
    }

    /// Polling period used when the configuration does not override it.
    pub fn default_poll_interval(self) -> Duration {
        match self {
            Role::Admin => Duration::from_secs(60),
            Role::Delivery | Role::Customer => Duration::from_secs(30),
        }
    }

    /// Unread categories reported for this role.
    pub fn categories(self) -> &'static [Category] {
        match self {
            Role::Admin => &[Category::Orders, Category::Messages, Category::Reviews],
            Role::Delivery | Role::Customer => &[Category::General],
        }
    }

    /// Relative path of the full notification page for this role.
    pub fn notifications_page(self) -> &'static str {
        match self {
            Role::Admin => "admin/notifications",
            Role::Delivery => "delivery/notifications",
            Role::Customer => "notifications",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Delivery => "delivery",
            Role::Customer => "customer",
        };
        formatter.write_str(name)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "delivery" | "agent" => Ok(Role::Delivery),
            "customer" | "user" => Ok(Role::Customer),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

/// Unread counter bucket. Admins get one bucket per notification source,
/// every other role has a single `General` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Orders,
    Messages,
    Reviews,
    General,
}

impl Category {
    /// Returns the bucket a record of `kind` is counted in for `role`, if any.
    pub fn for_kind(role: Role, kind: NotificationKind) -> Option<Category> {
        match role {
            Role::Admin => match kind {
                NotificationKind::Order => Some(Category::Orders),
                NotificationKind::Message => Some(Category::Messages),
                NotificationKind::Review => Some(Category::Reviews),
                _ => None,
            },
            Role::Delivery | Role::Customer => Some(Category::General),
        }
    }
}

/// Kind of a notification record, normalized from the server's type strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NotificationKind {
    Order,
    Message,
    Review,
    Payment,
    Update,
    #[default]
    Generic,
}

impl From<&str> for NotificationKind {
    fn from(value: &str) -> Self {
        match value {
            "order" | "order_update" | "order_assignment" | "delivery_assignment" => {
                NotificationKind::Order
            }
            "message" | "admin_message" => NotificationKind::Message,
            "review" | "review_reply" => NotificationKind::Review,
            "payment" => NotificationKind::Payment,
            "update" => NotificationKind::Update,
            _ => NotificationKind::Generic,
        }
    }
}

/// Identifiers arrive as JSON numbers from some endpoints and as strings
/// from others.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for String {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Number(number) => number.to_string(),
            RawId::Text(text) => text,
        }
    }
}

/// Opaque notification identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(from = "RawId", into = "String")]
pub struct NotificationId(String);

impl NotificationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<RawId> for NotificationId {
    fn from(value: RawId) -> Self {
        Self(value.into())
    }
}

impl From<NotificationId> for String {
    fn from(value: NotificationId) -> Self {
        value.0
    }
}

impl From<&str> for NotificationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for NotificationId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

fn opaque_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

/// Parses the timestamp formats the server is known to emit: RFC 3339, or a
/// naive ISO-like date time which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// A single notification exactly as the server sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct WireNotification {
    pub id: NotificationId,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "message")]
    pub content: String,
    #[serde(default, alias = "timestamp")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub time_ago: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, deserialize_with = "opaque_string")]
    pub reference_id: Option<String>,
    #[serde(default, alias = "link")]
    pub url: Option<String>,
}

/// A normalized notification record.
///
/// Records are immutable apart from `is_read`, which only changes after the
/// server acknowledged a read-state mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Server-rendered relative time, used when `created_at` is unusable.
    pub time_ago: Option<String>,
    pub is_read: bool,
    pub reference_id: Option<String>,
    pub url: Option<String>,
}

impl From<WireNotification> for NotificationRecord {
    fn from(wire: WireNotification) -> Self {
        Self {
            id: wire.id,
            kind: wire
                .kind
                .as_deref()
                .map(NotificationKind::from)
                .unwrap_or_default(),
            title: wire.title,
            body: wire.content,
            created_at: wire.created_at.as_deref().and_then(parse_timestamp),
            time_ago: wire.time_ago.filter(|label| !label.is_empty()),
            is_read: wire.is_read,
            reference_id: wire.reference_id.filter(|id| !id.is_empty()),
            url: wire.url.filter(|url| !url.is_empty() && url != "#"),
        }
    }
}

/// Body of a notification summary response, for every role.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub unread_count: Option<u32>,
    pub total_notifications: Option<u32>,
    pub new_orders: Option<u32>,
    pub new_messages: Option<u32>,
    pub new_reviews: Option<u32>,
    #[serde(default)]
    pub notifications: Vec<WireNotification>,
}

impl SummaryResponse {
    /// Whether the server explicitly refused the request.
    pub fn is_rejected(&self) -> bool {
        self.success == Some(false)
    }

    /// Normalizes the response into a snapshot for `role`.
    ///
    /// Records are ordered newest first; records without a usable timestamp
    /// go last and keep their server order.
    pub fn into_snapshot(self, role: Role) -> NotificationSnapshot {
        let mut records: Vec<NotificationRecord> = self
            .notifications
            .into_iter()
            .map(NotificationRecord::from)
            .collect();
        records.sort_by(|left, right| right.created_at.cmp(&left.created_at));

        let mut category_counts = BTreeMap::new();
        let reported_categories = [
            (Category::Orders, self.new_orders),
            (Category::Messages, self.new_messages),
            (Category::Reviews, self.new_reviews),
        ];
        let has_category_fields = reported_categories
            .iter()
            .any(|(_, count)| count.is_some());

        let explicit_total = self.unread_count.or(self.total_notifications);
        let unread_total = match role {
            Role::Admin => {
                if has_category_fields {
                    for (category, count) in reported_categories {
                        category_counts.insert(category, count.unwrap_or(0));
                    }
                } else {
                    for category in role.categories() {
                        category_counts.insert(*category, 0);
                    }
                    for record in records.iter().filter(|record| !record.is_read) {
                        if let Some(category) = Category::for_kind(role, record.kind) {
                            *category_counts.entry(category).or_insert(0) += 1;
                        }
                    }
                }
                explicit_total.unwrap_or_else(|| {
                    if has_category_fields {
                        category_counts.values().sum()
                    } else {
                        count_unread(&records)
                    }
                })
            }
            Role::Delivery | Role::Customer => {
                let total = explicit_total.unwrap_or_else(|| count_unread(&records));
                category_counts.insert(Category::General, total);
                total
            }
        };

        NotificationSnapshot {
            role,
            unread_total,
            category_counts,
            records,
        }
    }
}

fn count_unread(records: &[NotificationRecord]) -> u32 {
    records.iter().filter(|record| !record.is_read).count() as u32
}

/// Body of every mutating endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

/// Complete server-reported notification state for one role.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSnapshot {
    pub role: Role,
    pub unread_total: u32,
    pub category_counts: BTreeMap<Category, u32>,
    pub records: Vec<NotificationRecord>,
}

impl NotificationSnapshot {
    /// Snapshot with nothing unread and no records.
    pub fn empty(role: Role) -> Self {
        Self {
            role,
            unread_total: 0,
            category_counts: role.categories().iter().map(|c| (*c, 0)).collect(),
            records: Vec::new(),
        }
    }

    pub fn category_count(&self, category: Category) -> u32 {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    pub fn record(&self, id: &NotificationId) -> Option<&NotificationRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Newest record that is still unread.
    pub fn newest_unread(&self) -> Option<&NotificationRecord> {
        self.records.iter().find(|record| !record.is_read)
    }

    /// Applies an acknowledged mark-read of `id`.
    ///
    /// Counts drop by exactly one, floored at zero. A record that is listed
    /// and already read leaves the counts alone. Returns whether anything
    /// changed.
    pub fn mark_read(&mut self, id: &NotificationId) -> bool {
        let kind = match self.records.iter_mut().find(|record| &record.id == id) {
            Some(record) if record.is_read => return false,
            Some(record) => {
                record.is_read = true;
                Some(record.kind)
            }
            None => None,
        };

        self.unread_total = self.unread_total.saturating_sub(1);
        let category = match kind {
            Some(kind) => Category::for_kind(self.role, kind),
            None if self.role != Role::Admin => Some(Category::General),
            None => None,
        };
        if let Some(count) = category.and_then(|c| self.category_counts.get_mut(&c)) {
            *count = count.saturating_sub(1);
        }
        true
    }

    /// Applies an acknowledged mark-all-read.
    pub fn mark_all_read(&mut self) {
        for record in &mut self.records {
            record.is_read = true;
        }
        for count in self.category_counts.values_mut() {
            *count = 0;
        }
        self.unread_total = 0;
    }

    /// Drops a deleted record from the list. Counts are left for the next poll
    /// to re-derive.
    pub fn remove(&mut self, id: &NotificationId) -> Option<NotificationRecord> {
        let position = self.records.iter().position(|record| &record.id == id)?;
        Some(self.records.remove(position))
    }
}
