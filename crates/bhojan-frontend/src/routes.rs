use bhojan_bridge::feed::{NotificationKind, NotificationRecord, Role};

/// Where opening `record` leads: its own URL, else a route derived from its
/// kind and reference, else the role's notification page.
pub fn deep_link(record: &NotificationRecord, role: Role) -> String {
    if let Some(url) = &record.url {
        return url.clone();
    }

    let notifications_page = || format!("/{}", role.notifications_page());
    let Some(reference) = &record.reference_id else {
        return notifications_page();
    };
    match (record.kind, role) {
        (NotificationKind::Review, _) => format!("/food/{reference}"),
        (NotificationKind::Order, Role::Customer) => format!("/my-orders/{reference}"),
        (NotificationKind::Order, Role::Delivery) => format!("/delivery/orders/{reference}"),
        (NotificationKind::Order, Role::Admin) => format!("/admin/orders/{reference}"),
        _ => notifications_page(),
    }
}

/// Resolves an in-app path against `base_url`. Absolute URLs are kept.
pub fn absolute_url(base_url: &str, target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        return target.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        target.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhojan_bridge::feed::NotificationId;

    fn record(kind: NotificationKind, reference: Option<&str>) -> NotificationRecord {
        NotificationRecord {
            id: NotificationId::from(1),
            kind,
            title: "Title".to_string(),
            body: String::new(),
            created_at: None,
            time_ago: None,
            is_read: false,
            reference_id: reference.map(str::to_string),
            url: None,
        }
    }

    #[test]
    fn deep_links_fall_back_by_kind_then_role_page() {
        let review = record(NotificationKind::Review, Some("44"));
        assert_eq!(deep_link(&review, Role::Customer), "/food/44");

        let order = record(NotificationKind::Order, Some("9"));
        assert_eq!(deep_link(&order, Role::Customer), "/my-orders/9");
        assert_eq!(deep_link(&order, Role::Delivery), "/delivery/orders/9");
        assert_eq!(deep_link(&order, Role::Admin), "/admin/orders/9");

        let no_reference = record(NotificationKind::Order, None);
        assert_eq!(deep_link(&no_reference, Role::Delivery), "/delivery/notifications");

        let mut linked = record(NotificationKind::Generic, None);
        linked.url = Some("/offers/summer".to_string());
        assert_eq!(deep_link(&linked, Role::Customer), "/offers/summer");
    }

    #[test]
    fn paths_are_resolved_against_the_base_url() {
        assert_eq!(
            absolute_url("https://bhojan.test/", "/food/12"),
            "https://bhojan.test/food/12"
        );
        assert_eq!(
            absolute_url("https://bhojan.test", "https://elsewhere.test/x"),
            "https://elsewhere.test/x"
        );
    }
}
