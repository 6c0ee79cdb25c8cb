//! HTTP client for the notification endpoints of the web application.

use bhojan_bridge::{
    BulkAction,
    feed::{Acknowledgement, NotificationId, NotificationSnapshot, Role, SummaryResponse},
};
use futures_util::StreamExt;
use reqwest::{Client, StatusCode, Url, header};
use serde::Serialize;

/// Header the server reads the anti-forgery token from.
const CSRF_HEADER: &str = "X-CSRFToken";

/// Errors returned by [`NotificationApi`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The configured base URL or a derived endpoint is not a valid URL.
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Network, TLS, timeout or body decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success HTTP status without a usable JSON body.
    #[error("server answered with status {0}")]
    Status(StatusCode),
    /// The server answered `success: false`.
    #[error("server rejected the request: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),
    /// A downloaded asset exceeded the allowed size.
    #[error("response body exceeds {0} bytes")]
    TooLarge(usize),
}

impl ApiError {
    /// Message for the user: the server's own explanation when it gave one,
    /// `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected(Some(message)) if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Serialize)]
struct BulkActionBody<'a> {
    action: BulkAction,
    notification_ids: &'a [NotificationId],
}

/// Role-scoped client for the notification API.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct NotificationApi {
    client: Client,
    base_url: Url,
    role: Role,
    csrf_token: Option<String>,
}

impl NotificationApi {
    /// Creates a client for `role` against the application at `base_url`.
    pub fn new(client: Client, base_url: &str, role: Role) -> Result<Self, ApiError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|error| ApiError::InvalidUrl {
            url: normalized.clone(),
            reason: error.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            role,
            csrf_token: None,
        })
    }

    /// Attaches the anti-forgery token sent with every mutating request.
    pub fn with_csrf_token(mut self, csrf_token: Option<String>) -> Self {
        self.csrf_token = csrf_token;
        self
    }

    /// Resolves `path` against the base URL. Absolute URLs are kept as is.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|error| ApiError::InvalidUrl {
                url: path.to_string(),
                reason: error.to_string(),
            })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.resolve(&format!("{}notifications/{path}", self.role.path_prefix()))
    }

    pub fn summary_url(&self, limit: Option<u32>) -> Result<Url, ApiError> {
        let mut url = self.endpoint("api/get")?;
        if let Some(limit) = limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        Ok(url)
    }

    pub fn mark_read_url(&self, id: &NotificationId) -> Result<Url, ApiError> {
        self.endpoint(&format!("{id}/mark-read"))
    }

    pub fn mark_all_read_url(&self) -> Result<Url, ApiError> {
        self.endpoint("mark-all-read")
    }

    pub fn delete_url(&self, id: &NotificationId) -> Result<Url, ApiError> {
        self.endpoint(&format!("{id}/delete"))
    }

    pub fn bulk_action_url(&self) -> Result<Url, ApiError> {
        self.resolve("admin/notifications/bulk-action")
    }

    /// Fetches the role's notification summary.
    pub async fn fetch_summary(&self, limit: Option<u32>) -> Result<NotificationSnapshot, ApiError> {
        let url = self.summary_url(limit)?;
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;

        let summary: SummaryResponse = response.json().await?;
        if summary.is_rejected() {
            return Err(ApiError::Rejected(summary.message));
        }
        Ok(summary.into_snapshot(self.role))
    }

    pub async fn mark_read(&self, id: &NotificationId) -> Result<Acknowledgement, ApiError> {
        self.post_mutation(self.mark_read_url(id)?, None::<&()>).await
    }

    pub async fn mark_all_read(&self) -> Result<Acknowledgement, ApiError> {
        self.post_mutation(self.mark_all_read_url()?, None::<&()>).await
    }

    pub async fn delete(&self, id: &NotificationId) -> Result<Acknowledgement, ApiError> {
        self.post_mutation(self.delete_url(id)?, None::<&()>).await
    }

    pub async fn bulk_action(
        &self,
        action: BulkAction,
        ids: &[NotificationId],
    ) -> Result<Acknowledgement, ApiError> {
        let body = BulkActionBody {
            action,
            notification_ids: ids,
        };
        self.post_mutation(self.bulk_action_url()?, Some(&body)).await
    }

    /// Sends a state-mutating POST and interprets the `{success, message}`
    /// acknowledgement.
    async fn post_mutation<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: Option<&B>,
    ) -> Result<Acknowledgement, ApiError> {
        let mut request = self
            .client
            .post(url.clone())
            .header(header::ACCEPT, "application/json");

        match &self.csrf_token {
            Some(token) => request = request.header(CSRF_HEADER, token),
            None => log::debug!("No anti-forgery token available for {url}"),
        }

        request = match body {
            Some(body) => request.json(body),
            None => request.header(header::CONTENT_TYPE, "application/json"),
        };

        let response = request.send().await?;
        let status = response.status();
        match response.json::<Acknowledgement>().await {
            Ok(acknowledgement) if acknowledgement.success => Ok(acknowledgement),
            Ok(acknowledgement) => Err(ApiError::Rejected(acknowledgement.message)),
            Err(_) if !status.is_success() => Err(ApiError::Status(status)),
            Err(error) => Err(error.into()),
        }
    }

    /// Downloads a page as text, e.g. to scrape the anti-forgery token.
    pub async fn fetch_page(&self, path: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .get(self.resolve(path)?)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// Downloads a binary asset, refusing bodies larger than `max_bytes`.
    pub async fn fetch_asset(&self, path: &str, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(self.resolve(path)?)
            .send()
            .await?
            .error_for_status()?;

        if let Some(length) = response.content_length() {
            if length as usize > max_bytes {
                return Err(ApiError::TooLarge(max_bytes));
            }
        }

        let mut bytes = Vec::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            if bytes.len() + chunk.len() > max_bytes {
                return Err(ApiError::TooLarge(max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str, role: Role) -> NotificationApi {
        NotificationApi::new(Client::new(), base_url, role).unwrap()
    }

    #[test]
    fn customer_endpoints_have_no_prefix() {
        let api = api("http://shop.test", Role::Customer);
        let id = NotificationId::from(42);

        assert_eq!(
            api.summary_url(None).unwrap().as_str(),
            "http://shop.test/notifications/api/get"
        );
        assert_eq!(
            api.mark_read_url(&id).unwrap().as_str(),
            "http://shop.test/notifications/42/mark-read"
        );
        assert_eq!(
            api.delete_url(&id).unwrap().as_str(),
            "http://shop.test/notifications/42/delete"
        );
    }

    #[test]
    fn role_prefix_and_limit_are_applied() {
        let api = api("http://shop.test/app", Role::Admin);
        assert_eq!(
            api.summary_url(Some(5)).unwrap().as_str(),
            "http://shop.test/app/admin/notifications/api/get?limit=5"
        );
        assert_eq!(
            api.mark_all_read_url().unwrap().as_str(),
            "http://shop.test/app/admin/notifications/mark-all-read"
        );
        assert_eq!(
            api.bulk_action_url().unwrap().as_str(),
            "http://shop.test/app/admin/notifications/bulk-action"
        );

        let delivery = self::api("http://shop.test/", Role::Delivery);
        assert_eq!(
            delivery.mark_all_read_url().unwrap().as_str(),
            "http://shop.test/delivery/notifications/mark-all-read"
        );
    }

    #[test]
    fn resolve_handles_leading_slash_and_absolute_urls() {
        let api = api("http://shop.test/app/", Role::Customer);
        assert_eq!(
            api.resolve("/static/sounds/user-notification.mp3").unwrap().as_str(),
            "http://shop.test/app/static/sounds/user-notification.mp3"
        );
        assert_eq!(
            api.resolve("https://cdn.test/a.mp3").unwrap().as_str(),
            "https://cdn.test/a.mp3"
        );
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let result = NotificationApi::new(Client::new(), "not a url", Role::Customer);
        assert!(matches!(result, Err(ApiError::InvalidUrl { .. })));
    }

    #[test]
    fn bulk_body_matches_the_admin_endpoint() {
        let ids = [NotificationId::from(3), NotificationId::from("12")];
        let body = BulkActionBody {
            action: BulkAction::MarkRead,
            notification_ids: &ids,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"action": "mark_read", "notification_ids": ["3", "12"]})
        );
    }

    #[test]
    fn user_message_prefers_server_reason() {
        let rejected = ApiError::Rejected(Some("Notification not found".to_string()));
        assert_eq!(rejected.user_message("fallback"), "Notification not found");
        assert_eq!(ApiError::Rejected(None).user_message("fallback"), "fallback");
        assert_eq!(
            ApiError::Status(StatusCode::FORBIDDEN).user_message("fallback"),
            "fallback"
        );
    }
}
