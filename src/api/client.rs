//! Authenticated REST client for the marketplace API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::DealApi;
use super::dto::{ApiErrorBody, StatusUpdateRequest};
use crate::domain::{
    AuthToken, Deal, DealId, DealStatus, Document, DocumentId, Message, Notification,
    NotificationId, PriceHistoryEntry, User,
};
use crate::error::ClientError;

/// `reqwest`-backed implementation of [`DealApi`].
///
/// Every request carries `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:5000`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `base_url` is not a valid base
    /// URL and [`ClientError::Request`] if the HTTP client cannot be built.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| ClientError::Config(format!("invalid API_URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!("invalid API_URL: {base_url}")));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// Direct download link for a document, carrying the token as a query
    /// parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL cannot carry a path.
    pub fn document_download_url(
        &self,
        token: &AuthToken,
        deal_id: &DealId,
        document_id: &DocumentId,
    ) -> Result<String, ClientError> {
        let mut url = self.endpoint(&[
            "api",
            "deals",
            deal_id.as_str(),
            "documents",
            document_id.as_str(),
            "download",
        ])?;
        url.query_pairs_mut().append_pair("token", token.expose());
        Ok(url.into())
    }

    /// Joins `segments` onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Config(format!("invalid API_URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        token: &AuthToken,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        Ok(self
            .http
            .request(method, self.endpoint(segments)?)
            .bearer_auth(token.expose()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AuthToken,
        segments: &[&str],
    ) -> Result<T, ClientError> {
        let response = check(self.request(Method::GET, token, segments)?.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn put_empty(
        &self,
        token: &AuthToken,
        segments: &[&str],
        body: &serde_json::Value,
    ) -> Result<(), ClientError> {
        check(
            self.request(Method::PUT, token, segments)?
                .json(body)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }
}

/// Maps non-success responses to [`ClientError`].
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::AuthRejected);
    }
    let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
    Err(ClientError::Http {
        status: status.as_u16(),
        message: body.message,
    })
}

#[async_trait]
impl DealApi for ApiClient {
    async fn me(&self, token: &AuthToken) -> Result<User, ClientError> {
        self.get_json(token, &["api", "auth", "me"]).await
    }

    async fn deal(&self, token: &AuthToken, deal_id: &DealId) -> Result<Deal, ClientError> {
        self.get_json(token, &["api", "deals", deal_id.as_str()])
            .await
    }

    async fn messages(
        &self,
        token: &AuthToken,
        deal_id: &DealId,
    ) -> Result<Vec<Message>, ClientError> {
        self.get_json(token, &["api", "deals", deal_id.as_str(), "messages"])
            .await
    }

    async fn documents(
        &self,
        token: &AuthToken,
        deal_id: &DealId,
    ) -> Result<Vec<Document>, ClientError> {
        self.get_json(token, &["api", "deals", deal_id.as_str(), "documents"])
            .await
    }

    async fn price_history(
        &self,
        token: &AuthToken,
        deal_id: &DealId,
    ) -> Result<Vec<PriceHistoryEntry>, ClientError> {
        self.get_json(token, &["api", "deals", deal_id.as_str(), "price-history"])
            .await
    }

    async fn update_status(
        &self,
        token: &AuthToken,
        deal_id: &DealId,
        status: DealStatus,
    ) -> Result<(), ClientError> {
        let body = serde_json::to_value(StatusUpdateRequest { status })?;
        self.put_empty(token, &["api", "deals", deal_id.as_str(), "status"], &body)
            .await
    }

    async fn delete_document(
        &self,
        token: &AuthToken,
        deal_id: &DealId,
        document_id: &DocumentId,
    ) -> Result<(), ClientError> {
        let segments = [
            "api",
            "deals",
            deal_id.as_str(),
            "documents",
            document_id.as_str(),
        ];
        check(self.request(Method::DELETE, token, &segments)?.send().await?).await?;
        Ok(())
    }

    async fn notifications(&self, token: &AuthToken) -> Result<Vec<Notification>, ClientError> {
        self.get_json(token, &["api", "notifications"]).await
    }

    async fn mark_notification_read(
        &self,
        token: &AuthToken,
        id: &NotificationId,
    ) -> Result<(), ClientError> {
        self.put_empty(
            token,
            &["api", "notifications", id.as_str(), "read"],
            &serde_json::json!({}),
        )
        .await
    }

    async fn mark_all_notifications_read(&self, token: &AuthToken) -> Result<(), ClientError> {
        self.put_empty(token, &["api", "notifications", "read-all"], &serde_json::json!({}))
            .await
    }
}
