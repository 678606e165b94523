use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::notification::{MarkAllReadResponse, NotificationListResponse};

use super::live::TokenProvider;

/// REST surface the aggregator depends on. Mirrors the server's
/// notification endpoints one to one.
#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<NotificationListResponse>;

    async fn mark_read(&self, id: Uuid) -> Result<()>;

    async fn mark_all_read(&self) -> Result<u64>;
}

pub struct RestNotificationApi {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl RestNotificationApi {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            tokens,
        }
    }

    fn bearer(&self) -> Result<String> {
        self.tokens
            .token()
            .ok_or_else(|| AppError::Unauthorized("No auth token available".to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl NotificationApi for RestNotificationApi {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<NotificationListResponse> {
        let response = self
            .client
            .get(self.url("/api/notifications"))
            .query(&[("page", page), ("limit", limit)])
            .bearer_auth(self.bearer()?)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn mark_read(&self, id: Uuid) -> Result<()> {
        self.client
            .patch(self.url(&format!("/api/notifications/{id}/read")))
            .bearer_auth(self.bearer()?)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn mark_all_read(&self) -> Result<u64> {
        let response = self
            .client
            .post(self.url("/api/notifications/read-all"))
            .bearer_auth(self.bearer()?)
            .send()
            .await?
            .error_for_status()?;

        let body: MarkAllReadResponse = response.json().await?;
        Ok(body.updated)
    }
}
