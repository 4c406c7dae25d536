//! Supabase (PostgREST) implementation of the store contract.
//!
//! The scheduler runs as a background task with no user session attached,
//! so this client authenticates every request with the service-role key it
//! was constructed with. Handing the engine this privileged handle
//! explicitly, instead of reaching for an ambient session token, is what
//! lets publishing work while nobody is logged in.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
    Credential, HistoricalPost, NewScheduledPost, PostStore, ScheduledPost, StatusChange,
    StoreError,
};

/// PostgREST-backed post store.
pub struct SupabaseStore {
    http: Client,
    base_url: String,
    service_role_key: String,
}

impl SupabaseStore {
    /// Create a store client for the given Supabase project URL.
    pub fn new(base_url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into(),
            service_role_key: service_role_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", self.service_role_key.as_str())
            .header(
                "Authorization",
                format!("Bearer {}", self.service_role_key),
            )
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// PATCH rows matching `filters`, returning whether any row matched.
    async fn patch_rows(
        &self,
        table: &str,
        filters: &[(&str, String)],
        body: serde_json::Value,
    ) -> Result<bool, StoreError> {
        let response = self
            .authed(self.http.patch(self.table_url(table)))
            .query(filters)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        let rows: Vec<serde_json::Value> = Self::check(response).await?.json().await?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl PostStore for SupabaseStore {
    async fn create_post(&self, post: NewScheduledPost) -> Result<ScheduledPost, StoreError> {
        let body = json!({
            "user_id": post.user_id,
            "content": post.content,
            "topic": post.topic,
            "tags": post.tags,
            "scheduled_time": post.scheduled_time,
            "timezone": post.timezone,
            "status": "pending",
        });

        let response = self
            .authed(self.http.post(self.table_url("scheduled_posts")))
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        let mut rows: Vec<ScheduledPost> = Self::check(response).await?.json().await?;
        rows.pop()
            .ok_or_else(|| StoreError::UnexpectedResponse("insert returned no rows".to_string()))
    }

    async fn list_due_posts(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledPost>, StoreError> {
        let response = self
            .authed(self.http.get(self.table_url("scheduled_posts")))
            .query(&[
                ("select", "*".to_string()),
                ("status", "eq.pending".to_string()),
                ("scheduled_time", format!("lte.{}", now.to_rfc3339())),
            ])
            .send()
            .await?;

        let posts: Vec<ScheduledPost> = Self::check(response).await?.json().await?;
        debug!(count = posts.len(), "fetched due posts");
        Ok(posts)
    }

    async fn update_status(&self, id: &str, change: StatusChange) -> Result<bool, StoreError> {
        match change {
            StatusChange::Published {
                published_at,
                linkedin_post_id,
            } => {
                // Conditional on pending so a cancel that raced us wins.
                self.patch_rows(
                    "scheduled_posts",
                    &[
                        ("id", format!("eq.{id}")),
                        ("status", "eq.pending".to_string()),
                    ],
                    json!({
                        "status": "published",
                        "published_at": published_at,
                        "linkedin_post_id": linkedin_post_id,
                    }),
                )
                .await
            }
            StatusChange::Failed { error_message } => {
                // PostgREST has no atomic increment; read-then-write is
                // safe under the single-writer polling model.
                #[derive(Deserialize)]
                struct RetryRow {
                    #[serde(default)]
                    retry_count: u32,
                }

                let response = self
                    .authed(self.http.get(self.table_url("scheduled_posts")))
                    .query(&[
                        ("select", "retry_count".to_string()),
                        ("id", format!("eq.{id}")),
                    ])
                    .send()
                    .await?;
                let rows: Vec<RetryRow> = Self::check(response).await?.json().await?;
                let Some(row) = rows.first() else {
                    return Ok(false);
                };

                self.patch_rows(
                    "scheduled_posts",
                    &[
                        ("id", format!("eq.{id}")),
                        ("status", "eq.pending".to_string()),
                    ],
                    json!({
                        "status": "failed",
                        "error_message": error_message,
                        "retry_count": row.retry_count + 1,
                    }),
                )
                .await
            }
            StatusChange::Cancelled => {
                self.patch_rows(
                    "scheduled_posts",
                    &[
                        ("id", format!("eq.{id}")),
                        ("status", "in.(pending,failed)".to_string()),
                    ],
                    json!({ "status": "cancelled" }),
                )
                .await
            }
            StatusChange::Rescheduled {
                scheduled_time,
                timezone,
                reset_retries,
            } => {
                let mut body = json!({
                    "status": "pending",
                    "scheduled_time": scheduled_time,
                    "error_message": null,
                });
                if let Some(tz) = timezone {
                    body["timezone"] = json!(tz);
                }
                if reset_retries {
                    body["retry_count"] = json!(0);
                }

                self.patch_rows(
                    "scheduled_posts",
                    &[
                        ("id", format!("eq.{id}")),
                        ("status", "in.(pending,failed)".to_string()),
                    ],
                    body,
                )
                .await
            }
        }
    }

    async fn get_credential(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Option<Credential>, StoreError> {
        let response = self
            .authed(self.http.get(self.table_url("user_connections")))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("provider", format!("eq.{provider}")),
            ])
            .send()
            .await?;

        let mut rows: Vec<Credential> = Self::check(response).await?.json().await?;
        Ok(rows.pop())
    }

    async fn count_pending(&self) -> Result<u64, StoreError> {
        #[derive(Deserialize)]
        struct IdRow {
            #[allow(dead_code)]
            id: String,
        }

        let response = self
            .authed(self.http.get(self.table_url("scheduled_posts")))
            .query(&[
                ("select", "id".to_string()),
                ("status", "eq.pending".to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<IdRow> = Self::check(response).await?.json().await?;
        Ok(rows.len() as u64)
    }

    async fn recent_failures(&self, limit: u32) -> Result<Vec<ScheduledPost>, StoreError> {
        let response = self
            .authed(self.http.get(self.table_url("scheduled_posts")))
            .query(&[
                ("select", "*".to_string()),
                ("status", "eq.failed".to_string()),
                ("order", "scheduled_time.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        Self::check(response).await?.json().await.map_err(Into::into)
    }

    async fn list_historical_posts(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<HistoricalPost>, StoreError> {
        let response = self
            .authed(self.http.get(self.table_url("posts")))
            .query(&[
                ("select", "created_at,word_count".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        Self::check(response).await?.json().await.map_err(Into::into)
    }
}
