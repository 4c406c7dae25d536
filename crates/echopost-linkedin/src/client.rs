//! LinkedIn REST client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::PublishError;

/// Default LinkedIn API base URL.
const DEFAULT_API_URL: &str = "https://api.linkedin.com";

/// Restli protocol version header required by the UGC endpoints.
const RESTLI_VERSION: &str = "2.0.0";

/// A platform identity resolved from an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// LinkedIn member id (the OIDC `sub` claim).
    pub member_id: String,
}

/// Result of a successful content submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    /// Share URN assigned by LinkedIn, when the response carried one.
    pub post_id: Option<String>,
}

/// The two-step publish contract the scheduler engine depends on.
#[async_trait]
pub trait PublishClient: Send + Sync {
    /// Resolve an access token to the member identity it belongs to.
    async fn fetch_identity(&self, access_token: &str) -> Result<Identity, PublishError>;

    /// Publish `text` as a public share authored by `member_id`.
    async fn submit_content(
        &self,
        access_token: &str,
        member_id: &str,
        text: &str,
    ) -> Result<PublishedPost, PublishError>;
}

/// Client for the LinkedIn REST API.
pub struct LinkedInClient {
    http: Client,
    api_url: String,
}

impl LinkedInClient {
    /// Create a client against the production API.
    pub fn new() -> Self {
        Self::with_api_url(DEFAULT_API_URL)
    }

    /// Create a client against a custom base URL (used by tests).
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_url: api_url.into(),
        }
    }

    async fn check(response: Response) -> Result<Response, PublishError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PublishError::RateLimited);
        }

        let message = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PublishError::Auth(message));
        }

        Err(PublishError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl Default for LinkedInClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PublishClient for LinkedInClient {
    async fn fetch_identity(&self, access_token: &str) -> Result<Identity, PublishError> {
        #[derive(Deserialize)]
        struct UserInfo {
            sub: String,
        }

        let url = format!("{}/v2/userinfo", self.api_url);
        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {access_token}"))
            .header("X-Restli-Protocol-Version", RESTLI_VERSION)
            .send()
            .await?;

        let info: UserInfo = Self::check(response).await?.json().await?;
        debug!(member_id = %info.sub, "resolved linkedin identity");

        Ok(Identity {
            member_id: info.sub,
        })
    }

    async fn submit_content(
        &self,
        access_token: &str,
        member_id: &str,
        text: &str,
    ) -> Result<PublishedPost, PublishError> {
        #[derive(Deserialize)]
        struct UgcResponse {
            #[serde(default)]
            id: Option<String>,
        }

        let body = json!({
            "author": format!("urn:li:person:{member_id}"),
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": text },
                    "shareMediaCategory": "NONE"
                }
            },
            "visibility": {
                "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
            }
        });

        let url = format!("{}/v2/ugcPosts", self.api_url);
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {access_token}"))
            .header("X-Restli-Protocol-Version", RESTLI_VERSION)
            .json(&body)
            .send()
            .await?;

        let ugc: UgcResponse = Self::check(response).await?.json().await?;
        info!(post_id = ?ugc.id, "published linkedin share");

        Ok(PublishedPost { post_id: ugc.id })
    }
}
