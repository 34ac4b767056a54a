use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::constants::{UNKNOWN_OWNER, USER_AGENT, VK_API_VERSION};
use crate::vk::models::{Envelope, GroupsResponse, Post, UserName, WallResponse};

#[derive(Debug, Error)]
pub enum VkError {
    #[error("VK request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("VK response for {0} had neither response nor error")]
    EmptyResponse(&'static str),
    #[error("owner {0} not found")]
    OwnerNotFound(i64),
}

/// Source of wall posts.
#[async_trait]
pub trait WallSource: Send + Sync {
    /// Fetch the latest `count` posts, most recent first.
    async fn fetch_posts(&self, count: u32) -> Result<Vec<Post>, VkError>;

    /// Fetch specific posts by `owner_post` id.
    async fn fetch_posts_by_ids(&self, ids: &[String]) -> Result<Vec<Post>, VkError>;
}

/// Resolves owner ids to display names.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    /// Display name for `owner_id`; never fails, falling back to a placeholder.
    async fn owner_name(&self, owner_id: i64) -> String;
}

/// Client for the subset of the VK API used to read a wall.
#[derive(Clone)]
pub struct VkClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    domain: String,
}

impl VkClient {
    /// Create a new VK client from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_url: config.vk_api_url.clone(),
            token: config.vk_token.clone(),
            domain: config.domain.clone(),
        }
    }

    /// Call a VK method and unwrap its `response` envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: &[(&str, String)],
    ) -> Result<T, VkError> {
        let url = format!("{}/method/{method}", self.api_url);
        debug!(method, "Calling VK API");

        let envelope: Envelope<T> = self
            .http
            .get(&url)
            .query(&[("access_token", self.token.as_str()), ("v", VK_API_VERSION)])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (envelope.response, envelope.error) {
            (Some(response), _) => Ok(response),
            (None, Some(error)) => Err(VkError::Api {
                code: error.error_code,
                message: error.error_msg,
            }),
            (None, None) => Err(VkError::EmptyResponse(method)),
        }
    }

    /// Resolve a user (`owner_id > 0`) or group (`owner_id < 0`) name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the owner does not exist.
    pub async fn fetch_owner_name(&self, owner_id: i64) -> Result<String, VkError> {
        if owner_id > 0 {
            let users: Vec<UserName> = self
                .call(
                    "users.get",
                    &[
                        ("user_ids", owner_id.to_string()),
                        ("fields", "first_name,last_name".to_string()),
                    ],
                )
                .await?;
            users
                .into_iter()
                .next()
                .map(|u| format!("{} {}", u.first_name, u.last_name))
                .ok_or(VkError::OwnerNotFound(owner_id))
        } else {
            let groups: GroupsResponse = self
                .call("groups.getById", &[("group_id", (-owner_id).to_string())])
                .await?;
            groups
                .into_first()
                .map(|g| g.name)
                .ok_or(VkError::OwnerNotFound(owner_id))
        }
    }
}

#[async_trait]
impl WallSource for VkClient {
    async fn fetch_posts(&self, count: u32) -> Result<Vec<Post>, VkError> {
        let wall: WallResponse = self
            .call(
                "wall.get",
                &[
                    ("domain", self.domain.clone()),
                    ("extended", "1".to_string()),
                    ("count", count.to_string()),
                ],
            )
            .await?;
        Ok(wall.items)
    }

    async fn fetch_posts_by_ids(&self, ids: &[String]) -> Result<Vec<Post>, VkError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let wall: WallResponse = self
            .call(
                "wall.getById",
                &[("posts", ids.join(",")), ("extended", "1".to_string())],
            )
            .await?;
        Ok(wall.items)
    }
}

#[async_trait]
impl OwnerDirectory for VkClient {
    async fn owner_name(&self, owner_id: i64) -> String {
        match self.fetch_owner_name(owner_id).await {
            Ok(name) => name,
            Err(e) => {
                warn!(owner_id, error = %e, "Failed to resolve owner name");
                UNKNOWN_OWNER.to_string()
            }
        }
    }
}
