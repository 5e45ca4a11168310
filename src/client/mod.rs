use crate::models::{CommentPage, GroupRecord, UserRecord, VkEnvelope, WallPage};
use log::debug;
use reqwest::{Client, Error as ReqwestError};
use serde::de::DeserializeOwned;
use std::fmt;

/// Base URL for all VK API method calls.
pub const API_BASE_URL: &str = "https://api.vk.com/method";

/// Protocol version sent with every request.
pub const DEFAULT_API_VERSION: &str = "5.131";

// Define a custom error type for handling VK API errors
#[derive(Debug)]
pub enum VkClientError {
    RequestError(ReqwestError),
    ApiError(String),
    ParseError(serde_json::Error),
}

impl fmt::Display for VkClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VkClientError::RequestError(err) => write!(f, "Request error: {}", err),
            VkClientError::ApiError(msg) => write!(f, "VK API error: {}", msg),
            VkClientError::ParseError(err) => write!(f, "Parse error: {}", err),
        }
    }
}

impl std::error::Error for VkClientError {}

impl From<ReqwestError> for VkClientError {
    fn from(err: ReqwestError) -> Self {
        VkClientError::RequestError(err)
    }
}

impl From<serde_json::Error> for VkClientError {
    fn from(err: serde_json::Error) -> Self {
        VkClientError::ParseError(err)
    }
}

/// Truncate a response body for debug logging. Char-based, so a multi-byte
/// character (VK error pages are mostly Cyrillic) is never split.
fn body_excerpt(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

#[derive(Clone)]
pub struct VkClient {
    pub client: Client,
    pub access_token: String,
    pub api_version: String,
}

impl VkClient {
    pub fn new(access_token: String) -> Self {
        Self::with_api_version(access_token, DEFAULT_API_VERSION.to_string())
    }

    pub fn with_api_version(access_token: String, api_version: String) -> Self {
        Self {
            client: Client::new(),
            access_token,
            api_version,
        }
    }

    /// Call a VK API method and unwrap its response envelope.
    ///
    /// The access token and protocol version are appended to every request.
    /// An HTTP error status, a VK `error` object, or a missing `response`
    /// field all surface as `ApiError`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, VkClientError> {
        let url = format!("{}/{}", API_BASE_URL, method);
        debug!("Calling VK method: {}", method);

        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("access_token", self.access_token.clone()));
        query.push(("v", self.api_version.clone()));

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(VkClientError::ApiError(format!(
                "Server returned error status: {}",
                status
            )));
        }

        let body = response.text().await?;
        debug!("Response body length: {} bytes", body.len());

        let envelope = match serde_json::from_str::<VkEnvelope<T>>(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!("Error parsing {} response: {}", method, e);
                debug!("First 100 chars: {}", body_excerpt(&body, 100));
                return Err(VkClientError::ParseError(e));
            }
        };

        if let Some(err) = envelope.error {
            return Err(VkClientError::ApiError(format!(
                "{} (code {})",
                err.error_msg, err.error_code
            )));
        }

        envelope.response.ok_or_else(|| {
            VkClientError::ApiError(format!("Method {} returned no 'response' field", method))
        })
    }

    /// Resolve a community's domain name to its numeric ID via `groups.getById`.
    pub async fn fetch_group_id(&self, group_domain: &str) -> Result<i64, VkClientError> {
        let groups: Vec<GroupRecord> = self
            .call("groups.getById", &[("group_id", group_domain.to_string())])
            .await?;

        match groups.first() {
            Some(group) => {
                debug!(
                    "Resolved group '{}' ({}) to ID {}",
                    group.screen_name, group.name, group.id
                );
                Ok(group.id)
            }
            None => Err(VkClientError::ApiError(format!(
                "No group found for domain '{}'",
                group_domain
            ))),
        }
    }

    /// Fetch one page of a community wall via `wall.get`.
    ///
    /// `owner_id` follows the VK convention: negative for a community wall.
    pub async fn fetch_wall_page(
        &self,
        owner_id: i64,
        offset: i64,
        count: i64,
    ) -> Result<WallPage, VkClientError> {
        self.call(
            "wall.get",
            &[
                ("owner_id", owner_id.to_string()),
                ("offset", offset.to_string()),
                ("count", count.to_string()),
            ],
        )
        .await
    }

    /// Fetch one page of a post's comments via `wall.getComments`.
    pub async fn fetch_comment_page(
        &self,
        owner_id: i64,
        post_id: i64,
        offset: i64,
        count: i64,
    ) -> Result<CommentPage, VkClientError> {
        self.call(
            "wall.getComments",
            &[
                ("owner_id", owner_id.to_string()),
                ("post_id", post_id.to_string()),
                ("offset", offset.to_string()),
                ("count", count.to_string()),
            ],
        )
        .await
    }

    /// Look up a user's first and last name via `users.get`.
    ///
    /// Returns `Ok(None)` when VK answers with an empty user list, which
    /// happens for deactivated accounts and for community authors.
    pub async fn fetch_user(&self, user_id: i64) -> Result<Option<UserRecord>, VkClientError> {
        let users: Vec<UserRecord> = self
            .call(
                "users.get",
                &[
                    ("user_ids", user_id.to_string()),
                    ("fields", "first_name,last_name".to_string()),
                ],
            )
            .await?;

        Ok(users.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_excerpt_respects_char_boundaries() {
        let body = "Ошибка: доступ к стене запрещён. ".repeat(10);
        let excerpt = body_excerpt(&body, 100);

        assert_eq!(excerpt.chars().count(), 100);
        assert!(body.starts_with(&excerpt));
    }

    #[test]
    fn body_excerpt_keeps_short_bodies_whole() {
        assert_eq!(body_excerpt("{}", 100), "{}");
    }
}
