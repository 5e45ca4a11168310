//! Response models for the VK API methods this crate consumes.
//!
//! Every VK method wraps its payload in a top-level envelope that carries
//! either a `response` field or an `error` object, never both. The payload
//! shapes below keep only the fields the pipeline actually reads; VK returns
//! many more, which serde ignores.

use serde::Deserialize;

/// Top-level envelope returned by every VK API method.
#[derive(Deserialize)]
pub struct VkEnvelope<T> {
    pub response: Option<T>,
    pub error: Option<VkApiError>,
}

/// Error object VK returns in place of a `response`.
#[derive(Debug, Deserialize)]
pub struct VkApiError {
    pub error_code: i64,
    pub error_msg: String,
}

/// One community record from `groups.getById`.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub screen_name: String,
}

/// One page of a community wall from `wall.get`.
#[derive(Debug, Deserialize)]
pub struct WallPage {
    /// Total number of posts on the wall, not the page size.
    pub count: i64,
    pub items: Vec<WallPost>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WallPost {
    pub id: i64,
    #[serde(default)]
    pub comments: CommentInfo,
}

/// Comment counter attached to a wall post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentInfo {
    #[serde(default)]
    pub count: i64,
}

/// One page of a post's comments from `wall.getComments`.
#[derive(Debug, Deserialize)]
pub struct CommentPage {
    /// Total number of comments on the post, not the page size.
    pub count: i64,
    pub items: Vec<WallComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WallComment {
    pub id: i64,
    pub from_id: i64,
    #[serde(default)]
    pub text: String,
}

/// One user record from `users.get`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}
