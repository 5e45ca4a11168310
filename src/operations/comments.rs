use crate::client::{VkClient, VkClientError};
use crate::models::{UserRecord, WallComment};
use log::{error, warn};
use std::collections::HashMap;
use std::time::Duration;

/// Maximum number of comments `wall.getComments` returns per request.
pub const COMMENT_PAGE_SIZE: usize = 100;

/// Pause between comment requests, to stay under the VK rate limit.
pub const COMMENT_REQUEST_PAUSE: Duration = Duration::from_millis(350);

/// One spreadsheet row: a comment together with its resolved author.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub text: String,
}

/// Build an export row for a comment, or drop it when the author could not
/// be resolved. Only the single comment is lost, never the rest of the post.
pub fn row_for_comment(comment: &WallComment, user: Option<&UserRecord>) -> Option<CommentRow> {
    user.map(|user| CommentRow {
        user_id: comment.from_id,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        text: comment.text.clone(),
    })
}

/// Per-run cache of successful `users.get` lookups.
///
/// An author commenting on many posts costs one request. Failed lookups are
/// not cached, so a transient failure gets retried the next time the author
/// appears.
#[derive(Default)]
pub struct NameCache {
    names: HashMap<i64, UserRecord>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an author's name, consulting the cache first.
    ///
    /// Returns `None` when the lookup fails or VK has no record for the ID;
    /// both cases are logged by the caller.
    pub async fn resolve(&mut self, client: &VkClient, user_id: i64) -> Option<UserRecord> {
        if let Some(user) = self.names.get(&user_id) {
            return Some(user.clone());
        }

        match client.fetch_user(user_id).await {
            Ok(Some(user)) => {
                self.names.insert(user_id, user.clone());
                Some(user)
            }
            Ok(None) => None,
            Err(err) => {
                error!("Error occurred while fetching user info: {}", err);
                None
            }
        }
    }
}

/// Accumulates a post's comments across offset-paginated pages.
///
/// The response's advertised total drives termination, with one guard: a
/// page that comes back empty also ends the loop, since deleted comments
/// make the total overshoot what the API actually returns.
#[derive(Default)]
pub struct CommentPager {
    offset: i64,
    comments: Vec<WallComment>,
}

impl CommentPager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one comment page and the total the response advertised.
    ///
    /// Returns `false` when pagination should stop: the offset has reached
    /// the total, or the page was empty.
    pub fn push_page(&mut self, items: Vec<WallComment>, total: i64) -> bool {
        let fetched = items.len();
        self.offset += fetched as i64;
        self.comments.extend(items);

        fetched != 0 && self.offset < total
    }

    /// Offset to request the next page at.
    pub fn next_offset(&self) -> i64 {
        self.offset
    }

    pub fn into_comments(self) -> Vec<WallComment> {
        self.comments
    }
}

/// Fetch every comment on a post, paginating past the first page with the
/// usual pause between pages.
async fn fetch_all_comments(
    client: &VkClient,
    owner_id: i64,
    post_id: i64,
) -> Result<Vec<WallComment>, VkClientError> {
    let mut pager = CommentPager::new();

    loop {
        let page = client
            .fetch_comment_page(owner_id, post_id, pager.next_offset(), COMMENT_PAGE_SIZE as i64)
            .await?;

        if !pager.push_page(page.items, page.count) {
            break;
        }

        tokio::time::sleep(COMMENT_REQUEST_PAUSE).await;
    }

    Ok(pager.into_comments())
}

/// Collect one `CommentRow` per comment across the given posts, in the order
/// posts were given and comments were returned by the source.
///
/// A failed comment fetch contributes zero rows for that post and processing
/// continues; a failed name lookup drops only that comment's row.
pub async fn collect_comment_rows(
    client: &VkClient,
    group_id: i64,
    post_ids: &[i64],
    cache: &mut NameCache,
) -> Vec<CommentRow> {
    let owner_id = -group_id;
    let mut rows = Vec::new();

    for &post_id in post_ids {
        match fetch_all_comments(client, owner_id, post_id).await {
            Ok(comments) => {
                if comments.is_empty() {
                    warn!("No comments found for post ID: {}", post_id);
                }

                for comment in comments {
                    let user = cache.resolve(client, comment.from_id).await;
                    match row_for_comment(&comment, user.as_ref()) {
                        Some(row) => rows.push(row),
                        None => warn!("No user info found for user ID: {}", comment.from_id),
                    }
                }
            }
            Err(err) => error!("Error occurred while fetching comments: {}", err),
        }

        tokio::time::sleep(COMMENT_REQUEST_PAUSE).await;
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: i64, from_id: i64, text: &str) -> WallComment {
        WallComment {
            id,
            from_id,
            text: text.to_string(),
        }
    }

    fn user(id: i64, first: &str, last: &str) -> UserRecord {
        UserRecord {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    fn comments(ids: std::ops::Range<i64>) -> Vec<WallComment> {
        ids.map(|id| comment(id, id + 100, "text")).collect()
    }

    #[test]
    fn exactly_one_full_page_stops_without_an_extra_fetch() {
        let mut pager = CommentPager::new();
        let keep_going = pager.push_page(comments(0..100), 100);

        assert!(!keep_going, "offset reached the total, no further request");
        assert_eq!(pager.into_comments().len(), 100);
    }

    #[test]
    fn paginates_while_the_total_is_unmet() {
        let mut pager = CommentPager::new();
        assert!(pager.push_page(comments(0..100), 250));
        assert_eq!(pager.next_offset(), 100);
        assert!(pager.push_page(comments(100..200), 250));
        assert_eq!(pager.next_offset(), 200);
        assert!(!pager.push_page(comments(200..250), 250));

        let ids: Vec<i64> = pager.into_comments().iter().map(|c| c.id).collect();
        let expected: Vec<i64> = (0..250).collect();
        assert_eq!(ids, expected, "pages accumulate in fetch order");
    }

    #[test]
    fn overshooting_total_ends_on_the_empty_page() {
        // Deleted comments: the wall advertises 150 but only 100 come back.
        let mut pager = CommentPager::new();
        assert!(pager.push_page(comments(0..100), 150));
        assert!(!pager.push_page(Vec::new(), 150), "empty page ends the loop");

        assert_eq!(pager.next_offset(), 100);
        assert_eq!(pager.into_comments().len(), 100);
    }

    #[test]
    fn short_page_under_the_total_keeps_paginating() {
        let mut pager = CommentPager::new();
        assert!(pager.push_page(comments(0..60), 90));
        assert_eq!(pager.next_offset(), 60);
        assert!(!pager.push_page(comments(60..90), 90));

        assert_eq!(pager.into_comments().len(), 90);
    }

    #[test]
    fn unresolved_author_drops_only_that_row() {
        let comments = vec![
            comment(1, 10, "first"),
            comment(2, 11, "second"),
            comment(3, 12, "third"),
        ];
        // Author 11 fails to resolve.
        let lookups = |from_id: i64| -> Option<UserRecord> {
            match from_id {
                10 => Some(user(10, "Anna", "Petrova")),
                12 => Some(user(12, "Ivan", "Sidorov")),
                _ => None,
            }
        };

        let rows: Vec<CommentRow> = comments
            .iter()
            .filter_map(|c| row_for_comment(c, lookups(c.from_id).as_ref()))
            .collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id, 10);
        assert_eq!(rows[0].text, "first");
        assert_eq!(rows[1].user_id, 12);
        assert_eq!(rows[1].text, "third");
    }

    #[test]
    fn row_carries_resolved_name_and_comment_text() {
        let c = comment(7, 42, "hello there");
        let u = user(42, "Olga", "Ivanova");

        let row = row_for_comment(&c, Some(&u)).unwrap();
        assert_eq!(
            row,
            CommentRow {
                user_id: 42,
                first_name: "Olga".to_string(),
                last_name: "Ivanova".to_string(),
                text: "hello there".to_string(),
            }
        );
    }
}
