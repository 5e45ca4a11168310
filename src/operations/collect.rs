use crate::client::VkClient;
use crate::models::WallPost;
use log::{error, info, warn};
use std::time::Duration;

/// Maximum number of posts `wall.get` returns per request.
pub const WALL_PAGE_SIZE: usize = 100;

/// Pause between wall pages, to stay under the VK rate limit.
pub const WALL_PAGE_PAUSE: Duration = Duration::from_secs(1);

/// Accumulates posts with at least one comment across raw wall pages.
///
/// The accumulator is fed whole pages as returned by the API and keeps the
/// pagination bookkeeping honest: the offset advances by the raw page size,
/// never by the number of posts that survived the comment filter, so a page
/// full of uncommented posts still moves the window forward.
pub struct PostAccumulator {
    target: usize,
    offset: usize,
    posts: Vec<WallPost>,
}

impl PostAccumulator {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            offset: 0,
            posts: Vec::new(),
        }
    }

    /// Feed one raw wall page into the accumulator.
    ///
    /// Returns `false` when collection should stop: either the target count
    /// has been reached or the page was empty (the wall is exhausted).
    pub fn push_page(&mut self, items: Vec<WallPost>) -> bool {
        if items.is_empty() {
            return false;
        }

        self.offset += items.len();

        for post in items {
            if post.comments.count > 0 {
                self.posts.push(post);
                if self.posts.len() == self.target {
                    return false;
                }
            }
        }

        true
    }

    /// Offset to request the next page at.
    pub fn next_offset(&self) -> usize {
        self.offset
    }

    /// How many more posts are needed to reach the target.
    pub fn remaining(&self) -> usize {
        self.target - self.posts.len()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn is_satisfied(&self) -> bool {
        self.posts.len() == self.target
    }

    pub fn into_posts(self) -> Vec<WallPost> {
        self.posts
    }
}

/// Collect up to `target` posts that have at least one comment from a
/// community wall, preserving the newest-first order the API returns.
///
/// A transport or decode failure ends collection early with whatever has
/// been gathered so far; a shortfall against `target` is logged as a
/// warning, not treated as an error.
pub async fn collect_posts_with_comments(
    client: &VkClient,
    group_id: i64,
    target: usize,
) -> Vec<WallPost> {
    // Community walls are addressed with a negated ID.
    let owner_id = -group_id;
    let mut accumulator = PostAccumulator::new(target);

    while accumulator.remaining() > 0 {
        let request_count = accumulator.remaining().min(WALL_PAGE_SIZE);

        let page = match client
            .fetch_wall_page(owner_id, accumulator.next_offset() as i64, request_count as i64)
            .await
        {
            Ok(page) => page,
            Err(err) => {
                error!("Error occurred while fetching posts: {}", err);
                break;
            }
        };

        if !accumulator.push_page(page.items) {
            break;
        }

        info!(
            "Processed {} posts with comments. {} remaining.",
            accumulator.len(),
            accumulator.remaining()
        );

        tokio::time::sleep(WALL_PAGE_PAUSE).await;
    }

    if !accumulator.is_satisfied() {
        warn!(
            "Wall exhausted with {} of {} requested posts collected.",
            accumulator.len(),
            target
        );
    }

    accumulator.into_posts()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommentInfo;

    fn post(id: i64, comment_count: i64) -> WallPost {
        WallPost {
            id,
            comments: CommentInfo {
                count: comment_count,
            },
        }
    }

    #[test]
    fn retains_only_commented_posts_up_to_target() {
        let mut acc = PostAccumulator::new(3);
        let keep_going = acc.push_page(vec![
            post(1, 2),
            post(2, 0),
            post(3, 1),
            post(4, 0),
            post(5, 7),
        ]);

        assert!(!keep_going, "target reached, collection should stop");
        assert!(acc.is_satisfied());

        let posts = acc.into_posts();
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 5], "source order must be preserved");
        assert!(posts.iter().all(|p| p.comments.count > 0));
    }

    #[test]
    fn offset_advances_by_raw_page_size_not_filtered_count() {
        let mut acc = PostAccumulator::new(10);
        acc.push_page(vec![post(1, 0), post(2, 1), post(3, 0)]);

        assert_eq!(acc.next_offset(), 3);
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.remaining(), 9);
    }

    #[test]
    fn empty_page_signals_exhaustion_with_partial_result() {
        let mut acc = PostAccumulator::new(5);
        assert!(acc.push_page(vec![post(1, 1), post(2, 3)]));
        assert!(!acc.push_page(Vec::new()), "empty page ends collection");

        assert!(!acc.is_satisfied());
        assert_eq!(acc.into_posts().len(), 2);
    }

    #[test]
    fn never_exceeds_target_mid_page() {
        let mut acc = PostAccumulator::new(2);
        let keep_going = acc.push_page(vec![post(1, 1), post(2, 1), post(3, 1), post(4, 1)]);

        assert!(!keep_going);
        let posts = acc.into_posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, 1);
        assert_eq!(posts[1].id, 2);
    }

    #[test]
    fn collects_across_pages() {
        let mut acc = PostAccumulator::new(3);
        assert!(acc.push_page(vec![post(1, 0), post(2, 4)]));
        assert_eq!(acc.next_offset(), 2);
        assert!(acc.push_page(vec![post(3, 1), post(4, 0)]));
        assert_eq!(acc.next_offset(), 4);
        assert!(!acc.push_page(vec![post(5, 2), post(6, 9)]));

        let ids: Vec<i64> = acc.into_posts().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3, 5]);
    }
}
