// src/services/feed.rs

//! Announcement feed menu source.
//!
//! Retrieves the shop's recent posts, picks the one announcing today's
//! menu, and runs the extractor on its text. Post selection prefers a
//! same-day post containing the "today" marker; when none exists it falls
//! back to the newest post of any date. That fallback can surface a stale
//! menu as if current (see DESIGN.md) and is logged as a warning.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::FetchError;
use crate::models::{FeedConfig, MenuOrigin, MenuSnapshot};
use crate::services::{MenuExtractor, MenuSource};
use crate::utils::{local_date_string, today_string};

/// Feed-backed menu source. Second priority; composes the extractor.
pub struct FeedSource {
    client: Client,
    config: FeedConfig,
    bearer_token: String,
    utc_offset_hours: i32,
    extractor: MenuExtractor,
}

/// One post from the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct UserResponse {
    data: UserData,
}

#[derive(Deserialize)]
struct UserData {
    id: String,
}

#[derive(Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    data: Vec<Post>,
}

impl FeedSource {
    pub fn new(
        client: Client,
        config: FeedConfig,
        bearer_token: String,
        utc_offset_hours: i32,
        extractor: MenuExtractor,
    ) -> Self {
        Self {
            client,
            config,
            bearer_token,
            utc_offset_hours,
            extractor,
        }
    }

    /// Fetch the account's recent posts, newest first.
    async fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        let user: UserResponse = self
            .client
            .get(format!(
                "{}/users/by/username/{}",
                self.config.api_base, self.config.username
            ))
            .bearer_auth(&self.bearer_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let timeline: TimelineResponse = self
            .client
            .get(format!(
                "{}/users/{}/tweets",
                self.config.api_base, user.data.id
            ))
            .query(&[
                ("max_results", self.config.max_results.to_string()),
                ("exclude", "retweets,replies".to_string()),
                ("tweet.fields", "created_at".to_string()),
            ])
            .bearer_auth(&self.bearer_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(timeline.data)
    }
}

#[async_trait]
impl MenuSource for FeedSource {
    fn name(&self) -> &'static str {
        "feed"
    }

    fn origin(&self) -> MenuOrigin {
        MenuOrigin::AnnouncementExtracted
    }

    async fn fetch(&self) -> Result<MenuSnapshot, FetchError> {
        let posts = self.fetch_posts().await?;
        let today = today_string(Utc::now(), self.utc_offset_hours);

        let (post, same_day) = select_post(
            &posts,
            &today,
            &self.config.today_marker,
            self.utc_offset_hours,
        )
        .ok_or_else(|| FetchError::NoPosts {
            username: self.config.username.clone(),
        })?;

        if !same_day {
            log::warn!(
                "No same-day post with marker '{}'; using newest post from {:?} (may be stale)",
                self.config.today_marker,
                post.created_at
            );
        }

        let snapshot = self.extractor.extract(&post.text, post.created_at).await?;
        Ok(snapshot)
    }
}

/// Pick the post to extract from.
///
/// Returns the first same-day post whose text contains the marker, or the
/// newest post of any date as a fallback. The bool reports which branch
/// was taken.
pub fn select_post<'a>(
    posts: &'a [Post],
    today: &str,
    marker: &str,
    utc_offset_hours: i32,
) -> Option<(&'a Post, bool)> {
    for post in posts {
        let same_day = post
            .created_at
            .map(|at| local_date_string(at, utc_offset_hours) == today)
            .unwrap_or(false);
        if same_day && post.text.contains(marker) {
            return Some((post, true));
        }
    }
    posts.first().map(|post| (post, false))
}
