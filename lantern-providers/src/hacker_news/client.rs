//! Hacker News Firebase REST client

use std::time::Duration;

use async_trait::async_trait;
use lantern_core::{Item, ItemId, LanternResult, StoryApi};
use tracing::debug;

use super::types::RawItem;
use crate::http::JsonClient;

/// Public Firebase endpoint of the Hacker News API.
pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// `topstories.json` never lists more than this many ids.
pub const MAX_TOP_STORIES: usize = 500;

/// Story API backed by the Hacker News REST endpoints.
#[derive(Debug, Clone)]
pub struct HackerNewsClient {
    http: JsonClient,
    max_top_stories: usize,
}

impl HackerNewsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> LanternResult<Self> {
        Ok(Self {
            http: JsonClient::new(base_url, timeout)?,
            max_top_stories: MAX_TOP_STORIES,
        })
    }

    /// Client for the public endpoint.
    pub fn public(timeout: Duration) -> LanternResult<Self> {
        Self::new(DEFAULT_BASE_URL, timeout)
    }

    /// Truncate the top-id list to `max` entries.
    pub fn with_max_top_stories(mut self, max: usize) -> Self {
        self.max_top_stories = max;
        self
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl StoryApi for HackerNewsClient {
    async fn list_top_ids(&self) -> LanternResult<Vec<ItemId>> {
        let ids: Vec<u64> = self.http.get_json("topstories.json", &[]).await?;
        debug!(count = ids.len(), "top stories listed");
        Ok(ids
            .into_iter()
            .take(self.max_top_stories)
            .map(ItemId::new)
            .collect())
    }

    async fn get_item(&self, id: ItemId) -> LanternResult<Option<Item>> {
        let path = format!("item/{}.json", id);
        let raw: Option<RawItem> = self.http.get_json(&path, &[]).await?;
        match raw {
            Some(raw) => Ok(Some(Item::try_from(raw)?)),
            None => {
                debug!(%id, "item is null");
                Ok(None)
            }
        }
    }
}
