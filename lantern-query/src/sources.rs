//! Adapters from the story API to the paging and tree sources.

use std::sync::Arc;

use async_trait::async_trait;
use lantern_core::{Item, ItemId, LanternResult, NotFoundError, Story, StoryApi};

use crate::paged::PageSource;
use crate::tree::TreeSource;

/// Top stories as a paged source: the top-id list, then one story per id.
#[derive(Clone)]
pub struct TopStories {
    api: Arc<dyn StoryApi>,
}

impl TopStories {
    pub fn new(api: Arc<dyn StoryApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource for TopStories {
    type Id = ItemId;
    type Item = Story;

    async fn list_ids(&self) -> LanternResult<Vec<ItemId>> {
        self.api.list_top_ids().await
    }

    /// A null or non-story item counts as missing and fails its page.
    async fn fetch_item(&self, id: ItemId) -> LanternResult<Story> {
        self.api
            .get_item(id)
            .await?
            .and_then(Item::into_story)
            .ok_or_else(|| NotFoundError::Item { id }.into())
    }
}

/// Comment threads as a tree source, one item per node.
#[derive(Clone)]
pub struct CommentThreads {
    api: Arc<dyn StoryApi>,
}

impl CommentThreads {
    pub fn new(api: Arc<dyn StoryApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl TreeSource for CommentThreads {
    type Node = Item;

    async fn fetch_node(&self, id: ItemId) -> LanternResult<Option<Item>> {
        self.api.get_item(id).await
    }
}
