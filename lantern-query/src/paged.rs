//! Paginated fetch over a prerequisite id list.
//!
//! The id list is fetched once and shared by every page. Page `n` covers
//! `[n * page_size, min((n + 1) * page_size, limit))` of that list, where
//! `limit = min(list length, max_items)`. Pages load strictly in order: the
//! next page is only requested after the previous one resolved, and only one
//! page fetch runs at a time. Items within a page are fetched concurrently.

use std::fmt::Debug;
use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures_util::future::join_all;
use lantern_core::{LanternError, LanternResult, QueryError};
use tracing::{debug, warn};

use crate::cache::QueryCache;
use crate::options::QueryOptions;

/// Supplies the id list and the items behind it.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Id: Clone + Debug + Send + Sync + 'static;
    type Item: Clone + Send + Sync + 'static;

    /// The ordered prerequisite list.
    async fn list_ids(&self) -> LanternResult<Vec<Self::Id>>;

    async fn fetch_item(&self, id: Self::Id) -> LanternResult<Self::Item>;
}

/// What to do when some items of a page fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagePolicy {
    /// Any item failure fails the whole page.
    #[default]
    FailPage,
    /// Drop failed items and keep the rest.
    SkipFailed,
}

/// Page size, item cap and failure policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub page_size: usize,
    pub max_items: usize,
    pub policy: PagePolicy,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_items: 500,
            policy: PagePolicy::FailPage,
        }
    }
}

impl PageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn with_policy(mut self, policy: PagePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// One resolved page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub page_index: usize,
    /// Items in list order.
    pub items: Vec<T>,
    /// Items dropped under [`PagePolicy::SkipFailed`].
    pub skipped: usize,
}

/// Outcome of [`PagedSequence::fetch_next_page`].
#[derive(Debug, Clone)]
pub enum PageFetch<T> {
    Loaded(Arc<PageResult<T>>),
    /// Every page has been loaded.
    Exhausted,
    /// Another call is already fetching the next page.
    AlreadyFetching,
    /// The sequence was reset while this page loaded; the page was dropped.
    Superseded,
}

/// Index range of page `page` over a list truncated to `limit` items.
/// Empty once `page` is past the end.
pub fn page_range(page: usize, page_size: usize, limit: usize) -> Range<usize> {
    let start = page.saturating_mul(page_size).min(limit);
    let end = page
        .saturating_add(1)
        .saturating_mul(page_size)
        .min(limit);
    start..end
}

/// Number of pages for a list of `len` ids.
pub fn total_pages(len: usize, page_size: usize, max_items: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.min(max_items).div_ceil(page_size)
}

/// Loaded pages and the fetch bookkeeping that changes with them.
struct Progress<T> {
    /// Bumped by `reset`; a fetch started under an older epoch is discarded.
    epoch: u64,
    fetching: bool,
    loaded: Pages<T>,
}

/// Releases the fetching flag when the fetch finishes or is dropped, unless
/// the sequence was reset in the meantime.
struct FetchGuard<'a, T> {
    progress: &'a Mutex<Progress<T>>,
    epoch: u64,
}

impl<T> Drop for FetchGuard<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut progress) = self.progress.lock() {
            if progress.epoch == self.epoch {
                progress.fetching = false;
            }
        }
    }
}

type Pages<T> = Vec<Arc<PageResult<T>>>;

/// Incrementally loaded list of pages ("load more").
pub struct PagedSequence<S: PageSource> {
    source: Arc<S>,
    config: PageConfig,
    ids: QueryCache<u64, Arc<Vec<S::Id>>>,
    pages: QueryCache<(u64, usize), Arc<PageResult<S::Item>>>,
    progress: Mutex<Progress<S::Item>>,
}

impl<S: PageSource> PagedSequence<S> {
    pub fn new(source: Arc<S>, config: PageConfig) -> Self {
        Self {
            source,
            config,
            ids: QueryCache::new("page-ids"),
            pages: QueryCache::new("pages"),
            progress: Mutex::new(Progress {
                epoch: 0,
                fetching: false,
                loaded: Vec::new(),
            }),
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    fn progress(&self) -> LanternResult<MutexGuard<'_, Progress<S::Item>>> {
        self.progress
            .lock()
            .map_err(|_| LanternError::from(QueryError::LockPoisoned))
    }

    fn begin_fetch(&self) -> LanternResult<Option<FetchGuard<'_, S::Item>>> {
        let mut progress = self.progress()?;
        if progress.fetching {
            return Ok(None);
        }
        progress.fetching = true;
        Ok(Some(FetchGuard {
            progress: &self.progress,
            epoch: progress.epoch,
        }))
    }

    /// Resolve the id list, shared by every page of `epoch`.
    async fn ensure_ids(&self, epoch: u64) -> LanternResult<Arc<Vec<S::Id>>> {
        let source = Arc::clone(&self.source);
        let read = self
            .ids
            .fetch(
                epoch,
                move |_| async move { source.list_ids().await.map(Arc::new) },
                &QueryOptions::default(),
            )
            .await?
            .ok_or_else(|| QueryError::PrerequisiteMissing {
                name: "id list".to_string(),
            })?;
        Ok(read.into_value())
    }

    /// Load the page after the last loaded one.
    pub async fn fetch_next_page(&self) -> LanternResult<PageFetch<S::Item>> {
        let Some(guard) = self.begin_fetch()? else {
            debug!("next page already being fetched");
            return Ok(PageFetch::AlreadyFetching);
        };
        let epoch = guard.epoch;

        let ids = self.ensure_ids(epoch).await?;
        let next = {
            let progress = self.progress()?;
            if progress.epoch != epoch {
                return Ok(PageFetch::Superseded);
            }
            progress.loaded.len()
        };
        let limit = ids.len().min(self.config.max_items);
        let range = page_range(next, self.config.page_size, limit);
        if range.is_empty() {
            return Ok(PageFetch::Exhausted);
        }

        debug!(page = next, start = range.start, end = range.end, "fetching page");
        let page_ids = ids[range].to_vec();
        let source = Arc::clone(&self.source);
        let policy = self.config.policy;
        let page = self
            .pages
            .fetch(
                (epoch, next),
                move |(_, index)| load_page(source, index, page_ids, policy),
                &QueryOptions::default(),
            )
            .await?
            .ok_or_else(|| QueryError::PrerequisiteMissing {
                name: format!("page {next}"),
            })?
            .into_value();

        let mut progress = self.progress()?;
        if progress.epoch != epoch || page.page_index != progress.loaded.len() {
            debug!(page = page.page_index, "sequence reset while page loaded, dropping it");
            return Ok(PageFetch::Superseded);
        }
        progress.loaded.push(Arc::clone(&page));
        Ok(PageFetch::Loaded(page))
    }

    /// True until the id list has resolved and every page within it loaded.
    pub fn has_next_page(&self) -> LanternResult<bool> {
        let (epoch, loaded) = {
            let progress = self.progress()?;
            (progress.epoch, progress.loaded.len())
        };
        let Some(ids) = self.ids.peek(&epoch)? else {
            return Ok(true);
        };
        let limit = ids.len().min(self.config.max_items);
        Ok(loaded.saturating_mul(self.config.page_size) < limit)
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.progress().map(|p| p.fetching).unwrap_or(false)
    }

    /// Loaded pages in order.
    pub fn pages(&self) -> LanternResult<Pages<S::Item>> {
        Ok(self.progress()?.loaded.clone())
    }

    /// Items of every loaded page, in page order.
    pub fn items(&self) -> LanternResult<Vec<S::Item>> {
        Ok(self
            .progress()?
            .loaded
            .iter()
            .flat_map(|page| page.items.iter().cloned())
            .collect())
    }

    /// Total pages, once the id list is known.
    pub fn page_count(&self) -> LanternResult<Option<usize>> {
        let epoch = self.progress()?.epoch;
        Ok(self
            .ids
            .peek(&epoch)?
            .map(|ids| total_pages(ids.len(), self.config.page_size, self.config.max_items)))
    }

    /// Forget the id list and every page; the next fetch starts over. A
    /// fetch still in flight finishes as [`PageFetch::Superseded`].
    pub fn reset(&self) -> LanternResult<()> {
        {
            let mut progress = self.progress()?;
            progress.epoch += 1;
            progress.fetching = false;
            progress.loaded.clear();
        }
        self.pages.clear()?;
        self.ids.clear()?;
        Ok(())
    }
}

async fn load_page<S: PageSource>(
    source: Arc<S>,
    page_index: usize,
    ids: Vec<S::Id>,
    policy: PagePolicy,
) -> LanternResult<Arc<PageResult<S::Item>>> {
    let results = join_all(ids.iter().cloned().map(|id| {
        let source = Arc::clone(&source);
        async move { source.fetch_item(id).await }
    }))
    .await;

    let mut items = Vec::with_capacity(results.len());
    let mut skipped = 0;
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(item) => items.push(item),
            Err(err) => match policy {
                PagePolicy::FailPage => {
                    warn!(page = page_index, ?id, error = %err, "item failed, failing page");
                    return Err(err);
                }
                PagePolicy::SkipFailed => {
                    warn!(page = page_index, ?id, error = %err, "item failed, skipping");
                    skipped += 1;
                }
            },
        }
    }

    Ok(Arc::new(PageResult {
        page_index,
        items,
        skipped,
    }))
}

// =============================================================================
// TESTS
// =============================================================================
