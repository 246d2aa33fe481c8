//! Lantern Query - Cached Fetching
//!
//! Three composable fetch mechanisms:
//!
//! - [`QueryCache`]: a keyed cache that coalesces concurrent requests into one
//!   producer call, serves fresh values without calling it, and can keep a key
//!   loaded in the background through a [`QueryObserver`].
//! - [`PagedSequence`]: pages over a prerequisite id list, loaded in order on
//!   demand.
//! - [`TreeFetcher`]: lazily resolved trees where each node is its own cache
//!   entry and children are discovered from their parent.

mod cache;
mod observer;
mod options;
mod paged;
mod read;
mod sources;
mod state;
mod tree;

pub use cache::QueryCache;
pub use observer::QueryObserver;
pub use options::QueryOptions;
pub use paged::{
    page_range, total_pages, PageConfig, PageFetch, PagePolicy, PageResult, PageSource,
    PagedSequence,
};
pub use read::QueryRead;
pub use sources::{CommentThreads, TopStories};
pub use state::{CacheStats, QueryState, QueryStatus};
pub use tree::{
    FlatNode, NodeId, NodeState, NodeView, ResolvedTree, TreeFetcher, TreeNode, TreeSource,
    DEFAULT_NODE_STALE_TIME,
};
