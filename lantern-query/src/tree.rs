//! Lazy fetch of unbounded-depth trees.
//!
//! Every node is its own cache entry keyed by id. A node's children are only
//! discovered once the node resolves, and are then fetched concurrently with
//! each other. Failures, missing payloads and removed nodes all degrade to
//! [`NodeState::Unavailable`]; nothing below a node is fatal to its siblings.
//!
//! Traversal uses an explicit work set and the result is a flat arena, so
//! thread depth never touches the call stack.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{FuturesUnordered, StreamExt};
use lantern_core::{Item, ItemId, LanternResult};
use tracing::{debug, warn};

use crate::cache::QueryCache;
use crate::options::QueryOptions;
use crate::state::QueryStatus;

/// How long resolved nodes are reused before refetching.
pub const DEFAULT_NODE_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// A payload that can sit in a tree.
pub trait TreeNode: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Child ids in display order.
    fn child_ids(&self) -> &[Self::Id];

    /// Deleted or otherwise withdrawn content.
    fn is_removed(&self) -> bool;
}

impl TreeNode for Item {
    type Id = ItemId;

    fn child_ids(&self) -> &[ItemId] {
        self.kids()
    }

    fn is_removed(&self) -> bool {
        Item::is_removed(self)
    }
}

/// Fetches single nodes.
#[async_trait]
pub trait TreeSource: Send + Sync + 'static {
    type Node: TreeNode;

    /// `Ok(None)` when the node does not exist.
    async fn fetch_node(
        &self,
        id: <Self::Node as TreeNode>::Id,
    ) -> LanternResult<Option<Self::Node>>;
}

/// Id type of a source's nodes.
pub type NodeId<S> = <<S as TreeSource>::Node as TreeNode>::Id;

/// Resolution state of one node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState<N> {
    Loading,
    /// Failed, missing or removed.
    Unavailable,
    Available(N),
}

impl<N: TreeNode> NodeState<N> {
    fn from_payload(payload: Option<N>) -> Self {
        match payload {
            Some(node) if !node.is_removed() => NodeState::Available(node),
            _ => NodeState::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, NodeState::Available(_))
    }
}

/// Resolves nodes and whole trees through a per-node cache.
pub struct TreeFetcher<S: TreeSource> {
    source: Arc<S>,
    nodes: QueryCache<NodeId<S>, Option<S::Node>>,
    options: QueryOptions,
}

impl<S: TreeSource> TreeFetcher<S> {
    /// Fetcher whose nodes stay fresh for [`DEFAULT_NODE_STALE_TIME`].
    pub fn new(source: Arc<S>) -> Self {
        Self::with_options(
            source,
            QueryOptions::new().with_stale_time(DEFAULT_NODE_STALE_TIME),
        )
    }

    pub fn with_options(source: Arc<S>, options: QueryOptions) -> Self {
        Self {
            source,
            nodes: QueryCache::new("tree-nodes"),
            options,
        }
    }

    /// The per-node cache, shared with anything else keyed the same way.
    pub fn cache(&self) -> &QueryCache<NodeId<S>, Option<S::Node>> {
        &self.nodes
    }

    /// Resolve one node. Never fails: errors degrade to `Unavailable`.
    pub async fn resolve_node(&self, id: NodeId<S>) -> NodeState<S::Node> {
        let source = Arc::clone(&self.source);
        let result = self
            .nodes
            .fetch(
                id.clone(),
                move |id| async move { source.fetch_node(id).await },
                &self.options,
            )
            .await;

        match result {
            Ok(Some(read)) => {
                let state = NodeState::from_payload(read.into_value());
                if !state.is_available() {
                    debug!(?id, "node missing or removed");
                }
                state
            }
            Ok(None) => NodeState::Loading,
            Err(err) => {
                warn!(?id, error = %err, "node fetch failed");
                NodeState::Unavailable
            }
        }
    }

    /// Current cache view of one node without fetching.
    pub fn peek_node(&self, id: &NodeId<S>) -> NodeState<S::Node> {
        match self.nodes.state(id) {
            Ok(state) => match (state.status, state.data) {
                (QueryStatus::Failed, None) => NodeState::Unavailable,
                (_, Some(payload)) => NodeState::from_payload(payload),
                (_, None) => NodeState::Loading,
            },
            Err(err) => {
                warn!(?id, error = %err, "node cache unreadable");
                NodeState::Unavailable
            }
        }
    }

    /// Resolve `roots` and everything below them.
    ///
    /// Each node's children enter the work set the moment it resolves, so
    /// siblings load concurrently and a slow branch never holds up another.
    pub async fn resolve_tree(&self, roots: &[NodeId<S>]) -> ResolvedTree<S::Node> {
        let this = self;
        let resolve =
            move |index: usize, id: NodeId<S>| async move { (index, this.resolve_node(id).await) };

        let mut tree = ResolvedTree::with_roots(roots);
        let mut work = FuturesUnordered::new();
        for (index, id) in roots.iter().enumerate() {
            work.push(resolve(index, id.clone()));
        }

        while let Some((index, state)) = work.next().await {
            if let NodeState::Available(node) = &state {
                for child in node.child_ids() {
                    let child_index = tree.push_child(index, child.clone());
                    work.push(resolve(child_index, child.clone()));
                }
            }
            tree.nodes[index].state = state;
        }

        debug!(nodes = tree.len(), depth = tree.max_depth(), "tree resolved");
        tree
    }

    /// Build the tree from whatever the cache holds right now. Unresolved
    /// nodes show as `Loading` and have no children yet.
    pub fn snapshot(&self, roots: &[NodeId<S>]) -> ResolvedTree<S::Node> {
        let mut tree = ResolvedTree::with_roots(roots);
        let mut pending: Vec<usize> = (0..tree.nodes.len()).collect();

        while let Some(index) = pending.pop() {
            let state = self.peek_node(&tree.nodes[index].id);
            if let NodeState::Available(node) = &state {
                for child in node.child_ids() {
                    pending.push(tree.push_child(index, child.clone()));
                }
            }
            tree.nodes[index].state = state;
        }
        tree
    }
}

struct ArenaNode<N: TreeNode> {
    id: N::Id,
    state: NodeState<N>,
    children: Vec<usize>,
    depth: usize,
}

/// Borrowed view of one node in a [`ResolvedTree`].
#[derive(Debug)]
pub enum NodeView<'a, N> {
    Loading,
    Unavailable,
    Available {
        content: &'a N,
        /// Arena indices of the children, in display order.
        children: &'a [usize],
    },
}

/// A node visited by [`ResolvedTree::flatten`].
#[derive(Debug)]
pub struct FlatNode<'a, N> {
    pub index: usize,
    pub depth: usize,
    pub view: NodeView<'a, N>,
}

/// A resolved tree stored as a flat arena.
pub struct ResolvedTree<N: TreeNode> {
    nodes: Vec<ArenaNode<N>>,
    roots: Vec<usize>,
}

impl<N: TreeNode> ResolvedTree<N> {
    fn with_roots(roots: &[N::Id]) -> Self {
        let nodes = roots
            .iter()
            .map(|id| ArenaNode {
                id: id.clone(),
                state: NodeState::Loading,
                children: Vec::new(),
                depth: 0,
            })
            .collect();
        Self {
            nodes,
            roots: (0..roots.len()).collect(),
        }
    }

    fn push_child(&mut self, parent: usize, id: N::Id) -> usize {
        let index = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(ArenaNode {
            id,
            state: NodeState::Loading,
            children: Vec::new(),
            depth,
        });
        self.nodes[parent].children.push(index);
        index
    }

    /// Arena indices of the top-level nodes.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn id(&self, index: usize) -> Option<&N::Id> {
        self.nodes.get(index).map(|node| &node.id)
    }

    pub fn depth(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).map(|node| node.depth)
    }

    pub fn state(&self, index: usize) -> Option<&NodeState<N>> {
        self.nodes.get(index).map(|node| &node.state)
    }

    pub fn view(&self, index: usize) -> Option<NodeView<'_, N>> {
        let node = self.nodes.get(index)?;
        Some(match &node.state {
            NodeState::Loading => NodeView::Loading,
            NodeState::Unavailable => NodeView::Unavailable,
            NodeState::Available(content) => NodeView::Available {
                content,
                children: &node.children,
            },
        })
    }

    /// Index of the first node with `id`.
    pub fn find(&self, id: &N::Id) -> Option<usize> {
        self.nodes.iter().position(|node| &node.id == id)
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    pub fn unavailable_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node.state, NodeState::Unavailable))
            .count()
    }

    /// Display order: pre-order from each root, with depth.
    pub fn flatten(&self) -> Vec<FlatNode<'_, N>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            stack.extend(node.children.iter().rev().copied());
            if let Some(view) = self.view(index) {
                out.push(FlatNode {
                    index,
                    depth: node.depth,
                    view,
                });
            }
        }
        out
    }
}

// =============================================================================
// TESTS
// =============================================================================
