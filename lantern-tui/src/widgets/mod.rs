//! Reusable widget components.

pub mod comment_tree;
pub mod detail;

pub use comment_tree::{CommentTree, LOADING_PLACEHOLDER, UNAVAILABLE_PLACEHOLDER};
pub use detail::DetailPanel;
