//! Story-API payloads
//!
//! These are the validated shapes of items returned by the story API. Raw wire
//! types live with the HTTP clients and convert into these at the boundary.

use serde::{Deserialize, Serialize};

use crate::{ItemId, Timestamp};

/// Kind tag carried by every story-API item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    Comment,
    Job,
    Poll,
    PollOpt,
}

/// A top-level, titled item (story, job, poll).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: ItemId,
    pub kind: ItemKind,
    pub title: String,
    pub by: String,
    pub score: i64,
    pub url: Option<String>,
    pub time: Timestamp,
    /// Total comment count as reported by the API.
    pub descendants: u32,
    /// Top-level comment ids, in display order.
    pub kids: Vec<ItemId>,
    /// Body text for text posts; HTML.
    pub text: Option<String>,
}

/// A comment in a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: ItemId,
    pub by: Option<String>,
    pub parent: Option<ItemId>,
    /// HTML.
    pub text: Option<String>,
    pub time: Timestamp,
    pub kids: Vec<ItemId>,
    pub deleted: bool,
    pub dead: bool,
}

impl Comment {
    /// Deleted or dead comments render as unavailable.
    pub fn is_removed(&self) -> bool {
        self.deleted || self.dead
    }

    pub fn author(&self) -> &str {
        self.by.as_deref().unwrap_or("unknown")
    }
}

/// Any item the story API can return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum Item {
    Story(Story),
    Comment(Comment),
    /// An item kind the dashboard does not render (poll options, or a removed
    /// story with no title).
    Other {
        id: ItemId,
        kind: ItemKind,
        deleted: bool,
        dead: bool,
    },
}

impl Item {
    pub fn id(&self) -> ItemId {
        match self {
            Item::Story(story) => story.id,
            Item::Comment(comment) => comment.id,
            Item::Other { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Story(story) => story.kind,
            Item::Comment(_) => ItemKind::Comment,
            Item::Other { kind, .. } => *kind,
        }
    }

    /// Child ids in display order; empty for items without children.
    pub fn kids(&self) -> &[ItemId] {
        match self {
            Item::Story(story) => &story.kids,
            Item::Comment(comment) => &comment.kids,
            Item::Other { .. } => &[],
        }
    }

    pub fn is_removed(&self) -> bool {
        match self {
            Item::Story(_) => false,
            Item::Comment(comment) => comment.is_removed(),
            Item::Other { deleted, dead, .. } => *deleted || *dead,
        }
    }

    pub fn into_story(self) -> Option<Story> {
        match self {
            Item::Story(story) => Some(story),
            _ => None,
        }
    }

    pub fn into_comment(self) -> Option<Comment> {
        match self {
            Item::Comment(comment) => Some(comment),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp_from_unix;

    fn comment(deleted: bool, dead: bool) -> Comment {
        Comment {
            id: ItemId::new(2),
            by: None,
            parent: Some(ItemId::new(1)),
            text: Some("hi".to_string()),
            time: timestamp_from_unix(1_700_000_000).unwrap(),
            kids: vec![ItemId::new(3)],
            deleted,
            dead,
        }
    }

    #[test]
    fn test_comment_removed_flags() {
        assert!(!comment(false, false).is_removed());
        assert!(comment(true, false).is_removed());
        assert!(comment(false, true).is_removed());
    }

    #[test]
    fn test_comment_author_fallback() {
        let mut c = comment(false, false);
        assert_eq!(c.author(), "unknown");
        c.by = Some("pg".to_string());
        assert_eq!(c.author(), "pg");
    }

    #[test]
    fn test_item_accessors() {
        let item = Item::Comment(comment(false, false));
        assert_eq!(item.id(), ItemId::new(2));
        assert_eq!(item.kind(), ItemKind::Comment);
        assert_eq!(item.kids(), &[ItemId::new(3)]);
        assert!(item.clone().into_story().is_none());
        assert!(item.into_comment().is_some());

        let other = Item::Other {
            id: ItemId::new(9),
            kind: ItemKind::PollOpt,
            deleted: true,
            dead: false,
        };
        assert!(other.is_removed());
        assert!(other.kids().is_empty());
    }
}
