//! Hacker News wire types and their validation into core payloads

use lantern_core::{
    timestamp_from_unix, Comment, Item, ItemId, ItemKind, Story, ValidationError,
};
use serde::Deserialize;

/// An item exactly as `item/{id}.json` returns it. Every field except `id`
/// may be absent.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub by: Option<String>,
    pub time: Option<i64>,
    pub text: Option<String>,
    #[serde(default)]
    pub dead: bool,
    #[serde(default)]
    pub deleted: bool,
    pub parent: Option<u64>,
    #[serde(default)]
    pub kids: Vec<u64>,
    pub url: Option<String>,
    pub score: Option<i64>,
    pub title: Option<String>,
    pub descendants: Option<u32>,
}

fn malformed(id: u64, reason: impl Into<String>) -> ValidationError {
    ValidationError::MalformedPayload {
        payload: format!("item {}", id),
        reason: reason.into(),
    }
}

fn parse_kind(id: u64, kind: Option<&str>) -> Result<ItemKind, ValidationError> {
    match kind {
        Some("story") => Ok(ItemKind::Story),
        Some("comment") => Ok(ItemKind::Comment),
        Some("job") => Ok(ItemKind::Job),
        Some("poll") => Ok(ItemKind::Poll),
        Some("pollopt") => Ok(ItemKind::PollOpt),
        Some(other) => Err(malformed(id, format!("unknown type {:?}", other))),
        None => Err(malformed(id, "missing type")),
    }
}

impl TryFrom<RawItem> for Item {
    type Error = ValidationError;

    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        let kind = parse_kind(raw.id, raw.kind.as_deref())?;
        let id = ItemId::new(raw.id);
        let kids: Vec<ItemId> = raw.kids.into_iter().map(ItemId::new).collect();
        let time = raw
            .time
            .ok_or_else(|| malformed(raw.id, "missing time"))
            .and_then(timestamp_from_unix)?;

        match kind {
            ItemKind::Comment => Ok(Item::Comment(Comment {
                id,
                by: raw.by,
                parent: raw.parent.map(ItemId::new),
                text: raw.text,
                time,
                kids,
                deleted: raw.deleted,
                dead: raw.dead,
            })),
            ItemKind::Story | ItemKind::Job | ItemKind::Poll => match raw.title {
                Some(title) if !raw.deleted => Ok(Item::Story(Story {
                    id,
                    kind,
                    title,
                    by: raw.by.unwrap_or_else(|| "unknown".to_string()),
                    score: raw.score.unwrap_or(0),
                    url: raw.url,
                    time,
                    descendants: raw.descendants.unwrap_or(0),
                    kids,
                    text: raw.text,
                })),
                _ => Ok(Item::Other {
                    id,
                    kind,
                    deleted: raw.deleted,
                    dead: raw.dead,
                }),
            },
            ItemKind::PollOpt => Ok(Item::Other {
                id,
                kind,
                deleted: raw.deleted,
                dead: raw.dead,
            }),
        }
    }
}
