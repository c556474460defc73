//! Frontend Models
//!
//! Data structures matching the planner REST API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which planner the UI is driving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Youtube,
    Instagram,
    Tiktok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Youtube, Platform::Instagram, Platform::Tiktok];

    /// Path segment under the API base, e.g. `/api/youtube`
    pub fn path_segment(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Youtube => "YouTube",
            Platform::Instagram => "Instagram",
            Platform::Tiktok => "TikTok",
        }
    }

    pub fn default_columns(&self) -> usize {
        match self {
            Platform::Youtube => crate::config::YOUTUBE_GRID_COLUMNS,
            Platform::Instagram | Platform::Tiktok => crate::config::DEFAULT_GRID_COLUMNS,
        }
    }
}

/// Item identifier.
///
/// `Local` ids are handed out for optimistic placeholders before the server
/// has answered a create; `Remote` ids are server-issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemId {
    Local(u64),
    Remote(String),
}

const LOCAL_PREFIX: &str = "local-";

impl ItemId {
    pub fn remote(id: impl Into<String>) -> Self {
        ItemId::Remote(id.into())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ItemId::Local(_))
    }

    pub fn as_remote(&self) -> Option<&str> {
        match self {
            ItemId::Remote(id) => Some(id),
            ItemId::Local(_) => None,
        }
    }
}

/// Ids arriving from the server are always server-issued, whatever they look like.
impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::Remote(s)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Local(n) => write!(f, "{}{}", LOCAL_PREFIX, n),
            ItemId::Remote(id) => f.write_str(id),
        }
    }
}

/// Publishing state of a planner item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Draft,
    Scheduled,
    Published,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [ItemStatus::Draft, ItemStatus::Scheduled, ItemStatus::Published];

    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Draft => "Draft",
            ItemStatus::Scheduled => "Scheduled",
            ItemStatus::Published => "Published",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Draft => "draft",
            ItemStatus::Scheduled => "scheduled",
            ItemStatus::Published => "published",
        }
    }
}

/// A planner entry (video/post/image)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Optimistic entry shown while the create call is in flight
    pub fn placeholder(local_id: u64, collection_id: &str, position: i32, draft: &ItemDraft) -> Self {
        Self {
            id: ItemId::Local(local_id),
            collection_id: collection_id.to_string(),
            position,
            thumbnail: draft.thumbnail.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status,
            scheduled_at: draft.scheduled_at,
        }
    }
}

/// User-supplied fields for a new item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub status: ItemStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Body of `POST /items`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub thumbnail: Option<&'a str>,
    pub collection_id: &'a str,
    pub status: ItemStatus,
    pub position: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl<'a> NewItem<'a> {
    pub fn from_draft(draft: &'a ItemDraft, collection_id: &'a str, position: i32) -> Self {
        Self {
            title: &draft.title,
            description: &draft.description,
            thumbnail: draft.thumbnail.as_deref(),
            collection_id,
            status: draft.status,
            position,
            scheduled_at: draft.scheduled_at,
        }
    }
}

/// Partial item update, body of `PATCH /items/:id`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl ItemPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Default::default() }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self { description: Some(description.into()), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self == &ItemPatch::default()
    }

    /// Fold `newer` into `self`; fields set in `newer` win.
    pub fn merge(&mut self, newer: ItemPatch) {
        if newer.title.is_some() { self.title = newer.title; }
        if newer.description.is_some() { self.description = newer.description; }
        if newer.thumbnail.is_some() { self.thumbnail = newer.thumbnail; }
        if newer.status.is_some() { self.status = newer.status; }
        if newer.scheduled_at.is_some() { self.scheduled_at = newer.scheduled_at; }
    }

    pub fn apply_to(&self, item: &mut Item) {
        if let Some(t) = &self.title { item.title = t.clone(); }
        if let Some(d) = &self.description { item.description = d.clone(); }
        if let Some(t) = &self.thumbnail { item.thumbnail = Some(t.clone()); }
        if let Some(s) = self.status { item.status = s; }
        if let Some(at) = self.scheduled_at { item.scheduled_at = Some(at); }
    }
}

/// Link to an external release planner. Both halves or neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLink {
    pub rollout_id: String,
    pub section_id: String,
}

/// A named, ordered set of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub link: Option<ExternalLink>,
}

/// Body of `POST /collections`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Partial collection update, body of `PATCH /collections/:id`
///
/// `folder: Some(None)` serializes as `null` and moves the collection to root.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

impl CollectionPatch {
    pub fn apply_to(&self, collection: &mut Collection) {
        if let Some(n) = &self.name { collection.name = n.clone(); }
        if let Some(f) = &self.folder { collection.folder = f.clone(); }
        if let Some(c) = &self.color { collection.color = Some(c.clone()); }
        if let Some(p) = self.position { collection.position = p; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_wire_format() {
        assert_eq!(ItemId::from("abc".to_string()), ItemId::remote("abc"));
        assert_eq!(ItemId::Local(3).to_string(), "local-3");
    }

    #[test]
    fn test_server_id_shaped_like_placeholder_stays_remote() {
        let item: Item = serde_json::from_str(r#"{"id":"local-7","title":"Clip"}"#).unwrap();
        assert_eq!(item.id, ItemId::remote("local-7"));
        assert!(!item.id.is_local());
        assert_eq!(item.id.as_remote(), Some("local-7"));
    }

    #[test]
    fn test_item_deserializes_from_api() {
        let json = r#"{"id":"v1","collectionId":"c1","position":2,"title":"Intro","status":"scheduled","scheduledAt":"2026-01-02T03:04:05Z"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, ItemId::remote("v1"));
        assert_eq!(item.position, 2);
        assert_eq!(item.status, ItemStatus::Scheduled);
        assert!(item.scheduled_at.is_some());
        assert_eq!(item.description, "");
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = ItemPatch::title("New");
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"title":"New"}"#);

        let to_root = CollectionPatch { folder: Some(None), ..Default::default() };
        assert_eq!(serde_json::to_string(&to_root).unwrap(), r#"{"folder":null}"#);
    }

    #[test]
    fn test_patch_merge_newer_wins() {
        let mut patch = ItemPatch::title("a");
        patch.merge(ItemPatch::description("d"));
        patch.merge(ItemPatch::title("b"));
        assert_eq!(patch.title.as_deref(), Some("b"));
        assert_eq!(patch.description.as_deref(), Some("d"));
    }

    #[test]
    fn test_external_link_both_or_neither() {
        let linked: Collection = serde_json::from_str(
            r#"{"id":"c1","name":"Main","rolloutId":"r1","sectionId":"s1"}"#,
        ).unwrap();
        assert_eq!(
            linked.link,
            Some(ExternalLink { rollout_id: "r1".into(), section_id: "s1".into() })
        );

        let half: Collection = serde_json::from_str(
            r#"{"id":"c2","name":"Half","rolloutId":"r1"}"#,
        ).unwrap();
        assert_eq!(half.link, None);
        assert_eq!(half.folder, None);
    }
}
