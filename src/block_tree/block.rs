use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque, client-generated block identifier. Never reused.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Markdown,
    Image,
    Material,
    Assignment,
    Html,
    Test,
    Group,
}

impl BlockKind {
    pub const ALL: [BlockKind; 8] = [
        BlockKind::Text,
        BlockKind::Markdown,
        BlockKind::Image,
        BlockKind::Material,
        BlockKind::Assignment,
        BlockKind::Html,
        BlockKind::Test,
        BlockKind::Group,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Text => "Text",
            BlockKind::Markdown => "Markdown",
            BlockKind::Image => "Image",
            BlockKind::Material => "Material",
            BlockKind::Assignment => "Assignment",
            BlockKind::Html => "HTML",
            BlockKind::Test => "Test",
            BlockKind::Group => "Group",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            BlockKind::Text => "#FF9800",
            BlockKind::Markdown => "#795548",
            BlockKind::Image => "#2196F3",
            BlockKind::Material => "#009688",
            BlockKind::Assignment => "#E91E63",
            BlockKind::Html => "#607D8B",
            BlockKind::Test => "#673AB7",
            BlockKind::Group => "#4CAF50",
        }
    }
}

/// A node of the course tree.
///
/// `order` mirrors the array position inside the owning container and is
/// rewritten on every mutation; `group_id` is a lookup hint only. Tree
/// position decides membership. Fields the engine does not know about are
/// kept verbatim in `payload`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<BlockId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Children; only meaningful for `BlockKind::Group`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, kind: BlockKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            order: 0,
            is_visible: None,
            group_id: None,
            description: None,
            blocks: Vec::new(),
            payload: Map::new(),
        }
    }

    pub fn group(id: impl Into<BlockId>, title: impl Into<String>, blocks: Vec<Block>) -> Self {
        let mut group = Self::new(id, BlockKind::Group, title);
        group.description = Some(String::new());
        group.blocks = blocks;
        group
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn is_group(&self) -> bool {
        self.kind == BlockKind::Group
    }

    /// Absent counts as visible.
    pub fn is_visible(&self) -> bool {
        self.is_visible != Some(false)
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&BlockId> for BlockId {
    fn from(id: &BlockId) -> Self {
        id.clone()
    }
}
