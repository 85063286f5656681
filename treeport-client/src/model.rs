use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw record from the content tree endpoints. Field names mirror the wire
/// format; unknown fields are dropped on the floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    pub content_link: String,
    #[serde(default)]
    pub parent_link: Option<String>,
    #[serde(default)]
    pub content_type_name: Option<String>,
    #[serde(rename = "contentTypeID", default)]
    pub content_type_id: Option<i64>,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub assets_folder_link: Option<String>,
    #[serde(default)]
    pub permanent_link: Option<String>,
    #[serde(default)]
    pub content_guid: Option<String>,
    #[serde(default)]
    pub type_identifier: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub current_language_branch: Option<LanguageBranch>,
    #[serde(default)]
    pub editable_preview_url: Option<String>,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub changed: Option<String>,
    #[serde(default)]
    pub changed_by: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub published_by: Option<String>,
    #[serde(default)]
    pub deleted: Option<String>,
    #[serde(default)]
    pub deleted_by: Option<String>,
}

impl ContentNode {
    /// Bare node with the given link; everything else unset.
    pub fn new(content_link: impl Into<String>) -> Self {
        Self {
            content_link: content_link.into(),
            parent_link: None,
            content_type_name: None,
            content_type_id: None,
            status: 0,
            name: None,
            properties: Map::new(),
            has_children: false,
            assets_folder_link: None,
            permanent_link: None,
            content_guid: None,
            type_identifier: None,
            uri: None,
            current_language_branch: None,
            editable_preview_url: None,
            public_url: None,
            created: None,
            created_by: None,
            changed: None,
            changed_by: None,
            published: None,
            published_by: None,
            deleted: None,
            deleted_by: None,
        }
    }

    /// Grouping key; records without a type name land in one bucket.
    pub fn type_name(&self) -> &str {
        self.content_type_name.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageBranch {
    #[serde(default)]
    pub language_id: Option<String>,
}

/// Reverse-reference record from the referenced-content store: everything
/// that links to `content_link`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencedContent {
    pub content_link: String,
    #[serde(default)]
    pub references: Vec<Value>,
}

/// Entry of the content type catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeInfo {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
}
