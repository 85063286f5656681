use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use treeport_client::model::{ContentNode, ReferencedContent};

/// Editing lifecycle states as numbered by the version store.
const STATUS_LABELS: [&str; 8] = [
    "NotCreated",
    "Rejected",
    "CheckedOut",
    "CheckedIn",
    "Published",
    "PreviouslyPublished",
    "DelayedPublish",
    "AwaitingApproval",
];

/// Symbolic label for a status code; codes outside the table pass through
/// as their decimal form.
pub fn status_label(status: i64) -> String {
    usize::try_from(status)
        .ok()
        .and_then(|idx| STATUS_LABELS.get(idx))
        .map_or_else(|| status.to_string(), |label| (*label).to_string())
}

pub fn group_by<T, K, F>(items: Vec<T>, mut key: F) -> HashMap<K, Vec<T>>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut groups: HashMap<K, Vec<T>> = HashMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}

/// Strict one-to-one index; a repeated key aborts the run.
pub fn to_index<T, F>(items: Vec<T>, mut key: F) -> Result<HashMap<String, T>, ReportError>
where
    F: FnMut(&T) -> String,
{
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        let key = key(&item);
        if index.contains_key(&key) {
            return Err(ReportError::DuplicateKey(key));
        }
        index.insert(key, item);
    }
    Ok(index)
}

/// End-user content properties: keys carrying an underscore or a `page`
/// prefix are reserved by the system and dropped.
pub fn user_properties(properties: &Map<String, Value>) -> Map<String, Value> {
    properties
        .iter()
        .filter(|(key, _)| !key.contains('_') && !key.starts_with("page"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Site-relative URLs get the origin prefixed; anything else passes through.
pub fn absolute_url(origin: &str, url: Option<&str>) -> Option<String> {
    url.map(|url| {
        if url.starts_with('/') {
            format!("{origin}{url}")
        } else {
            url.to_string()
        }
    })
}

/// Flattened projection of a ContentNode as emitted in the report files.
/// End-user properties are spread into the row itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type_name: Option<String>,
    #[serde(rename = "contentTypeID", default, skip_serializing_if = "Option::is_none")]
    pub content_type_id: Option<i64>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable_preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_link: Option<String>,
    pub content_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// The general row mapping: allow-listed fields, resolved status, absolute
/// URLs, user properties and the reverse-reference list for the node.
pub fn map_general(
    node: &ContentNode,
    referenced: &HashMap<String, ReferencedContent>,
    origin: &str,
) -> ReportRow {
    ReportRow {
        content_type_name: node.content_type_name.clone(),
        content_type_id: node.content_type_id,
        status: status_label(node.status),
        name: node.name.clone(),
        editable_preview_url: absolute_url(origin, node.editable_preview_url.as_deref()),
        public_url: absolute_url(origin, node.public_url.as_deref()),
        language_id: node
            .current_language_branch
            .as_ref()
            .and_then(|branch| branch.language_id.clone()),
        parent_link: node.parent_link.clone(),
        content_link: node.content_link.clone(),
        content_guid: node.content_guid.clone(),
        permanent_link: node.permanent_link.clone(),
        type_identifier: node.type_identifier.clone(),
        referenced: referenced
            .get(&node.content_link)
            .map(|entry| entry.references.clone()),
        uri: node.uri.clone(),
        created: node.created.clone(),
        created_by: node.created_by.clone(),
        changed: node.changed.clone(),
        changed_by: node.changed_by.clone(),
        published: node.published.clone(),
        published_by: node.published_by.clone(),
        deleted: node.deleted.clone(),
        deleted_by: node.deleted_by.clone(),
        properties: user_properties(&node.properties),
    }
}

/// Per-report customization applied after the general mapping; the seam for
/// report-specific fields without touching the general mapper.
pub type RowTransform = Arc<dyn Fn(ReportRow) -> ReportRow + Send + Sync>;

pub fn identity_transform() -> RowTransform {
    Arc::new(|row| row)
}
