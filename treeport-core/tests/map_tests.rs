// Tests for grouping, indexing and row mapping

use serde_json::json;
use std::collections::HashMap;
use treeport_client::model::{ContentNode, ReferencedContent};
use treeport_core::error::ReportError;
use treeport_core::map::{
    ReportRow, absolute_url, group_by, map_general, status_label, to_index, user_properties,
};

fn node_of_type(link: &str, type_name: &str) -> ContentNode {
    let mut node = ContentNode::new(link);
    node.content_type_name = Some(type_name.to_string());
    node
}

fn referenced(link: &str) -> ReferencedContent {
    ReferencedContent {
        content_link: link.to_string(),
        references: Vec::new(),
    }
}

// ============================================================================
// Status Label Tests
// ============================================================================

#[test]
fn test_status_label_known_codes() {
    assert_eq!(status_label(0), "NotCreated");
    assert_eq!(status_label(1), "Rejected");
    assert_eq!(status_label(2), "CheckedOut");
    assert_eq!(status_label(3), "CheckedIn");
    assert_eq!(status_label(4), "Published");
    assert_eq!(status_label(5), "PreviouslyPublished");
    assert_eq!(status_label(6), "DelayedPublish");
    assert_eq!(status_label(7), "AwaitingApproval");
}

#[test]
fn test_status_label_out_of_range_passes_through() {
    assert_eq!(status_label(8), "8");
    assert_eq!(status_label(-1), "-1");
    assert_eq!(status_label(1234), "1234");
}

#[test]
fn test_status_label_is_total_over_the_table() {
    for code in 0..8 {
        let label = status_label(code);
        assert!(
            label.parse::<i64>().is_err(),
            "{code} should map to a symbolic label, got {label}"
        );
    }
}

// ============================================================================
// Grouping Tests
// ============================================================================

#[test]
fn test_grouping_is_exhaustive_and_exclusive() {
    let nodes = vec![
        node_of_type("1", "Page"),
        node_of_type("2", "Block"),
        node_of_type("3", "Page"),
    ];

    let groups = group_by(nodes, |node| node.type_name().to_string());

    let total: usize = groups.values().map(Vec::len).sum();
    assert_eq!(total, 3);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups["Page"].len(), 2);
    assert_eq!(groups["Block"].len(), 1);

    let mut seen: Vec<&str> = groups
        .values()
        .flatten()
        .map(|node| node.content_link.as_str())
        .collect();
    seen.sort();
    assert_eq!(seen, vec!["1", "2", "3"]);
}

#[test]
fn test_grouping_untyped_nodes_land_in_one_bucket() {
    let nodes = vec![ContentNode::new("1"), ContentNode::new("2")];
    let groups = group_by(nodes, |node| node.type_name().to_string());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups["Unknown"].len(), 2);
}

// ============================================================================
// Strict Index Tests
// ============================================================================

#[test]
fn test_to_index_maps_keys_to_items() {
    let items = vec![referenced("1"), referenced("2")];
    let index = to_index(items, |entry| entry.content_link.clone()).unwrap();
    assert_eq!(index.len(), 2);
    assert!(index.contains_key("1"));
    assert!(index.contains_key("2"));
}

#[test]
fn test_to_index_rejects_duplicate_keys() {
    let items = vec![referenced("7"), referenced("7")];
    let result = to_index(items, |entry| entry.content_link.clone());
    assert!(matches!(result, Err(ReportError::DuplicateKey(key)) if key == "7"));
}

// ============================================================================
// Property Filtering Tests
// ============================================================================

#[test]
fn test_user_properties_drop_reserved_keys() {
    let mut node = ContentNode::new("1");
    node.properties.insert("heading".into(), json!("Hello"));
    node.properties.insert("icon".into(), json!({"id": 3}));
    node.properties.insert("main_body".into(), json!("reserved"));
    node.properties.insert("pageName".into(), json!("reserved"));
    node.properties.insert("page".into(), json!("reserved"));

    let kept = user_properties(&node.properties);
    assert_eq!(kept.len(), 2);
    assert!(kept.contains_key("heading"));
    assert!(kept.contains_key("icon"));
}

// ============================================================================
// URL Resolution Tests
// ============================================================================

#[test]
fn test_absolute_url_prefixes_origin_on_relative_urls() {
    assert_eq!(
        absolute_url("https://example.com", Some("/en/start")),
        Some("https://example.com/en/start".to_string())
    );
    assert_eq!(absolute_url("https://example.com", None), None);
    assert_eq!(
        absolute_url("https://example.com", Some("https://cdn.example.com/x.png")),
        Some("https://cdn.example.com/x.png".to_string())
    );
}

// ============================================================================
// General Mapping Tests
// ============================================================================

#[test]
fn test_map_general_resolves_fields() {
    let mut node = ContentNode::new("12_34");
    node.content_type_name = Some("StandardPage".into());
    node.content_type_id = Some(21);
    node.status = 4;
    node.name = Some("Start".into());
    node.public_url = Some("/en/start/".into());
    node.properties.insert("heading".into(), json!("Hi"));
    node.properties.insert("page_internal".into(), json!("x"));

    let references = vec![ReferencedContent {
        content_link: "12_34".into(),
        references: vec![json!({"contentLink": "9"})],
    }];
    let index = to_index(references, |entry| entry.content_link.clone()).unwrap();

    let row = map_general(&node, &index, "https://example.com");

    assert_eq!(row.status, "Published");
    assert_eq!(row.public_url.as_deref(), Some("https://example.com/en/start/"));
    assert_eq!(row.referenced.as_ref().map(Vec::len), Some(1));
    assert!(row.properties.contains_key("heading"));
    assert!(!row.properties.contains_key("page_internal"));
}

#[test]
fn test_map_general_without_references() {
    let node = node_of_type("5", "ImageFile");
    let row = map_general(&node, &HashMap::new(), "https://example.com");
    assert!(row.referenced.is_none());
    assert_eq!(row.content_link, "5");
    assert_eq!(row.status, "NotCreated");
}

// ============================================================================
// Round-trip Tests
// ============================================================================

#[test]
fn test_report_group_round_trips_through_json() {
    let mut node = node_of_type("1", "Page");
    node.status = 4;
    node.name = Some("Start".into());
    node.properties.insert("heading".into(), json!("Hello"));
    node.properties.insert("blocks".into(), json!([1, 2, 3]));

    let rows = vec![
        map_general(&node, &HashMap::new(), "https://example.com"),
        map_general(&node_of_type("2", "Page"), &HashMap::new(), "https://example.com"),
    ];

    let serialized = serde_json::to_string_pretty(&rows).unwrap();
    let parsed: Vec<ReportRow> = serde_json::from_str(&serialized).unwrap();
    assert_eq!(parsed, rows);
}
