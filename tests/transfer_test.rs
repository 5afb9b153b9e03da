mod helpers;

use helpers::*;
use ideacloud::ideas::fragments;
use ideacloud::ideas::types::Fragment;
use ideacloud::IdeaError;
use serde_json::json;

#[test]
fn export_then_import_into_an_empty_store_reproduces_it() {
    let source = test_cloud(vec![]);
    let mut tagged = fragment("a", "first", 1);
    tagged.tags = vec!["x".into(), "y".into()];
    tagged.star = 3;
    tagged.cluster_id = Some("c1".into());
    tagged.rel = vec!["b".into()];
    seed(&source, &[tagged, fragment("b", "second", 2)]);

    let exported = source.export_json().unwrap();
    let target = test_cloud(vec![]);
    let report = target.import_json(&exported).unwrap();

    assert_eq!(report.imported, 2);
    assert_eq!(report.replaced, 0);
    assert!(report.rejected.is_empty());
    assert_eq!(
        fragments::list_fragments(&source.db()).unwrap(),
        fragments::list_fragments(&target.db()).unwrap()
    );
}

#[test]
fn export_uses_interchange_field_names() {
    let cloud = test_cloud(vec![]);
    seed(&cloud, &[fragment("a", "first", 1)]);

    let exported: serde_json::Value = serde_json::from_str(&cloud.export_json().unwrap()).unwrap();

    assert_eq!(exported[0]["createdAt"], "2024-05-01T00:01:00.000Z");
    assert!(exported[0].get("created_at").is_none());
    assert!(exported[0].get("clusterId").is_none());
}

#[test]
fn export_of_an_empty_store_is_an_empty_array() {
    let cloud = test_cloud(vec![]);
    let exported: Vec<Fragment> = serde_json::from_str(&cloud.export_json().unwrap()).unwrap();
    assert!(exported.is_empty());
}

#[test]
fn import_replaces_a_record_with_the_same_id() {
    let cloud = test_cloud(vec![]);
    let mut original = fragment("a", "old text", 1);
    original.tags = vec!["old".into()];
    seed(&cloud, &[original]);

    let doc = json!([{
        "id": "a",
        "text": "new text",
        "createdAt": "2024-06-01T08:00:00.000Z",
        "star": 2,
        "tags": ["new"]
    }]);
    let report = cloud.import_json(&doc.to_string()).unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(report.replaced, 1);
    let conn = cloud.db();
    assert_eq!(fragments::count_fragments(&conn).unwrap(), 1);
    let stored = fragments::get_fragment(&conn, "a").unwrap().unwrap();
    assert_eq!(stored.text, "new text");
    assert_eq!(stored.star, 2);
    assert_eq!(stored.created_at, "2024-06-01T08:00:00.000Z");
    assert!(fragments::fragments_with_tag(&conn, "old").unwrap().is_empty());
    assert_eq!(fragments::fragments_with_tag(&conn, "new").unwrap().len(), 1);
}

#[test]
fn invalid_records_are_skipped_and_reported() {
    let cloud = test_cloud(vec![]);
    let doc = json!([
        {"id": "ok", "text": "fine", "createdAt": "2024-05-01T10:00:00Z"},
        {"text": "no id", "createdAt": "2024-05-01T10:00:00Z"},
        {"id": "bad-star", "text": "x", "createdAt": "2024-05-01T10:00:00Z", "star": 7},
        {"id": "bad-date", "text": "x", "createdAt": "yesterday"},
        {"id": "bad-tags", "text": "x", "createdAt": "2024-05-01T10:00:00Z", "tags": [1, 2]},
        "just a string"
    ]);

    let report = cloud.import_json(&doc.to_string()).unwrap();

    assert_eq!(report.imported, 1);
    let rejected: Vec<(usize, Option<&str>)> = report
        .rejected
        .iter()
        .map(|r| (r.index, r.id.as_deref()))
        .collect();
    assert_eq!(
        rejected,
        [
            (1, None),
            (2, Some("bad-star")),
            (3, Some("bad-date")),
            (4, Some("bad-tags")),
            (5, None)
        ]
    );
    assert_eq!(report.rejected[0].reason, "missing id");
    assert_eq!(fragments::count_fragments(&cloud.db()).unwrap(), 1);
}

#[test]
fn malformed_document_changes_nothing() {
    let cloud = test_cloud(vec![]);
    seed(&cloud, &[fragment("a", "keep me", 1)]);

    let err = cloud.import_json("[{\"id\": ").unwrap_err();

    assert!(matches!(err, IdeaError::ImportParseFailure(_)));
    assert_eq!(fragments::count_fragments(&cloud.db()).unwrap(), 1);
}

#[test]
fn imported_cluster_reference_is_kept() {
    let cloud = test_cloud(vec![]);
    let doc = json!([{
        "id": "a",
        "text": "t",
        "createdAt": "2024-05-01T10:00:00Z",
        "clusterId": "c9"
    }]);

    cloud.import_json(&doc.to_string()).unwrap();

    let stored = fragments::get_fragment(&cloud.db(), "a").unwrap().unwrap();
    assert_eq!(stored.cluster_id.as_deref(), Some("c9"));
}

#[test]
fn imported_offsets_sort_chronologically() {
    let cloud = test_cloud(vec![]);
    let doc = json!([
        {"id": "tokyo", "text": "early", "createdAt": "2024-05-01T09:00:00+09:00"},
        {"id": "utc", "text": "late", "createdAt": "2024-05-01T05:00:00Z"}
    ]);

    cloud.import_json(&doc.to_string()).unwrap();

    let conn = cloud.db();
    let ids: Vec<String> = fragments::list_fragments(&conn)
        .unwrap()
        .into_iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(ids, ["tokyo", "utc"]);
    let newest = fragments::recent_fragments(&conn, 1).unwrap();
    assert_eq!(newest[0].id, "utc");
    assert_eq!(newest[0].created_at, "2024-05-01T05:00:00.000Z");
}
