use crate::database::{PageCriteria, PageQuery, Pager, SortDirection, PAGE_SORT_FIELDS};
use crate::domain::block::BlockPosition;
use crate::domain::document::{JsonBlock, JsonPage, block_tree_to_json, page_tree_to_json};
use crate::domain::snapshot::{SnapshotCriteria, SnapshotLookup};
use crate::domain::{Block, Page, Snapshot, Tree};
use crate::error::PageTreeError;
use crate::features::blocks::model::DbBlock;
use crate::features::pages::model::DbPage;
use crate::features::snapshots::model::{DbSnapshot, JsonSnapshot};
use crate::tests::common::{mock_block, mock_page, mock_snapshot, ts};
use serde_json::json;
use std::collections::HashMap;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_db_page_conversion_keeps_stored_fields() {
    let mut page = mock_page("p1", "site-1", Some("root"));
    page.url = Some("/about".to_string());
    page.children = vec!["ignored".to_string()];

    let db_page = DbPage::from(&page);
    assert_eq!(db_page.to_string(), "p1");

    let back = Page::from(db_page);
    assert_eq!(back.url.as_deref(), Some("/about"));
    assert_eq!(back.parent_id.as_deref(), Some("root"));
    assert!(back.children.is_empty());
}

#[test]
fn test_json_page_flags() {
    let cms = mock_page("cms", "site-1", None);
    let mut internal = mock_page("internal", "site-1", None);
    internal.route_name = "_page_internal_error_404".to_string();
    let mut hybrid = mock_page("hybrid", "site-1", None);
    hybrid.route_name = "catalog_index".to_string();

    let cms = JsonPage::from(&cms);
    assert!(!cms.is_internal && !cms.is_hybrid);

    let internal = JsonPage::from(&internal);
    assert!(internal.is_internal);
    assert!(!internal.is_hybrid);

    let hybrid = JsonPage::from(&hybrid);
    assert!(!hybrid.is_internal);
    assert!(hybrid.is_hybrid);
}

#[test]
fn test_json_page_serializes_camel_case() {
    let page = mock_page("p1", "site-1", None);

    let value = serde_json::to_value(JsonPage::from(&page)).unwrap();

    assert_eq!(value["siteId"], "site-1");
    assert_eq!(value["routeName"], "page_slug");
    assert_eq!(value["createdAt"], "2024-01-01 12:00:00");
    assert!(value.get("children").is_none());
}

#[test]
fn test_page_tree_to_json_nests_children() {
    let tree = Tree::assemble(vec![
        mock_page("root", "site-1", None),
        mock_page("a", "site-1", Some("root")),
        mock_page("b", "site-1", Some("a")),
    ]);

    let json = page_tree_to_json(&tree);

    assert_eq!(json.len(), 1);
    assert_eq!(json[0].children[0].id, "a");
    assert_eq!(json[0].children[0].children[0].id, "b");
}

#[test]
fn test_db_block_settings_are_json_text() {
    let block = mock_block("b1", "page-1", None);

    let db_block = DbBlock::from(&block);
    assert_eq!(db_block.settings, r#"{"code":"b1"}"#);
    assert_eq!(db_block.to_string(), "b1 (container)");

    let back = Block::try_from(db_block).unwrap();
    assert_eq!(back.setting("code"), Some(&json!("b1")));
}

#[test]
fn test_db_block_with_malformed_settings_fails() {
    let mut db_block = DbBlock::from(&mock_block("b1", "page-1", None));
    db_block.settings = "{not json".to_string();

    let result = Block::try_from(db_block);

    assert!(matches!(result, Err(PageTreeError::Serialization(_))));
}

#[test]
fn test_json_block_uses_type_key() {
    let tree = Tree::assemble(vec![
        mock_block("header", "page-1", None),
        mock_block("logo", "page-1", Some("header")),
    ]);

    let json = block_tree_to_json(&tree);
    let value = serde_json::to_value(&json).unwrap();

    assert_eq!(value[0]["type"], "container");
    assert_eq!(value[0]["children"][0]["id"], "logo");

    let single = JsonBlock::from(&mock_block("x", "page-1", None));
    assert_eq!(single.settings["code"], "x");
}

#[test]
fn test_snapshot_conversions() {
    let mut snapshot = mock_snapshot("s1", "page-1", "2024-01-01 10:00:00");
    snapshot.publication_date_start = Some(ts("2024-01-02 00:00:00"));

    let db_snapshot = DbSnapshot::from(&snapshot);
    let back = Snapshot::try_from(db_snapshot).unwrap();
    assert_eq!(back, snapshot);

    let json = JsonSnapshot::from(&snapshot);
    assert_eq!(json.publication_date_start.as_deref(), Some("2024-01-02 00:00:00"));
    assert_eq!(json.publication_date_end, None);
    assert_eq!(json.content["page"]["id"], "page-1");
}

#[test]
fn test_criteria_needs_exactly_one_lookup_key() {
    let none = SnapshotCriteria::from_params(&params(&[]));
    assert!(matches!(none, Err(PageTreeError::InvalidCriteria(_))));

    let only_site = SnapshotCriteria::from_params(&params(&[("site", "site-1")]));
    assert!(matches!(only_site, Err(PageTreeError::InvalidCriteria(_))));

    let two = SnapshotCriteria::from_params(&params(&[("url", "/"), ("name", "Home")]));
    assert!(matches!(two, Err(PageTreeError::InvalidCriteria(_))));

    let unknown = SnapshotCriteria::from_params(&params(&[("slug", "home")]));
    assert!(matches!(unknown, Err(PageTreeError::InvalidCriteria(_))));
}

#[test]
fn test_criteria_with_site_filter() {
    let criteria =
        SnapshotCriteria::from_params(&params(&[("url", "/about"), ("site", "site-1")])).unwrap();

    assert_eq!(criteria.lookup, SnapshotLookup::Url("/about".to_string()));
    assert_eq!(criteria.lookup.column(), "url");
    assert_eq!(criteria.site_id.as_deref(), Some("site-1"));

    let any_site = SnapshotCriteria::new(SnapshotLookup::PageId("about".to_string()));
    assert_eq!(any_site.site_id, None);
    assert_eq!(any_site.with_site("site-1").site_id.as_deref(), Some("site-1"));
}

#[test]
fn test_block_position_validation() {
    let complete = BlockPosition {
        id: Some("b1".into()),
        position: Some(2),
        parent_id: Some("c1".into()),
        page_id: Some("page-1".into()),
    };
    let update = complete.validated().unwrap();
    assert_eq!(update.id, "b1");
    assert_eq!(update.position, 2);

    let no_position = BlockPosition {
        position: None,
        ..complete.clone()
    };
    assert!(no_position.validated().is_none());

    let empty_parent = BlockPosition {
        parent_id: Some(String::new()),
        ..complete.clone()
    };
    assert!(empty_parent.validated().is_none());

    let from_wire: BlockPosition =
        serde_json::from_value(json!({ "id": "b1", "position": 3, "parentId": "c1", "pageId": "p" }))
            .unwrap();
    assert!(from_wire.validated().is_some());
}

#[test]
fn test_block_positions_from_loose_entries() {
    let entries = vec![
        json!({ "id": "b1", "position": 3, "parentId": "c1", "pageId": "p" }),
        json!({ "id": "b2", "position": "oops", "parentId": "c1", "pageId": "p" }),
        json!("not an entry"),
        json!({ "id": "b3" }),
    ];

    let positions = BlockPosition::from_entries(entries);

    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].id.as_deref(), Some("b1"));
    assert!(positions[1].validated().is_none());
}

#[test]
fn test_pager_last_page() {
    assert_eq!(Pager::new(vec![1, 2, 3], 1, 3, 7).last_page, 3);
    assert_eq!(Pager::new(Vec::<i32>::new(), 1, 10, 0).last_page, 1);

    let mapped = Pager::new(vec![1], 2, 1, 2).map(|n| n * 10);
    assert_eq!(mapped.items, vec![10]);
    assert_eq!(mapped.last_page, 2);
}

#[test]
fn test_list_query_validation() {
    let query = PageQuery::new(
        PageCriteria::default(),
        3,
        20,
        &[],
        &PAGE_SORT_FIELDS,
        ("name", SortDirection::Asc),
    )
    .unwrap();
    assert_eq!(query.offset, 40);
    assert_eq!(query.sort, vec![("name", SortDirection::Asc)]);

    let unknown = PageQuery::new(
        PageCriteria::default(),
        1,
        20,
        &[("rowid".to_string(), SortDirection::Asc)],
        &PAGE_SORT_FIELDS,
        ("name", SortDirection::Asc),
    );
    assert!(matches!(unknown, Err(PageTreeError::InvalidArgument(_))));
}
