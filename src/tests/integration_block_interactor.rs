use crate::database::{BlockCriteria, BlockRepository, SortDirection};
use crate::database::sqlite::SqliteRepository;
use crate::domain::block::BlockPosition;
use crate::error::PageTreeError;
use crate::services::block_interactor::{
    ContainerValues, DEFAULT_CONTAINER_CODE, DEFAULT_CONTAINER_NAME,
};
use crate::services::{BlockInteractor, TreeSession};
use crate::tests::common::{mock_block, setup_test_db};
use serde_json::json;

async fn setup_interactor() -> (BlockInteractor, SqliteRepository) {
    let db = setup_test_db().await;
    (BlockInteractor::new(Box::new(db.clone())), db)
}

fn position(id: &str, position: i64, parent_id: Option<&str>, page_id: Option<&str>) -> BlockPosition {
    BlockPosition {
        id: Some(id.to_string()),
        position: Some(position),
        parent_id: parent_id.map(str::to_string),
        page_id: page_id.map(str::to_string),
    }
}

#[tokio::test]
async fn test_save_blocks_position_skips_incomplete_and_foreign_entries() {
    let (interactor, db) = setup_interactor().await;
    db.save_blocks(&[
        mock_block("main", "page-1", None),
        mock_block("sidebar", "page-1", None),
        mock_block("text", "page-1", Some("main")),
        mock_block("image", "page-1", Some("main")),
        mock_block("other-page", "page-2", None),
    ])
    .await
    .unwrap();

    let applied = interactor
        .save_blocks_position(&[
            position("text", 2, Some("sidebar"), Some("page-1")),
            // no parent
            position("image", 9, None, Some("page-1")),
            // parent on another page
            position("image", 9, Some("other-page"), Some("page-1")),
            BlockPosition::default(),
        ])
        .await
        .unwrap();

    assert_eq!(applied, 1);
    let text = interactor.get_block("text").await.unwrap().unwrap();
    assert_eq!(text.parent_id.as_deref(), Some("sidebar"));
    assert_eq!(text.position, 2);
    let image = interactor.get_block("image").await.unwrap().unwrap();
    assert_eq!(image.parent_id.as_deref(), Some("main"));
    assert_eq!(image.position, 1);
}

#[tokio::test]
async fn test_save_blocks_position_with_nothing_to_do() {
    let (interactor, _) = setup_interactor().await;
    assert_eq!(interactor.save_blocks_position(&[]).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_container_with_defaults() {
    let (interactor, db) = setup_interactor().await;

    let container = interactor
        .create_new_container(ContainerValues::default())
        .await
        .unwrap();

    assert!(container.is_container());
    assert_eq!(container.name, DEFAULT_CONTAINER_NAME);
    assert_eq!(container.setting("code"), Some(&json!(DEFAULT_CONTAINER_CODE)));
    assert!(container.enabled);
    assert_eq!(container.page_id, None);

    let stored = db.get_block(&container.id).await.unwrap().unwrap();
    assert_eq!(stored.name, container.name);
    assert_eq!(stored.settings, container.settings);
}

#[tokio::test]
async fn test_create_container_named_after_code() {
    let (interactor, _) = setup_interactor().await;

    let container = interactor
        .create_new_container(ContainerValues {
            code: Some("header".to_string()),
            page_id: Some("page-1".to_string()),
            position: Some(4),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(container.name, "header");
    assert_eq!(container.page_id.as_deref(), Some("page-1"));
    assert_eq!(container.position, 4);
}

#[tokio::test]
async fn test_create_container_inherits_parent_page() {
    let (interactor, db) = setup_interactor().await;
    db.save_block(&mock_block("layout", "page-1", None)).await.unwrap();

    let container = interactor
        .create_new_container(ContainerValues {
            parent_id: Some("layout".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(container.page_id.as_deref(), Some("page-1"));
    assert_eq!(container.parent_id.as_deref(), Some("layout"));
}

#[tokio::test]
async fn test_create_container_rejects_parent_on_other_page() {
    let (interactor, db) = setup_interactor().await;
    db.save_block(&mock_block("layout", "page-1", None)).await.unwrap();

    let result = interactor
        .create_new_container(ContainerValues {
            parent_id: Some("layout".to_string()),
            page_id: Some("page-2".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(PageTreeError::InvalidArgument(_))));

    let missing_parent = interactor
        .create_new_container(ContainerValues {
            parent_id: Some("ghost".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(missing_parent, Err(PageTreeError::NotFound { .. })));
}

#[tokio::test]
async fn test_create_container_alter_hook_runs_before_save() {
    let (interactor, db) = setup_interactor().await;

    let container = interactor
        .create_new_container_with(ContainerValues::default(), |block| {
            block.enabled = false;
            block
                .settings
                .insert("layout".to_string(), json!("two-columns"));
        })
        .await
        .unwrap();

    let stored = db.get_block(&container.id).await.unwrap().unwrap();
    assert!(!stored.enabled);
    assert_eq!(stored.setting("layout"), Some(&json!("two-columns")));
}

#[tokio::test]
async fn test_load_page_blocks() {
    let (interactor, db) = setup_interactor().await;
    db.save_blocks(&[
        mock_block("main", "page-1", None),
        mock_block("text", "page-1", Some("main")),
        mock_block("footer", "page-1", None),
        mock_block("elsewhere", "page-2", None),
    ])
    .await
    .unwrap();

    let session = TreeSession::new();
    let tree = interactor.load_page_blocks(&session, "page-1").await.unwrap();

    assert_eq!(tree.len(), 3);
    assert_eq!(
        tree.roots().map(|b| b.id.as_str()).collect::<Vec<_>>(),
        vec!["main", "footer"]
    );
    assert_eq!(tree.children_of("main").count(), 1);

    let again = interactor.load_page_blocks(&session, "page-1").await.unwrap();
    assert!(again.is_empty());

    assert_eq!(interactor.get_blocks_by_page("page-1").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_pager() {
    let (interactor, db) = setup_interactor().await;
    let mut text = mock_block("text", "page-1", Some("main"));
    text.block_type = "text".to_string();
    text.position = 3;
    let mut footer = mock_block("footer", "page-1", None);
    footer.position = 2;
    db.save_blocks(&[mock_block("main", "page-1", None), text, footer])
        .await
        .unwrap();

    let containers = interactor
        .get_pager(
            BlockCriteria {
                block_type: Some("container".to_string()),
                ..Default::default()
            },
            1,
            10,
            &[],
        )
        .await
        .unwrap();
    assert_eq!(containers.total, 2);
    assert_eq!(
        containers.items.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
        vec!["main", "footer"]
    );

    let by_name = interactor
        .get_pager(
            BlockCriteria::default(),
            2,
            2,
            &[("name".to_string(), SortDirection::Asc)],
        )
        .await
        .unwrap();
    assert_eq!(by_name.last_page, 2);
    assert_eq!(by_name.items.len(), 1);
    assert_eq!(by_name.items[0].id, "text");

    let bad_sort = interactor
        .get_pager(BlockCriteria::default(), 1, 10, &[("settings".to_string(), SortDirection::Asc)])
        .await;
    assert!(matches!(bad_sort, Err(PageTreeError::InvalidArgument(_))));
}
