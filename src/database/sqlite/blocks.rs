use super::{push_sort_and_window, SqliteRepository};
use crate::database::{BlockCriteria, BlockQuery, BlockRepository};
use crate::domain::block::PositionUpdate;
use crate::domain::Block;
use crate::error::Result;
use crate::features::blocks::model::DbBlock;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Executor, QueryBuilder, Sqlite};

const BLOCK_COLUMNS: &str = "id, page_id, parent_id, block_type, name, settings, position, \
                             enabled, created_at, updated_at";

async fn upsert_block<'e, E>(executor: E, db_block: &DbBlock) -> sqlx::Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO blocks (
            id, page_id, parent_id, block_type, name, settings, position,
            enabled, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            page_id = excluded.page_id,
            parent_id = excluded.parent_id,
            block_type = excluded.block_type,
            name = excluded.name,
            settings = excluded.settings,
            position = excluded.position,
            enabled = excluded.enabled,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&db_block.id)
    .bind(&db_block.page_id)
    .bind(&db_block.parent_id)
    .bind(&db_block.block_type)
    .bind(&db_block.name)
    .bind(&db_block.settings)
    .bind(db_block.position)
    .bind(db_block.enabled)
    .bind(db_block.created_at)
    .bind(db_block.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

fn push_block_filters(builder: &mut QueryBuilder<'_, Sqlite>, criteria: &BlockCriteria) {
    if let Some(enabled) = criteria.enabled {
        builder.push(" AND enabled = ").push_bind(enabled);
    }
    if let Some(block_type) = &criteria.block_type {
        builder.push(" AND block_type = ").push_bind(block_type.clone());
    }
}

fn into_blocks(db_blocks: Vec<DbBlock>) -> Result<Vec<Block>> {
    db_blocks.into_iter().map(Block::try_from).collect()
}

#[async_trait]
impl BlockRepository for SqliteRepository {
    async fn get_block(&self, id: &str) -> Result<Option<Block>> {
        let db_block = sqlx::query_as::<_, DbBlock>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM blocks WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        db_block.map(Block::try_from).transpose()
    }

    async fn get_blocks_by_page(&self, page_id: &str) -> Result<Vec<Block>> {
        let db_blocks = sqlx::query_as::<_, DbBlock>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM blocks WHERE page_id = ? ORDER BY position, rowid"
        ))
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        into_blocks(db_blocks)
    }

    async fn get_all_blocks(&self) -> Result<Vec<Block>> {
        let db_blocks = sqlx::query_as::<_, DbBlock>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM blocks ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_blocks(db_blocks)
    }

    async fn list_blocks(&self, query: &BlockQuery) -> Result<(Vec<Block>, i64)> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM blocks WHERE 1 = 1");
        push_block_filters(&mut count, &query.criteria);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {BLOCK_COLUMNS} FROM blocks WHERE 1 = 1"));
        push_block_filters(&mut select, &query.criteria);
        push_sort_and_window(&mut select, query);

        let db_blocks = select
            .build_query_as::<DbBlock>()
            .fetch_all(&self.pool)
            .await?;

        Ok((into_blocks(db_blocks)?, total))
    }

    async fn save_block(&self, block: &Block) -> Result<()> {
        upsert_block(&self.pool, &DbBlock::from(block)).await?;
        Ok(())
    }

    async fn save_blocks(&self, blocks: &[Block]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for block in blocks {
            upsert_block(&mut *tx, &DbBlock::from(block)).await?;
        }
        tx.commit().await?;

        tracing::debug!(count = blocks.len(), "saved blocks");
        Ok(())
    }

    async fn update_positions(&self, updates: &[PositionUpdate]) -> Result<u64> {
        let now = Utc::now().naive_utc();
        let mut applied = 0;

        let mut tx = self.pool.begin().await?;
        for update in updates {
            // the new parent must live on the same page and can't be the block itself
            let result = sqlx::query(
                r#"
                UPDATE blocks
                SET position = ?, parent_id = ?, page_id = ?, updated_at = ?
                WHERE id = ?
                  AND id <> ?
                  AND EXISTS (
                      SELECT 1 FROM blocks AS parent
                      WHERE parent.id = ? AND parent.page_id = ?
                  )
                "#,
            )
            .bind(update.position)
            .bind(&update.parent_id)
            .bind(&update.page_id)
            .bind(now)
            .bind(&update.id)
            .bind(&update.parent_id)
            .bind(&update.parent_id)
            .bind(&update.page_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tracing::warn!(block_id = %update.id, parent_id = %update.parent_id, "position update matched no block on that page");
            }
            applied += result.rows_affected();
        }
        tx.commit().await?;

        Ok(applied)
    }
}
