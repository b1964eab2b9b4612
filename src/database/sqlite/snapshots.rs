use super::{push_sort_and_window, SqliteRepository};
use crate::database::{SnapshotListCriteria, SnapshotQuery, SnapshotRepository};
use crate::domain::snapshot::SnapshotCriteria;
use crate::domain::Snapshot;
use crate::error::Result;
use crate::features::snapshots::model::DbSnapshot;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Executor, QueryBuilder, Sqlite};
use std::collections::BTreeSet;

const SNAPSHOT_COLUMNS: &str = "id, page_id, site_id, parent_id, route_name, url, page_alias, name, \
                                enabled, content, publication_date_start, publication_date_end, \
                                created_at";

async fn upsert_snapshot<'e, E>(executor: E, db_snapshot: &DbSnapshot) -> sqlx::Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO snapshots (
            id, page_id, site_id, parent_id, route_name, url, page_alias, name,
            enabled, content, publication_date_start, publication_date_end, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            parent_id = excluded.parent_id,
            route_name = excluded.route_name,
            url = excluded.url,
            page_alias = excluded.page_alias,
            name = excluded.name,
            enabled = excluded.enabled,
            content = excluded.content,
            publication_date_start = excluded.publication_date_start,
            publication_date_end = excluded.publication_date_end
        "#,
    )
    .bind(&db_snapshot.id)
    .bind(&db_snapshot.page_id)
    .bind(&db_snapshot.site_id)
    .bind(&db_snapshot.parent_id)
    .bind(&db_snapshot.route_name)
    .bind(&db_snapshot.url)
    .bind(&db_snapshot.page_alias)
    .bind(&db_snapshot.name)
    .bind(db_snapshot.enabled)
    .bind(&db_snapshot.content)
    .bind(db_snapshot.publication_date_start)
    .bind(db_snapshot.publication_date_end)
    .bind(db_snapshot.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

fn push_snapshot_filters(builder: &mut QueryBuilder<'_, Sqlite>, criteria: &SnapshotListCriteria) {
    if let Some(enabled) = criteria.enabled {
        builder.push(" AND enabled = ").push_bind(enabled);
    }
    if let Some(site_id) = &criteria.site_id {
        builder.push(" AND site_id = ").push_bind(site_id.clone());
    }
    if let Some(page_id) = &criteria.page_id {
        builder.push(" AND page_id = ").push_bind(page_id.clone());
    }
    if let Some(parent_id) = &criteria.parent_id {
        builder.push(" AND parent_id = ").push_bind(parent_id.clone());
    }
    match criteria.root {
        Some(true) => {
            builder.push(" AND parent_id IS NULL");
        }
        Some(false) => {
            builder.push(" AND parent_id IS NOT NULL");
        }
        None => {}
    }
}

#[async_trait]
impl SnapshotRepository for SqliteRepository {
    async fn get_snapshot(&self, id: &str) -> Result<Option<Snapshot>> {
        let db_snapshot = sqlx::query_as::<_, DbSnapshot>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        db_snapshot.map(Snapshot::try_from).transpose()
    }

    async fn get_snapshots_by_page(&self, page_id: &str) -> Result<Vec<Snapshot>> {
        let db_snapshots = sqlx::query_as::<_, DbSnapshot>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE page_id = ? ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        db_snapshots.into_iter().map(Snapshot::try_from).collect()
    }

    async fn list_snapshots(&self, query: &SnapshotQuery) -> Result<(Vec<Snapshot>, i64)> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM snapshots WHERE 1 = 1");
        push_snapshot_filters(&mut count, &query.criteria);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE 1 = 1"
        ));
        push_snapshot_filters(&mut select, &query.criteria);
        push_sort_and_window(&mut select, query);

        let db_snapshots = select
            .build_query_as::<DbSnapshot>()
            .fetch_all(&self.pool)
            .await?;
        let snapshots = db_snapshots
            .into_iter()
            .map(Snapshot::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok((snapshots, total))
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        upsert_snapshot(&self.pool, &DbSnapshot::from(snapshot)).await?;
        Ok(())
    }

    async fn activate_snapshots(&self, snapshots: &[Snapshot], as_of: NaiveDateTime) -> Result<u64> {
        if snapshots.is_empty() {
            return Ok(0);
        }

        let page_ids: BTreeSet<&str> = snapshots.iter().map(|s| s.page_id.as_str()).collect();

        // open and close in one transaction so readers never see zero or two
        // live snapshots for a page
        let mut tx = self.pool.begin().await?;

        for snapshot in snapshots {
            upsert_snapshot(&mut *tx, &DbSnapshot::from(snapshot)).await?;
        }

        let mut close = QueryBuilder::<Sqlite>::new("UPDATE snapshots SET publication_date_end = ");
        close.push_bind(as_of).push(" WHERE page_id IN (");
        {
            let mut separated = close.separated(", ");
            for page_id in &page_ids {
                separated.push_bind(page_id.to_string());
            }
        }
        close.push(") AND id NOT IN (");
        {
            let mut separated = close.separated(", ");
            for snapshot in snapshots {
                separated.push_bind(snapshot.id.clone());
            }
        }
        close
            .push(") AND (publication_date_end IS NULL OR publication_date_end > ")
            .push_bind(as_of)
            .push(")");

        let closed = close.build().execute(&mut *tx).await?.rows_affected();

        tx.commit().await?;

        Ok(closed)
    }

    async fn find_active_snapshot(
        &self,
        criteria: &SnapshotCriteria,
        as_of: NaiveDateTime,
    ) -> Result<Option<Snapshot>> {
        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE "));

        select
            .push(criteria.lookup.column())
            .push(" = ")
            .push_bind(criteria.lookup.value().to_string());

        if let Some(site_id) = &criteria.site_id {
            select.push(" AND site_id = ").push_bind(site_id.clone());
        }

        select
            .push(" AND publication_date_start <= ")
            .push_bind(as_of)
            .push(" AND (publication_date_end IS NULL OR publication_date_end >= ")
            .push_bind(as_of)
            .push(") ORDER BY created_at DESC, rowid DESC LIMIT 1");

        let db_snapshot = select
            .build_query_as::<DbSnapshot>()
            .fetch_optional(&self.pool)
            .await?;

        db_snapshot.map(Snapshot::try_from).transpose()
    }

    async fn delete_snapshots_beyond(&self, page_id: &str, keep: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM snapshots
            WHERE page_id = ?
              AND id NOT IN (
                  SELECT id FROM snapshots
                  WHERE page_id = ?
                  ORDER BY publication_date_end IS NULL DESC,
                           publication_date_end DESC,
                           created_at DESC
                  LIMIT ?
              )
            "#,
        )
        .bind(page_id)
        .bind(page_id)
        .bind(keep)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
