use super::{push_sort_and_window, SqliteRepository};
use crate::database::{PageCriteria, PageQuery, PageRepository};
use crate::domain::page::{PAGE_ROUTE_CMS_NAME, PAGE_ROUTE_INTERNAL_PREFIX};
use crate::domain::Page;
use crate::error::Result;
use crate::features::pages::model::DbPage;
use async_trait::async_trait;
use sqlx::{Executor, QueryBuilder, Sqlite};

const PAGE_COLUMNS: &str = "id, site_id, parent_id, name, slug, url, route_name, page_alias, \
                            enabled, edited, position, created_at, updated_at";

async fn upsert_page<'e, E>(executor: E, db_page: &DbPage) -> sqlx::Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO pages (
            id, site_id, parent_id, name, slug, url, route_name, page_alias,
            enabled, edited, position, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            site_id = excluded.site_id,
            parent_id = excluded.parent_id,
            name = excluded.name,
            slug = excluded.slug,
            url = excluded.url,
            route_name = excluded.route_name,
            page_alias = excluded.page_alias,
            enabled = excluded.enabled,
            edited = excluded.edited,
            position = excluded.position,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&db_page.id)
    .bind(&db_page.site_id)
    .bind(&db_page.parent_id)
    .bind(&db_page.name)
    .bind(&db_page.slug)
    .bind(&db_page.url)
    .bind(&db_page.route_name)
    .bind(&db_page.page_alias)
    .bind(db_page.enabled)
    .bind(db_page.edited)
    .bind(db_page.position)
    .bind(db_page.created_at)
    .bind(db_page.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

fn push_page_filters(builder: &mut QueryBuilder<'_, Sqlite>, criteria: &PageCriteria) {
    if let Some(enabled) = criteria.enabled {
        builder.push(" AND enabled = ").push_bind(enabled);
    }
    if let Some(edited) = criteria.edited {
        builder.push(" AND edited = ").push_bind(edited);
    }
    if let Some(site_id) = &criteria.site_id {
        builder.push(" AND site_id = ").push_bind(site_id.clone());
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
impl PageRepository for SqliteRepository {
    async fn get_page(&self, id: &str) -> Result<Option<Page>> {
        let db_page = sqlx::query_as::<_, DbPage>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(db_page.map(Page::from))
    }

    async fn get_pages_by_site(&self, site_id: &str) -> Result<Vec<Page>> {
        let db_pages = sqlx::query_as::<_, DbPage>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE site_id = ? ORDER BY position, rowid"
        ))
        .bind(site_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(db_pages.into_iter().map(Page::from).collect())
    }

    async fn get_page_by_url(&self, site_id: &str, url: &str) -> Result<Option<Page>> {
        let db_page = sqlx::query_as::<_, DbPage>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE site_id = ? AND url = ?"
        ))
        .bind(site_id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(db_page.map(Page::from))
    }

    async fn get_hybrid_pages(&self, site_id: &str) -> Result<Vec<Page>> {
        // substr instead of LIKE: the internal prefix is full of `_` wildcards
        let db_pages = sqlx::query_as::<_, DbPage>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages
             WHERE site_id = ? AND route_name <> ? AND substr(route_name, 1, ?) <> ?
             ORDER BY position, rowid"
        ))
        .bind(site_id)
        .bind(PAGE_ROUTE_CMS_NAME)
        .bind(PAGE_ROUTE_INTERNAL_PREFIX.len() as i64)
        .bind(PAGE_ROUTE_INTERNAL_PREFIX)
        .fetch_all(&self.pool)
        .await?;

        Ok(db_pages.into_iter().map(Page::from).collect())
    }

    async fn list_pages(&self, query: &PageQuery) -> Result<(Vec<Page>, i64)> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM pages WHERE 1 = 1");
        push_page_filters(&mut count, &query.criteria);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {PAGE_COLUMNS} FROM pages WHERE 1 = 1"));
        push_page_filters(&mut select, &query.criteria);
        push_sort_and_window(&mut select, query);

        let db_pages = select
            .build_query_as::<DbPage>()
            .fetch_all(&self.pool)
            .await?;

        Ok((db_pages.into_iter().map(Page::from).collect(), total))
    }

    async fn save_page(&self, page: &Page) -> Result<()> {
        upsert_page(&self.pool, &DbPage::from(page)).await?;
        Ok(())
    }

    async fn save_pages(&self, pages: &[Page]) -> Result<()> {
        // dropping an uncommitted transaction rolls it back
        let mut tx = self.pool.begin().await?;
        for page in pages {
            upsert_page(&mut *tx, &DbPage::from(page)).await?;
        }
        tx.commit().await?;

        tracing::debug!(count = pages.len(), "saved pages");
        Ok(())
    }
}
