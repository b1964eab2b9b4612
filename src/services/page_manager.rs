use crate::config::PageDefaults;
use crate::database::{PageCriteria, PageQuery, PageRepository, Pager, SortDirection, PAGE_SORT_FIELDS};
use crate::domain::page::PageValues;
use crate::domain::{new_id, Page, Tree};
use crate::error::{PageTreeError, Result};
use crate::services::tree_loader::{load_tree, TreeKind, TreeSession};
use crate::services::url_fixer::fix_url;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub struct PageManager {
    repo: Box<dyn PageRepository>,
    defaults: PageDefaults,
}

impl PageManager {
    pub fn new(repo: Box<dyn PageRepository>, defaults: PageDefaults) -> Self {
        Self { repo, defaults }
    }

    /// Builds a new, unsaved page. The route's configured defaults apply when
    /// `values` names a route that has some, the global defaults otherwise;
    /// `values` wins over either.
    pub fn create(&self, values: Map<String, Value>) -> Result<Page> {
        let route_defaults = values
            .get("routeName")
            .and_then(Value::as_str)
            .and_then(|route| self.defaults.page_defaults.get(route));

        let mut merged = match route_defaults {
            Some(route_defaults) => route_defaults.clone(),
            None => self.defaults.defaults.clone(),
        };
        merged.extend(values);

        let values: PageValues = serde_json::from_value(Value::Object(merged))
            .map_err(|e| PageTreeError::InvalidArgument(e.to_string()))?;

        Page::from_values(values, new_id(), Utc::now().naive_utc())
    }

    /// Persists `page`. Unless the page is hybrid, the urls of the page and of
    /// everything below it are recomputed first and the whole subtree is
    /// written in one transaction.
    pub async fn save(&self, mut page: Page) -> Result<Page> {
        page.updated_at = Utc::now().naive_utc();
        page.edited = true;

        if page.is_hybrid() {
            self.repo.save_page(&page).await?;
            tracing::info!(page_id = %page.id, "saved hybrid page");
            return Ok(page);
        }

        let page_id = page.id.clone();
        let mut records = self.repo.get_pages_by_site(&page.site_id).await?;

        if let Some(parent_id) = page.parent_id.as_deref() {
            let current = Tree::assemble(records.clone());
            if parent_id == page_id || current.subtree_ids(&page_id).iter().any(|id| id == parent_id) {
                return Err(PageTreeError::InvalidArgument(format!(
                    "page {page_id} can't be moved below itself"
                )));
            }
        }

        match records.iter_mut().find(|p| p.id == page_id) {
            Some(existing) => *existing = page,
            None => records.push(page),
        }

        let previous_urls: HashMap<String, Option<String>> =
            records.iter().map(|p| (p.id.clone(), p.url.clone())).collect();

        let mut tree = Tree::assemble(records);
        fix_url(&mut tree, &page_id);

        // pages whose url moved need republishing too
        let subtree: Vec<Page> = tree
            .subtree_ids(&page_id)
            .iter()
            .filter_map(|id| tree.get(id).cloned())
            .map(|mut p| {
                if previous_urls.get(&p.id) != Some(&p.url) {
                    p.edited = true;
                }
                p
            })
            .collect();
        self.repo.save_pages(&subtree).await?;

        tracing::info!(page_id = %page_id, pages = subtree.len(), "saved page subtree");

        subtree
            .into_iter()
            .find(|p| p.id == page_id)
            .ok_or_else(|| PageTreeError::not_found("page", page_id))
    }

    /// Clears the edited flag once a page's current state has been published.
    /// Urls are left as they are.
    pub async fn mark_published(&self, mut page: Page) -> Result<Page> {
        if !page.edited {
            return Ok(page);
        }

        page.edited = false;
        self.repo.save_page(&page).await?;
        tracing::debug!(page_id = %page.id, "page marked as published");

        Ok(page)
    }

    pub async fn find(&self, id: &str) -> Result<Page> {
        self.repo
            .get_page(id)
            .await?
            .ok_or_else(|| PageTreeError::not_found("page", id))
    }

    pub async fn get_page_by_url(&self, site_id: &str, url: &str) -> Result<Option<Page>> {
        self.repo.get_page_by_url(site_id, url).await
    }

    pub async fn get_hybrid_pages(&self, site_id: &str) -> Result<Vec<Page>> {
        self.repo.get_hybrid_pages(site_id).await
    }

    /// Loads the page tree of a site, once per session.
    pub async fn load_pages(&self, session: &TreeSession, site_id: &str) -> Result<Tree<Page>> {
        load_tree(session, TreeKind::SitePages, site_id, || {
            self.repo.get_pages_by_site(site_id)
        })
        .await
    }

    /// One page of the pages matching `criteria`. Sorted by name unless `sort`
    /// says otherwise.
    pub async fn get_pager(
        &self,
        criteria: PageCriteria,
        page: u32,
        limit: u32,
        sort: &[(String, SortDirection)],
    ) -> Result<Pager<Page>> {
        let query = PageQuery::new(
            criteria,
            page,
            limit,
            sort,
            &PAGE_SORT_FIELDS,
            ("name", SortDirection::Asc),
        )?;

        let (items, total) = self.repo.list_pages(&query).await?;
        Ok(Pager::new(items, page, limit, total))
    }
}
