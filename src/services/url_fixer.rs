use crate::domain::slug::slugify;
use crate::domain::{Page, Tree};

/// Recomputes the url of `page_id` and of every page below it, parents first.
///
/// Internal pages lose their url and hybrid pages keep theirs, but the walk
/// still continues into their children.
pub fn fix_url(pages: &mut Tree<Page>, page_id: &str) {
    for id in pages.subtree_ids(page_id) {
        // None: no parent. Some(None): a parent without a known url.
        let parent_url = pages
            .get(&id)
            .and_then(|page| page.parent_id.clone())
            .map(|parent_id| pages.get(&parent_id).and_then(|parent| parent.url.clone()));

        if let Some(page) = pages.get_mut(&id) {
            fix_page_url(page, parent_url);
        }
    }
}

/// Recomputes the url of a single page given its parent's url.
pub fn fix_page_url(page: &mut Page, parent_url: Option<Option<String>>) {
    if page.is_internal() {
        page.url = None;
        return;
    }

    if page.is_hybrid() {
        return;
    }

    match parent_url {
        Some(parent_url) => {
            if page.slug.as_deref().is_none_or(str::is_empty) {
                page.slug = Some(slugify(&page.name));
            }
            let slug = page.slug.as_deref().unwrap_or_default();
            page.url = Some(format!("{}{}", base_url(parent_url.as_deref()), slug));
        }
        None => {
            // top-level pages carry no slug, so their url is always "/"
            page.slug = None;
            page.url = Some("/".to_string());
        }
    }
}

/// The parent's url with exactly one trailing `/`.
pub fn base_url(parent_url: Option<&str>) -> String {
    match parent_url {
        Some(url) if url.ends_with('/') => url.to_string(),
        Some(url) => format!("{url}/"),
        None => "/".to_string(),
    }
}
