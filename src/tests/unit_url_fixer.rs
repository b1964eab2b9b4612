use crate::domain::slug::EMPTY_SLUG;
use crate::domain::{Page, Tree};
use crate::services::url_fixer::{base_url, fix_page_url, fix_url};
use crate::tests::common::mock_page;

fn with_slug(mut page: Page, slug: &str) -> Page {
    page.slug = Some(slug.to_string());
    page
}

fn with_route(mut page: Page, route: &str, url: Option<&str>) -> Page {
    page.route_name = route.to_string();
    page.url = url.map(str::to_string);
    page
}

fn url_of(tree: &Tree<Page>, id: &str) -> Option<String> {
    tree.get(id).and_then(|p| p.url.clone())
}

#[test]
fn test_base_url_has_one_trailing_slash() {
    assert_eq!(base_url(Some("/a/")), "/a/");
    assert_eq!(base_url(Some("/a")), "/a/");
    assert_eq!(base_url(None), "/");
}

#[test]
fn test_child_url_is_parent_base_plus_slug() {
    let mut page = with_slug(mock_page("b", "site-1", Some("a")), "b");

    fix_page_url(&mut page, Some(Some("/a/".to_string())));
    assert_eq!(page.url.as_deref(), Some("/a/b"));

    fix_page_url(&mut page, Some(Some("/a".to_string())));
    assert_eq!(page.url.as_deref(), Some("/a/b"));
}

#[test]
fn test_parent_without_url_gives_root_base() {
    let mut page = with_slug(mock_page("b", "site-1", Some("a")), "b");

    fix_page_url(&mut page, Some(None));

    assert_eq!(page.url.as_deref(), Some("/b"));
}

#[test]
fn test_top_level_page_is_served_at_root() {
    let mut page = with_slug(mock_page("home", "site-1", None), "home");

    fix_page_url(&mut page, None);

    assert_eq!(page.url.as_deref(), Some("/"));
    assert_eq!(page.slug, None);
}

#[test]
fn test_missing_slug_is_derived_from_name() {
    let mut page = mock_page("x", "site-1", Some("root"));
    page.name = "About Us!".to_string();

    fix_page_url(&mut page, Some(Some("/".to_string())));

    assert_eq!(page.slug.as_deref(), Some("about-us"));
    assert_eq!(page.url.as_deref(), Some("/about-us"));
}

#[test]
fn test_name_without_alphanumerics_still_gets_its_own_url() {
    let mut parent = mock_page("a", "site-1", None);
    parent.url = Some("/".to_string());
    let mut child = mock_page("c", "site-1", Some("a"));
    child.name = "???".to_string();
    let mut tree = Tree::assemble(vec![parent, child]);

    fix_url(&mut tree, "a");

    let child = tree.get("c").unwrap();
    assert_eq!(child.slug.as_deref(), Some(EMPTY_SLUG));
    assert_eq!(child.url.as_deref(), Some("/n-a"));
    assert_ne!(url_of(&tree, "c"), url_of(&tree, "a"));
}

#[test]
fn test_fix_url_walks_the_whole_subtree() {
    let mut tree = Tree::assemble(vec![
        mock_page("root", "site-1", None),
        with_slug(mock_page("a", "site-1", Some("root")), "a"),
        with_slug(mock_page("b", "site-1", Some("a")), "b"),
        with_slug(mock_page("c", "site-1", Some("b")), "c"),
    ]);

    fix_url(&mut tree, "root");

    assert_eq!(url_of(&tree, "root").as_deref(), Some("/"));
    assert_eq!(url_of(&tree, "a").as_deref(), Some("/a"));
    assert_eq!(url_of(&tree, "b").as_deref(), Some("/a/b"));
    assert_eq!(url_of(&tree, "c").as_deref(), Some("/a/b/c"));
}

#[test]
fn test_fix_url_only_touches_the_given_subtree() {
    let mut tree = Tree::assemble(vec![
        mock_page("root", "site-1", None),
        with_slug(mock_page("a", "site-1", Some("root")), "a"),
        with_slug(mock_page("other", "site-1", Some("root")), "other"),
    ]);

    fix_url(&mut tree, "a");

    // the parent keeps no url, so "a" hangs off "/"
    assert_eq!(url_of(&tree, "a").as_deref(), Some("/a"));
    assert_eq!(url_of(&tree, "root"), None);
    assert_eq!(url_of(&tree, "other"), None);
}

#[test]
fn test_internal_page_has_no_url_but_children_are_fixed() {
    let mut tree = Tree::assemble(vec![
        mock_page("root", "site-1", None),
        with_route(
            with_slug(mock_page("errors", "site-1", Some("root")), "errors"),
            "_page_internal_error",
            Some("/errors"),
        ),
        with_slug(mock_page("c", "site-1", Some("errors")), "c"),
    ]);

    fix_url(&mut tree, "root");

    assert_eq!(url_of(&tree, "errors"), None);
    assert_eq!(url_of(&tree, "c").as_deref(), Some("/c"));
}

#[test]
fn test_hybrid_page_keeps_its_url_and_children_build_on_it() {
    let mut tree = Tree::assemble(vec![
        mock_page("root", "site-1", None),
        with_route(
            with_slug(mock_page("catalog", "site-1", Some("root")), "ignored"),
            "catalog_index",
            Some("/catalog"),
        ),
        with_slug(mock_page("item", "site-1", Some("catalog")), "item"),
    ]);

    fix_url(&mut tree, "root");

    assert_eq!(url_of(&tree, "catalog").as_deref(), Some("/catalog"));
    assert_eq!(url_of(&tree, "item").as_deref(), Some("/catalog/item"));
}
