/// Slug used when a text has nothing to slugify.
pub const EMPTY_SLUG: &str = "n-a";

/// Lowercases `text`, collapses every run of non-alphanumeric characters into a
/// single `-` and trims dashes from both ends. Never empty: text without any
/// alphanumeric character gives [`EMPTY_SLUG`].
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        return EMPTY_SLUG.to_string();
    }
    slug
}
