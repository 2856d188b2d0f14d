//! URL slugs for cuisines, restaurants, dishes and blog posts.

/// Lowercases `text` and joins its alphanumeric runs with single dashes.
///
/// Non-ASCII letters (Arabic names in particular) are kept as they are, so
/// `"مطعم الشام"` becomes `"مطعم-الشام"`.
#[must_use]
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
    slug
}

/// Returns the explicit slug if one was given, otherwise derives it from `name`.
///
/// The explicit slug is normalized too, so `"Grill House "` and
/// `"grill-house"` end up identical.
#[must_use]
pub fn slug_or_derive(explicit: Option<&str>, name: &str) -> String {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slugify(slug),
        None => slugify(name),
    }
}
