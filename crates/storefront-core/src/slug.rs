use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Generate a URL-safe slug from a display name.
///
/// Diacritics are stripped by canonical decomposition (`é` → `e`), then every
/// run of characters that is not ASCII alphanumeric collapses into a single
/// `-`. Leading and trailing separators are trimmed.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}
