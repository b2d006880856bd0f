//! Category slug resolution for `{route_prefix}/{slug}` routes.
//!
//! Slugs are lookup keys only. They are recomputed from the live catalog on
//! every resolution and never cached, so a renamed category is picked up on
//! the next load.

use crate::catalog::Category;
use crate::CoreError;

/// Outcome of resolving a category route against the current catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The slug names a category.
    Found(&'a Category),
    /// Unknown or missing slug; navigate to `path`. `replace` asks the router
    /// to replace the current history entry instead of pushing a new one.
    Redirect { path: String, replace: bool },
    /// No categories exist; render an empty product list without redirecting.
    Empty,
}

/// Finds the first category, in catalog order, whose derived slug equals `slug`.
///
/// Two categories that normalize to the same slug are not disambiguated; the
/// earlier one always wins.
///
/// # Errors
///
/// Returns [`CoreError::ResolutionMiss`] when no category matches.
pub fn resolve<'a>(slug: &str, categories: &'a [Category]) -> Result<&'a Category, CoreError> {
    categories
        .iter()
        .find(|c| c.slug() == slug)
        .ok_or_else(|| CoreError::ResolutionMiss(slug.to_owned()))
}

/// Applies the routing policy: a hit renders the category, a miss (or a
/// missing slug) redirects to the first category with history replacement,
/// and an empty catalog renders nothing.
#[must_use]
pub fn resolve_route<'a>(
    slug: Option<&str>,
    categories: &'a [Category],
    route_prefix: &str,
) -> Resolution<'a> {
    let Some(first) = categories.first() else {
        return Resolution::Empty;
    };

    if let Some(slug) = slug {
        match resolve(slug, categories) {
            Ok(category) => return Resolution::Found(category),
            Err(e) => tracing::debug!(error = %e, "redirecting to first category"),
        }
    }

    Resolution::Redirect {
        path: category_path(route_prefix, first),
        replace: true,
    }
}

/// Route for a category, e.g. `/tienda/rangos`.
#[must_use]
pub fn category_path(route_prefix: &str, category: &Category) -> String {
    format!("{route_prefix}/{}", category.slug())
}
