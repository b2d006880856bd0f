//! Read-only catalog commands: `categories`, `browse`, and `show`.

use storefront_checkout::{CategoryView, Storefront};
use storefront_client::CommerceClient;
use storefront_core::{category_path, Package};

type Store = Storefront<CommerceClient>;

pub(crate) async fn run_categories(store: &Store) -> anyhow::Result<()> {
    store.load_catalog().await?;

    let categories = store.categories();
    if categories.is_empty() {
        println!("The store has no categories yet.");
        return Ok(());
    }
    for category in &categories {
        println!(
            "{:<6} {:<28} {:<24} {}",
            category.id,
            category.name,
            category.slug(),
            category_path(store.route_prefix(), category)
        );
    }
    Ok(())
}

/// Lists the packages of the category named by `slug`. An unknown or missing
/// slug follows the redirect to the first category, as the web route does.
pub(crate) async fn run_browse(store: &Store, slug: Option<&str>) -> anyhow::Result<()> {
    store.load_catalog().await?;

    let mut view = store.open_category(slug);
    if let CategoryView::Redirect { path, .. } = &view {
        match slug {
            Some(slug) => println!("No category matches \"{slug}\"; showing {path}"),
            None => println!("Showing {path}"),
        }
        let target = path.rsplit('/').next().unwrap_or_default().to_owned();
        view = store.open_category(Some(&target));
    }

    match view {
        CategoryView::Found { category, packages } => {
            println!("{} ({} packages)", category.name, packages.len());
            for package in &packages {
                println!("{}", package_line(package));
            }
            Ok(())
        }
        CategoryView::Empty => {
            println!("The store has no categories yet.");
            Ok(())
        }
        CategoryView::Failed(message) => anyhow::bail!("catalog unavailable: {message}"),
        CategoryView::Loading | CategoryView::Redirect { .. } => {
            anyhow::bail!("category could not be resolved")
        }
    }
}

pub(crate) async fn run_show(store: &Store, package_id: i64) -> anyhow::Result<()> {
    store.load_catalog().await?;

    let package = store
        .view_details(package_id)
        .ok_or_else(|| anyhow::anyhow!("package {package_id} not found"))?;

    println!("{} (#{})", package.name, package.id);
    if let Some(category) = &package.category {
        println!("Category: {}", category.name);
    }
    match (package.discount_badge(), package.savings()) {
        (Some(badge), Some(saved)) => println!(
            "Price:    {} {} (was {:.2}, {badge}, you save {saved:.2})",
            package.formatted_display_price(),
            package.currency,
            package.base_price
        ),
        _ => println!(
            "Price:    {} {}",
            package.formatted_display_price(),
            package.currency
        ),
    }
    let description = package.description_preview();
    if !description.is_empty() {
        println!();
        println!("{description}");
    }
    store.close_details();
    Ok(())
}

/// One-line summary: id, name, price, and discount badge.
pub(crate) fn package_line(package: &Package) -> String {
    let badge = package
        .discount_badge()
        .map(|b| format!("  {b}"))
        .unwrap_or_default();
    format!(
        "{:>6}  {:<32} {:>8} {}{badge}",
        package.id,
        package.name,
        package.formatted_display_price(),
        package.currency
    )
}
