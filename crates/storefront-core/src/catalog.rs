//! Catalog model as served by the commerce platform.
//!
//! Prices arrive as JSON numbers (`10.0`, `7.5`) and are held as
//! [`Decimal`] so display and discount math never drift.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::slug::slugify;

/// A purchasable package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: i64,
    pub name: String,
    /// Rich-text HTML description.
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub package_type: Option<String>,
    pub base_price: Decimal,
    /// Sale price, `null` when the package is not discounted.
    #[serde(default)]
    pub sales_price: Option<Decimal>,
    pub currency: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub disable_quantity: bool,
    #[serde(default)]
    pub disable_gifting: bool,
    #[serde(default)]
    pub category: Option<CategoryRef>,
}

impl Package {
    /// The sale price, if it actually undercuts the base price.
    #[must_use]
    pub fn effective_sale_price(&self) -> Option<Decimal> {
        self.sales_price.filter(|sale| *sale < self.base_price)
    }

    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.effective_sale_price().is_some()
    }

    /// Sale price when discounted, base price otherwise.
    #[must_use]
    pub fn display_price(&self) -> Decimal {
        self.effective_sale_price().unwrap_or(self.base_price)
    }

    /// Whole-number discount, rounded half up; `0` when not discounted.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        let Some(sale) = self.effective_sale_price() else {
            return 0;
        };
        if self.base_price <= Decimal::ZERO {
            return 0;
        }
        let ratio = (Decimal::ONE - sale / self.base_price) * Decimal::ONE_HUNDRED;
        ratio
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0)
    }

    /// Amount saved against the base price; `None` when not discounted.
    #[must_use]
    pub fn savings(&self) -> Option<Decimal> {
        self.effective_sale_price().map(|sale| self.base_price - sale)
    }

    /// Badge text such as `-25%`, or `None` when not discounted.
    #[must_use]
    pub fn discount_badge(&self) -> Option<String> {
        self.has_discount()
            .then(|| format!("-{}%", self.discount_percent()))
    }

    /// Price formatted with two decimals, e.g. `7.50`.
    #[must_use]
    pub fn formatted_display_price(&self) -> String {
        format!("{:.2}", self.display_price())
    }

    /// Plain-text preview of the HTML description.
    #[must_use]
    pub fn description_preview(&self) -> String {
        strip_html(&self.description)
    }

    #[must_use]
    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().map(|c| c.id)
    }
}

/// The owning category embedded in a package payload. Only identity and name
/// are kept; the platform may send the full category object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Ordering hint; lower sorts first.
    #[serde(default)]
    pub order: i32,
    /// Only populated when the listing was requested with packages included.
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl Category {
    /// Route slug derived from the name. Recomputed on every call.
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Webstore metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webstore {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub webstore_url: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// The joined result of one catalog load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    categories: Vec<Category>,
    packages: Vec<Package>,
}

impl Catalog {
    /// Builds a catalog, ordering categories stably by their ordering hint.
    #[must_use]
    pub fn new(mut categories: Vec<Category>, packages: Vec<Package>) -> Self {
        categories.sort_by_key(|c| c.order);
        Self {
            categories,
            packages,
        }
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Packages owned by `category_id`, in catalog order.
    #[must_use]
    pub fn packages_in(&self, category_id: i64) -> Vec<&Package> {
        self.packages
            .iter()
            .filter(|p| p.category_id() == Some(category_id))
            .collect()
    }

    #[must_use]
    pub fn package(&self, package_id: i64) -> Option<&Package> {
        self.packages.iter().find(|p| p.id == package_id)
    }
}

/// Strip HTML tags from a string and normalize whitespace.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                // Tags separate words even when the markup has no whitespace.
                out.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
