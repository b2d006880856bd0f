use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A server-side basket. One is created per purchase attempt and never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    /// Opaque identifier handed to the checkout widget.
    pub ident: String,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub base_price: Decimal,
    #[serde(default)]
    pub sales_tax: Decimal,
    #[serde(default)]
    pub total_price: Decimal,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub packages: Vec<BasketPackage>,
    /// Set once the buyer has logged in on username-based stores.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub creator_code: Option<String>,
    #[serde(default)]
    pub links: BasketLinks,
}

impl Basket {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.packages.iter().map(|p| p.in_basket.quantity).sum()
    }

    #[must_use]
    pub fn contains(&self, package_id: i64) -> bool {
        self.packages.iter().any(|p| p.id == package_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketLinks {
    /// Hosted checkout page for this basket.
    #[serde(default)]
    pub checkout: Option<String>,
}

/// A login provider for a basket on stores that require a username before
/// checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketPackage {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub in_basket: InBasket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InBasket {
    pub quantity: u32,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub gift_username_id: Option<i64>,
}
