//! Wire shapes for the commerce platform proxy.
//!
//! ### Envelopes
//! Read endpoints wrap their payload as `{ "data": ... }`. Basket mutation
//! endpoints (add/remove package, coupons, gift cards, creator codes) have been
//! observed returning the basket bare. [`Payload`] accepts either form.
//!
//! ### Lists
//! A list endpoint may answer with a bare array, or `{ "data": null }` / `{}`
//! for an empty store. All of them decode through [`ListEnvelope`].
//!
//! ### Errors
//! Error bodies carry a human message under `error`, sometimes `message`.

use serde::{Deserialize, Serialize};

/// A single object, wrapped in `data` or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Payload::Wrapped { data } | Payload::Bare(data) => data,
        }
    }
}

/// A list, bare or wrapped in `data`. A missing or null `data` is empty.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { data: Option<Vec<T>> },
}

impl<T> ListEnvelope<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Wrapped { data } => data.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Redirect targets for the hosted checkout when a basket is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateBasketOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddPackageRequest {
    pub package_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct RemovePackageRequest {
    pub package_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuantityUpdate {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct CouponRequest<'a> {
    pub coupon_code: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GiftCardRequest<'a> {
    pub card_number: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatorCodeRequest<'a> {
    pub creator_code: &'a str,
}

/// A custom content page of the webstore.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Page {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    /// HTML body.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub disabled: bool,
}

/// A sidebar widget such as top customers or recent payments. The payload
/// shape depends on `module_type`, so it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SidebarModule {
    pub id: i64,
    #[serde(default, rename = "type")]
    pub module_type: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}
