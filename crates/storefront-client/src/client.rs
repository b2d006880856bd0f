//! HTTP client for the commerce platform proxy.
//!
//! Wraps `reqwest` with status classification and typed response
//! deserialization. Calls are never retried here; a failed call surfaces to
//! the caller, which decides whether to offer a retry.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use storefront_core::{AppConfig, AuthLink, Basket, Category, Package, Webstore};

use crate::error::CommerceError;
use crate::types::{
    AddPackageRequest, CouponRequest, CreateBasketOptions, CreatorCodeRequest, ErrorBody,
    GiftCardRequest, ListEnvelope, Page, Payload, QuantityRequest, QuantityUpdate,
    RemovePackageRequest, SidebarModule,
};

/// Client for the commerce platform's catalog and basket endpoints.
///
/// Every request carries the configured timeout so a stalled call ends as
/// [`CommerceError::Network`] instead of hanging.
pub struct CommerceClient {
    client: Client,
    base_url: Url,
}

impl CommerceClient {
    /// Creates a client rooted at `base_url`, which may carry a path prefix
    /// such as `http://localhost:4000/api/tebex`.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Network`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CommerceError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, CommerceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so joined segments land under the prefix.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| CommerceError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(CommerceError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "expected an absolute http(s) URL".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Builds a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`CommerceClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, CommerceError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Fetches webstore metadata (name, currency, language).
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn get_webstore(&self) -> Result<Webstore, CommerceError> {
        self.get(self.endpoint(&["webstore"]), "webstore").await
    }

    /// Lists the store's custom content pages.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn list_pages(&self) -> Result<Vec<Page>, CommerceError> {
        self.get_list(self.endpoint(&["pages"]), "pages").await
    }

    /// Lists sidebar modules (top customers, recent payments, goals).
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn list_sidebar(&self) -> Result<Vec<SidebarModule>, CommerceError> {
        self.get_list(self.endpoint(&["sidebar"]), "sidebar").await
    }

    /// Lists every category in the store, without their packages.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn list_categories(&self) -> Result<Vec<Category>, CommerceError> {
        self.get_list(self.categories_url(&[], false), "categories")
            .await
    }

    /// Lists every category with its packages embedded.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn list_categories_with_packages(&self) -> Result<Vec<Category>, CommerceError> {
        self.get_list(self.categories_url(&[], true), "categories")
            .await
    }

    /// Fetches one category by id.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; a missing category is
    /// [`CommerceError::Client`] with status 404.
    pub async fn get_category(&self, category_id: i64) -> Result<Category, CommerceError> {
        let id = category_id.to_string();
        self.get(
            self.categories_url(&[id.as_str()], false),
            &format!("category {category_id}"),
        )
        .await
    }

    /// Fetches one category with its packages embedded.
    ///
    /// # Errors
    ///
    /// See [`Self::get_category`].
    pub async fn get_category_with_packages(
        &self,
        category_id: i64,
    ) -> Result<Category, CommerceError> {
        let id = category_id.to_string();
        self.get(
            self.categories_url(&[id.as_str()], true),
            &format!("category {category_id}"),
        )
        .await
    }

    /// Lists every package in the store.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::Network`] when no response arrives in time.
    /// - [`CommerceError::Client`] / [`CommerceError::Server`] for 4xx / 5xx.
    /// - [`CommerceError::Deserialize`] if the body has an unexpected shape.
    pub async fn list_packages(&self) -> Result<Vec<Package>, CommerceError> {
        self.get_list(self.endpoint(&["packages"]), "packages").await
    }

    /// Fetches one package by id.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn get_package(&self, package_id: i64) -> Result<Package, CommerceError> {
        let id = package_id.to_string();
        self.get(
            self.endpoint(&["packages", id.as_str()]),
            &format!("package {package_id}"),
        )
        .await
    }

    /// Creates an empty basket.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn create_basket(
        &self,
        options: &CreateBasketOptions,
    ) -> Result<Basket, CommerceError> {
        self.post(self.endpoint(&["baskets"]), options, "create basket")
            .await
    }

    /// Fetches the current state of a basket, including its `complete` flag.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn get_basket(&self, basket_ident: &str) -> Result<Basket, CommerceError> {
        self.get(
            self.endpoint(&["baskets", basket_ident]),
            &format!("basket {basket_ident}"),
        )
        .await
    }

    /// Lists the login providers for a basket. Stores that identify buyers by
    /// username only open checkout once one of these has been followed;
    /// other stores answer with an empty list.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn basket_auth_links(
        &self,
        basket_ident: &str,
        return_url: Option<&str>,
    ) -> Result<Vec<AuthLink>, CommerceError> {
        let mut url = self.endpoint(&["baskets", basket_ident, "auth"]);
        if let Some(return_url) = return_url {
            url.query_pairs_mut().append_pair("returnUrl", return_url);
        }
        self.get_list(url, &format!("auth links for basket {basket_ident}"))
            .await
    }

    /// Adds `quantity` units of a package to a basket.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn add_package(
        &self,
        basket_ident: &str,
        package_id: i64,
        quantity: u32,
    ) -> Result<Basket, CommerceError> {
        self.post(
            self.endpoint(&["baskets", basket_ident, "packages"]),
            &AddPackageRequest {
                package_id,
                quantity,
            },
            &format!("add package {package_id} to basket {basket_ident}"),
        )
        .await
    }

    /// Removes a package line from a basket.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn remove_package(
        &self,
        basket_ident: &str,
        package_id: i64,
    ) -> Result<Basket, CommerceError> {
        self.post(
            self.endpoint(&["baskets", basket_ident, "packages", "remove"]),
            &RemovePackageRequest { package_id },
            &format!("remove package {package_id} from basket {basket_ident}"),
        )
        .await
    }

    /// Sets the quantity of a package line already in a basket. Returns the
    /// platform's success flag; the basket itself is not echoed back.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; see [`Self::list_packages`].
    pub async fn update_package_quantity(
        &self,
        basket_ident: &str,
        package_id: i64,
        quantity: u32,
    ) -> Result<bool, CommerceError> {
        let id = package_id.to_string();
        let url = self.endpoint(&["baskets", basket_ident, "packages", id.as_str()]);
        tracing::debug!(method = "PUT", %url, "commerce request");
        let request = self.client.put(url.clone()).json(&QuantityRequest { quantity });
        let body = self.execute(request, &url).await?;
        let context = format!("update package {package_id} in basket {basket_ident}");
        decode::<Payload<QuantityUpdate>>(&body, &context).map(|p| p.into_inner().success)
    }

    /// Applies a coupon code to a basket.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant; an unknown coupon is a 4xx
    /// [`CommerceError::Client`].
    pub async fn apply_coupon(
        &self,
        basket_ident: &str,
        coupon_code: &str,
    ) -> Result<Basket, CommerceError> {
        self.post(
            self.endpoint(&["baskets", basket_ident, "coupons"]),
            &CouponRequest { coupon_code },
            &format!("apply coupon to basket {basket_ident}"),
        )
        .await
    }

    /// Removes any coupon from a basket.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant.
    pub async fn remove_coupon(&self, basket_ident: &str) -> Result<Basket, CommerceError> {
        self.post_empty(
            self.endpoint(&["baskets", basket_ident, "coupons", "remove"]),
            &format!("remove coupon from basket {basket_ident}"),
        )
        .await
    }

    /// Applies a gift card to a basket.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant.
    pub async fn apply_gift_card(
        &self,
        basket_ident: &str,
        card_number: &str,
    ) -> Result<Basket, CommerceError> {
        self.post(
            self.endpoint(&["baskets", basket_ident, "giftcards"]),
            &GiftCardRequest { card_number },
            &format!("apply gift card to basket {basket_ident}"),
        )
        .await
    }

    /// Removes any gift card from a basket.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant.
    pub async fn remove_gift_card(&self, basket_ident: &str) -> Result<Basket, CommerceError> {
        self.post_empty(
            self.endpoint(&["baskets", basket_ident, "giftcards", "remove"]),
            &format!("remove gift card from basket {basket_ident}"),
        )
        .await
    }

    /// Applies a creator code to a basket.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant.
    pub async fn apply_creator_code(
        &self,
        basket_ident: &str,
        creator_code: &str,
    ) -> Result<Basket, CommerceError> {
        self.post(
            self.endpoint(&["baskets", basket_ident, "creator-codes"]),
            &CreatorCodeRequest { creator_code },
            &format!("apply creator code to basket {basket_ident}"),
        )
        .await
    }

    /// Removes the creator code from a basket.
    ///
    /// # Errors
    ///
    /// Any [`CommerceError`] variant.
    pub async fn remove_creator_code(&self, basket_ident: &str) -> Result<Basket, CommerceError> {
        self.post_empty(
            self.endpoint(&["baskets", basket_ident, "creator-codes", "remove"]),
            &format!("remove creator code from basket {basket_ident}"),
        )
        .await
    }

    /// `categories[/{id}]`, with `includePackages=true` when requested.
    fn categories_url(&self, rest: &[&str], include_packages: bool) -> Url {
        let mut segments = vec!["categories"];
        segments.extend_from_slice(rest);
        let mut url = self.endpoint(&segments);
        if include_packages {
            url.query_pairs_mut().append_pair("includePackages", "true");
        }
        url
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this branch always runs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T, CommerceError> {
        tracing::debug!(method = "GET", %url, "commerce request");
        let body = self.execute(self.client.get(url.clone()), &url).await?;
        decode::<Payload<T>>(&body, context).map(Payload::into_inner)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<Vec<T>, CommerceError> {
        tracing::debug!(method = "GET", %url, "commerce request");
        let body = self.execute(self.client.get(url.clone()), &url).await?;
        decode::<ListEnvelope<T>>(&body, context).map(ListEnvelope::into_vec)
    }

    async fn post<T, B>(&self, url: Url, payload: &B, context: &str) -> Result<T, CommerceError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        tracing::debug!(method = "POST", %url, "commerce request");
        let request = self.client.post(url.clone()).json(payload);
        let body = self.execute(request, &url).await?;
        decode::<Payload<T>>(&body, context).map(Payload::into_inner)
    }

    async fn post_empty<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, CommerceError> {
        tracing::debug!(method = "POST", %url, "commerce request");
        let body = self.execute(self.client.post(url.clone()), &url).await?;
        decode::<Payload<T>>(&body, context).map(Payload::into_inner)
    }

    /// Sends the request and returns the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// [`CommerceError::Network`] if no response arrives (or its body cannot be
    /// read); otherwise the status classification from [`classify_status`].
    async fn execute(&self, request: RequestBuilder, url: &Url) -> Result<String, CommerceError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "network error, commerce platform may be offline");
            CommerceError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.text().await?);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&raw)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_owned());

        log_failure(status, url, &message);
        Err(classify_status(status, message, url))
    }
}

fn decode<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, CommerceError> {
    serde_json::from_str(body).map_err(|e| CommerceError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Maps a non-2xx status onto the error taxonomy.
fn classify_status(status: StatusCode, message: String, url: &Url) -> CommerceError {
    if status.is_client_error() {
        CommerceError::Client {
            status: status.as_u16(),
            message,
        }
    } else if status.is_server_error() {
        CommerceError::Server {
            status: status.as_u16(),
            message,
        }
    } else {
        CommerceError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        }
    }
}

fn log_failure(status: StatusCode, url: &Url, message: &str) {
    match status {
        StatusCode::BAD_REQUEST => tracing::error!(%url, detail = message, "bad request"),
        StatusCode::UNAUTHORIZED => tracing::error!(%url, "unauthorized"),
        StatusCode::FORBIDDEN => tracing::error!(%url, "forbidden"),
        StatusCode::NOT_FOUND => tracing::error!(%url, "not found"),
        s if s.is_server_error() => {
            tracing::error!(status = s.as_u16(), %url, detail = message, "server error");
        }
        s => tracing::error!(status = s.as_u16(), %url, detail = message, "request failed"),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
