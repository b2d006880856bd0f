//! The slice of the commerce API that catalog loading and the purchase
//! coordinator depend on, so both can run against a test double.

use std::future::Future;

use storefront_core::{Basket, Category, Package};

use crate::client::CommerceClient;
use crate::error::CommerceError;
use crate::types::CreateBasketOptions;

pub trait CommerceApi: Send + Sync {
    fn list_packages(&self) -> impl Future<Output = Result<Vec<Package>, CommerceError>> + Send;

    fn list_categories(&self)
        -> impl Future<Output = Result<Vec<Category>, CommerceError>> + Send;

    fn create_basket(&self) -> impl Future<Output = Result<Basket, CommerceError>> + Send;

    fn add_package(
        &self,
        basket_ident: &str,
        package_id: i64,
        quantity: u32,
    ) -> impl Future<Output = Result<Basket, CommerceError>> + Send;
}

impl CommerceApi for CommerceClient {
    async fn list_packages(&self) -> Result<Vec<Package>, CommerceError> {
        CommerceClient::list_packages(self).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CommerceError> {
        CommerceClient::list_categories(self).await
    }

    async fn create_basket(&self) -> Result<Basket, CommerceError> {
        CommerceClient::create_basket(self, &CreateBasketOptions::default()).await
    }

    async fn add_package(
        &self,
        basket_ident: &str,
        package_id: i64,
        quantity: u32,
    ) -> Result<Basket, CommerceError> {
        CommerceClient::add_package(self, basket_ident, package_id, quantity).await
    }
}
