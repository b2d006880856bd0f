//! View model for the store page.
//!
//! Owns the loaded [`Catalog`], the selected package for the detail view, and
//! the purchase coordinator. Catalog state and purchase state are independent:
//! a failed purchase never touches the catalog.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use storefront_client::{CommerceApi, CommerceError};
use storefront_core::{resolve_route, AppConfig, Catalog, Category, Package, Resolution};

use crate::bridge::CheckoutBridge;
use crate::coordinator::{PurchaseAttempt, PurchaseCoordinator};
use crate::notification::{Notification, NotificationCenter, NotificationKind};

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogState {
    Loading,
    Ready(Catalog),
    /// Page-level failure with a shopper-facing message; cleared by
    /// [`Storefront::retry`].
    Failed(String),
}

/// What the category route should render.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryView {
    Loading,
    Failed(String),
    Found {
        category: Category,
        packages: Vec<Package>,
    },
    Redirect {
        path: String,
        replace: bool,
    },
    /// The store has no categories.
    Empty,
}

struct ViewState {
    catalog: CatalogState,
    selected: Option<i64>,
}

pub struct Storefront<A> {
    api: Arc<A>,
    coordinator: PurchaseCoordinator<A>,
    route_prefix: String,
    state: Mutex<ViewState>,
}

impl<A: CommerceApi + 'static> Storefront<A> {
    #[must_use]
    pub fn new(api: Arc<A>, bridge: CheckoutBridge, config: &AppConfig) -> Self {
        let notifications =
            NotificationCenter::new(Duration::from_secs(config.notification_ttl_secs));
        let coordinator = PurchaseCoordinator::new(Arc::clone(&api), bridge, notifications);
        Self::with_coordinator(api, coordinator, &config.route_prefix)
    }

    #[must_use]
    pub fn with_coordinator(
        api: Arc<A>,
        coordinator: PurchaseCoordinator<A>,
        route_prefix: &str,
    ) -> Self {
        Self {
            api,
            coordinator,
            route_prefix: route_prefix.to_owned(),
            state: Mutex::new(ViewState {
                catalog: CatalogState::Loading,
                selected: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches packages and categories concurrently and replaces the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first [`CommerceError`] from either fetch. The catalog enters
    /// [`CatalogState::Failed`] and one error notification is posted.
    pub async fn load_catalog(&self) -> Result<(), CommerceError> {
        self.lock().catalog = CatalogState::Loading;

        let loaded = tokio::try_join!(self.api.list_packages(), self.api.list_categories());
        match loaded {
            Ok((packages, categories)) => {
                let catalog = Catalog::new(categories, packages);
                tracing::info!(
                    categories = catalog.categories().len(),
                    packages = catalog.packages().len(),
                    "catalog loaded"
                );
                self.lock().catalog = CatalogState::Ready(catalog);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "catalog load failed");
                let message = e.user_message();
                self.lock().catalog = CatalogState::Failed(message.clone());
                self.notifications()
                    .post(NotificationKind::Error, format!("Could not load the store. {message}"));
                Err(e)
            }
        }
    }

    /// Manual retry after a failed load.
    ///
    /// # Errors
    ///
    /// See [`Self::load_catalog`].
    pub async fn retry(&self) -> Result<(), CommerceError> {
        self.load_catalog().await
    }

    #[must_use]
    pub fn catalog_state(&self) -> CatalogState {
        self.lock().catalog.clone()
    }

    /// Categories in display order; empty unless the catalog is loaded.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        match &self.lock().catalog {
            CatalogState::Ready(catalog) => catalog.categories().to_vec(),
            CatalogState::Loading | CatalogState::Failed(_) => Vec::new(),
        }
    }

    /// Resolves the category route for `slug` against the loaded catalog.
    #[must_use]
    pub fn open_category(&self, slug: Option<&str>) -> CategoryView {
        let state = self.lock();
        let catalog = match &state.catalog {
            CatalogState::Loading => return CategoryView::Loading,
            CatalogState::Failed(message) => return CategoryView::Failed(message.clone()),
            CatalogState::Ready(catalog) => catalog,
        };

        match resolve_route(slug, catalog.categories(), &self.route_prefix) {
            Resolution::Found(category) => CategoryView::Found {
                category: category.clone(),
                packages: catalog
                    .packages_in(category.id)
                    .into_iter()
                    .cloned()
                    .collect(),
            },
            Resolution::Redirect { path, replace } => CategoryView::Redirect { path, replace },
            Resolution::Empty => CategoryView::Empty,
        }
    }

    /// Selects a package for the detail view. Returns `None` (and selects
    /// nothing) for an id not in the catalog.
    pub fn view_details(&self, package_id: i64) -> Option<Package> {
        let mut state = self.lock();
        let CatalogState::Ready(catalog) = &state.catalog else {
            return None;
        };
        let package = catalog.package(package_id).cloned()?;
        state.selected = Some(package_id);
        Some(package)
    }

    #[must_use]
    pub fn selected_package(&self) -> Option<Package> {
        let state = self.lock();
        let CatalogState::Ready(catalog) = &state.catalog else {
            return None;
        };
        state.selected.and_then(|id| catalog.package(id).cloned())
    }

    pub fn close_details(&self) {
        self.lock().selected = None;
    }

    pub async fn purchase(&self, package_id: i64) -> PurchaseAttempt {
        self.coordinator.purchase(package_id).await
    }

    #[must_use]
    pub fn is_purchasing(&self, package_id: i64) -> bool {
        self.coordinator.is_purchasing(package_id)
    }

    #[must_use]
    pub fn notification(&self) -> Option<Notification> {
        self.notifications().current()
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationCenter {
        self.coordinator.notifications()
    }

    #[must_use]
    pub fn coordinator(&self) -> &PurchaseCoordinator<A> {
        &self.coordinator
    }

    #[must_use]
    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }
}

#[cfg(test)]
#[path = "storefront_test.rs"]
mod tests;
