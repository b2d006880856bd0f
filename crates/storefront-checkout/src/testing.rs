//! Test doubles for the widget capability and the commerce API.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use storefront_client::{CommerceApi, CommerceError};
use storefront_core::{Basket, BasketLinks, Category, CategoryRef, Package};
use tokio::sync::Notify;

use crate::widget::{
    CheckoutEvent, CheckoutEventKind, CheckoutWidget, EventHandler, HandlerRegistry,
    SubscriptionId, WidgetConfig,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WidgetCall {
    Init(WidgetConfig),
    Launch,
    Close,
}

/// Records calls and lets tests emit events. `close` emits a `close` event the
/// way the hosted widget does.
#[derive(Default)]
pub(crate) struct FakeWidget {
    pub registry: HandlerRegistry,
    calls: Mutex<Vec<WidgetCall>>,
}

impl FakeWidget {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn emit(&self, kind: CheckoutEventKind) {
        self.registry.emit(&CheckoutEvent::new(kind));
    }

    pub(crate) fn emit_detail(&self, kind: CheckoutEventKind, detail: &str) {
        self.registry.emit(&CheckoutEvent::with_detail(kind, detail));
    }

    pub(crate) fn calls(&self) -> Vec<WidgetCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn launches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == WidgetCall::Launch)
            .count()
    }
}

impl CheckoutWidget for FakeWidget {
    fn init(&self, config: WidgetConfig) {
        self.calls.lock().unwrap().push(WidgetCall::Init(config));
    }

    fn launch(&self) {
        self.calls.lock().unwrap().push(WidgetCall::Launch);
    }

    fn close(&self) {
        self.calls.lock().unwrap().push(WidgetCall::Close);
        self.emit(CheckoutEventKind::Close);
    }

    fn subscribe(&self, kind: CheckoutEventKind, handler: EventHandler) -> SubscriptionId {
        self.registry.subscribe(kind, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.registry.unsubscribe(id);
    }
}

pub(crate) fn package(
    id: i64,
    name: &str,
    base: Decimal,
    sale: Option<Decimal>,
    category: &Category,
) -> Package {
    Package {
        id,
        name: name.to_string(),
        description: format!("<p>{name}</p>"),
        package_type: Some("single".to_string()),
        base_price: base,
        sales_price: sale,
        currency: "USD".to_string(),
        image: None,
        disable_quantity: false,
        disable_gifting: false,
        category: Some(CategoryRef {
            id: category.id,
            name: category.name.clone(),
        }),
    }
}

pub(crate) fn category(id: i64, name: &str, order: i32) -> Category {
    Category {
        id,
        name: name.to_string(),
        description: String::new(),
        order,
        packages: Vec::new(),
    }
}

fn basket(ident: String) -> Basket {
    Basket {
        ident,
        complete: false,
        base_price: Decimal::ZERO,
        sales_tax: Decimal::ZERO,
        total_price: Decimal::ZERO,
        currency: "USD".to_string(),
        packages: Vec::new(),
        username: None,
        creator_code: None,
        links: BasketLinks::default(),
    }
}

fn server_error() -> CommerceError {
    CommerceError::Server {
        status: 500,
        message: "boom".to_string(),
    }
}

/// In-memory commerce API with switchable failures and an optional gate that
/// holds `create_basket` until released.
pub(crate) struct FakeApi {
    pub categories: Vec<Category>,
    pub packages: Vec<Package>,
    pub fail_packages: AtomicBool,
    pub fail_categories: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_add: AtomicBool,
    pub blank_ident: AtomicBool,
    pub create_calls: AtomicUsize,
    pub add_calls: Mutex<Vec<(String, i64, u32)>>,
    pub catalog_loads: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    /// Store with categories "Rangos" (VIP 10.00 on sale for 7.50) and "Kits".
    pub(crate) fn new() -> Self {
        let rangos = category(1, "Rangos", 0);
        let kits = category(2, "Kits", 1);
        let packages = vec![
            package(10, "VIP", Decimal::new(1000, 2), Some(Decimal::new(750, 2)), &rangos),
            package(11, "MVP", Decimal::new(2000, 2), None, &rangos),
            package(20, "Starter Kit", Decimal::new(500, 2), None, &kits),
        ];
        Self::with_catalog(vec![rangos, kits], packages)
    }

    pub(crate) fn with_catalog(categories: Vec<Category>, packages: Vec<Package>) -> Self {
        Self {
            categories,
            packages,
            fail_packages: AtomicBool::new(false),
            fail_categories: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            fail_add: AtomicBool::new(false),
            blank_ident: AtomicBool::new(false),
            create_calls: AtomicUsize::new(0),
            add_calls: Mutex::new(Vec::new()),
            catalog_loads: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }

    /// Makes `create_basket` wait until the returned handle is notified.
    pub(crate) fn hold_create_basket(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub(crate) fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

impl CommerceApi for FakeApi {
    async fn list_packages(&self) -> Result<Vec<Package>, CommerceError> {
        self.catalog_loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_packages.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.packages.clone())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CommerceError> {
        if self.fail_categories.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.categories.clone())
    }

    async fn create_basket(&self) -> Result<Basket, CommerceError> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        if self.blank_ident.load(Ordering::SeqCst) {
            return Ok(basket(String::new()));
        }
        Ok(basket(format!("basket-{n}")))
    }

    async fn add_package(
        &self,
        basket_ident: &str,
        package_id: i64,
        quantity: u32,
    ) -> Result<Basket, CommerceError> {
        self.add_calls
            .lock()
            .unwrap()
            .push((basket_ident.to_string(), package_id, quantity));
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(CommerceError::Client {
                status: 404,
                message: "Package not found".to_string(),
            });
        }
        Ok(basket(basket_ident.to_string()))
    }
}
