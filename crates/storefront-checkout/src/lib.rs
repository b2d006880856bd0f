pub mod bridge;
pub mod coordinator;
pub mod error;
pub mod notification;
pub mod storefront;
pub mod widget;

pub use bridge::{CheckoutBridge, CheckoutOutcome, OutcomeHandler};
pub use coordinator::{PurchaseAttempt, PurchaseCoordinator, PurchasePhase};
pub use error::CheckoutError;
pub use notification::{Notification, NotificationCenter, NotificationKind};
pub use storefront::{CatalogState, CategoryView, Storefront};
pub use widget::{
    CheckoutEvent, CheckoutEventKind, CheckoutWidget, EventHandler, HandlerRegistry,
    SubscriptionId, WidgetConfig,
};

#[cfg(test)]
pub(crate) mod testing;
