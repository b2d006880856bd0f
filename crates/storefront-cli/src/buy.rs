//! `buy` command: runs one purchase through the terminal checkout and waits
//! for its outcome.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use storefront_checkout::{
    CheckoutBridge, Notification, NotificationKind, PurchaseAttempt, Storefront,
};
use storefront_client::CommerceClient;
use storefront_core::AppConfig;

use crate::browse::package_line;
use crate::terminal_checkout::TerminalCheckout;

pub(crate) async fn run_buy(
    config: &AppConfig,
    client: Arc<CommerceClient>,
    package_id: i64,
) -> anyhow::Result<()> {
    let widget = TerminalCheckout::new(
        Arc::clone(&client),
        Duration::from_secs(config.checkout_poll_interval_secs),
    );
    let bridge = CheckoutBridge::new(Arc::new(widget), config.checkout.clone());
    let store = Storefront::new(client, bridge, config);

    store
        .load_catalog()
        .await
        .context("failed to load the catalog")?;
    let package = store
        .view_details(package_id)
        .ok_or_else(|| anyhow::anyhow!("package {package_id} not found"))?;
    println!("{}", package_line(&package));

    let mut notifications = store.notifications().subscribe();

    let attempt = tokio::select! {
        attempt = store.purchase(package_id) => attempt,
        _ = tokio::signal::ctrl_c() => {
            store.coordinator().abandon();
            println!("Purchase abandoned.");
            return Ok(());
        }
    };

    match attempt {
        PurchaseAttempt::Launched { basket_ident } => {
            tracing::info!(
                basket = %basket_ident,
                package = package_id,
                "waiting for checkout outcome"
            );
        }
        PurchaseAttempt::Failed(e) => {
            if let Some(notification) = store.notification() {
                print_notification(&notification);
            }
            return Err(e).context("purchase failed");
        }
        PurchaseAttempt::LaunchFailed(e) => {
            store.coordinator().close_checkout();
            return Err(e).context("could not open the checkout");
        }
        PurchaseAttempt::Busy | PurchaseAttempt::Superseded => {
            anyhow::bail!("another purchase is already in progress");
        }
    }

    loop {
        tokio::select! {
            changed = notifications.changed() => {
                changed.context("notification channel closed")?;
                let latest = notifications.borrow_and_update().clone();
                if let Some(notification) = latest {
                    print_notification(&notification);
                    if notification.kind == NotificationKind::Error {
                        anyhow::bail!("payment failed");
                    }
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                store.coordinator().close_checkout();
            }
        }
    }
}

fn print_notification(notification: &Notification) {
    println!("[{}] {}", notification.kind, notification.message);
}
