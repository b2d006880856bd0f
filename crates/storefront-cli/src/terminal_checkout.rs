//! Checkout capability for a terminal session.
//!
//! There is no embedded payment UI here: `launch` prints the basket's hosted
//! checkout link and polls the basket until the platform marks it complete.
//! Stores that identify buyers by username also get their login links printed
//! while the basket has no username. A failed poll is reported as
//! `payment:error`; `close` stops polling and reports `close`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use storefront_checkout::{
    CheckoutEvent, CheckoutEventKind, CheckoutWidget, EventHandler, HandlerRegistry,
    SubscriptionId, WidgetConfig,
};
use storefront_client::CommerceClient;
use storefront_core::AuthLink;
use tokio::task::JoinHandle;

#[derive(Default)]
struct Session {
    config: Option<WidgetConfig>,
    poller: Option<JoinHandle<()>>,
}

pub(crate) struct TerminalCheckout {
    client: Arc<CommerceClient>,
    poll_interval: Duration,
    registry: Arc<HandlerRegistry>,
    session: Mutex<Session>,
}

impl TerminalCheckout {
    pub(crate) fn new(client: Arc<CommerceClient>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval: poll_interval.max(Duration::from_secs(1)),
            registry: Arc::new(HandlerRegistry::new()),
            session: Mutex::new(Session::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CheckoutWidget for TerminalCheckout {
    fn init(&self, config: WidgetConfig) {
        tracing::debug!(
            basket = %config.ident,
            theme = %config.theme,
            locale = %config.locale,
            "checkout initialized"
        );
        self.lock().config = Some(config);
    }

    fn launch(&self) {
        let mut session = self.lock();
        let Some(config) = session.config.clone() else {
            tracing::error!("checkout launched before init");
            return;
        };
        if let Some(previous) = session.poller.take() {
            previous.abort();
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            drop(session);
            tracing::error!("checkout needs a tokio runtime to poll the basket");
            self.registry.emit(&CheckoutEvent::with_detail(
                CheckoutEventKind::PaymentError,
                "checkout is unavailable",
            ));
            return;
        };
        session.poller = Some(runtime.spawn(poll_basket(
            Arc::clone(&self.client),
            Arc::clone(&self.registry),
            config,
            self.poll_interval,
        )));
    }

    fn close(&self) {
        let poller = self.lock().poller.take();
        if let Some(poller) = poller {
            poller.abort();
        }
        self.registry.emit(&CheckoutEvent::new(CheckoutEventKind::Close));
    }

    fn subscribe(&self, kind: CheckoutEventKind, handler: EventHandler) -> SubscriptionId {
        self.registry.subscribe(kind, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.registry.unsubscribe(id);
    }
}

async fn poll_basket(
    client: Arc<CommerceClient>,
    registry: Arc<HandlerRegistry>,
    config: WidgetConfig,
    interval: Duration,
) {
    let ident = config.ident;
    registry.emit(&CheckoutEvent::new(CheckoutEventKind::Open));

    let mut announced = false;
    loop {
        match client.get_basket(&ident).await {
            Ok(basket) if basket.complete => {
                registry.emit(&CheckoutEvent::new(CheckoutEventKind::PaymentComplete));
                return;
            }
            Ok(basket) => {
                if !announced {
                    announced = true;
                    match basket.links.checkout.as_deref() {
                        Some(url) => println!("Complete your payment at: {url}"),
                        None => {
                            println!("Basket {ident} is ready, but no checkout link was returned.");
                        }
                    }
                    if basket.username.is_none() {
                        announce_login(&client, &ident).await;
                    }
                    println!("Waiting for payment. Press Ctrl-C to close the checkout.");
                }
                tracing::debug!(basket = %ident, "basket not complete yet");
            }
            Err(e) => {
                tracing::error!(basket = %ident, error = %e, "basket poll failed");
                registry.emit(&CheckoutEvent::with_detail(
                    CheckoutEventKind::PaymentError,
                    e.user_message(),
                ));
                return;
            }
        }
        tokio::time::sleep(interval).await;
    }
}

async fn announce_login(client: &CommerceClient, ident: &str) {
    match client.basket_auth_links(ident, None).await {
        Ok(links) => {
            if let Some(prompt) = login_prompt(&links) {
                println!("{prompt}");
            }
        }
        Err(e) => tracing::debug!(basket = %ident, error = %e, "no login links for basket"),
    }
}

/// Text asking the buyer to log in first, or `None` when the store needs no login.
fn login_prompt(links: &[AuthLink]) -> Option<String> {
    if links.is_empty() {
        return None;
    }
    let mut prompt = String::from("Log in before paying:");
    for link in links {
        prompt.push_str(&format!("\n  {}: {}", link.name, link.url));
    }
    Some(prompt)
}

#[cfg(test)]
#[path = "terminal_checkout_test.rs"]
mod tests;
