//! Single-flight purchase orchestration.
//!
//! A purchase runs `create basket -> add package -> launch checkout` and then
//! waits for the checkout bridge to report an outcome. Only one purchase may be
//! in flight at a time; a second request while the lock is held is dropped,
//! not queued.
//!
//! The lock is taken synchronously before the first network call. Every
//! attempt is tagged with a generation so a step that completes after the
//! attempt was abandoned is discarded instead of reviving it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use storefront_client::{CommerceApi, CommerceError};
use storefront_core::Basket;

use crate::bridge::{CheckoutBridge, CheckoutOutcome};
use crate::error::CheckoutError;
use crate::notification::{NotificationCenter, NotificationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchasePhase {
    Idle,
    CreatingBasket,
    AddingPackage,
    AwaitingCheckout,
}

/// What a call to [`PurchaseCoordinator::purchase`] ended up doing.
#[derive(Debug)]
pub enum PurchaseAttempt {
    /// Another purchase holds the lock; nothing happened.
    Busy,
    /// The checkout widget was launched for this basket.
    Launched { basket_ident: String },
    /// The basket could be prepared but checkout could not be launched. The
    /// coordinator keeps waiting; [`PurchaseCoordinator::close_checkout`]
    /// releases it.
    LaunchFailed(CheckoutError),
    /// A basket step failed. The lock was released and an error notification
    /// posted.
    Failed(CommerceError),
    /// The attempt was abandoned while a step was in flight.
    Superseded,
}

#[derive(Debug)]
struct PurchaseState {
    phase: PurchasePhase,
    in_flight: Option<i64>,
    generation: u64,
    basket: Option<Basket>,
}

impl PurchaseState {
    fn reset(&mut self) {
        self.phase = PurchasePhase::Idle;
        self.in_flight = None;
        self.basket = None;
        self.generation += 1;
    }
}

struct Inner<A> {
    api: Arc<A>,
    bridge: CheckoutBridge,
    notifications: NotificationCenter,
    state: Mutex<PurchaseState>,
}

impl<A> Inner<A> {
    fn lock(&self) -> MutexGuard<'_, PurchaseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the lock for `package_id` unless a purchase is already in flight.
    fn begin(&self, package_id: i64) -> Option<u64> {
        let mut state = self.lock();
        if state.phase != PurchasePhase::Idle {
            tracing::debug!(
                requested = package_id,
                in_flight = ?state.in_flight,
                "purchase already in flight, ignoring"
            );
            return None;
        }
        state.generation += 1;
        state.phase = PurchasePhase::CreatingBasket;
        state.in_flight = Some(package_id);
        Some(state.generation)
    }

    /// Moves a live attempt to `phase`. Returns `false` for a stale generation.
    fn advance(&self, generation: u64, phase: PurchasePhase, basket: Option<Basket>) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        state.phase = phase;
        if basket.is_some() {
            state.basket = basket;
        }
        true
    }

    fn fail(&self, generation: u64, step: &str, error: CommerceError) -> PurchaseAttempt {
        {
            let mut state = self.lock();
            if state.generation != generation {
                tracing::debug!(step, error = %error, "discarding failure from abandoned purchase");
                return PurchaseAttempt::Superseded;
            }
            tracing::warn!(
                step,
                package = ?state.in_flight,
                error = %error,
                "purchase failed"
            );
            state.reset();
        }
        self.notifications.post(
            NotificationKind::Error,
            format!("Could not start the purchase. {}", error.user_message()),
        );
        PurchaseAttempt::Failed(error)
    }

    fn handle_outcome(&self, outcome: CheckoutOutcome) {
        {
            let mut state = self.lock();
            if state.phase != PurchasePhase::AwaitingCheckout {
                tracing::debug!(?outcome, phase = ?state.phase, "ignoring checkout outcome");
                return;
            }
            tracing::info!(?outcome, package = ?state.in_flight, "purchase finished");
            state.reset();
        }

        let (kind, message) = match outcome {
            CheckoutOutcome::Complete => (
                NotificationKind::Success,
                "Payment complete. Thank you for your purchase!".to_string(),
            ),
            CheckoutOutcome::Error(Some(detail)) => (
                NotificationKind::Error,
                format!("The payment could not be completed: {detail}"),
            ),
            CheckoutOutcome::Error(None) => (
                NotificationKind::Error,
                "The payment could not be completed.".to_string(),
            ),
            CheckoutOutcome::Cancelled => (
                NotificationKind::Cancelled,
                "Checkout was closed before payment.".to_string(),
            ),
        };
        self.notifications.post(kind, message);
    }
}

/// Drives purchase attempts and feeds checkout outcomes back into the lock
/// and the notification center.
pub struct PurchaseCoordinator<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for PurchaseCoordinator<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: CommerceApi + 'static> PurchaseCoordinator<A> {
    /// Builds a coordinator and registers it as the bridge's outcome listener.
    pub fn new(api: Arc<A>, bridge: CheckoutBridge, notifications: NotificationCenter) -> Self {
        let inner = Arc::new(Inner {
            api,
            bridge,
            notifications,
            state: Mutex::new(PurchaseState {
                phase: PurchasePhase::Idle,
                in_flight: None,
                generation: 0,
                basket: None,
            }),
        });

        let weak = Arc::downgrade(&inner);
        inner.bridge.on_outcome(Arc::new(move |outcome: CheckoutOutcome| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_outcome(outcome);
            }
        }));
        if let Err(e) = inner.bridge.attach() {
            tracing::debug!(error = %e, "checkout events unavailable");
        }

        Self { inner }
    }

    /// Starts a purchase of one unit of `package_id`.
    ///
    /// Returns [`PurchaseAttempt::Busy`] without side effects if any purchase
    /// is already in flight.
    pub async fn purchase(&self, package_id: i64) -> PurchaseAttempt {
        let inner = &self.inner;
        let Some(generation) = inner.begin(package_id) else {
            return PurchaseAttempt::Busy;
        };
        tracing::info!(package = package_id, generation, "purchase started");

        let basket = match inner.api.create_basket().await {
            Ok(basket) => basket,
            Err(e) => return inner.fail(generation, "create basket", e),
        };
        if !inner.advance(generation, PurchasePhase::AddingPackage, Some(basket.clone())) {
            return PurchaseAttempt::Superseded;
        }

        let basket = match inner.api.add_package(&basket.ident, package_id, 1).await {
            Ok(basket) => basket,
            Err(e) => return inner.fail(generation, "add package", e),
        };
        let basket_ident = basket.ident.clone();
        if !inner.advance(generation, PurchasePhase::AwaitingCheckout, Some(basket)) {
            return PurchaseAttempt::Superseded;
        }

        match inner.bridge.launch_checkout(&basket_ident) {
            Ok(()) => PurchaseAttempt::Launched { basket_ident },
            Err(e) => {
                tracing::error!(basket = %basket_ident, error = %e, "checkout launch failed");
                PurchaseAttempt::LaunchFailed(e)
            }
        }
    }

    /// Applies a checkout outcome. Ignored unless awaiting checkout.
    pub fn handle_outcome(&self, outcome: CheckoutOutcome) {
        self.inner.handle_outcome(outcome);
    }

    /// Asks the widget to close. If no checkout session is open (for example
    /// the launch failed) while awaiting checkout, the attempt is treated as
    /// cancelled directly.
    pub fn close_checkout(&self) {
        if self.inner.bridge.close_checkout() {
            return;
        }
        self.inner.handle_outcome(CheckoutOutcome::Cancelled);
    }

    /// Drops the current attempt without a notification. Results of steps
    /// still in flight are discarded when they arrive.
    pub fn abandon(&self) {
        let mut state = self.inner.lock();
        if state.phase != PurchasePhase::Idle {
            tracing::info!(package = ?state.in_flight, phase = ?state.phase, "purchase abandoned");
            state.reset();
        }
    }

    #[must_use]
    pub fn phase(&self) -> PurchasePhase {
        self.inner.lock().phase
    }

    /// Package currently holding the lock.
    #[must_use]
    pub fn in_flight(&self) -> Option<i64> {
        self.inner.lock().in_flight
    }

    #[must_use]
    pub fn is_purchasing(&self, package_id: i64) -> bool {
        self.in_flight() == Some(package_id)
    }

    #[must_use]
    pub fn basket(&self) -> Option<Basket> {
        self.inner.lock().basket.clone()
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationCenter {
        &self.inner.notifications
    }
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
