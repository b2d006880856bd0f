//! Translates checkout widget events into purchase outcomes.
//!
//! The bridge subscribes to the widget once per instance, no matter how many
//! times checkout is launched. Each launch opens a session; the first
//! `payment:complete` or `payment:error` settles it, and a `close` on a session
//! that never settled is reported as a cancellation. A `close` after a settled
//! session produces nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use storefront_core::CheckoutAppearance;

use crate::error::CheckoutError;
use crate::widget::{
    CheckoutEvent, CheckoutEventKind, CheckoutWidget, SubscriptionId, WidgetConfig,
};

/// Terminal result of a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Complete,
    /// Payment failed; carries the widget's description when it gave one.
    Error(Option<String>),
    /// Closed before payment completed or failed.
    Cancelled,
}

pub type OutcomeHandler = Arc<dyn Fn(CheckoutOutcome) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    Idle,
    Open,
    Settled,
}

struct BridgeState {
    session: Session,
    subscriptions: Vec<SubscriptionId>,
    listener: Option<OutcomeHandler>,
}

type SharedState = Arc<Mutex<BridgeState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, BridgeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct CheckoutBridge {
    widget: Option<Arc<dyn CheckoutWidget>>,
    appearance: CheckoutAppearance,
    state: SharedState,
}

impl CheckoutBridge {
    #[must_use]
    pub fn new(widget: Arc<dyn CheckoutWidget>, appearance: CheckoutAppearance) -> Self {
        Self::with_widget(Some(widget), appearance)
    }

    /// A bridge with no checkout capability; every launch fails with
    /// [`CheckoutError::Integration`].
    #[must_use]
    pub fn unavailable(appearance: CheckoutAppearance) -> Self {
        Self::with_widget(None, appearance)
    }

    fn with_widget(
        widget: Option<Arc<dyn CheckoutWidget>>,
        appearance: CheckoutAppearance,
    ) -> Self {
        Self {
            widget,
            appearance,
            state: Arc::new(Mutex::new(BridgeState {
                session: Session::Idle,
                subscriptions: Vec::new(),
                listener: None,
            })),
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.widget.is_some()
    }

    /// Sets the single receiver of checkout outcomes, replacing any previous one.
    pub fn on_outcome(&self, listener: OutcomeHandler) {
        lock(&self.state).listener = Some(listener);
    }

    /// Subscribes to the widget's events. Later calls are no-ops until
    /// [`Self::detach`].
    ///
    /// # Errors
    ///
    /// [`CheckoutError::Integration`] when no widget is available.
    pub fn attach(&self) -> Result<(), CheckoutError> {
        let widget = self.widget.as_ref().ok_or(CheckoutError::Integration)?;

        let mut state = lock(&self.state);
        if !state.subscriptions.is_empty() {
            return Ok(());
        }
        for kind in CheckoutEventKind::ALL {
            let shared = Arc::clone(&self.state);
            let handler = Arc::new(move |event: &CheckoutEvent| dispatch(&shared, event));
            state.subscriptions.push(widget.subscribe(kind, handler));
        }
        tracing::debug!(subscriptions = state.subscriptions.len(), "checkout bridge attached");
        Ok(())
    }

    /// Removes every subscription made by [`Self::attach`].
    pub fn detach(&self) {
        let Some(widget) = self.widget.as_ref() else {
            return;
        };
        let subscriptions = std::mem::take(&mut lock(&self.state).subscriptions);
        for id in subscriptions {
            widget.unsubscribe(id);
        }
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        !lock(&self.state).subscriptions.is_empty()
    }

    /// Initializes the widget for `basket_ident` and opens it.
    ///
    /// An empty ident is logged and nothing is launched.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::MissingBasketIdent`] for an empty ident.
    /// - [`CheckoutError::Integration`] when no widget is available.
    pub fn launch_checkout(&self, basket_ident: &str) -> Result<(), CheckoutError> {
        if basket_ident.trim().is_empty() {
            tracing::error!("basket ident is required to launch checkout");
            return Err(CheckoutError::MissingBasketIdent);
        }
        let Some(widget) = self.widget.as_ref() else {
            tracing::error!(basket = basket_ident, "checkout integration is not available");
            return Err(CheckoutError::Integration);
        };
        self.attach()?;

        lock(&self.state).session = Session::Open;
        widget.init(WidgetConfig::new(basket_ident, &self.appearance));
        widget.launch();
        tracing::info!(basket = basket_ident, "checkout launched");
        Ok(())
    }

    /// Closes the widget if a launched session has not settled yet. Returns
    /// whether a close was requested.
    pub fn close_checkout(&self) -> bool {
        let Some(widget) = self.widget.as_ref() else {
            return false;
        };
        if lock(&self.state).session != Session::Open {
            return false;
        }
        widget.close();
        true
    }
}

impl Drop for CheckoutBridge {
    fn drop(&mut self) {
        self.detach();
    }
}

fn dispatch(state: &SharedState, event: &CheckoutEvent) {
    let (outcome, listener) = {
        let mut state = lock(state);
        let outcome = match event.kind {
            CheckoutEventKind::Open => None,
            CheckoutEventKind::PaymentComplete => {
                state.session = Session::Settled;
                Some(CheckoutOutcome::Complete)
            }
            CheckoutEventKind::PaymentError => {
                state.session = Session::Settled;
                Some(CheckoutOutcome::Error(event.detail.clone()))
            }
            CheckoutEventKind::Close => {
                let cancelled = state.session == Session::Open;
                state.session = Session::Idle;
                cancelled.then_some(CheckoutOutcome::Cancelled)
            }
        };
        (outcome, state.listener.clone())
    };

    let Some(outcome) = outcome else {
        tracing::debug!(event = %event.kind, "checkout event produced no outcome");
        return;
    };
    tracing::info!(event = %event.kind, ?outcome, "checkout outcome");
    if let Some(listener) = listener {
        listener(outcome);
    }
}

#[cfg(test)]
#[path = "bridge_test.rs"]
mod tests;
