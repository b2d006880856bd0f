//! The checkout widget capability.
//!
//! The hosted payment UI is driven imperatively (`init`, `launch`, `close`)
//! and reports back through named events. [`CheckoutWidget`] is the seam a
//! concrete integration (or a test double) implements; [`HandlerRegistry`] is
//! the observer bookkeeping such an implementation can reuse.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use storefront_core::{CheckoutAppearance, CheckoutColor, CheckoutTheme};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutEventKind {
    Open,
    Close,
    PaymentComplete,
    PaymentError,
}

impl CheckoutEventKind {
    pub const ALL: [CheckoutEventKind; 4] = [
        CheckoutEventKind::Open,
        CheckoutEventKind::Close,
        CheckoutEventKind::PaymentComplete,
        CheckoutEventKind::PaymentError,
    ];

    /// Event name as emitted by the widget.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CheckoutEventKind::Open => "open",
            CheckoutEventKind::Close => "close",
            CheckoutEventKind::PaymentComplete => "payment:complete",
            CheckoutEventKind::PaymentError => "payment:error",
        }
    }
}

impl fmt::Display for CheckoutEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckoutEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown checkout event \"{s}\""))
    }
}

/// An event reported by the widget. `detail` carries the widget's own
/// description for `payment:error`, when it gives one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutEvent {
    pub kind: CheckoutEventKind,
    pub detail: Option<String>,
}

impl CheckoutEvent {
    #[must_use]
    pub fn new(kind: CheckoutEventKind) -> Self {
        Self { kind, detail: None }
    }

    #[must_use]
    pub fn with_detail(kind: CheckoutEventKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }
}

pub type EventHandler = Arc<dyn Fn(&CheckoutEvent) + Send + Sync>;

/// Handle returned by [`CheckoutWidget::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Arguments to [`CheckoutWidget::init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub ident: String,
    pub theme: CheckoutTheme,
    pub colors: Vec<CheckoutColor>,
    pub locale: String,
}

impl WidgetConfig {
    #[must_use]
    pub fn new(ident: impl Into<String>, appearance: &CheckoutAppearance) -> Self {
        Self {
            ident: ident.into(),
            theme: appearance.theme,
            colors: appearance.colors.clone(),
            locale: appearance.locale.clone(),
        }
    }
}

pub trait CheckoutWidget: Send + Sync {
    /// Configures the next launch for a basket.
    fn init(&self, config: WidgetConfig);

    /// Opens the checkout for the most recently initialized basket.
    fn launch(&self);

    /// Closes the checkout if it is open.
    fn close(&self);

    fn subscribe(&self, kind: CheckoutEventKind, handler: EventHandler) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Subscriber list keyed by event kind.
///
/// Handlers are cloned out of the lock before being called, so a handler may
/// subscribe, unsubscribe, or trigger further events without deadlocking.
#[derive(Default)]
pub struct HandlerRegistry {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, CheckoutEventKind, EventHandler)>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: CheckoutEventKind, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, kind, handler));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().retain(|(sub, _, _)| *sub != id);
    }

    /// Calls every handler subscribed to `event.kind`, in subscription order.
    pub fn emit(&self, event: &CheckoutEvent) {
        let matching: Vec<EventHandler> = self
            .lock()
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind)
            .map(|(_, _, handler)| Arc::clone(handler))
            .collect();

        tracing::debug!(event = %event.kind, handlers = matching.len(), "checkout event");
        for handler in matching {
            handler(event);
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, CheckoutEventKind, EventHandler)>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
