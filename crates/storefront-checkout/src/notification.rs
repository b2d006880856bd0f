//! Single-slot, auto-dismissing outcome messages.
//!
//! Posting replaces whatever is showing and restarts the dismiss timer.
//! Observers follow changes through a `tokio::sync::watch` channel. When a
//! runtime is available a timer task clears the slot on expiry; reads also
//! enforce expiry, so the center behaves the same without one.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Cancelled,
}

impl NotificationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub posted_at: DateTime<Utc>,
    expires_at: Instant,
}

impl Notification {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

struct Slot {
    current: Option<Notification>,
    next_id: u64,
    timer: Option<JoinHandle<()>>,
}

struct Shared {
    ttl: Duration,
    slot: Mutex<Slot>,
    tx: watch::Sender<Option<Notification>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clears the slot if it still holds notification `id`.
    fn expire(&self, id: u64) {
        let mut slot = self.lock();
        if slot.current.as_ref().is_some_and(|n| n.id == id) {
            slot.current = None;
            slot.timer = None;
            self.tx.send_replace(None);
            tracing::debug!(id, "notification expired");
        }
    }
}

/// Cheap to clone; clones share one slot.
#[derive(Clone)]
pub struct NotificationCenter {
    shared: Arc<Shared>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl NotificationCenter {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                ttl,
                slot: Mutex::new(Slot {
                    current: None,
                    next_id: 1,
                    timer: None,
                }),
                tx,
            }),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    /// Shows `message`, replacing any current notification.
    pub fn post(&self, kind: NotificationKind, message: impl Into<String>) -> Notification {
        let mut slot = self.shared.lock();
        let id = slot.next_id;
        slot.next_id += 1;

        let notification = Notification {
            id,
            kind,
            message: message.into(),
            posted_at: Utc::now(),
            expires_at: Instant::now() + self.shared.ttl,
        };

        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.timer = self.spawn_timer(id);
        slot.current = Some(notification.clone());
        self.shared.tx.send_replace(Some(notification.clone()));

        tracing::info!(id, kind = %kind, message = %notification.message, "notification posted");
        notification
    }

    /// Clears the current notification and cancels its timer.
    pub fn dismiss(&self) {
        let mut slot = self.shared.lock();
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        if slot.current.take().is_some() {
            self.shared.tx.send_replace(None);
        }
    }

    /// The visible notification, if any has been posted and not yet expired.
    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        let expired = {
            let slot = self.shared.lock();
            match slot.current.as_ref() {
                None => return None,
                Some(n) if !n.is_expired() => return Some(n.clone()),
                Some(n) => n.id,
            }
        };
        self.shared.expire(expired);
        None
    }

    /// Receiver that observes every post, dismissal, and timer expiry.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.shared.tx.subscribe()
    }

    fn spawn_timer(&self, id: u64) -> Option<JoinHandle<()>> {
        let handle = tokio::runtime::Handle::try_current().ok()?;
        let ttl = self.shared.ttl;
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        Some(handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(shared) = shared.upgrade() {
                shared.expire(id);
            }
        }))
    }
}
