//! Package change notifications.
//!
//! The engine owns a single [`PackageEvents`] hub. Ownership filtering
//! happens on the publish side: a customer subscription only ever carries
//! events for packages that customer owns, an admin subscription carries all
//! of them. Subscribers never see someone else's traffic and then discard it
//! locally.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{Account, Package, Role};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A committed package change. Carries the full snapshot as of the commit.
#[derive(Clone, Debug, PartialEq)]
pub struct PackageEvent {
    pub package: Package,
}

#[derive(Debug)]
struct Subscriber {
    account_id: Uuid,
    role: Role,
    tx: mpsc::Sender<PackageEvent>,
}

#[derive(Debug, Default)]
struct HubInner {
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    next_id: AtomicU64,
    /// Held across commit + publish so delivery order matches commit order.
    publish_order: tokio::sync::Mutex<()>,
}

impl HubInner {
    fn remove(&self, id: u64) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// Publish/subscribe hub for package events.
#[derive(Debug, Default)]
pub(crate) struct PackageEvents {
    inner: Arc<HubInner>,
}

impl PackageEvents {
    pub(crate) fn subscribe(&self, account: &Account) -> Subscription {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Subscriber {
                    account_id: account.id,
                    role: account.role,
                    tx,
                },
            );
        Subscription {
            id,
            rx,
            hub: Arc::clone(&self.inner),
        }
    }

    /// Fan an event out to every eligible subscriber.
    ///
    /// A closed subscriber is pruned; one with a full buffer misses this
    /// event. Neither affects delivery to the others.
    pub(crate) fn publish(&self, event: &PackageEvent) {
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut closed = Vec::new();
        for (id, subscriber) in subscribers.iter() {
            let eligible = subscriber.role.is_admin()
                || subscriber.account_id == event.package.owner_id;
            if !eligible {
                continue;
            }
            if let Err(mpsc::error::TrySendError::Closed(_)) = subscriber.tx.try_send(event.clone())
            {
                closed.push(*id);
            }
        }
        for id in closed {
            subscribers.remove(&id);
        }
    }

    /// Serializes the commit + publish section of package writes.
    pub(crate) async fn order_guard(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.inner.publish_order.lock().await
    }
}

/// A live event stream for one subscriber. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<PackageEvent>,
    hub: Arc<HubInner>,
}

impl Subscription {
    /// Next event, or `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<PackageEvent> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<PackageEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.remove(self.id);
    }
}
