//! Notification lifecycle management.
//!
//! The manager owns the display region and drives each notification through
//! `Showing -> Hiding -> Removed` with two scheduled transitions: the
//! auto-hide timer (or an explicit dismiss) and the fixed hide transition.
//! Both entry points converge on [`NotificationManager::begin_hiding`].

use super::notification::{
    HideReason, Notification, NotificationId, NotificationView, Phase, HIDE_TRANSITION,
};
use super::region::DisplayRegion;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

/// Lifecycle events for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Shown(NotificationView),
    Hiding { id: NotificationId, reason: HideReason },
    Removed { id: NotificationId },
}

#[derive(Default)]
struct Inner {
    region: Option<DisplayRegion>,
    next_id: u64,
    events: Option<UnboundedSender<NotificationEvent>>,
}

impl Inner {
    fn emit(&self, event: NotificationEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Cheap-to-clone handle; clones share one display region.
#[derive(Clone, Default)]
pub struct NotificationManager {
    inner: Arc<Mutex<Inner>>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manager that reports every transition on `tx`.
    pub fn with_events(tx: UnboundedSender<NotificationEvent>) -> Self {
        let manager = Self::new();
        manager.lock().events = Some(tx);
        manager
    }

    // The lock is only ever held for synchronous region updates, so a
    // poisoned mutex still guards a consistent region.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create the display region. Returns `false` if it already existed.
    pub fn initialize(&self) -> bool {
        let mut inner = self.lock();
        if inner.region.is_some() {
            return false;
        }
        inner.region = Some(DisplayRegion::new());
        log::debug!("notification region initialized");
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().region.is_some()
    }

    /// Show a notification and schedule its automatic removal.
    pub fn notify(&self, notification: Notification) -> NotificationId {
        let delay = notification.duration();
        let kind = notification.kind();

        let mut inner = self.lock();
        if inner.region.is_none() {
            log::warn!("notify called before initialize; creating the region now");
        }
        let id = NotificationId(inner.next_id);
        inner.next_id += 1;

        let region = inner.region.get_or_insert_with(DisplayRegion::new);
        region.append(id, notification);
        if let Some(timer) = self.schedule(delay, move |manager| {
            manager.begin_hiding(id, HideReason::Expired);
        }) {
            region.set_auto_hide(id, timer);
        }
        let view = region.view(id);

        log::debug!("notification {id} shown ({kind}, {}ms)", delay.as_millis());
        if let Some(view) = view {
            inner.emit(NotificationEvent::Shown(view));
        }
        id
    }

    /// User-initiated close. Returns `false` if the notification was not showing.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        self.begin_hiding(id, HideReason::Dismissed)
    }

    /// Dismiss the most recent notification that is still showing.
    pub fn dismiss_newest(&self) -> Option<NotificationId> {
        let id = self.lock().region.as_ref()?.newest_showing()?;
        self.dismiss(id).then_some(id)
    }

    /// Shared removal routine for the timeout and dismiss paths.
    fn begin_hiding(&self, id: NotificationId, reason: HideReason) -> bool {
        let mut inner = self.lock();
        let Some(region) = inner.region.as_mut() else {
            return false;
        };
        if !region.begin_hiding(id) {
            return false;
        }
        self.schedule(HIDE_TRANSITION, move |manager| {
            manager.detach(id);
        });
        log::debug!("notification {id} hiding ({reason:?})");
        inner.emit(NotificationEvent::Hiding { id, reason });
        true
    }

    fn detach(&self, id: NotificationId) -> bool {
        let mut inner = self.lock();
        let detached = inner
            .region
            .as_mut()
            .map(|region| region.detach(id))
            .unwrap_or(false);
        if detached {
            log::debug!("notification {id} removed");
            inner.emit(NotificationEvent::Removed { id });
        }
        detached
    }

    fn schedule<F>(&self, delay: Duration, f: F) -> Option<AbortHandle>
    where
        F: FnOnce(&NotificationManager) + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::warn!("no async runtime available; notification timer not scheduled");
            return None;
        };
        let manager = self.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            f(&manager);
        });
        Some(task.abort_handle())
    }

    pub fn phase(&self, id: NotificationId) -> Phase {
        self.lock()
            .region
            .as_ref()
            .map(|region| region.phase(id))
            .unwrap_or(Phase::Removed)
    }

    /// Everything currently attached to the region, in display order.
    pub fn visible(&self) -> Vec<NotificationView> {
        self.lock()
            .region
            .as_ref()
            .map(DisplayRegion::views)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lock().region.as_ref().map(DisplayRegion::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Kind;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<NotificationEvent>) -> Vec<NotificationEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn initialize_is_idempotent() {
        let manager = NotificationManager::new();
        assert!(!manager.is_initialized());
        assert!(manager.initialize());
        assert!(!manager.initialize());
        assert!(manager.is_initialized());
    }

    #[test]
    fn notify_without_runtime_still_shows() {
        let manager = NotificationManager::new();
        manager.initialize();
        let id = manager.notify(Notification::success("saved"));
        assert_eq!(manager.phase(id), Phase::Showing);
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn notify_before_initialize_creates_region() {
        let manager = NotificationManager::new();
        let id = manager.notify(Notification::info("early"));
        assert!(manager.is_initialized());
        assert_eq!(manager.phase(id), Phase::Showing);
    }

    #[tokio::test(start_paused = true)]
    async fn hides_at_duration_and_detaches_after_transition() {
        let manager = NotificationManager::new();
        manager.initialize();
        let id = manager.notify(Notification::info("x").with_duration(ms(1000)));

        sleep(ms(999)).await;
        assert_eq!(manager.phase(id), Phase::Showing);

        sleep(ms(2)).await;
        assert_eq!(manager.phase(id), Phase::Hiding);

        // Hiding began at 1000ms; detach is due at 1300ms.
        sleep(ms(297)).await;
        assert_eq!(manager.phase(id), Phase::Hiding);

        sleep(ms(3)).await;
        assert_eq!(manager.phase(id), Phase::Removed);
        assert!(manager.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn default_duration_is_five_seconds() {
        let manager = NotificationManager::new();
        manager.initialize();
        let id = manager.notify(Notification::success("x"));

        sleep(ms(4999)).await;
        assert_eq!(manager.phase(id), Phase::Showing);
        sleep(ms(2)).await;
        assert_eq!(manager.phase(id), Phase::Hiding);
        sleep(ms(300)).await;
        assert_eq!(manager.phase(id), Phase::Removed);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_dismiss_removes_exactly_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let manager = NotificationManager::with_events(tx);
        manager.initialize();
        let id = manager.notify(Notification::info("bye").with_duration(ms(1000)));

        sleep(ms(100)).await;
        assert!(manager.dismiss(id));
        assert!(!manager.dismiss(id), "second dismiss is a no-op");
        assert_eq!(manager.phase(id), Phase::Hiding);

        sleep(ms(301)).await;
        assert_eq!(manager.phase(id), Phase::Removed);

        // Well past the original auto-hide deadline.
        sleep(ms(5000)).await;

        let events = drain(&mut rx);
        let hiding = events
            .iter()
            .filter(|e| matches!(e, NotificationEvent::Hiding { .. }))
            .count();
        let removed = events
            .iter()
            .filter(|e| matches!(e, NotificationEvent::Removed { .. }))
            .count();
        assert_eq!(hiding, 1);
        assert_eq!(removed, 1);
        assert!(events.contains(&NotificationEvent::Hiding {
            id,
            reason: HideReason::Dismissed
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn dismissing_one_leaves_others_on_their_own_timers() {
        let manager = NotificationManager::new();
        manager.initialize();
        let first = manager.notify(Notification::info("first").with_duration(ms(2000)));
        let second = manager.notify(Notification::info("second").with_duration(ms(2000)));

        manager.dismiss(first);
        sleep(ms(400)).await;
        assert_eq!(manager.phase(first), Phase::Removed);
        assert_eq!(manager.phase(second), Phase::Showing);

        sleep(ms(1700)).await;
        assert_eq!(manager.phase(second), Phase::Hiding);
    }

    #[tokio::test(start_paused = true)]
    async fn visible_keeps_insertion_order() {
        let manager = NotificationManager::new();
        manager.initialize();
        manager.notify(Notification::success("a"));
        manager.notify(Notification::error("b"));
        manager.notify(Notification::new(Kind::Info, "c").with_title("Title"));

        let views = manager.visible();
        let messages: Vec<_> = views.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages, ["a", "b", "c"]);
        assert_eq!(views[2].title.as_deref(), Some("Title"));
        assert_eq!(views[1].kind, Kind::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_newest_targets_latest_showing() {
        let manager = NotificationManager::new();
        manager.initialize();
        let older = manager.notify(Notification::info("older"));
        let newer = manager.notify(Notification::info("newer"));

        assert_eq!(manager.dismiss_newest(), Some(newer));
        assert_eq!(manager.dismiss_newest(), Some(older));
        assert_eq!(manager.dismiss_newest(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn events_follow_the_lifecycle_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let manager = NotificationManager::with_events(tx);
        manager.initialize();
        let id = manager.notify(Notification::success("done").with_duration(ms(500)));

        sleep(ms(900)).await;
        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], NotificationEvent::Shown(v) if v.id == id));
        assert_eq!(
            events[1],
            NotificationEvent::Hiding {
                id,
                reason: HideReason::Expired
            }
        );
        assert_eq!(events[2], NotificationEvent::Removed { id });
    }
}
