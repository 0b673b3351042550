//! The display region: ordered host for live notifications.
//!
//! The region only knows about phases; timing lives in the manager. Every
//! transition is guarded by the entry's current phase, which is what makes a
//! late timer or a repeated dismiss harmless.

use super::notification::{Notification, NotificationId, NotificationView, Phase};
use tokio::task::AbortHandle;

struct Entry {
    id: NotificationId,
    notification: Notification,
    phase: Phase,
    /// Pending auto-hide timer, aborted when the user dismisses first.
    auto_hide: Option<AbortHandle>,
}

#[derive(Default)]
pub struct DisplayRegion {
    entries: Vec<Entry>,
}

impl DisplayRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append in creation order.
    pub fn append(&mut self, id: NotificationId, notification: Notification) {
        self.entries.push(Entry {
            id,
            notification,
            phase: Phase::Showing,
            auto_hide: None,
        });
    }

    pub fn set_auto_hide(&mut self, id: NotificationId, handle: AbortHandle) {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) if entry.phase == Phase::Showing => entry.auto_hide = Some(handle),
            // Already hiding or gone: the timer has nothing left to do.
            _ => handle.abort(),
        }
    }

    /// `Showing -> Hiding`. Returns `false` for any other starting point.
    pub fn begin_hiding(&mut self, id: NotificationId) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        if entry.phase != Phase::Showing {
            return false;
        }
        entry.phase = Phase::Hiding;
        if let Some(timer) = entry.auto_hide.take() {
            timer.abort();
        }
        true
    }

    /// `Hiding -> Removed`. Detaching something already detached is a no-op.
    pub fn detach(&mut self, id: NotificationId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) if self.entries[pos].phase == Phase::Hiding => {
                self.entries.remove(pos);
                true
            }
            _ => false,
        }
    }

    pub fn phase(&self, id: NotificationId) -> Phase {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.phase)
            .unwrap_or(Phase::Removed)
    }

    pub fn view(&self, id: NotificationId) -> Option<NotificationView> {
        self.entries.iter().find(|e| e.id == id).map(Entry::view)
    }

    /// Snapshot in display order.
    pub fn views(&self) -> Vec<NotificationView> {
        self.entries.iter().map(Entry::view).collect()
    }

    /// Newest entry that is still showing, the natural target for "dismiss".
    pub fn newest_showing(&self) -> Option<NotificationId> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.phase == Phase::Showing)
            .map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Entry {
    fn view(&self) -> NotificationView {
        NotificationView {
            id: self.id,
            kind: self.notification.kind(),
            title: self.notification.title().map(str::to_owned),
            message: self.notification.message().to_owned(),
            phase: self.phase,
        }
    }
}
