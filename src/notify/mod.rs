//! Toast notifications.
//!
//! A single display region hosts every live notification in creation order.
//! Each one shows for its duration (5s unless overridden), hides for a fixed
//! 300ms transition, then is detached. Users may dismiss early; dismissal and
//! expiry share one removal path, so a notification is never removed twice.
//!
//! - [`notification`] - `Notification`, `Kind`, `Phase` and the timing constants
//! - [`region`] - `DisplayRegion`, the ordered, phase-guarded container
//! - [`manager`] - `NotificationManager`, which owns the region and its timers

mod manager;
mod notification;
mod region;

pub use manager::{NotificationEvent, NotificationManager};
pub use notification::{HideReason, Kind, Notification, NotificationId, NotificationView, Phase};
