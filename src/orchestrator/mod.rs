//! Application-level orchestration.
//!
//! This module owns the submission task lifecycle and turns UI commands into
//! controller and notification-manager calls. UI/CLI layers only send
//! [`UiCommand`]s and read `AppEvent`s.

mod controller;

pub(crate) use controller::{start_session, UiCommand};
