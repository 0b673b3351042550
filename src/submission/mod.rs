//! Contact-form submission: consent check, relay delivery and outcome reporting.

mod controller;
mod messages;

pub use controller::SubmissionController;
pub(crate) use messages::delivery_failed;
