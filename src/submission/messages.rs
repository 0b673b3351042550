//! User-facing notification texts for submission outcomes.

use crate::model::SubmissionRequest;
use crate::notify::Notification;
use std::time::Duration;

pub fn consent_required() -> Notification {
    Notification::error("You must accept the privacy policy to continue.")
        .with_title("Privacy policy required")
        .with_duration(Duration::from_millis(4000))
}

pub fn delivered(request: &SubmissionRequest) -> Notification {
    Notification::success(format!(
        "Your message has been sent. We will get back to you soon at {}.",
        request.email
    ))
    .with_title(format!("Thanks {}!", request.name))
    .with_duration(Duration::from_millis(6000))
}

pub fn delivery_failed(fallback_contact: &str) -> Notification {
    Notification::error(format!(
        "Something went wrong while sending your message. Please try again or write to us at {fallback_contact}."
    ))
    .with_title("Sending failed")
    .with_duration(Duration::from_millis(7000))
}
