//! Mail-relay collaborator.
//!
//! The submission controller only sees [`MailRelay`]: a service id, a template
//! id and a key/value payload go in, an opaque success or failure comes out.

mod emailjs;

pub use emailjs::EmailJsClient;

use crate::model::TemplateParams;
use std::future::Future;
use std::time::Duration;

/// What the relay answered on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("relay request failed")]
    Transport(#[from] reqwest::Error),
    #[error("relay rejected the message ({status}): {text}")]
    Rejected { status: u16, text: String },
    #[error("relay did not answer within {0:?}")]
    TimedOut(Duration),
}

pub trait MailRelay: Send + Sync + 'static {
    fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &TemplateParams,
    ) -> impl Future<Output = Result<RelayResponse, RelayError>> + Send;
}
