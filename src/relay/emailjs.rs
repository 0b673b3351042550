use super::{MailRelay, RelayError, RelayResponse};
use crate::config::RelayConfig;
use crate::model::TemplateParams;
use anyhow::{Context, Result};
use serde::Serialize;

const SEND_PATH: &str = "/api/v1.0/email/send";

/// JSON body accepted by the EmailJS REST send endpoint.
#[derive(Debug, Serialize)]
struct SendBody<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a TemplateParams,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
}

/// HTTP client for an EmailJS-compatible relay.
pub struct EmailJsClient {
    http: reqwest::Client,
    send_url: String,
    public_key: String,
    access_token: Option<String>,
}

impl EmailJsClient {
    pub fn new(cfg: &RelayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!("contact-relay/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build relay http client")?;
        Ok(Self {
            http,
            send_url: format!("{}{}", cfg.endpoint.trim_end_matches('/'), SEND_PATH),
            public_key: cfg.public_key.clone(),
            access_token: cfg.access_token.clone(),
        })
    }

    fn body<'a>(
        &'a self,
        service_id: &'a str,
        template_id: &'a str,
        params: &'a TemplateParams,
    ) -> SendBody<'a> {
        SendBody {
            service_id,
            template_id,
            user_id: &self.public_key,
            template_params: params,
            access_token: self.access_token.as_deref(),
        }
    }
}

impl MailRelay for EmailJsClient {
    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &TemplateParams,
    ) -> Result<RelayResponse, RelayError> {
        let resp = self
            .http
            .post(&self.send_url)
            .json(&self.body(service_id, template_id, params))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let success = resp.status().is_success();
        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("could not read relay response body ({status}): {e}");
                String::new()
            }
        };
        if !success {
            return Err(RelayError::Rejected { status, text });
        }
        Ok(RelayResponse { status, text })
    }
}
