// src/services/contact_relay.rs
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::translator::{Language, Translator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactOutcome {
    pub ok: bool,
    pub status: String,
}

#[derive(Deserialize)]
struct RelayErrors {
    errors: Vec<RelayError>,
}

#[derive(Deserialize)]
struct RelayError {
    message: String,
}

/// Forwards contact form submissions to a third-party form relay.
#[derive(Clone)]
pub struct ContactRelay {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl ContactRelay {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Submit the form. The outcome's status is shown to the visitor as is.
    pub async fn submit(&self, form: &ContactForm, lang: Language, translator: &Translator) -> ContactOutcome {
        let failed = || ContactOutcome {
            ok: false,
            status: translator.text("contact_form_error", lang),
        };

        let Some(endpoint) = &self.endpoint else {
            warn!("contact form submitted but no relay endpoint is configured");
            return failed();
        };

        let resp = match self
            .client
            .post(endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(form)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("contact relay unreachable: {e}");
                return failed();
            }
        };

        if resp.status().is_success() {
            info!("contact form relayed");
            return ContactOutcome {
                ok: true,
                status: translator.text("contact_form_success", lang),
            };
        }

        let status = resp.status();
        match resp.json::<RelayErrors>().await {
            Ok(body) if !body.errors.is_empty() => {
                warn!("contact relay rejected the form ({status})");
                ContactOutcome {
                    ok: false,
                    status: body
                        .errors
                        .into_iter()
                        .map(|e| e.message)
                        .collect::<Vec<_>>()
                        .join(", "),
                }
            }
            _ => {
                warn!("contact relay returned {status}");
                failed()
            }
        }
    }
}
