//! HTTP client for the Sponte educational SOAP API

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::envelope::{build_request, parse_response, soap_action};
use super::extract;
use crate::config::ApiCredentials;
use crate::config::settings::ApiSettings;
use crate::resolver::StudentLookup;

pub struct SponteClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SponteClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
        })
    }

    /// Call `GetAlunos` with a search filter such as `CPF=12345678900`
    pub async fn get_alunos(&self, credentials: &ApiCredentials, search: &str) -> Result<Value> {
        let body = build_request(
            "GetAlunos",
            &[
                ("nCodigoCliente", credentials.client_code.as_str()),
                ("sToken", credentials.token.as_str()),
                ("sParametrosBusca", search),
            ],
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action("GetAlunos"))
            .body(body)
            .send()
            .await
            .with_context(|| format!("GetAlunos request to {} failed", self.endpoint))?;

        let status = response.status();
        let text = response.text().await.context("Failed to read GetAlunos response")?;

        // Faults come back as HTTP 500 with a readable envelope
        match parse_response(&text) {
            Ok(value) => Ok(value),
            Err(e) if !status.is_success() => {
                Err(e.context(format!("GetAlunos returned HTTP {}", status)))
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl StudentLookup for SponteClient {
    async fn find_student_id(&self, cpf: &str, credentials: &ApiCredentials) -> Result<Option<String>> {
        let response = self.get_alunos(credentials, &format!("CPF={}", cpf)).await?;
        Ok(extract::student_id(&response))
    }
}
