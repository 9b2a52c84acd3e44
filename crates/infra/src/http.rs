//! HTTP adapter for the payroll services.
//!
//! Endpoints (relative to the configured base URL):
//! - `GET employees/search?q=&institution_id=&institution_kind=` -> `[Employee]`
//! - `GET affordability/check?employee_id=&amount=` -> `{success, data, message}`
//! - `POST deduction-requests` -> `DeductionRequest`
//!
//! Non-2xx responses are classified with [`GatewayError::from_status`];
//! error bodies of the form `{"error": .., "message": ..}` supply the message.

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use paydesk_core::EmployeeId;
use paydesk_deductions::{AffordabilityAssessment, DeductionRequest, Employee, NewDeductionRequest};

use crate::config::GatewayConfig;
use crate::context::{InstitutionContext, InstitutionKind};
use crate::gateway::{AffordabilityScorer, DeductionRequestStore, EmployeeDirectory, GatewayError};

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        // `Url::join` replaces the last segment unless the path ends in '/'.
        let mut base_url = config.api_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::Network(format!("invalid endpoint {path}: {e}")))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(GatewayError::from_status(
                status.as_u16(),
                error_message(status, &body),
            ));
        }

        serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Network("request timed out".to_string())
    } else {
        GatewayError::Network(err.to_string())
    }
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.error) {
            return message;
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        text
    }
}

fn kind_param(kind: InstitutionKind) -> &'static str {
    match kind {
        InstitutionKind::Employer => "employer",
        InstitutionKind::Sacco => "sacco",
        InstitutionKind::FinancialHub => "financial_hub",
    }
}

#[async_trait::async_trait]
impl EmployeeDirectory for HttpGateway {
    async fn search(
        &self,
        context: &InstitutionContext,
        query: &str,
    ) -> Result<Vec<Employee>, GatewayError> {
        let url = self.endpoint("employees/search")?;
        let request = self.client.get(url).query(&[
            ("q", query.to_string()),
            ("institution_id", context.institution_id().to_string()),
            ("institution_kind", kind_param(context.kind()).to_string()),
        ]);
        self.send(request).await
    }
}

#[async_trait::async_trait]
impl AffordabilityScorer for HttpGateway {
    async fn assess(
        &self,
        employee_id: EmployeeId,
        requested_amount: Decimal,
    ) -> Result<AffordabilityAssessment, GatewayError> {
        let url = self.endpoint("affordability/check")?;
        let request = self.client.get(url).query(&[
            ("employee_id", employee_id.to_string()),
            ("amount", requested_amount.to_string()),
        ]);

        let envelope: Envelope<AffordabilityAssessment> = self.send(request).await?;
        match envelope {
            Envelope {
                success: true,
                data: Some(assessment),
                ..
            } => Ok(assessment),
            Envelope {
                success: true,
                data: None,
                ..
            } => Err(GatewayError::Decode(
                "affordability response has no data".to_string(),
            )),
            Envelope { message, .. } => Err(GatewayError::Validation(
                message.unwrap_or_else(|| "affordability check failed".to_string()),
            )),
        }
    }
}

#[async_trait::async_trait]
impl DeductionRequestStore for HttpGateway {
    async fn create(&self, request: &NewDeductionRequest) -> Result<DeductionRequest, GatewayError> {
        let url = self.endpoint("deduction-requests")?;
        self.send(self.client.post(url).json(request)).await
    }
}
