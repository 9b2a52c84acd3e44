//! Configuration loading.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use paydesk_core::{DomainError, InstitutionId};
use paydesk_deductions::DraftPolicy;

use crate::context::{InstitutionContext, InstitutionKind};

pub const API_URL_VAR: &str = "PAYDESK_API_URL";
pub const API_TOKEN_VAR: &str = "PAYDESK_API_TOKEN";
pub const TIMEOUT_VAR: &str = "PAYDESK_HTTP_TIMEOUT_SECS";
pub const REQUIRE_AFFORDABILITY_VAR: &str = "PAYDESK_REQUIRE_AFFORDABILITY";
pub const INSTITUTION_VAR: &str = "PAYDESK_INSTITUTION_ID";

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Settings for the collaborator adapters and the wizard policy.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_url: Url,
    pub api_token: Option<String>,
    pub timeout: Duration,
    pub require_affordability: bool,
    pub institution_id: Option<InstitutionId>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (process env, a map in tests, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(raw_url.trim()).map_err(|_| ConfigError::InvalidUrl {
            value: raw_url.clone(),
        })?;

        let api_token = lookup(API_TOKEN_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let timeout = match lookup(TIMEOUT_VAR) {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout { value: raw }),
            },
        };

        let require_affordability = match lookup(REQUIRE_AFFORDABILITY_VAR) {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                key: REQUIRE_AFFORDABILITY_VAR,
                value: raw,
            })?,
        };

        let institution_id = lookup(INSTITUTION_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| raw.parse::<InstitutionId>())
            .transpose()
            .map_err(ConfigError::InvalidInstitution)?;

        Ok(Self {
            api_url,
            api_token,
            timeout,
            require_affordability,
            institution_id,
        })
    }

    pub fn draft_policy(&self) -> DraftPolicy {
        DraftPolicy {
            require_affordability: self.require_affordability,
        }
    }

    /// Acting-institution context. There is no fallback institution.
    pub fn institution_context(&self, kind: InstitutionKind) -> Result<InstitutionContext, ConfigError> {
        let institution_id = self.institution_id.ok_or(ConfigError::MissingInstitution)?;
        Ok(InstitutionContext::new(institution_id, kind))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PAYDESK_API_URL must be an absolute URL (got {value:?})")]
    InvalidUrl { value: String },

    #[error("PAYDESK_HTTP_TIMEOUT_SECS must be a positive number of seconds (got {value:?})")]
    InvalidTimeout { value: String },

    #[error("{key} must be a boolean (got {value:?})")]
    InvalidFlag { key: &'static str, value: String },

    #[error("PAYDESK_INSTITUTION_ID is not a valid institution id: {0}")]
    InvalidInstitution(DomainError),

    #[error("PAYDESK_INSTITUTION_ID is not set; the acting institution must be explicit")]
    MissingInstitution,
}
