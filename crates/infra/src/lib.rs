//! Infrastructure layer: collaborator adapters and wizard orchestration.
//!
//! - `gateway`: traits for the employee directory, affordability scorer,
//!   and deduction request store, plus the shared error classification
//! - `resolver` / `affordability` / `submission`: thin gateways over those
//!   traits with local precondition checks and stale-response handling
//! - `wizard`: the session object a UI drives
//! - `http` / `in_memory`: concrete adapters

pub mod affordability;
pub mod config;
pub mod context;
pub mod gateway;
pub mod http;
pub mod in_memory;
pub mod resolver;
pub mod submission;
pub mod wizard;

pub use affordability::{AffordabilityGateway, AssessmentError};
pub use config::{ConfigError, GatewayConfig};
pub use context::{InstitutionContext, InstitutionKind};
pub use gateway::{AffordabilityScorer, DeductionRequestStore, EmployeeDirectory, GatewayError};
pub use http::HttpGateway;
pub use in_memory::{InMemoryAffordabilityScorer, InMemoryDeductionRequestStore, InMemoryEmployeeDirectory};
pub use resolver::{EmployeeResolver, SearchOutcome, SearchView};
pub use submission::SubmissionGateway;
pub use wizard::{AssessmentOutcome, DeductionWizard, WizardError};
