//! Domain types for Azure DevOps service-hook subscriptions.
//!
//! This crate contains the subscription record, its identifiers, the error
//! taxonomy, and the [`SubscriptionApi`] port trait. The transport crate
//! implements the trait; the provider crate consumes it.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** No I/O dependencies. It defines *what* the
//! remote API offers; `azure-devops` defines *how* to reach it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`SubscriptionId`, `ProjectId`, etc.) |
//! | [`types`] | `Subscription`, its input records, defaults, `Diagnostic` |
//! | [`errors`] | `ApiError`, `ConfigurationError`, `ServiceHooksError` |
//! | [`api`] | The `SubscriptionApi` port trait |

pub mod api;
pub mod errors;
pub mod identifiers;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use api::SubscriptionApi;
pub use errors::{
    ApiError, ApiOperation, ConfigurationError, ServiceHooksError, ORGANIZATION_ATTRIBUTE,
    PAT_ATTRIBUTE,
};
pub use identifiers::{EmptyIdentifier, Organization, ProjectId, RepositoryId, SubscriptionId};
pub use types::{
    ConsumerInputs, Diagnostic, DiagnosticSeverity, IdResponse, PublisherInputs, Subscription,
    DEFAULT_CONSUMER_ID, DEFAULT_RESOURCE_VERSION, DEFAULT_SCOPE, HTTP_REQUEST_ACTION,
    TFS_PUBLISHER_ID,
};
