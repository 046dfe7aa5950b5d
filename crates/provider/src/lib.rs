//! Azure DevOps service hooks provider: the resource adapter.
//!
//! Receives lifecycle calls (create, read, update, delete, import) from the
//! host tool, converts host state into [`servicehooks::Subscription`] records,
//! calls the [`servicehooks::SubscriptionApi`], and converts the response back.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Resources sequence calls between host state and
//! the transport port. They keep no state between calls; the host's state
//! store is authoritative.
//!
//! ## Resources
//!
//! | Type name | Module |
//! |-----------|--------|
//! | `adoservicehooks_subscription` | [`subscription`] |
//! | `adoservicehooks_repository_webhook` | [`repository_webhook`] |

pub mod config;
pub mod provider;
pub mod repository_webhook;
pub mod resource;
pub mod schema;
pub mod state;
pub mod subscription;

#[cfg(test)]
mod testing;

pub use config::{ProviderConfig, ORGANIZATION_ENV, PAT_ENV};
pub use provider::{ConfiguredProvider, Provider, ProviderError};
pub use repository_webhook::{RepositoryWebhook, RepositoryWebhookResource};
pub use resource::Resource;
pub use schema::{
    Attribute, AttributeKind, AttributeMode, Schema, PROVIDER_TYPE_NAME,
    REPOSITORY_WEBHOOK_SCHEMA, REPOSITORY_WEBHOOK_TYPE_NAME, SUBSCRIPTION_SCHEMA,
    SUBSCRIPTION_TYPE_NAME,
};
pub use subscription::SubscriptionResource;
