//! Port trait for the Azure DevOps service-hook REST surface.
//!
//! The `azure-devops` crate supplies the HTTP implementation; resource
//! adapters depend only on this trait so they can be exercised against an
//! in-memory double.

use async_trait::async_trait;

use crate::{ApiError, ProjectId, RepositoryId, Subscription, SubscriptionId};

/// Remote operations a resource adapter needs.
///
/// Every call is a single request with no retry. Implementations must be
/// shareable across concurrently running resource operations.
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    /// Resolves a project name (or id) to its GUID.
    async fn lookup_project_id(&self, project: &str) -> Result<ProjectId, ApiError>;

    /// Resolves a repository name within `project` to its GUID.
    async fn lookup_repository_id(
        &self,
        project: &str,
        repository: &str,
    ) -> Result<RepositoryId, ApiError>;

    /// Fetches a subscription by id. A missing subscription is a 404 status error.
    ///
    /// A response body that is not a subscription (no `id`) is
    /// [`ApiError::Decode`].
    async fn get_subscription(&self, id: &SubscriptionId) -> Result<Subscription, ApiError>;

    /// Creates the subscription when `subscription.id` is `None`, otherwise
    /// replaces the subscription with that id. Returns the stored record,
    /// which the HTTP implementation guarantees carries an `id`.
    async fn upsert_subscription(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, ApiError>;

    /// Deletes a subscription by id.
    async fn delete_subscription(&self, id: &SubscriptionId) -> Result<(), ApiError>;
}
