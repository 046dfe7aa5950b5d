//! In-memory [`SubscriptionApi`] double for resource tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use servicehooks::{
    ApiError, ApiOperation, ProjectId, RepositoryId, Subscription, SubscriptionApi,
    SubscriptionId,
};
use uuid::Uuid;

/// A request the double received, in the shape the real client would send it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    LookupProject(String),
    LookupRepository(String, String),
    Get(String),
    Post,
    Put(String),
    Delete(String),
}

#[derive(Default)]
struct Remote {
    subscriptions: HashMap<SubscriptionId, Subscription>,
    projects: HashMap<String, String>,
    repositories: HashMap<(String, String), String>,
    calls: Vec<Call>,
}

/// Behaves like the service-hook API: assigns UUIDs on create, 404s on
/// unknown ids, and fills in `tfsSubscriptionId`.
#[derive(Default)]
pub(crate) struct InMemoryApi {
    remote: Mutex<Remote>,
    withhold_ids: bool,
}

impl InMemoryApi {
    /// Creates and updates answer without an `id`, like a misbehaving server.
    pub(crate) fn without_assigned_ids(mut self) -> Self {
        self.withhold_ids = true;
        self
    }

    pub(crate) fn with_project(self, name: &str, id: &str) -> Self {
        self.lock().projects.insert(name.into(), id.into());
        self
    }

    pub(crate) fn with_repository(self, project: &str, name: &str, id: &str) -> Self {
        self.lock()
            .repositories
            .insert((project.into(), name.into()), id.into());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Seeds a subscription that already exists remotely.
    pub(crate) fn insert(&self, subscription: Subscription) {
        let id = subscription
            .id
            .clone()
            .expect("seeded subscriptions carry an id");
        self.lock().subscriptions.insert(id, subscription);
    }

    pub(crate) fn stored(&self, id: &SubscriptionId) -> Option<Subscription> {
        self.lock().subscriptions.get(id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Remote> {
        self.remote.lock().unwrap()
    }
}

fn not_found(operation: ApiOperation) -> ApiError {
    ApiError::Status {
        operation,
        status: 404,
    }
}

#[async_trait]
impl SubscriptionApi for InMemoryApi {
    async fn lookup_project_id(&self, project: &str) -> Result<ProjectId, ApiError> {
        let mut remote = self.lock();
        remote.calls.push(Call::LookupProject(project.into()));
        remote
            .projects
            .get(project)
            .and_then(|id| ProjectId::new(id.clone()))
            .ok_or(not_found(ApiOperation::LookupProject))
    }

    async fn lookup_repository_id(
        &self,
        project: &str,
        repository: &str,
    ) -> Result<RepositoryId, ApiError> {
        let mut remote = self.lock();
        remote
            .calls
            .push(Call::LookupRepository(project.into(), repository.into()));
        remote
            .repositories
            .get(&(project.to_string(), repository.to_string()))
            .and_then(|id| RepositoryId::new(id.clone()))
            .ok_or(not_found(ApiOperation::LookupRepository))
    }

    async fn get_subscription(&self, id: &SubscriptionId) -> Result<Subscription, ApiError> {
        let mut remote = self.lock();
        remote.calls.push(Call::Get(id.to_string()));
        remote
            .subscriptions
            .get(id)
            .cloned()
            .ok_or(not_found(ApiOperation::GetSubscription))
    }

    async fn upsert_subscription(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, ApiError> {
        let mut remote = self.lock();
        let mut stored = subscription.clone();

        let id = match &subscription.id {
            Some(id) => {
                remote.calls.push(Call::Put(id.to_string()));
                if !remote.subscriptions.contains_key(id) {
                    return Err(not_found(ApiOperation::UpdateSubscription));
                }
                id.clone()
            }
            None => {
                remote.calls.push(Call::Post);
                if self.withhold_ids {
                    return Ok(stored);
                }
                SubscriptionId::new(Uuid::new_v4().to_string())
                    .expect("a formatted UUID is never empty")
            }
        };

        if let Some(publisher) = stored.publisher_inputs.as_mut() {
            publisher.tfs_subscription_id = Some(format!("tfs-{id}"));
        }
        stored.id = Some(id.clone());
        remote.subscriptions.insert(id, stored.clone());
        if self.withhold_ids {
            stored.id = None;
        }
        Ok(stored)
    }

    async fn delete_subscription(&self, id: &SubscriptionId) -> Result<(), ApiError> {
        let mut remote = self.lock();
        remote.calls.push(Call::Delete(id.to_string()));
        remote
            .subscriptions
            .remove(id)
            .map(|_| ())
            .ok_or(not_found(ApiOperation::DeleteSubscription))
    }
}
