//! The `adoservicehooks_repository_webhook` resource.
//!
//! A narrow front end over service-hook subscriptions: the user names a project
//! and repository, and the resource resolves both to GUIDs before building an
//! `httpRequest` web hook subscription filtered to that repository.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use servicehooks::{
    ConsumerInputs, PublisherInputs, ServiceHooksError, Subscription, SubscriptionApi,
    SubscriptionId, HTTP_REQUEST_ACTION, TFS_PUBLISHER_ID,
};
use tracing::{debug, info};

use crate::{
    resource::Resource,
    schema::{Schema, REPOSITORY_WEBHOOK_SCHEMA},
    state::{check_required, from_state, to_state},
};

/// Host-facing record of a repository web hook.
///
/// `project` and `repository` hold the names the user declared; the remote
/// subscription only stores their GUIDs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryWebhook {
    /// Project name (or id) as declared.
    pub project: Option<String>,
    /// Repository name within `project`, as declared.
    pub repository: Option<String>,
    /// Delivery URL.
    pub url: Option<String>,
    /// Triggering event (e.g. `git.push`).
    pub event_type: Option<String>,
    /// Id of the backing subscription; computed.
    pub webhook_id: Option<SubscriptionId>,
}

impl RepositoryWebhook {
    /// Takes the remote-owned fields from `stored`.
    fn refreshed_from(mut self, stored: Subscription) -> Self {
        self.webhook_id = stored.id.clone();
        self.url = stored.url().map(str::to_string);
        self.event_type = stored.event_type;
        self
    }
}

/// Lifecycle of a repository web hook, over any [`SubscriptionApi`].
#[derive(Clone)]
pub struct RepositoryWebhookResource {
    api: Arc<dyn SubscriptionApi>,
}

impl RepositoryWebhookResource {
    /// Binds the resource to the API it manages subscriptions through.
    pub fn new(api: Arc<dyn SubscriptionApi>) -> Self {
        Self { api }
    }

    /// Resolves the declared names and builds the subscription to send.
    async fn subscription(
        &self,
        declared: &RepositoryWebhook,
        id: Option<SubscriptionId>,
    ) -> Result<Subscription, ServiceHooksError> {
        let project = required(&declared.project, "project")?;
        let repository = required(&declared.repository, "repository")?;

        let project_id = self.api.lookup_project_id(project).await?;
        let repository_id = self.api.lookup_repository_id(project, repository).await?;
        debug!(%project_id, %repository_id, "Resolved repository web hook target");

        Ok(Subscription {
            consumer_action_id: Some(HTTP_REQUEST_ACTION.to_string()),
            consumer_inputs: Some(ConsumerInputs {
                url: Some(required(&declared.url, "url")?.to_string()),
                ..ConsumerInputs::default()
            }),
            event_type: Some(required(&declared.event_type, "event_type")?.to_string()),
            id,
            publisher_id: Some(TFS_PUBLISHER_ID.to_string()),
            publisher_inputs: Some(PublisherInputs {
                repository: Some(repository_id.to_string()),
                project_id: Some(project_id.to_string()),
                ..PublisherInputs::default()
            }),
            ..Subscription::default()
        }
        .with_defaults())
    }

    /// Resolves the names, creates the subscription, and records its id.
    pub async fn create(
        &self,
        declared: RepositoryWebhook,
    ) -> Result<RepositoryWebhook, ServiceHooksError> {
        let subscription = self.subscription(&declared, None).await?;
        let stored = self.api.upsert_subscription(&subscription).await?;
        if stored.id.is_none() {
            return Err(ServiceHooksError::UnassignedIdentifier);
        }
        let created = declared.refreshed_from(stored);
        info!(webhook_id = ?created.webhook_id, "Created repository web hook");
        Ok(created)
    }

    /// Refreshes `url` and `event_type`; the declared names are kept.
    pub async fn read(
        &self,
        stored: &RepositoryWebhook,
    ) -> Result<RepositoryWebhook, ServiceHooksError> {
        let id = webhook_id(stored)?;
        let remote = self.api.get_subscription(id).await?;
        Ok(stored.clone().refreshed_from(remote))
    }

    /// Re-resolves the names and replaces the subscription named by `stored`.
    pub async fn update(
        &self,
        declared: RepositoryWebhook,
        stored: &RepositoryWebhook,
    ) -> Result<RepositoryWebhook, ServiceHooksError> {
        let id = webhook_id(stored)?;
        info!(webhook_id = %id, "Updating repository web hook");

        let subscription = self.subscription(&declared, Some(id.clone())).await?;
        let remote = self.api.upsert_subscription(&subscription).await?;
        if remote.id.is_none() {
            return Err(ServiceHooksError::UnassignedIdentifier);
        }
        Ok(declared.refreshed_from(remote))
    }

    /// Deletes the subscription named by `stored`.
    pub async fn delete(&self, stored: &RepositoryWebhook) -> Result<(), ServiceHooksError> {
        let id = webhook_id(stored)?;
        self.api.delete_subscription(id).await?;
        info!(webhook_id = %id, "Deleted repository web hook");
        Ok(())
    }

    /// Imports by subscription id. Project and repository names stay unset
    /// because the remote record only carries their GUIDs.
    pub async fn import(&self, id: &str) -> Result<RepositoryWebhook, ServiceHooksError> {
        let id = SubscriptionId::new(id).ok_or_else(missing_id)?;
        let remote = self.api.get_subscription(&id).await?;
        Ok(RepositoryWebhook::default().refreshed_from(remote))
    }
}

fn required<'a>(
    value: &'a Option<String>,
    attribute: &str,
) -> Result<&'a str, ServiceHooksError> {
    value
        .as_deref()
        .ok_or_else(|| ServiceHooksError::InvalidState {
            resource: REPOSITORY_WEBHOOK_SCHEMA.type_name,
            message: format!("missing required attribute(s): {attribute}"),
        })
}

fn webhook_id(stored: &RepositoryWebhook) -> Result<&SubscriptionId, ServiceHooksError> {
    stored.webhook_id.as_ref().ok_or_else(missing_id)
}

fn missing_id() -> ServiceHooksError {
    ServiceHooksError::MissingIdentifier {
        resource: REPOSITORY_WEBHOOK_SCHEMA.type_name,
        attribute: "webhook_id",
    }
}

#[async_trait]
impl Resource for RepositoryWebhookResource {
    fn schema(&self) -> &'static Schema {
        &REPOSITORY_WEBHOOK_SCHEMA
    }

    async fn create(&self, plan: &Value) -> Result<Value, ServiceHooksError> {
        check_required(&REPOSITORY_WEBHOOK_SCHEMA, plan)?;
        let declared = from_state(&REPOSITORY_WEBHOOK_SCHEMA, plan)?;
        let created = RepositoryWebhookResource::create(self, declared).await?;
        to_state(&REPOSITORY_WEBHOOK_SCHEMA, &created)
    }

    async fn read(&self, state: &Value) -> Result<Value, ServiceHooksError> {
        let stored = from_state(&REPOSITORY_WEBHOOK_SCHEMA, state)?;
        let refreshed = RepositoryWebhookResource::read(self, &stored).await?;
        to_state(&REPOSITORY_WEBHOOK_SCHEMA, &refreshed)
    }

    async fn update(&self, plan: &Value, prior: &Value) -> Result<Value, ServiceHooksError> {
        check_required(&REPOSITORY_WEBHOOK_SCHEMA, plan)?;
        let declared = from_state(&REPOSITORY_WEBHOOK_SCHEMA, plan)?;
        let stored = from_state(&REPOSITORY_WEBHOOK_SCHEMA, prior)?;
        let refreshed = RepositoryWebhookResource::update(self, declared, &stored).await?;
        to_state(&REPOSITORY_WEBHOOK_SCHEMA, &refreshed)
    }

    async fn delete(&self, state: &Value) -> Result<(), ServiceHooksError> {
        let stored = from_state(&REPOSITORY_WEBHOOK_SCHEMA, state)?;
        RepositoryWebhookResource::delete(self, &stored).await
    }

    async fn import(&self, id: &str) -> Result<Value, ServiceHooksError> {
        let imported = RepositoryWebhookResource::import(self, id).await?;
        to_state(&REPOSITORY_WEBHOOK_SCHEMA, &imported)
    }
}
