//! The `adoservicehooks_subscription` resource.
//!
//! Exposes every field of a service-hook subscription. Create POSTs with
//! defaults applied, update PUTs with the identifier carried over from prior
//! state, and read/import replace state wholesale with the remote record.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use servicehooks::{ServiceHooksError, Subscription, SubscriptionApi, SubscriptionId};
use tracing::{debug, info};

use crate::{
    resource::Resource,
    schema::{Schema, SUBSCRIPTION_SCHEMA},
    state::{check_required, from_state, to_state},
};

/// Lifecycle of one service-hook subscription, over any [`SubscriptionApi`].
#[derive(Clone)]
pub struct SubscriptionResource {
    api: Arc<dyn SubscriptionApi>,
}

impl SubscriptionResource {
    /// Binds the resource to the API it manages subscriptions through.
    pub fn new(api: Arc<dyn SubscriptionApi>) -> Self {
        Self { api }
    }

    /// Creates the subscription. Any identifier on `declared` is ignored.
    pub async fn create(&self, mut declared: Subscription) -> Result<Subscription, ServiceHooksError> {
        declared.id = None;
        declared.apply_defaults();

        let stored = self.api.upsert_subscription(&declared).await?;
        let Some(id) = &stored.id else {
            return Err(ServiceHooksError::UnassignedIdentifier);
        };
        info!(subscription_id = %id, event_type = ?stored.event_type, "Created service hook subscription");
        Ok(stored)
    }

    /// Fetches the subscription named by `stored`. A remote 404 is an error.
    pub async fn read(&self, stored: &Subscription) -> Result<Subscription, ServiceHooksError> {
        let id = stored_id(stored)?;
        debug!(subscription_id = %id, "Reading service hook subscription");
        Ok(self.api.get_subscription(id).await?)
    }

    /// Replaces the subscription named by `stored` with `declared`.
    ///
    /// Fails with [`ServiceHooksError::UnassignedIdentifier`] if the response
    /// drops the id, so state never loses it.
    pub async fn update(
        &self,
        mut declared: Subscription,
        stored: &Subscription,
    ) -> Result<Subscription, ServiceHooksError> {
        let id = stored_id(stored)?;
        info!(subscription_id = %id, "Updating service hook subscription");

        declared.id = Some(id.clone());
        declared.apply_defaults();
        let refreshed = self.api.upsert_subscription(&declared).await?;
        if refreshed.id.is_none() {
            return Err(ServiceHooksError::UnassignedIdentifier);
        }
        Ok(refreshed)
    }

    /// Deletes the subscription named by `stored`.
    pub async fn delete(&self, stored: &Subscription) -> Result<(), ServiceHooksError> {
        let id = stored_id(stored)?;
        self.api.delete_subscription(id).await?;
        info!(subscription_id = %id, "Deleted service hook subscription");
        Ok(())
    }

    /// Reads a subscription that was created outside the host.
    pub async fn import(&self, id: &str) -> Result<Subscription, ServiceHooksError> {
        let id = SubscriptionId::new(id).ok_or_else(missing_id)?;
        debug!(subscription_id = %id, "Importing service hook subscription");
        Ok(self.api.get_subscription(&id).await?)
    }
}

fn stored_id(stored: &Subscription) -> Result<&SubscriptionId, ServiceHooksError> {
    stored.id.as_ref().ok_or_else(missing_id)
}

fn missing_id() -> ServiceHooksError {
    ServiceHooksError::MissingIdentifier {
        resource: SUBSCRIPTION_SCHEMA.type_name,
        attribute: "id",
    }
}

#[async_trait]
impl Resource for SubscriptionResource {
    fn schema(&self) -> &'static Schema {
        &SUBSCRIPTION_SCHEMA
    }

    async fn create(&self, plan: &Value) -> Result<Value, ServiceHooksError> {
        check_required(&SUBSCRIPTION_SCHEMA, plan)?;
        let declared = from_state(&SUBSCRIPTION_SCHEMA, plan)?;
        let stored = SubscriptionResource::create(self, declared).await?;
        to_state(&SUBSCRIPTION_SCHEMA, &stored)
    }

    async fn read(&self, state: &Value) -> Result<Value, ServiceHooksError> {
        let stored = from_state(&SUBSCRIPTION_SCHEMA, state)?;
        let refreshed = SubscriptionResource::read(self, &stored).await?;
        to_state(&SUBSCRIPTION_SCHEMA, &refreshed)
    }

    async fn update(&self, plan: &Value, prior: &Value) -> Result<Value, ServiceHooksError> {
        check_required(&SUBSCRIPTION_SCHEMA, plan)?;
        let declared = from_state(&SUBSCRIPTION_SCHEMA, plan)?;
        let stored = from_state(&SUBSCRIPTION_SCHEMA, prior)?;
        let refreshed = SubscriptionResource::update(self, declared, &stored).await?;
        to_state(&SUBSCRIPTION_SCHEMA, &refreshed)
    }

    async fn delete(&self, state: &Value) -> Result<(), ServiceHooksError> {
        let stored = from_state(&SUBSCRIPTION_SCHEMA, state)?;
        SubscriptionResource::delete(self, &stored).await
    }

    async fn import(&self, id: &str) -> Result<Value, ServiceHooksError> {
        let stored = SubscriptionResource::import(self, id).await?;
        to_state(&SUBSCRIPTION_SCHEMA, &stored)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use servicehooks::{ConsumerInputs, PublisherInputs, DEFAULT_CONSUMER_ID};

    use super::*;
    use crate::testing::{Call, InMemoryApi};

    fn setup() -> (Arc<InMemoryApi>, SubscriptionResource) {
        let api = Arc::new(InMemoryApi::default());
        (api.clone(), SubscriptionResource::new(api))
    }

    fn declared(url: &str) -> Subscription {
        Subscription {
            consumer_action_id: Some("httpRequest".into()),
            consumer_inputs: Some(ConsumerInputs {
                url: Some(url.into()),
                ..ConsumerInputs::default()
            }),
            event_type: Some("git.push".into()),
            publisher_id: Some("tfs".into()),
            publisher_inputs: Some(PublisherInputs {
                repository: Some("some-repo".into()),
                project_id: Some("test-project".into()),
                ..PublisherInputs::default()
            }),
            ..Subscription::default()
        }
    }

    #[tokio::test]
    async fn create_posts_with_defaults_and_stores_assigned_id() {
        let (api, resource) = setup();

        let stored = resource
            .create(declared("https://example.com/webhook"))
            .await
            .unwrap();

        assert!(stored.id.as_ref().is_some_and(|id| !id.as_str().is_empty()));
        assert_eq!(stored.consumer_id.as_deref(), Some(DEFAULT_CONSUMER_ID));
        assert_eq!(stored.resource_version.as_deref(), Some("1.0"));
        assert_eq!(stored.scope, Some(1));
        assert_eq!(api.calls(), vec![Call::Post]);
    }

    #[tokio::test]
    async fn create_ignores_a_declared_identifier() {
        let (api, resource) = setup();
        let mut plan = declared("https://example.com/webhook");
        plan.id = SubscriptionId::new("chosen-by-user");

        let stored = resource.create(plan).await.unwrap();

        assert_ne!(stored.id.unwrap().as_str(), "chosen-by-user");
        assert_eq!(api.calls(), vec![Call::Post]);
    }

    #[tokio::test]
    async fn create_without_returned_id_fails() {
        let api = Arc::new(InMemoryApi::default().without_assigned_ids());
        let resource = SubscriptionResource::new(api);

        let err = resource
            .create(declared("https://example.com/webhook"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceHooksError::UnassignedIdentifier));
    }

    #[tokio::test]
    async fn update_puts_to_the_stored_identifier() {
        let (api, resource) = setup();
        let stored = resource
            .create(declared("https://example.com/webhook"))
            .await
            .unwrap();
        let id = stored.id.clone().unwrap();

        let refreshed = resource
            .update(declared("https://example.com/updated_webhook"), &stored)
            .await
            .unwrap();

        assert_eq!(refreshed.id.as_ref(), Some(&id));
        assert_eq!(refreshed.url(), Some("https://example.com/updated_webhook"));
        assert_eq!(api.calls(), vec![Call::Post, Call::Put(id.to_string())]);
    }

    #[tokio::test]
    async fn update_without_returned_id_fails_instead_of_dropping_it() {
        let (_, resource) = setup();
        let stored = resource
            .create(declared("https://example.com/webhook"))
            .await
            .unwrap();
        let api = Arc::new(InMemoryApi::default().without_assigned_ids());
        api.insert(stored.clone());
        let resource = SubscriptionResource::new(api);

        let err = resource
            .update(declared("https://example.com/updated_webhook"), &stored)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceHooksError::UnassignedIdentifier));
    }

    #[tokio::test]
    async fn state_with_empty_id_is_invalid() {
        let (api, resource) = setup();
        let resource: &dyn Resource = &resource;

        for state in [json!({ "id": "" }), json!({ "id": "", "event_type": "git.push" })] {
            let err = resource.read(&state).await.unwrap_err();
            assert!(matches!(err, ServiceHooksError::InvalidState { .. }));
            let err = resource.delete(&state).await.unwrap_err();
            assert!(matches!(err, ServiceHooksError::InvalidState { .. }));
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn operations_on_state_without_id_fail() {
        let (api, resource) = setup();
        let stateless = declared("https://example.com/webhook");

        let read = resource.read(&stateless).await.unwrap_err();
        let delete = resource.delete(&stateless).await.unwrap_err();
        let update = resource
            .update(stateless.clone(), &stateless)
            .await
            .unwrap_err();

        for err in [read, delete, update] {
            assert!(matches!(
                err,
                ServiceHooksError::MissingIdentifier { attribute: "id", .. }
            ));
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn import_is_read_with_an_external_identifier() {
        let (_, resource) = setup();
        let stored = resource
            .create(declared("https://example.com/webhook"))
            .await
            .unwrap();

        let imported = resource
            .import(stored.id.as_ref().unwrap().as_str())
            .await
            .unwrap();

        assert_eq!(imported, stored);
        assert!(matches!(
            resource.import("").await.unwrap_err(),
            ServiceHooksError::MissingIdentifier { .. }
        ));
    }

    #[tokio::test]
    async fn full_lifecycle_ends_with_not_found() {
        let (_, resource) = setup();

        let created = resource
            .create(declared("https://example.com/webhook"))
            .await
            .unwrap();
        assert_eq!(created.event_type.as_deref(), Some("git.push"));

        let read = resource.read(&created).await.unwrap();
        assert_eq!(read.url(), Some("https://example.com/webhook"));
        assert_eq!(read.event_type.as_deref(), Some("git.push"));

        let updated = resource
            .update(declared("https://example.com/updated_webhook"), &read)
            .await
            .unwrap();
        let reread = resource.read(&updated).await.unwrap();
        assert_eq!(reread.url(), Some("https://example.com/updated_webhook"));

        resource.delete(&reread).await.unwrap();
        let err = resource.read(&reread).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn host_state_lifecycle_through_the_resource_trait() {
        let (_, resource) = setup();
        let resource: &dyn Resource = &resource;
        let plan = json!({
            "consumer_action_id": "httpRequest",
            "consumer_inputs": { "url": "https://example.com/webhook" },
            "event_type": "git.push",
            "publisher_id": "tfs",
            "publisher_inputs": { "repository": "some-repo", "project_id": "test-project" }
        });

        let state = resource.create(&plan).await.unwrap();
        assert!(state["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(state["consumer_id"], "webHooks");
        assert_eq!(state["publisher_inputs"]["branch"], Value::Null);

        let refreshed = resource.read(&state).await.unwrap();
        assert_eq!(refreshed, state);

        resource.delete(&state).await.unwrap();
        assert!(resource.read(&state).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn plan_missing_required_attribute_is_rejected_before_any_call() {
        let (api, resource) = setup();
        let resource: &dyn Resource = &resource;

        let err = resource
            .create(&json!({"consumer_action_id": "httpRequest", "publisher_id": "tfs"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceHooksError::InvalidState { .. }));
        assert!(api.calls().is_empty());
    }
}
