//! The lifecycle interface every resource type implements.
//!
//! Values passed in and out are host state objects shaped by the resource's
//! [`Schema`]. The host owns state between calls; resources keep none.

use async_trait::async_trait;
use serde_json::Value;
use servicehooks::ServiceHooksError;

use crate::schema::Schema;

/// One resource type the host can manage.
///
/// Implementations map host JSON onto a typed record, call the
/// [`servicehooks::SubscriptionApi`], and map the result back.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Attribute table for this resource's state.
    fn schema(&self) -> &'static Schema;

    /// Full host type name (e.g. `adoservicehooks_subscription`).
    fn type_name(&self) -> &'static str {
        self.schema().type_name
    }

    /// Creates the remote entity from a plan and returns the new state.
    async fn create(&self, plan: &Value) -> Result<Value, ServiceHooksError>;

    /// Refreshes prior state from the remote entity.
    async fn read(&self, state: &Value) -> Result<Value, ServiceHooksError>;

    /// Replaces the remote entity identified by `prior` with `plan`.
    async fn update(&self, plan: &Value, prior: &Value) -> Result<Value, ServiceHooksError>;

    /// Deletes the remote entity identified by `state`.
    async fn delete(&self, state: &Value) -> Result<(), ServiceHooksError>;

    /// Builds state for an existing remote entity from its identifier.
    async fn import(&self, id: &str) -> Result<Value, ServiceHooksError>;
}
