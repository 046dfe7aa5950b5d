//! Provider entry point: metadata, configuration, and resource registry.

use std::sync::Arc;

use azure_devops::{AzureDevOpsClient, ClientBuildError};
use servicehooks::{ConfigurationError, Diagnostic, SubscriptionApi};
use thiserror::Error;
use tracing::info;

use crate::{
    config::ProviderConfig,
    repository_webhook::RepositoryWebhookResource,
    resource::Resource,
    schema::{Schema, PROVIDER_TYPE_NAME, REPOSITORY_WEBHOOK_SCHEMA, SUBSCRIPTION_SCHEMA},
    subscription::SubscriptionResource,
};

/// Configuring the provider failed; no resource can run.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Client(#[from] ClientBuildError),
}

impl ProviderError {
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::Configuration(e) => e.diagnostics(),
            Self::Client(e) => vec![Diagnostic::error(
                "Unable to Create Client",
                format!(
                    "An unexpected error occurred when creating the client. \
                     If the error is not clear, please contact the provider developers.\n\n\
                     Client Error: {e}"
                ),
            )],
        }
    }
}

/// The unconfigured provider.
#[derive(Debug, Clone)]
pub struct Provider {
    version: String,
}

impl Provider {
    /// `version` is the release version, `"dev"` for local builds, or `"test"`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Prefix of every resource type name.
    pub fn type_name(&self) -> &'static str {
        PROVIDER_TYPE_NAME
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Schemas of every resource the provider offers.
    pub fn schemas(&self) -> [&'static Schema; 2] {
        [&SUBSCRIPTION_SCHEMA, &REPOSITORY_WEBHOOK_SCHEMA]
    }

    /// Resolves credentials and builds the shared Azure DevOps client.
    pub fn configure(&self, config: &ProviderConfig) -> Result<ConfiguredProvider, ProviderError> {
        let credentials = config.resolve()?;
        let client = match &config.base_url {
            Some(base_url) => AzureDevOpsClient::with_base_url(credentials, base_url.as_str())?,
            None => AzureDevOpsClient::new(credentials)?,
        };
        info!(
            organization = %client.organization(),
            base_url = client.base_url(),
            version = %self.version,
            "Configured Azure DevOps service hooks provider"
        );
        Ok(self.with_api(Arc::new(client)))
    }

    /// Binds the resources to an existing API implementation.
    pub fn with_api(&self, api: Arc<dyn SubscriptionApi>) -> ConfiguredProvider {
        let subscription: Arc<dyn Resource> = Arc::new(SubscriptionResource::new(api.clone()));
        let repository_webhook: Arc<dyn Resource> = Arc::new(RepositoryWebhookResource::new(api));
        ConfiguredProvider {
            resources: vec![subscription, repository_webhook],
        }
    }
}

/// A provider with a client, ready to serve lifecycle calls.
#[derive(Clone)]
pub struct ConfiguredProvider {
    resources: Vec<Arc<dyn Resource>>,
}

impl ConfiguredProvider {
    /// Every resource, in registration order.
    pub fn resources(&self) -> &[Arc<dyn Resource>] {
        &self.resources
    }

    /// Looks a resource up by its full host type name.
    pub fn resource(&self, type_name: &str) -> Option<Arc<dyn Resource>> {
        self.resources
            .iter()
            .find(|r| r.type_name() == type_name)
            .cloned()
    }
}
