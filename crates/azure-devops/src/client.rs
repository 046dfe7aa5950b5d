//! HTTP client for the Azure DevOps service-hook and lookup routes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Method, StatusCode, Url};
use serde::de::{DeserializeOwned, Error as _};
use servicehooks::{
    ApiError, ApiOperation, IdResponse, Organization, ProjectId, RepositoryId, Subscription,
    SubscriptionApi, SubscriptionId,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Endpoint of the hosted Azure DevOps service.
pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com/";

/// REST API version pinned on every route.
pub const API_VERSION: &str = "7.0";

/// Deadline applied to every request, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Organization plus personal access token. Immutable once the client is built.
#[derive(Clone)]
pub struct Credentials {
    organization: Organization,
    pat: String,
}

impl Credentials {
    /// Pairs an organization with the personal access token used to reach it.
    pub fn new(organization: Organization, pat: impl Into<String>) -> Self {
        Self {
            organization,
            pat: pat.into(),
        }
    }

    /// The organization every route is scoped to.
    pub fn organization(&self) -> &Organization {
        &self.organization
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("organization", &self.organization)
            .field("pat", &"<redacted>")
            .finish()
    }
}

/// The client could not be constructed.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The underlying HTTP client failed to build (e.g. TLS backend failure).
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL does not parse, or cannot have path segments appended.
    #[error("invalid base URL `{url}`: {message}")]
    BaseUrl { url: String, message: String },
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Azure DevOps REST client bound to one organization.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct AzureDevOpsClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl AzureDevOpsClient {
    /// Creates a client for the hosted service at [`DEFAULT_BASE_URL`].
    pub fn new(credentials: Credentials) -> Result<Self, ClientBuildError> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// Creates a client for a different server (Azure DevOps Server, test doubles).
    ///
    /// A trailing `/` is added to `base_url` if missing.
    pub fn with_base_url(
        credentials: Credentials,
        base_url: impl Into<String>,
    ) -> Result<Self, ClientBuildError> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let parsed = Url::parse(&base_url).map_err(|e| ClientBuildError::BaseUrl {
            url: base_url.clone(),
            message: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ClientBuildError::BaseUrl {
                url: base_url,
                message: "URL cannot carry a path".into(),
            });
        }

        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: parsed,
            credentials,
        })
    }

    /// Server root every route is built under, always ending in `/`.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Organization the client is bound to.
    pub fn organization(&self) -> &Organization {
        self.credentials.organization()
    }

    // -- Routes --------------------------------------------------------------

    /// Builds `{base}/{organization}/{segments}?api-version=..`.
    ///
    /// Each segment is percent-encoded on its own, so a `/` or `?` inside a
    /// name cannot change the route. `.` and `..` are refused.
    fn route(&self, operation: ApiOperation, segments: &[&str]) -> Result<Url, ApiError> {
        let invalid = |segment: &str| ApiError::InvalidRoute {
            operation,
            segment: segment.to_string(),
        };

        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| invalid(self.base_url.as_str()))?;
            path.pop_if_empty();
            let organization = self.credentials.organization.as_str();
            for segment in std::iter::once(organization).chain(segments.iter().copied()) {
                if matches!(segment, "." | "..") {
                    return Err(invalid(segment));
                }
                path.push(segment);
            }
        }
        url.set_query(Some(&format!("api-version={API_VERSION}")));
        Ok(url)
    }

    fn project_url(&self, project: &str) -> Result<Url, ApiError> {
        self.route(ApiOperation::LookupProject, &["_apis", "projects", project])
    }

    fn repository_url(&self, project: &str, repository: &str) -> Result<Url, ApiError> {
        self.route(
            ApiOperation::LookupRepository,
            &[project, "_apis", "git", "repositories", repository],
        )
    }

    fn subscriptions_url(
        &self,
        operation: ApiOperation,
        id: Option<&SubscriptionId>,
    ) -> Result<Url, ApiError> {
        match id {
            Some(id) => self.route(operation, &["_apis", "hooks", "subscriptions", id.as_str()]),
            None => self.route(operation, &["_apis", "hooks", "subscriptions"]),
        }
    }

    // -- Request plumbing ----------------------------------------------------

    /// Sends one request and returns the status and raw body.
    async fn send(
        &self,
        operation: ApiOperation,
        method: Method,
        url: Url,
        body: Option<&Subscription>,
    ) -> Result<(StatusCode, Vec<u8>), ApiError> {
        debug!(%operation, %method, %url, "Sending Azure DevOps request");

        let mut request = self
            .http
            .request(method, url)
            .basic_auth("", Some(&self.credentials.pat))
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let transport = |e: reqwest::Error| {
            warn!(%operation, error = %e, "Azure DevOps request failed to complete");
            ApiError::Transport {
                operation,
                message: e.to_string(),
            }
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;

        Ok((status, body.to_vec()))
    }

    /// Sends a request and decodes the body when `accept` admits the status.
    async fn exchange<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        method: Method,
        url: Url,
        body: Option<&Subscription>,
        accept: impl Fn(StatusCode) -> bool,
    ) -> Result<T, ApiError> {
        let (status, bytes) = self.send(operation, method, url, body).await?;
        check_status(operation, status, accept)?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode { operation, source })
    }
}

fn check_status(
    operation: ApiOperation,
    status: StatusCode,
    accept: impl Fn(StatusCode) -> bool,
) -> Result<(), ApiError> {
    if accept(status) {
        return Ok(());
    }
    warn!(%operation, status = status.as_u16(), "Azure DevOps returned an unexpected status");
    Err(ApiError::Status {
        operation,
        status: status.as_u16(),
    })
}

fn is_ok(status: StatusCode) -> bool {
    status == StatusCode::OK
}

fn is_ok_or_created(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::CREATED
}

fn decode_error(operation: ApiOperation, message: &str) -> ApiError {
    ApiError::Decode {
        operation,
        source: serde_json::Error::custom(message),
    }
}

/// A 200 body without an `id` (a listing, an error envelope) is not a subscription.
fn identified(
    operation: ApiOperation,
    subscription: Subscription,
) -> Result<Subscription, ApiError> {
    if subscription.id.is_none() {
        warn!(%operation, "Azure DevOps response carries no subscription id");
        return Err(decode_error(operation, "response has no subscription id"));
    }
    Ok(subscription)
}

#[async_trait]
impl SubscriptionApi for AzureDevOpsClient {
    async fn lookup_project_id(&self, project: &str) -> Result<ProjectId, ApiError> {
        let operation = ApiOperation::LookupProject;
        let url = self.project_url(project)?;
        let response: IdResponse = self
            .exchange(operation, Method::GET, url, None, is_ok)
            .await?;
        response
            .into_project_id()
            .ok_or_else(|| decode_error(operation, "response contains an empty id"))
    }

    async fn lookup_repository_id(
        &self,
        project: &str,
        repository: &str,
    ) -> Result<RepositoryId, ApiError> {
        let operation = ApiOperation::LookupRepository;
        let url = self.repository_url(project, repository)?;
        let response: IdResponse = self
            .exchange(operation, Method::GET, url, None, is_ok)
            .await?;
        response
            .into_repository_id()
            .ok_or_else(|| decode_error(operation, "response contains an empty id"))
    }

    async fn get_subscription(&self, id: &SubscriptionId) -> Result<Subscription, ApiError> {
        let operation = ApiOperation::GetSubscription;
        let url = self.subscriptions_url(operation, Some(id))?;
        let subscription = self
            .exchange(operation, Method::GET, url, None, is_ok)
            .await?;
        identified(operation, subscription)
    }

    async fn upsert_subscription(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, ApiError> {
        let (operation, method) = match subscription.id {
            Some(_) => (ApiOperation::UpdateSubscription, Method::PUT),
            None => (ApiOperation::CreateSubscription, Method::POST),
        };
        let url = self.subscriptions_url(operation, subscription.id.as_ref())?;
        let stored = self
            .exchange(operation, method, url, Some(subscription), is_ok_or_created)
            .await?;
        identified(operation, stored)
    }

    async fn delete_subscription(&self, id: &SubscriptionId) -> Result<(), ApiError> {
        let operation = ApiOperation::DeleteSubscription;
        let url = self.subscriptions_url(operation, Some(id))?;
        let (status, _) = self.send(operation, Method::DELETE, url, None).await?;
        check_status(operation, status, |s| s == StatusCode::NO_CONTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> AzureDevOpsClient {
        let credentials = Credentials::new(Organization::new("contoso").unwrap(), "secret");
        AzureDevOpsClient::with_base_url(credentials, base_url).unwrap()
    }

    fn subscription_route(client: &AzureDevOpsClient, id: &str) -> Result<Url, ApiError> {
        let id = SubscriptionId::new(id).unwrap();
        client.subscriptions_url(ApiOperation::GetSubscription, Some(&id))
    }

    #[test]
    fn routes_are_built_under_the_organization() {
        let client = client("https://dev.azure.com");

        assert_eq!(client.base_url(), "https://dev.azure.com/");
        assert_eq!(
            client.project_url("web").unwrap().as_str(),
            "https://dev.azure.com/contoso/_apis/projects/web?api-version=7.0"
        );
        assert_eq!(
            client.repository_url("web", "site").unwrap().as_str(),
            "https://dev.azure.com/contoso/web/_apis/git/repositories/site?api-version=7.0"
        );
        assert_eq!(
            client
                .subscriptions_url(ApiOperation::CreateSubscription, None)
                .unwrap()
                .as_str(),
            "https://dev.azure.com/contoso/_apis/hooks/subscriptions?api-version=7.0"
        );
        assert_eq!(
            subscription_route(&client, "abc").unwrap().as_str(),
            "https://dev.azure.com/contoso/_apis/hooks/subscriptions/abc?api-version=7.0"
        );
    }

    #[test]
    fn routes_keep_a_server_path_prefix() {
        let client = client("https://ado.example.com/tfs");

        assert_eq!(
            client.project_url("web").unwrap().as_str(),
            "https://ado.example.com/tfs/contoso/_apis/projects/web?api-version=7.0"
        );
    }

    #[test]
    fn route_segments_are_escaped() {
        let client = client(DEFAULT_BASE_URL);

        assert_eq!(
            subscription_route(&client, "x/../../projects/y").unwrap().as_str(),
            "https://dev.azure.com/contoso/_apis/hooks/subscriptions/x%2F..%2F..%2Fprojects%2Fy?api-version=7.0"
        );
        assert_eq!(
            subscription_route(&client, "a?b").unwrap().as_str(),
            "https://dev.azure.com/contoso/_apis/hooks/subscriptions/a%3Fb?api-version=7.0"
        );
        assert_eq!(
            client.repository_url("My Project", "site#1").unwrap().as_str(),
            "https://dev.azure.com/contoso/My%20Project/_apis/git/repositories/site%231?api-version=7.0"
        );
    }

    #[test]
    fn dot_segments_are_refused() {
        let client = client(DEFAULT_BASE_URL);

        let err = subscription_route(&client, "..").unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidRoute { operation: ApiOperation::GetSubscription, ref segment } if segment == ".."
        ));
        assert!(client.project_url(".").is_err());
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        let credentials = Credentials::new(Organization::new("contoso").unwrap(), "secret");

        assert!(matches!(
            AzureDevOpsClient::with_base_url(credentials.clone(), "not a url"),
            Err(ClientBuildError::BaseUrl { .. })
        ));
        assert!(matches!(
            AzureDevOpsClient::with_base_url(credentials, "mailto:ops@example.com"),
            Err(ClientBuildError::BaseUrl { .. })
        ));
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let rendered = format!("{:?}", client(DEFAULT_BASE_URL));
        assert!(rendered.contains("contoso"));
        assert!(!rendered.contains("secret"));
    }
}
