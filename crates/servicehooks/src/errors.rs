//! Error taxonomy for the service-hooks provider.
//!
//! [`ApiError`] is returned by every [`crate::SubscriptionApi`] call.
//! [`ConfigurationError`] is produced while resolving provider configuration.
//! [`ServiceHooksError`] is what resource lifecycle operations return; it wraps
//! the other two and renders itself as a host [`Diagnostic`].
//!
//! No error is retried or downgraded. A failure aborts the current operation.

use thiserror::Error;

use crate::Diagnostic;

// ---------------------------------------------------------------------------
// Remote operations
// ---------------------------------------------------------------------------

/// The remote operation a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// `GET /_apis/projects/{project}`.
    LookupProject,
    /// `GET /{project}/_apis/git/repositories/{repository}`.
    LookupRepository,
    /// `GET /_apis/hooks/subscriptions/{id}`.
    GetSubscription,
    /// `POST /_apis/hooks/subscriptions`.
    CreateSubscription,
    /// `PUT /_apis/hooks/subscriptions/{id}`.
    UpdateSubscription,
    /// `DELETE /_apis/hooks/subscriptions/{id}`.
    DeleteSubscription,
}

impl std::fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::LookupProject => "get project id",
            Self::LookupRepository => "get repository id",
            Self::GetSubscription => "get webhook",
            Self::CreateSubscription => "create webhook",
            Self::UpdateSubscription => "update webhook",
            Self::DeleteSubscription => "delete webhook",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Transport-level errors
// ---------------------------------------------------------------------------

/// Failure of a single request to the Azure DevOps REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("failed to {operation}: failed to send request: {message}")]
    Transport {
        operation: ApiOperation,
        /// The underlying client error, rendered.
        message: String,
    },

    /// The response body was not the JSON shape expected for the operation.
    #[error("failed to {operation}: failed to parse response: {source}")]
    Decode {
        operation: ApiOperation,
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with a status code outside the set the operation accepts.
    #[error("failed to {operation}, status code: {status}")]
    Status { operation: ApiOperation, status: u16 },

    /// A name or id cannot be placed in the request path (`.` and `..`
    /// would resolve to a different route). No request was sent.
    #[error("failed to {operation}: `{segment}` is not a valid path segment")]
    InvalidRoute {
        operation: ApiOperation,
        segment: String,
    },
}

impl ApiError {
    /// The operation that failed.
    pub fn operation(&self) -> ApiOperation {
        match self {
            Self::Transport { operation, .. }
            | Self::Decode { operation, .. }
            | Self::Status { operation, .. }
            | Self::InvalidRoute { operation, .. } => *operation,
        }
    }

    /// HTTP status code, for [`ApiError::Status`] only.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` when the remote entity does not exist (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Provider attribute naming the Azure DevOps organization.
pub const ORGANIZATION_ATTRIBUTE: &str = "organization";

/// Provider attribute holding the personal access token.
pub const PAT_ATTRIBUTE: &str = "pat";

/// The provider cannot build a client because required settings are missing.
///
/// Both attributes are checked before failing so the user sees every problem
/// at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing provider configuration: {}", .missing.join(", "))]
pub struct ConfigurationError {
    /// Attribute names that were unset or empty (`"organization"`, `"pat"`).
    pub missing: Vec<&'static str>,
}

impl ConfigurationError {
    /// One diagnostic per missing attribute, each naming its environment fallback.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.missing
            .iter()
            .map(|attribute| {
                let (summary, env) = match *attribute {
                    ORGANIZATION_ATTRIBUTE => {
                        ("Missing AzureDevOps Organization", "ADOWEBHOOKS_ORGANIZATION")
                    }
                    _ => ("Missing AzureDevOps PAT", "ADOWEBHOOKS_PAT"),
                };
                Diagnostic::error(
                    summary,
                    format!(
                        "The provider cannot create the client because it needs to know the \
                         AzureDevOps {attribute}. Set the {attribute} value in the configuration \
                         or use the {env} environment variable. If either is already set, \
                         ensure the value is not empty."
                    ),
                )
                .at(*attribute)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Resource lifecycle errors
// ---------------------------------------------------------------------------

/// Errors returned by resource lifecycle operations.
#[derive(Debug, Error)]
pub enum ServiceHooksError {
    /// A remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Provider configuration is incomplete.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Stored state has no identifier, so the remote entity cannot be addressed.
    #[error("{resource} state has no {attribute}")]
    MissingIdentifier {
        resource: &'static str,
        attribute: &'static str,
    },

    /// The remote service accepted a create or update but returned no identifier.
    #[error("remote service returned a subscription without an id")]
    UnassignedIdentifier,

    /// Host-supplied state or plan does not match the resource schema.
    #[error("invalid {resource} data: {message}")]
    InvalidState {
        resource: &'static str,
        message: String,
    },
}

impl ServiceHooksError {
    /// `true` when the error is a remote 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_not_found())
    }

    /// Renders the error as host diagnostics.
    ///
    /// API failures follow the `Client Error` / `Failed to <operation>: ...` form.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::Api(e) => vec![Diagnostic::error("Client Error", capitalise(&e.to_string()))],
            Self::Configuration(e) => e.diagnostics(),
            Self::MissingIdentifier { attribute, .. } => {
                vec![Diagnostic::error("Missing Identifier", self.to_string()).at(*attribute)]
            }
            Self::UnassignedIdentifier => {
                vec![Diagnostic::error("Client Error", capitalise(&self.to_string()))]
            }
            Self::InvalidState { .. } => {
                vec![Diagnostic::error("Invalid Resource Data", self.to_string())]
            }
        }
    }
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
