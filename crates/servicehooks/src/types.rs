//! The service-hook subscription record and related value types.
//!
//! [`Subscription`] is the single internal representation of a subscription.
//! Its serde derivation *is* the wire format (camelCase JSON); the host-state
//! representation is produced from it by the `provider` crate rather than by
//! a second struct family.

use serde::{Deserialize, Serialize};

use crate::{ProjectId, RepositoryId, SubscriptionId};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Consumer id used when none is declared: deliver the event as a web hook.
pub const DEFAULT_CONSUMER_ID: &str = "webHooks";

/// Resource version used when none is declared.
pub const DEFAULT_RESOURCE_VERSION: &str = "1.0";

/// Scope used when none is declared.
pub const DEFAULT_SCOPE: i64 = 1;

/// Publisher id of the Azure DevOps (Team Foundation Server) event source.
pub const TFS_PUBLISHER_ID: &str = "tfs";

/// Consumer action that POSTs the event payload to a URL.
pub const HTTP_REQUEST_ACTION: &str = "httpRequest";

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Inputs for the consumer side of a subscription (where and how events are delivered).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerInputs {
    /// Target URL the event is POSTed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Basic-auth user name sent with each delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth_username: Option<String>,

    /// Basic-auth password sent with each delivery. Sensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth_password: Option<String>,

    /// Extra request headers, formatted `Header1:Value1,Header2:Value2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_headers: Option<String>,

    /// Verbosity of the resource payload (`all`, `minimal`, `none`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_details_to_send: Option<String>,

    /// Verbosity of the short message (`all`, `text`, `html`, `markdown`, `none`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages_to_send: Option<String>,

    /// Verbosity of the detailed message, same values as `messages_to_send`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_messages_to_send: Option<String>,
}

/// Inputs for the publisher side of a subscription (which events are raised).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherInputs {
    /// Repository GUID the events are filtered to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Branch filter; events for other branches are not raised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Only raise events for pushes by this user or group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushed_by: Option<String>,

    /// Project GUID the events are filtered to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Notification subscription id the service assigns; read-only in practice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tfs_subscription_id: Option<String>,
}

/// A service-hook subscription as exchanged with the remote API.
///
/// `id` is `None` until the server assigns one. Every other field is
/// client-supplied and replaced as a whole on update. `consumer_action_id`,
/// `consumer_id` and `event_type` are always present on the wire (as `null`
/// when unset); all other absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// What the consumer does with an event (e.g. [`HTTP_REQUEST_ACTION`]).
    #[serde(default)]
    pub consumer_action_id: Option<String>,

    /// The consumer that receives events; [`DEFAULT_CONSUMER_ID`] when unset.
    #[serde(default)]
    pub consumer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_inputs: Option<ConsumerInputs>,

    /// Event that triggers the subscription (e.g. `git.push`).
    #[serde(default)]
    pub event_type: Option<String>,

    /// Server-assigned identifier; `None` before creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SubscriptionId>,

    /// The event source, [`TFS_PUBLISHER_ID`] for repository events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_inputs: Option<PublisherInputs>,

    /// Version of the event payload schema; [`DEFAULT_RESOURCE_VERSION`] when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,

    /// Subscription scope; [`DEFAULT_SCOPE`] when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<i64>,
}

impl Subscription {
    /// Fills unset fields with their defaults. Declared values are kept.
    pub fn apply_defaults(&mut self) {
        self.consumer_id
            .get_or_insert_with(|| DEFAULT_CONSUMER_ID.to_string());
        self.resource_version
            .get_or_insert_with(|| DEFAULT_RESOURCE_VERSION.to_string());
        self.scope.get_or_insert(DEFAULT_SCOPE);
    }

    /// Returns a copy of `self` with defaults applied.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.apply_defaults();
        self
    }

    /// Delivery URL, if one is configured.
    pub fn url(&self) -> Option<&str> {
        self.consumer_inputs.as_ref()?.url.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Body of the project and repository lookup routes.
///
/// The routes return the full entity; only `id` is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdResponse {
    /// GUID of the looked-up entity.
    pub id: String,
}

impl IdResponse {
    /// Interprets the response as a project id. `None` if the id is empty.
    pub fn into_project_id(self) -> Option<ProjectId> {
        ProjectId::new(self.id)
    }

    /// Interprets the response as a repository id. `None` if the id is empty.
    pub fn into_repository_id(self) -> Option<RepositoryId> {
        RepositoryId::new(self.id)
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Severity level for a [`Diagnostic`] reported to the host tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    /// The operation failed; the host aborts it.
    Error,
    /// The operation succeeded but something deserves attention.
    Warning,
}

/// A structured finding rendered by the host as a user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,

    /// Short headline (e.g. `"Client Error"`).
    pub summary: String,

    /// Full description including the underlying cause.
    pub detail: String,

    /// Attribute path the finding relates to, when there is one (e.g. `"pat"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Creates an error-severity diagnostic not tied to an attribute.
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    /// Ties this diagnostic to an attribute path.
    #[must_use]
    pub fn at(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_response() -> serde_json::Value {
        json!({
            "id": "4b4b5a5c-0000-4c1e-9f11-6b1a2b3c4d5e",
            "url": "https://dev.azure.com/contoso/_apis/hooks/subscriptions/4b4b5a5c",
            "status": "enabled",
            "publisherId": "tfs",
            "eventType": "git.push",
            "resourceVersion": "1.0",
            "eventDescription": "Any branch",
            "consumerId": "webHooks",
            "consumerActionId": "httpRequest",
            "actionDescription": "To host example.com",
            "scope": 1,
            "publisherInputs": {
                "repository": "9f1c2d3e-aaaa-bbbb-cccc-111122223333",
                "projectId": "5a6b7c8d-aaaa-bbbb-cccc-444455556666",
                "tfsSubscriptionId": "0e1f2a3b-aaaa-bbbb-cccc-777788889999"
            },
            "consumerInputs": {
                "url": "https://example.com/webhook"
            }
        })
    }

    #[test]
    fn response_decodes_and_ignores_unknown_fields() {
        let sub: Subscription = serde_json::from_value(sample_response()).unwrap();

        assert_eq!(
            sub.id.as_ref().map(SubscriptionId::as_str),
            Some("4b4b5a5c-0000-4c1e-9f11-6b1a2b3c4d5e")
        );
        assert_eq!(sub.event_type.as_deref(), Some("git.push"));
        assert_eq!(sub.url(), Some("https://example.com/webhook"));
        assert_eq!(sub.scope, Some(1));
        let publisher = sub.publisher_inputs.unwrap();
        assert_eq!(
            publisher.tfs_subscription_id.as_deref(),
            Some("0e1f2a3b-aaaa-bbbb-cccc-777788889999")
        );
        assert!(publisher.branch.is_none());
    }

    #[test]
    fn wire_json_keeps_every_modelled_field() {
        let sub: Subscription = serde_json::from_value(sample_response()).unwrap();
        let encoded = serde_json::to_value(&sub).unwrap();
        let decoded: Subscription = serde_json::from_value(encoded.clone()).unwrap();

        assert_eq!(decoded, sub);
        assert_eq!(encoded["consumerInputs"], json!({"url": "https://example.com/webhook"}));
        assert_eq!(encoded["publisherInputs"]["projectId"], "5a6b7c8d-aaaa-bbbb-cccc-444455556666");
        assert!(encoded.get("status").is_none());
    }

    #[test]
    fn new_subscription_omits_id_but_keeps_nullable_fields() {
        let sub = Subscription {
            publisher_id: Some(TFS_PUBLISHER_ID.into()),
            ..Subscription::default()
        };
        let encoded = serde_json::to_value(&sub).unwrap();

        assert!(encoded.get("id").is_none());
        assert!(encoded.get("scope").is_none());
        assert_eq!(encoded["eventType"], serde_json::Value::Null);
        assert_eq!(encoded["consumerActionId"], serde_json::Value::Null);
        assert_eq!(encoded["consumerId"], serde_json::Value::Null);
    }

    #[test]
    fn defaults_fill_only_unset_fields() {
        let sub = Subscription {
            resource_version: Some("5.1-preview.1".into()),
            ..Subscription::default()
        }
        .with_defaults();

        assert_eq!(sub.consumer_id.as_deref(), Some(DEFAULT_CONSUMER_ID));
        assert_eq!(sub.resource_version.as_deref(), Some("5.1-preview.1"));
        assert_eq!(sub.scope, Some(DEFAULT_SCOPE));
        assert!(sub.publisher_id.is_none());
    }

    #[test]
    fn empty_lookup_id_is_not_an_identifier() {
        let response = IdResponse { id: String::new() };
        assert!(response.into_project_id().is_none());
    }

    #[test]
    fn subscription_with_empty_id_does_not_decode() {
        let body = json!({ "id": "", "eventType": "git.push" });
        assert!(serde_json::from_value::<Subscription>(body).is_err());
    }
}
