//! Attribute schemas the provider exposes to the host tool.
//!
//! Each [`Attribute`] pairs the host attribute name with the JSON key the
//! record type serialises under. [`crate::state`] uses that pairing to
//! marshal records to and from host state, so the schema is the only place
//! where the two spellings are related.

use serde::Serialize;

/// Whether the host must, may, or cannot supply an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeMode {
    Required,
    Optional,
    /// Set by the remote service only.
    Computed,
    /// May be supplied; filled in by the remote service otherwise.
    OptionalComputed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    String,
    Int64,
    /// Single nested object with its own attributes.
    Object(&'static [Attribute]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    /// Key of the field in the record's serialised form.
    #[serde(skip)]
    pub wire_name: &'static str,
    pub kind: AttributeKind,
    pub mode: AttributeMode,
    #[serde(skip_serializing_if = "is_false")]
    pub sensitive: bool,
    pub description: &'static str,
}

fn is_false(b: &bool) -> bool {
    !b
}

impl Attribute {
    const fn new(
        name: &'static str,
        wire_name: &'static str,
        kind: AttributeKind,
        mode: AttributeMode,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            wire_name,
            kind,
            mode,
            sensitive: false,
            description,
        }
    }

    const fn string(
        name: &'static str,
        wire_name: &'static str,
        mode: AttributeMode,
        description: &'static str,
    ) -> Self {
        Self::new(name, wire_name, AttributeKind::String, mode, description)
    }

    const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn is_required(&self) -> bool {
        self.mode == AttributeMode::Required
    }
}

/// Schema of one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub type_name: &'static str,
    pub description: &'static str,
    pub attributes: &'static [Attribute],
}

impl Schema {
    /// Finds a top-level attribute by host name.
    pub fn attribute(&self, name: &str) -> Option<&'static Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Names of required top-level attributes that are absent or null in `data`.
    pub fn missing_required(&self, data: &serde_json::Value) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|a| a.is_required())
            .filter(|a| data.get(a.name).is_none_or(serde_json::Value::is_null))
            .map(|a| a.name)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// adoservicehooks_subscription
// ---------------------------------------------------------------------------

use AttributeMode::{Computed, Optional, OptionalComputed, Required};

/// Provider type name; every resource type name starts with it.
pub const PROVIDER_TYPE_NAME: &str = "adoservicehooks";
pub const SUBSCRIPTION_TYPE_NAME: &str = "adoservicehooks_subscription";
pub const REPOSITORY_WEBHOOK_TYPE_NAME: &str = "adoservicehooks_repository_webhook";

const CONSUMER_INPUTS: &[Attribute] = &[
    Attribute::string(
        "url",
        "url",
        Optional,
        "The target URL for the webhook where the HTTP request will be sent.",
    ),
    Attribute::string(
        "basic_auth_username",
        "basicAuthUsername",
        Optional,
        "The username for basic HTTP authentication when invoking the webhook.",
    ),
    Attribute::string(
        "basic_auth_password",
        "basicAuthPassword",
        Optional,
        "The password for basic HTTP authentication when invoking the webhook.",
    )
    .sensitive(),
    Attribute::string(
        "http_headers",
        "httpHeaders",
        Optional,
        "HTTP headers to include in the webhook request, formatted 'Header1:Value1,Header2:Value2'.",
    ),
    Attribute::string(
        "resource_details_to_send",
        "resourceDetailsToSend",
        Optional,
        "Level of resource detail sent to the webhook (e.g. 'all', 'minimal', 'none').",
    ),
    Attribute::string(
        "messages_to_send",
        "messagesToSend",
        Optional,
        "Which messages, if any, are sent to the webhook.",
    ),
    Attribute::string(
        "detailed_messages_to_send",
        "detailedMessagesToSend",
        Optional,
        "Which detailed messages, if any, are sent to the webhook.",
    ),
];

const PUBLISHER_INPUTS: &[Attribute] = &[
    Attribute::string(
        "repository",
        "repository",
        Optional,
        "The repository id the events are filtered to.",
    ),
    Attribute::string(
        "branch",
        "branch",
        Optional,
        "The branch in the repository where the event occurred.",
    ),
    Attribute::string(
        "pushed_by",
        "pushedBy",
        Optional,
        "The user or group whose pushes raise the event.",
    ),
    Attribute::string(
        "project_id",
        "projectId",
        Optional,
        "The id of the project associated with the event.",
    ),
    Attribute::string(
        "tfs_subscription_id",
        "tfsSubscriptionId",
        OptionalComputed,
        "The notification subscription id Azure DevOps assigns to this service hook.",
    ),
];

/// Every field of a service-hook subscription.
pub static SUBSCRIPTION_SCHEMA: Schema = Schema {
    type_name: SUBSCRIPTION_TYPE_NAME,
    description: "A service hook subscription in Azure DevOps.",
    attributes: &[
        Attribute::string(
            "consumer_action_id",
            "consumerActionId",
            Required,
            "The action the consumer performs, e.g. 'httpRequest'.",
        ),
        Attribute::string(
            "consumer_id",
            "consumerId",
            Optional,
            "The consumer of the event. Defaults to 'webHooks'.",
        ),
        Attribute::new(
            "consumer_inputs",
            "consumerInputs",
            AttributeKind::Object(CONSUMER_INPUTS),
            Optional,
            "Inputs required by the consumer action, such as URL, authentication, and headers.",
        ),
        Attribute::string(
            "event_type",
            "eventType",
            Required,
            "The event that triggers the webhook, e.g. 'git.push'.",
        ),
        Attribute::string(
            "id",
            "id",
            OptionalComputed,
            "The identifier of the subscription, assigned by Azure DevOps.",
        ),
        Attribute::string(
            "publisher_id",
            "publisherId",
            Required,
            "The publisher that raises the event, e.g. 'tfs'.",
        ),
        Attribute::new(
            "publisher_inputs",
            "publisherInputs",
            AttributeKind::Object(PUBLISHER_INPUTS),
            Optional,
            "Filters applied by the publisher to the events it raises.",
        ),
        Attribute::string(
            "resource_version",
            "resourceVersion",
            Optional,
            "Version of the event resource payload. Defaults to '1.0'.",
        ),
        Attribute::new(
            "scope",
            "scope",
            AttributeKind::Int64,
            Optional,
            "Scope of the subscription. Defaults to 1.",
        ),
    ],
};

// ---------------------------------------------------------------------------
// adoservicehooks_repository_webhook
// ---------------------------------------------------------------------------

/// Project and repository by name, plus delivery URL and event.
pub static REPOSITORY_WEBHOOK_SCHEMA: Schema = Schema {
    type_name: REPOSITORY_WEBHOOK_TYPE_NAME,
    description: "A web hook on one Git repository, addressed by project and repository name.",
    attributes: &[
        Attribute::string("project", "project", Required, "The Azure DevOps project name."),
        Attribute::string(
            "repository",
            "repository",
            Required,
            "The name of the repository the webhook is attached to.",
        ),
        Attribute::string("url", "url", Required, "The URL that receives webhook notifications."),
        Attribute::string(
            "event_type",
            "event_type",
            Required,
            "The event type that triggers the webhook.",
        ),
        Attribute::string("webhook_id", "webhook_id", Computed, "The id of the webhook."),
    ],
};
