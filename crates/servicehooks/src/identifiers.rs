//! Newtype identifiers for Azure DevOps entities.
//!
//! Project, repository, and subscription ids are all GUID strings on the wire.
//! Wrapping each in its own type stops a [`ProjectId`] from being passed where
//! a [`SubscriptionId`] is expected.
//!
//! Each identifier is a plain JSON string on the wire. Deserialising an empty
//! string fails, so no identifier value is ever empty.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An identifier was built from an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} must not be empty")]
pub struct EmptyIdentifier {
    /// Name of the identifier type (e.g. `"SubscriptionId"`).
    pub kind: &'static str,
}

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display, and the
// String conversions serde goes through.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = EmptyIdentifier;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(EmptyIdentifier {
                    kind: stringify!($name),
                })
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id! {
    /// Identifies a service-hook subscription.
    ///
    /// Assigned by Azure DevOps when the subscription is created and immutable
    /// afterwards.
    SubscriptionId
}

string_id! {
    /// The GUID of an Azure DevOps project, as returned by the projects route.
    ProjectId
}

string_id! {
    /// The GUID of a Git repository, as returned by the repositories route.
    RepositoryId
}

string_id! {
    /// An Azure DevOps organization name (the first path segment of every route).
    Organization
}
