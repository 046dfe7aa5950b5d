//! Azure DevOps REST transport.
//!
//! Implements the [`servicehooks::SubscriptionApi`] trait over the Azure DevOps
//! REST API using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL construction, authentication, status checking and
//! JSON decoding all live here. The `provider` crate sees only
//! [`servicehooks::SubscriptionApi`].
//!
//! ## Routes
//!
//! All routes are pinned to `api-version=7.0` and authenticated with HTTP
//! Basic auth (empty user name, personal access token as password).
//!
//! | Operation | Request | Accepted status |
//! |-----------|---------|-----------------|
//! | project lookup | `GET {org}/_apis/projects/{project}` | 200 |
//! | repository lookup | `GET {org}/{project}/_apis/git/repositories/{repo}` | 200 |
//! | get subscription | `GET {org}/_apis/hooks/subscriptions/{id}` | 200 |
//! | create subscription | `POST {org}/_apis/hooks/subscriptions` | 200, 201 |
//! | replace subscription | `PUT {org}/_apis/hooks/subscriptions/{id}` | 200, 201 |
//! | delete subscription | `DELETE {org}/_apis/hooks/subscriptions/{id}` | 204 |
//!
//! Names and ids are percent-encoded as single path segments; `.` and `..`
//! are refused before any request is sent. A get, create or replace response
//! without a subscription `id` is a decode error.
//!
//! There is no retry. Each request has a fixed 10-second deadline.

mod client;

pub use client::{
    AzureDevOpsClient, ClientBuildError, Credentials, API_VERSION, DEFAULT_BASE_URL,
    REQUEST_TIMEOUT,
};
