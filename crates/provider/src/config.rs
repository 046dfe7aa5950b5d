//! Provider configuration: organization and personal access token.
//!
//! Explicit configuration wins; unset values fall back to the
//! `ADOWEBHOOKS_ORGANIZATION` and `ADOWEBHOOKS_PAT` environment variables.

use azure_devops::Credentials;
use serde::Deserialize;
use servicehooks::{ConfigurationError, Organization, ORGANIZATION_ATTRIBUTE, PAT_ATTRIBUTE};

/// Environment fallback for the organization.
pub const ORGANIZATION_ENV: &str = "ADOWEBHOOKS_ORGANIZATION";

/// Environment fallback for the personal access token.
pub const PAT_ENV: &str = "ADOWEBHOOKS_PAT";

/// Provider block as declared by the host.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    pub organization: Option<String>,
    pub pat: Option<String>,
    /// Server root; the hosted service when unset.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("organization", &self.organization)
            .field("pat", &self.pat.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Resolves credentials against the process environment.
    pub fn resolve(&self) -> Result<Credentials, ConfigurationError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolves credentials against an arbitrary environment lookup.
    ///
    /// An explicitly configured value replaces the environment value even when
    /// it is empty. Both attributes are checked before an error is returned.
    pub fn resolve_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Credentials, ConfigurationError> {
        let organization = self
            .organization
            .clone()
            .or_else(|| env(ORGANIZATION_ENV))
            .and_then(Organization::new);
        let pat = self
            .pat
            .clone()
            .or_else(|| env(PAT_ENV))
            .filter(|pat| !pat.is_empty());

        match (organization, pat) {
            (Some(organization), Some(pat)) => Ok(Credentials::new(organization, pat)),
            (organization, pat) => {
                let mut missing = Vec::new();
                if organization.is_none() {
                    missing.push(ORGANIZATION_ATTRIBUTE);
                }
                if pat.is_none() {
                    missing.push(PAT_ATTRIBUTE);
                }
                Err(ConfigurationError { missing })
            }
        }
    }
}
