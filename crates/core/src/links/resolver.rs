//! Relation name → absolute URI

use adpost_domain::{HalError, Links, Result};
use tracing::debug;
use url::Url;

use super::template::{TemplateParams, UriTemplate};

/// Resolves link relations against a base URI.
///
/// Holds nothing but the base, so the same inputs always produce the same
/// URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResolver {
    base: Url,
}

impl LinkResolver {
    #[must_use]
    pub const fn new(base: Url) -> Self {
        Self { base }
    }

    /// Build a resolver from a base URI string.
    pub fn parse(base: &str) -> Result<Self> {
        Url::parse(base)
            .map(Self::new)
            .map_err(|err| HalError::InvalidUri(format!("{base}: {err}")))
    }

    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `relation` from `links` to an absolute URI.
    ///
    /// Templated links are expanded with `params` (every template variable
    /// must be bound). Params are ignored for plain links.
    pub fn resolve(
        &self,
        links: &Links,
        relation: &str,
        params: Option<&TemplateParams>,
    ) -> Result<Url> {
        let link = links.get(relation).ok_or_else(|| HalError::UnknownRelation(relation.to_string()))?;

        let href = if link.is_templated() {
            let template =
                UriTemplate::parse(link.href()).map_err(|err| err.into_hal_error(relation))?;
            let empty = TemplateParams::new();
            template.expand(params.unwrap_or(&empty)).map_err(|err| err.into_hal_error(relation))?
        } else {
            link.href_for_use()?.to_string()
        };

        let resolved = self.join(&href)?;
        debug!(relation, uri = %resolved, "resolved link relation");
        Ok(resolved)
    }

    /// Resolve a possibly relative href against the base URI.
    pub fn join(&self, href: &str) -> Result<Url> {
        self.base.join(href).map_err(|err| HalError::InvalidUri(format!("{href}: {err}")))
    }
}
