//! HAL link relations
//!
//! A resource's `_links` object maps relation names to link objects:
//!
//! ```json
//! {
//!   "_links": {
//!     "advertisements": { "href": "/advertisement" },
//!     "advertisement": { "href": "/advertisement/{advertisementId}", "templated": true }
//!   }
//! }
//! ```
//!
//! A relation may also map to an array of link objects; only the first one
//! is kept.

use std::collections::btree_map::{self, BTreeMap};

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{HalError, Result};

/// One named link. Templated links must be expanded before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    relation_name: String,
    href: String,
    templated: bool,
}

impl LinkRelation {
    pub fn new(relation_name: impl Into<String>, href: impl Into<String>, templated: bool) -> Self {
        Self { relation_name: relation_name.into(), href: href.into(), templated }
    }

    #[must_use]
    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    /// Raw href, possibly a URI template.
    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    #[must_use]
    pub const fn is_templated(&self) -> bool {
        self.templated
    }

    /// The href, provided it can be dereferenced as-is.
    pub fn href_for_use(&self) -> Result<&str> {
        if self.templated {
            return Err(HalError::UnexpandedTemplate(self.relation_name.clone()));
        }
        Ok(&self.href)
    }
}

#[derive(Serialize, Deserialize)]
struct RawLink {
    href: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    templated: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLinkValue {
    One(RawLink),
    Many(Vec<RawLink>),
}

/// Link table of one resource, keyed by relation name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    relations: BTreeMap<String, LinkRelation>,
}

impl Links {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the `_links` table from a full HAL document.
    ///
    /// Documents without `_links` (or non-object documents) yield an empty
    /// table; a malformed `_links` value is a serialization error.
    pub fn from_hal_value(document: &Value) -> Result<Self> {
        match document.get("_links") {
            None | Some(Value::Null) => Ok(Self::new()),
            Some(links) => Self::deserialize(links).map_err(HalError::from),
        }
    }

    /// Add or replace a relation.
    pub fn insert(&mut self, relation: LinkRelation) -> Option<LinkRelation> {
        self.relations.insert(relation.relation_name.clone(), relation)
    }

    #[must_use]
    pub fn get(&self, relation_name: &str) -> Option<&LinkRelation> {
        self.relations.get(relation_name)
    }

    #[must_use]
    pub fn contains(&self, relation_name: &str) -> bool {
        self.relations.contains_key(relation_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, LinkRelation> {
        self.relations.values()
    }
}

impl FromIterator<LinkRelation> for Links {
    fn from_iter<I: IntoIterator<Item = LinkRelation>>(iter: I) -> Self {
        let mut links = Self::new();
        for relation in iter {
            links.insert(relation);
        }
        links
    }
}

impl<'a> IntoIterator for &'a Links {
    type Item = &'a LinkRelation;
    type IntoIter = btree_map::Values<'a, String, LinkRelation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'de> Deserialize<'de> for Links {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, RawLinkValue>::deserialize(deserializer)?;
        let relations = raw
            .into_iter()
            .filter_map(|(name, value)| {
                let link = match value {
                    RawLinkValue::One(link) => Some(link),
                    RawLinkValue::Many(links) => links.into_iter().next(),
                }?;
                Some((name.clone(), LinkRelation::new(name, link.href, link.templated)))
            })
            .collect();
        Ok(Self { relations })
    }
}

impl Serialize for Links {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.relations.len()))?;
        for (name, relation) in &self.relations {
            let raw = RawLink { href: relation.href.clone(), templated: relation.templated };
            map.serialize_entry(name, &raw)?;
        }
        map.end()
    }
}
