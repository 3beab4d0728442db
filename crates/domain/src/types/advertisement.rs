//! Advertisement resources
//!
//! Enumerated business values (advertisement type, work type, salary type,
//! video position) are carried as plain strings: their value sets belong to
//! the API contract and change independently of this client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_header_enum_conversions;

/// Name/value pair filled into an advertiser template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateItem {
    pub name: String,
    pub value: String,
}

impl TemplateItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Job advertisement as submitted on create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertiser_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertisement_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertisement_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subclassification_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_form_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_items: Vec<TemplateItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standout_logo_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standout_bullet1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standout_bullet2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standout_bullet3: Option<String>,
    /// Client-chosen idempotency key; echoed back in `Conflict` errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_id: Option<String>,
}

/// Advertisement as returned by the API: the submitted fields plus
/// server-assigned identity and state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub advertisement: Advertisement,
}

/// One JSON-patch style operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    pub value: Value,
}

/// Partial update sent with PATCH.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvertisementPatch {
    pub operations: Vec<PatchOperation>,
}

impl AdvertisementPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that moves the advertisement to the `Expired` state.
    #[must_use]
    pub fn expire() -> Self {
        Self::new().replace("state", Value::String("Expired".to_string()))
    }

    #[must_use]
    pub fn replace(mut self, path: impl Into<String>, value: Value) -> Self {
        self.operations.push(PatchOperation { op: "replace".to_string(), path: path.into(), value });
        self
    }
}

/// Entry of the advertisement listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub advertiser_id: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_reference: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct EmbeddedAdvertisements {
    #[serde(default)]
    advertisements: Vec<AdvertisementSummary>,
}

/// One page of the advertisement listing. Paging links travel in the
/// envelope's link table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisementSummaryPage {
    #[serde(rename = "_embedded", default)]
    embedded: EmbeddedAdvertisements,
}

impl AdvertisementSummaryPage {
    #[must_use]
    pub fn new(advertisements: Vec<AdvertisementSummary>) -> Self {
        Self { embedded: EmbeddedAdvertisements { advertisements } }
    }

    #[must_use]
    pub fn advertisements(&self) -> &[AdvertisementSummary] {
        &self.embedded.advertisements
    }

    #[must_use]
    pub fn into_advertisements(self) -> Vec<AdvertisementSummary> {
        self.embedded.advertisements
    }
}

/// Value of the `Processing-Status` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl_header_enum_conversions!(ProcessingStatus {
    Pending => "Pending",
    Processing => "Processing",
    Completed => "Completed",
    Failed => "Failed",
});

impl ProcessingStatus {
    /// Whether the API has finished with the advertisement.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}
