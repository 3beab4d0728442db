//! Integration tests for HAL document parsing
//!
//! Realistic payloads as served by the Ad Posting API: the root index, an
//! advertisement resource and a listing page.

use adpost_domain::types::{Advertisement, AdvertisementResource, AdvertisementSummaryPage, Links};
use adpost_domain::HalError;
use serde_json::json;

// ============================================================================
// Root index
// ============================================================================

/// Scenario: the root document only advertises the two relations the client
/// navigates by
#[test]
fn test_root_index_links() {
    let root = json!({
        "_links": {
            "advertisements": { "href": "/advertisement" },
            "advertisement": { "href": "/advertisement/{advertisementId}", "templated": true }
        }
    });

    let links = Links::from_hal_value(&root).unwrap();

    let names: Vec<&str> = links.relation_names().collect();
    assert_eq!(names, vec!["advertisement", "advertisements"]);
    assert!(links.get("advertisement").unwrap().is_templated());
    assert!(links.get("self").is_none());
}

// ============================================================================
// Advertisement resource
// ============================================================================

/// Scenario: a resource body carries its own links next to the domain fields
#[test]
fn test_advertisement_resource_with_links() -> anyhow::Result<()> {
    let body = json!({
        "id": "75b2b1fc-9050-4f45-a632-ec6b7ac2bb4a",
        "advertiserId": "advertiserB",
        "jobTitle": "Baker",
        "salaryMinimum": 20.0,
        "salaryMaximum": 24.0,
        "templateItems": [
            { "name": "template1", "value": "value1" },
            { "name": "template2", "value": "value2" }
        ],
        "_links": {
            "self": { "href": "/advertisement/75b2b1fc-9050-4f45-a632-ec6b7ac2bb4a" }
        }
    });

    let resource: AdvertisementResource = serde_json::from_value(body.clone())?;
    let links = Links::from_hal_value(&body)?;

    assert_eq!(resource.advertisement.salary_minimum, Some(20.0));
    assert_eq!(resource.advertisement.template_items.len(), 2);
    let self_link = links.get("self").ok_or_else(|| anyhow::anyhow!("missing self link"))?;
    assert_eq!(self_link.href_for_use()?, "/advertisement/75b2b1fc-9050-4f45-a632-ec6b7ac2bb4a");
    Ok(())
}

/// Scenario: a round trip through the wire shape keeps every populated field
#[test]
fn test_advertisement_survives_wire_format() -> anyhow::Result<()> {
    let advertisement = Advertisement {
        agent_id: Some("agentA".into()),
        advertiser_id: Some("advertiserB".into()),
        job_title: Some("Baker".into()),
        salary_minimum: Some(20.0),
        salary_maximum: Some(24.0),
        screen_id: Some(100),
        creation_id: Some("creation-1".into()),
        ..Advertisement::default()
    };

    let wire = serde_json::to_string(&advertisement)?;
    assert!(wire.contains("\"creationId\":\"creation-1\""));
    let parsed: Advertisement = serde_json::from_str(&wire)?;
    assert_eq!(parsed, advertisement);
    Ok(())
}

// ============================================================================
// Listing page
// ============================================================================

/// Scenario: the listing carries paging links and embedded summaries
#[test]
fn test_summary_page_with_paging_links() {
    let body = json!({
        "_embedded": {
            "advertisements": [
                { "id": "a1", "advertiserId": "advertiserA", "jobTitle": "Bricklayer" },
                { "id": "a2", "advertiserId": "advertiserA", "jobTitle": "Baker", "state": "Expired" }
            ]
        },
        "_links": {
            "self": { "href": "/advertisement" },
            "next": { "href": "/advertisement?beforeId=a2" }
        }
    });

    let page: AdvertisementSummaryPage = serde_json::from_value(body.clone()).unwrap();
    let links = Links::from_hal_value(&body).unwrap();

    let titles: Vec<_> =
        page.advertisements().iter().filter_map(|ad| ad.job_title.as_deref()).collect();
    assert_eq!(titles, vec!["Bricklayer", "Baker"]);
    assert_eq!(links.get("next").unwrap().href(), "/advertisement?beforeId=a2");
}

/// Scenario: `_links` present but not an object
#[test]
fn test_non_object_links_are_rejected() {
    let err = Links::from_hal_value(&json!({ "_links": "nope" })).unwrap_err();
    assert!(matches!(err, HalError::Serialization(_)));
}
