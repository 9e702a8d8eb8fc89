//! Submission adapter: placement store → stamping-service records.
//!
//! The store already keeps geometry in the stamping service's convention
//! (points, origin bottom-left), so no coordinate flip happens here. The only
//! translation is the 1-based page number.

use crate::error::SignError;
use crate::model::ImageRef;
use crate::store::PlacementStore;
use serde::Serialize;

/// One stamp instruction as the signing endpoint expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    /// 1-based page number.
    pub page_number: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub image: ImageRef,
}

/// The external service that stamps signatures into the document.
pub trait SigningEndpoint {
    fn submit(&mut self, records: &[SubmissionRecord]) -> Result<(), SignError>;
}

/// Build the outbound records in store order.
///
/// # Errors
/// `NoPlacements` if the store is empty; nothing should be sent.
pub fn build_submission(store: &PlacementStore) -> Result<Vec<SubmissionRecord>, SignError> {
    if store.is_empty() {
        return Err(SignError::NoPlacements);
    }
    Ok(store
        .iter()
        .map(|p| SubmissionRecord {
            page_number: u32::try_from(p.page_index + 1).unwrap_or(u32::MAX),
            x: p.position.x,
            y: p.position.y,
            width: p.size.width,
            height: p.size.height,
            image: p.image.clone(),
        })
        .collect())
}

/// Build the records and hand them to `endpoint`.
pub fn submit(
    store: &PlacementStore,
    endpoint: &mut dyn SigningEndpoint,
) -> Result<usize, SignError> {
    let records = build_submission(store)?;
    log::debug!("submitting {} placement(s)", records.len());
    endpoint.submit(&records)?;
    Ok(records.len())
}

/// Serialize records as the JSON array the HTTP endpoint accepts.
pub fn to_json(records: &[SubmissionRecord]) -> Result<String, SignError> {
    serde_json::to_string(records).map_err(|e| SignError::Encode(e.to_string()))
}
