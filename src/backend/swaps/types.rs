//! Request types for the swap endpoints.

use serde::Deserialize;

/// Body of `POST /api/proposeSwap`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeSwapRequest {
    pub item_offered_id: Option<String>,
    pub item_requested_id: Option<String>,
    pub message: Option<String>,
}

/// Body of `POST /api/acceptSwap` and `POST /api/declineSwap`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapIdRequest {
    pub swap_id: Option<String>,
}
