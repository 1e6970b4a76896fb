/**
 * Swap Workflow Rules
 *
 * Capability and state checks for the swap lifecycle, written as pure
 * functions over loaded documents and the caller's uid so they can be
 * tested without a store.
 *
 * # State Machine
 *
 * ```text
 *            accept (receiver only)
 * pending ─────────────────────────▶ accepted
 *    │
 *    └──────────────────────────────▶ declined
 *            decline (receiver only)
 * ```
 *
 * Both outcomes are terminal.
 */

use thiserror::Error;

use crate::backend::error::ApiError;
use crate::shared::{Delivery, DeliveryStatus, Item, Swap, SwapStatus};

/// Why a swap operation was refused
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SwapRejection {
    #[error("You don't own the offered item")]
    NotOwner,

    #[error("Cannot swap with yourself")]
    SelfSwap,

    #[error("Items must be active")]
    InactiveItems,

    /// Only the owner of the requested item may respond
    #[error("Only the owner of the requested item can respond to this swap")]
    NotAuthorized,

    #[error("Swap is not pending")]
    InvalidStatus,
}

impl From<SwapRejection> for ApiError {
    fn from(rejection: SwapRejection) -> Self {
        let message = rejection.to_string();
        match rejection {
            SwapRejection::NotOwner => ApiError::forbidden("NOT_OWNER", message),
            SwapRejection::SelfSwap => ApiError::validation("SELF_SWAP", message),
            SwapRejection::InactiveItems => ApiError::invalid_state("INACTIVE_ITEMS", message),
            SwapRejection::NotAuthorized => ApiError::forbidden("NOT_AUTHORIZED", message),
            SwapRejection::InvalidStatus => ApiError::invalid_state("INVALID_STATUS", message),
        }
    }
}

/// Amount the proposer owes on top of their item; negative means they receive
pub fn net_amount(offered: &Item, requested: &Item) -> f64 {
    requested.price - offered.price
}

/// Check that `uid` may offer `offered` in exchange for `requested`
pub fn check_proposal(offered: &Item, requested: &Item, uid: &str) -> Result<(), SwapRejection> {
    if !offered.is_owned_by(uid) {
        return Err(SwapRejection::NotOwner);
    }
    if requested.is_owned_by(uid) {
        return Err(SwapRejection::SelfSwap);
    }
    if !offered.is_active() || !requested.is_active() {
        return Err(SwapRejection::InactiveItems);
    }
    Ok(())
}

/// Check that `uid` may accept or decline `swap`
pub fn check_response(swap: &Swap, uid: &str) -> Result<(), SwapRejection> {
    if swap.requested_from_user_id != uid {
        return Err(SwapRejection::NotAuthorized);
    }
    if swap.status != SwapStatus::Pending {
        return Err(SwapRejection::InvalidStatus);
    }
    Ok(())
}

/// The two hand-offs an accepted swap requires
///
/// The offered item travels from the proposer to the receiver and the
/// requested item the other way.
pub fn delivery_legs(swap: &Swap) -> [Delivery; 2] {
    let leg = |item_id: &str, from: &str, to: &str| Delivery {
        swap_id: Some(swap.id.clone()),
        item_id: item_id.to_string(),
        from_user_id: Some(from.to_string()),
        to_user_id: Some(to.to_string()),
        status: DeliveryStatus::Pending,
        ..Default::default()
    };
    [
        leg(&swap.item_offered_id, &swap.offered_by_user_id, &swap.requested_from_user_id),
        leg(&swap.item_requested_id, &swap.requested_from_user_id, &swap.offered_by_user_id),
    ]
}
