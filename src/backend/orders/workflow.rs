/**
 * Order Workflow Rules
 *
 * Pure checks for the buy-now pipeline:
 *
 * ```text
 * order:   pending ──initialize──▶ payment_pending ──verify──▶ paid
 * payment:           pending ──verify──▶ completed
 *                       └──────────┴──refund──▶ refund_pending
 * ```
 *
 * Only the buyer may drive an order or its payment.
 */

use thiserror::Error;

use crate::backend::error::ApiError;
use crate::shared::{Item, Order, OrderStatus, Payment, PaymentStatus};

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum OrderRejection {
    #[error("You cannot buy your own item")]
    SelfPurchase,

    #[error("Item is no longer available")]
    ItemUnavailable,

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Only the buyer can perform this action")]
    NotBuyer,

    #[error("Order is not awaiting payment")]
    OrderNotPending,

    #[error("Payment is not pending")]
    PaymentNotPending,

    #[error("A refund has already been requested for this payment")]
    RefundPending,
}

impl From<OrderRejection> for ApiError {
    fn from(rejection: OrderRejection) -> Self {
        let message = rejection.to_string();
        match rejection {
            OrderRejection::SelfPurchase => ApiError::validation("SELF_PURCHASE", message),
            OrderRejection::ItemUnavailable => ApiError::invalid_state("ITEM_UNAVAILABLE", message),
            OrderRejection::InvalidQuantity => ApiError::validation("INVALID_QUANTITY", message),
            OrderRejection::NotBuyer => ApiError::forbidden("NOT_AUTHORIZED", message),
            OrderRejection::OrderNotPending | OrderRejection::PaymentNotPending => {
                ApiError::invalid_state("INVALID_STATUS", message)
            }
            OrderRejection::RefundPending => ApiError::invalid_state("REFUND_PENDING", message),
        }
    }
}

pub fn order_total(unit_price: f64, quantity: u32) -> f64 {
    unit_price * f64::from(quantity)
}

/// Check that `uid` may buy `quantity` units of `item`
pub fn check_purchase(item: &Item, uid: &str, quantity: u32) -> Result<(), OrderRejection> {
    if quantity == 0 {
        return Err(OrderRejection::InvalidQuantity);
    }
    if item.is_owned_by(uid) {
        return Err(OrderRejection::SelfPurchase);
    }
    if !item.is_active() {
        return Err(OrderRejection::ItemUnavailable);
    }
    Ok(())
}

/// Check that `uid` may start paying for `order`
pub fn check_payable(order: &Order, uid: &str) -> Result<(), OrderRejection> {
    if order.buyer_id != uid {
        return Err(OrderRejection::NotBuyer);
    }
    if order.status != OrderStatus::Pending {
        return Err(OrderRejection::OrderNotPending);
    }
    Ok(())
}

/// Check that `uid` may confirm `payment`
pub fn check_verifiable(payment: &Payment, uid: &str) -> Result<(), OrderRejection> {
    if payment.buyer_id != uid {
        return Err(OrderRejection::NotBuyer);
    }
    if payment.status != PaymentStatus::Pending {
        return Err(OrderRejection::PaymentNotPending);
    }
    Ok(())
}

/// Check that `uid` may request a refund of `payment`
pub fn check_refundable(payment: &Payment, uid: &str) -> Result<(), OrderRejection> {
    if payment.buyer_id != uid {
        return Err(OrderRejection::NotBuyer);
    }
    if payment.status == PaymentStatus::RefundPending {
        return Err(OrderRejection::RefundPending);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ItemStatus;

    fn item(owner: &str) -> Item {
        Item {
            id: "i1".into(),
            owner_id: owner.into(),
            title: "Lamp".into(),
            category: "home".into(),
            price: 1200.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_purchase_checks() {
        assert_eq!(check_purchase(&item("seller"), "buyer", 2), Ok(()));
        assert_eq!(check_purchase(&item("buyer"), "buyer", 1), Err(OrderRejection::SelfPurchase));
        assert_eq!(check_purchase(&item("seller"), "buyer", 0), Err(OrderRejection::InvalidQuantity));

        let mut sold = item("seller");
        sold.status = ItemStatus::Swapped;
        assert_eq!(check_purchase(&sold, "buyer", 1), Err(OrderRejection::ItemUnavailable));
    }

    #[test]
    fn test_order_total() {
        assert_eq!(order_total(1200.0, 3), 3600.0);
    }

    #[test]
    fn test_only_buyer_drives_payment() {
        let order = Order {
            buyer_id: "buyer".into(),
            ..Default::default()
        };
        assert_eq!(check_payable(&order, "buyer"), Ok(()));
        assert_eq!(check_payable(&order, "seller"), Err(OrderRejection::NotBuyer));

        let paid = Order {
            status: OrderStatus::Paid,
            ..order
        };
        assert_eq!(check_payable(&paid, "buyer"), Err(OrderRejection::OrderNotPending));
    }

    #[test]
    fn test_payment_transitions() {
        let mut payment = Payment {
            buyer_id: "buyer".into(),
            ..Default::default()
        };
        assert_eq!(check_verifiable(&payment, "buyer"), Ok(()));
        assert_eq!(check_refundable(&payment, "buyer"), Ok(()));

        payment.status = PaymentStatus::Completed;
        assert_eq!(check_verifiable(&payment, "buyer"), Err(OrderRejection::PaymentNotPending));
        assert_eq!(check_refundable(&payment, "buyer"), Ok(()));

        payment.status = PaymentStatus::RefundPending;
        assert_eq!(check_refundable(&payment, "buyer"), Err(OrderRejection::RefundPending));
        assert_eq!(check_refundable(&payment, "other"), Err(OrderRejection::NotBuyer));
    }

    #[test]
    fn test_rejection_codes() {
        assert_eq!(ApiError::from(OrderRejection::SelfPurchase).code(), "SELF_PURCHASE");
        assert_eq!(ApiError::from(OrderRejection::NotBuyer).status_code().as_u16(), 403);
        assert_eq!(ApiError::from(OrderRejection::PaymentNotPending).code(), "INVALID_STATUS");
    }
}
