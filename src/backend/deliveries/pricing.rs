//! Delivery cost quotes.

use serde::{Deserialize, Serialize};

use crate::shared::DeliveryMethod;

/// Charge per unit of item weight
pub const COST_PER_WEIGHT_UNIT: f64 = 10.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostQuote {
    pub base_cost: f64,
    pub weight_cost: f64,
    pub total_cost: f64,
    pub estimated_days: i64,
}

pub fn quote(method: DeliveryMethod, item_weight: f64) -> CostQuote {
    let base_cost = method.base_cost();
    let weight_cost = item_weight * COST_PER_WEIGHT_UNIT;
    CostQuote {
        base_cost,
        weight_cost,
        total_cost: base_cost + weight_cost,
        estimated_days: method.estimated_days(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quote_per_method() {
        assert_eq!(
            quote(DeliveryMethod::Standard, 2.0),
            CostQuote {
                base_cost: 50.0,
                weight_cost: 20.0,
                total_cost: 70.0,
                estimated_days: 7,
            }
        );
        assert_eq!(quote(DeliveryMethod::Premium, 0.0).total_cost, 100.0);

        let express = quote(DeliveryMethod::Express, 1.5);
        assert_eq!(express.total_cost, 165.0);
        assert_eq!(express.estimated_days, 1);
    }
}
