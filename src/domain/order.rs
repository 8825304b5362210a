use serde::Serialize;
use serde_json::Value;

use crate::domain::item::{ResourceItem, value_to_text};

/// Payment state of an order as the remote API numbers it.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    PartiallyPaid,
}

impl PaymentStatus {
    /// Derives the status from what has been paid against the order total.
    /// Overpayment and negative amounts fall back to `Unpaid`, like the API.
    pub fn derive(paid: f64, total: f64) -> Self {
        if paid == 0.0 {
            PaymentStatus::Unpaid
        } else if (paid - total).abs() < f64::EPSILON {
            PaymentStatus::Paid
        } else if paid > 0.0 && paid < total {
            PaymentStatus::PartiallyPaid
        } else {
            PaymentStatus::Unpaid
        }
    }

    pub const fn id(self) -> u8 {
        match self {
            PaymentStatus::Unpaid => 1,
            PaymentStatus::Paid => 2,
            PaymentStatus::PartiallyPaid => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::PartiallyPaid => "Partially Paid",
        }
    }
}

/// Money columns of an order as the list shows them. The API stores
/// `sub_total`, `delivery_charge` and `paid_amount`; the rest is derived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderTotals {
    pub total: f64,
    pub due: f64,
    pub status: PaymentStatus,
}

impl OrderTotals {
    pub fn of(item: &ResourceItem) -> Self {
        let total = amount(item.field("sub_total")) + amount(item.field("delivery_charge"));
        let paid = amount(item.field("paid_amount"));
        Self {
            total,
            due: total - paid,
            status: PaymentStatus::derive(paid, total),
        }
    }
}

/// One product row of an order, ready for display.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct OrderLine {
    pub product: String,
    pub price: String,
    pub quantity: String,
    pub total: String,
}

impl OrderLine {
    /// Rows of the order's `order_detail` list; missing details give none.
    pub fn lines_of(item: &ResourceItem) -> Vec<OrderLine> {
        let Some(Value::Array(details)) = item.field("order_detail") else {
            return Vec::new();
        };

        details
            .iter()
            .map(|detail| {
                let price = amount(detail.get("price"));
                let quantity = amount(detail.get("qty"));
                OrderLine {
                    product: detail
                        .get("product")
                        .and_then(|product| product.get("name"))
                        .map(value_to_text)
                        .unwrap_or_default(),
                    price: format_amount(price),
                    quantity: format_amount(quantity),
                    total: format_amount(price * quantity),
                }
            })
            .collect()
    }
}

/// Numbers arrive as JSON numbers or numeric strings; anything else is 0.
fn amount(value: Option<&Value>) -> f64 {
    value
        .map(value_to_text)
        .and_then(|text| text.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Whole amounts without decimals, everything else with two.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(value: Value) -> ResourceItem {
        ResourceItem::from_json(value).unwrap()
    }

    #[test]
    fn totals_come_from_stored_amounts() {
        let totals = OrderTotals::of(&order(json!({
            "id": 1,
            "sub_total": "400",
            "delivery_charge": 80,
            "paid_amount": "180.5"
        })));

        assert_eq!(totals.total, 480.0);
        assert_eq!(totals.due, 299.5);
        assert_eq!(totals.status, PaymentStatus::PartiallyPaid);
        assert_eq!(format_amount(totals.due), "299.50");
        assert_eq!(format_amount(totals.total), "480");
    }

    #[test]
    fn unpaid_when_amounts_are_missing() {
        let totals = OrderTotals::of(&order(json!({"id": 1, "paid_amount": null})));

        assert_eq!(totals.total, 0.0);
        assert_eq!(totals.status, PaymentStatus::Unpaid);
    }

    #[test]
    fn lines_multiply_price_by_quantity() {
        let lines = OrderLine::lines_of(&order(json!({
            "id": 7,
            "order_detail": [
                {"id": 1, "product": {"name": "Guide Book"}, "price": "120", "qty": 2},
                {"id": 2, "product": null, "price": 15.5, "qty": "1"}
            ]
        })));

        assert_eq!(
            lines,
            vec![
                OrderLine {
                    product: "Guide Book".to_string(),
                    price: "120".to_string(),
                    quantity: "2".to_string(),
                    total: "240".to_string(),
                },
                OrderLine {
                    product: String::new(),
                    price: "15.50".to_string(),
                    quantity: "1".to_string(),
                    total: "15.50".to_string(),
                },
            ]
        );
        assert!(OrderLine::lines_of(&order(json!({"id": 8}))).is_empty());
    }

    #[test]
    fn derives_status_from_amounts() {
        assert_eq!(PaymentStatus::derive(0.0, 500.0), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::derive(500.0, 500.0), PaymentStatus::Paid);
        assert_eq!(
            PaymentStatus::derive(120.0, 500.0),
            PaymentStatus::PartiallyPaid
        );
        assert_eq!(PaymentStatus::derive(700.0, 500.0), PaymentStatus::Unpaid);
    }

    #[test]
    fn ids_and_labels_match_the_api() {
        assert_eq!(PaymentStatus::Paid.id(), 2);
        assert_eq!(PaymentStatus::PartiallyPaid.id(), 3);
        assert_eq!(PaymentStatus::PartiallyPaid.label(), "Partially Paid");
    }
}
