//! Formatting of finalized checkout carts into receipt text.

use std::fmt::Write;

use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::{checkout_lines, users};

/// Who rang up the sale, printed once at the top of the line list.
#[derive(Debug, Clone)]
pub struct CashierIdentity {
    pub cashier_number: Option<String>,
    pub name: String,
    pub email: String,
}

impl From<&users::Model> for CashierIdentity {
    fn from(user: &users::Model) -> Self {
        Self {
            cashier_number: user.cashier_number.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReceiptLine {
    pub name: String,
    pub price: i64,
    pub article_number: i64,
    pub quantity: i32,
    pub user_id: Option<i32>,
}

impl From<&checkout_lines::Model> for ReceiptLine {
    fn from(line: &checkout_lines::Model) -> Self {
        Self {
            name: line.name.clone(),
            price: line.price,
            article_number: line.article_number,
            quantity: line.quantity,
            user_id: line.user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReceiptTotals {
    pub total_price: i64,
    pub total_quantity: i64,
    /// `total_price * total_quantity`, kept on the printed receipt.
    pub total_price_times_quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptSummary {
    pub data: String,
    pub totals: ReceiptTotals,
}

pub fn totals(lines: &[ReceiptLine]) -> ReceiptTotals {
    let (total_price, total_quantity) = lines.iter().fold((0i64, 0i64), |(price, qty), line| {
        let quantity = i64::from(line.quantity);
        (
            price.saturating_add(line.price.saturating_mul(quantity)),
            qty.saturating_add(quantity),
        )
    });
    ReceiptTotals {
        total_price,
        total_quantity,
        total_price_times_quantity: total_price.saturating_mul(total_quantity),
    }
}

/// Render the receipt text. The cashier block is emitted before the first
/// line carrying a user id, and only once.
pub fn build_receipt(lines: &[ReceiptLine], cashier: Option<&CashierIdentity>) -> ReceiptSummary {
    let mut data = String::new();
    let mut cashier_added = false;

    for line in lines {
        if line.user_id.is_some() && !cashier_added {
            if let Some(cashier) = cashier {
                let _ = write!(
                    data,
                    "| Cashier Number: {} | Cashier Name: {} | Cashier Email: {} | ",
                    cashier.cashier_number.as_deref().unwrap_or_default(),
                    cashier.name,
                    cashier.email
                );
                cashier_added = true;
            }
        }

        let _ = write!(
            data,
            "Product: {} | Price: {} | Article Number: {} | ;",
            line.name, line.price, line.article_number
        );
    }

    let totals = totals(lines);
    let _ = write!(
        data,
        "Total Price: {} | Total Quantity: {} | Total Price and Quantity: {} | ",
        totals.total_price, totals.total_quantity, totals.total_price_times_quantity
    );

    ReceiptSummary { data, totals }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, price: i64, qty: i32, user_id: Option<i32>) -> ReceiptLine {
        ReceiptLine {
            name: name.to_string(),
            price,
            article_number: 1000 + price,
            quantity: qty,
            user_id,
        }
    }

    fn cashier() -> CashierIdentity {
        CashierIdentity {
            cashier_number: Some("K0007".into()),
            name: "Sanne".into(),
            email: "sanne@example.com".into(),
        }
    }

    #[test]
    fn totals_follow_price_times_quantity() {
        let lines = vec![line("Ficus", 10, 2, Some(7)), line("Cactus", 5, 1, Some(7))];
        let t = totals(&lines);
        assert_eq!(t.total_price, 25);
        assert_eq!(t.total_quantity, 3);
        assert_eq!(t.total_price_times_quantity, 75);
    }

    #[test]
    fn cashier_block_appears_once_before_first_owned_line() {
        let lines = vec![
            line("Ficus", 10, 2, None),
            line("Cactus", 5, 1, Some(7)),
            line("Bonsai", 30, 1, Some(7)),
        ];
        let summary = build_receipt(&lines, Some(&cashier()));

        assert_eq!(summary.data.matches("Cashier Number: K0007").count(), 1);
        let cashier_at = summary.data.find("Cashier Number").unwrap();
        let ficus_at = summary.data.find("Product: Ficus").unwrap();
        let cactus_at = summary.data.find("Product: Cactus").unwrap();
        assert!(ficus_at < cashier_at && cashier_at < cactus_at);
    }

    #[test]
    fn receipt_text_layout() {
        let lines = vec![line("Ficus", 10, 2, Some(7)), line("Cactus", 5, 1, Some(7))];
        let summary = build_receipt(&lines, Some(&cashier()));
        assert_eq!(
            summary.data,
            "| Cashier Number: K0007 | Cashier Name: Sanne | Cashier Email: sanne@example.com | \
             Product: Ficus | Price: 10 | Article Number: 1010 | ;\
             Product: Cactus | Price: 5 | Article Number: 1005 | ;\
             Total Price: 25 | Total Quantity: 3 | Total Price and Quantity: 75 | "
        );
    }

    #[test]
    fn no_cashier_block_without_identity() {
        let lines = vec![line("Ficus", 10, 1, Some(7))];
        let summary = build_receipt(&lines, None);
        assert!(!summary.data.contains("Cashier"));
        assert!(summary.data.starts_with("Product: Ficus"));
    }
}
