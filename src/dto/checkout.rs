use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{require_non_negative, require_positive, require_text},
    error::AppResult,
    models::{CheckoutLine, Receipt},
    receipt::ReceiptTotals,
};

/// Manually entered checkout line.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCheckoutLineRequest {
    pub article_number: i64,
    pub name: String,
    pub price: i64,
    pub quantity: Option<i32>,
}

impl CreateCheckoutLineRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_positive("article_number", self.article_number)?;
        require_text("name", &self.name, 50)?;
        require_non_negative("price", self.price)?;
        if let Some(quantity) = self.quantity {
            require_positive("quantity", i64::from(quantity))?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CheckoutLineList {
    #[schema(value_type = Vec<CheckoutLine>)]
    pub items: Vec<CheckoutLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearedCart {
    pub removed: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FinalizedReceipt {
    pub receipt: Receipt,
    #[serde(flatten)]
    pub totals: ReceiptTotals,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ReceiptList {
    #[schema(value_type = Vec<Receipt>)]
    pub items: Vec<Receipt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_line_is_rejected() {
        let req = CreateCheckoutLineRequest {
            article_number: 10,
            name: "Ficus".into(),
            price: 1299,
            quantity: Some(0),
        };
        assert!(req.validate().is_err());
    }
}
