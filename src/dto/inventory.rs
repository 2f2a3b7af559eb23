use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::require_positive,
    error::{AppError, AppResult},
    inventory::RemoteOrderItem,
};

/// Remote order lines to place with the inventory supplier.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreRemoteOrderRequest {
    pub items: Vec<RemoteOrderItem>,
}

impl StoreRemoteOrderRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.items.is_empty() {
            return Err(AppError::BadRequest("No products selected".into()));
        }
        for item in &self.items {
            require_positive("product_id", item.product_id)?;
            require_positive("quantity", i64::from(item.quantity))?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlacedRemoteOrders {
    pub order_ids: Vec<i64>,
}

/// Effect of one remote order line on the local catalog.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncedItem {
    pub article_number: i64,
    pub product_id: i32,
    pub quantity: i32,
    pub stock: i32,
    pub created: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SyncedOrder {
    pub order_id: i64,
    pub items: Vec<SyncedItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_request_is_rejected() {
        let req = StoreRemoteOrderRequest { items: vec![] };
        assert!(req.validate().is_err());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let req = StoreRemoteOrderRequest {
            items: vec![RemoteOrderItem {
                product_id: 3,
                quantity: 0,
            }],
        };
        assert!(req.validate().is_err());
    }
}
