//! Client for the remote inventory API ("Kuin") and the product merge rules
//! applied when its stock is synced into the local catalog.

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::Set;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    config::InventoryConfig,
    entity::products,
    error::{AppError, AppResult},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// One line of a remote order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RemoteOrderItem {
    pub product_id: i64,
    pub quantity: i32,
}

/// Product detail as served by the remote API. Prices arrive as decimal
/// strings or numbers and are kept in minor units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RemoteProduct {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_cents")]
    pub price: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub height_cm: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub width_cm: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub depth_cm: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub weight_gr: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacedOrderItem {
    pub order_id: i64,
}

/// Remote order items together with the detail of every product they reference.
#[derive(Debug, Serialize, ToSchema)]
pub struct RemoteOrderDetail {
    pub order_items: Vec<RemoteOrderItem>,
    pub products: Vec<RemoteProduct>,
}

/// What the catalog sync needs from the remote side.
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn order_items(&self, order_id: i64) -> AppResult<Vec<RemoteOrderItem>>;
    async fn product(&self, product_id: i64) -> AppResult<RemoteProduct>;
}

#[derive(Clone)]
pub struct KuinClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl KuinClient {
    pub fn new(config: &InventoryConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("retail-backend/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn token(&self) -> AppResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| AppError::Upstream("inventory token is not configured".into()))
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> AppResult<T> {
        let response = request
            .bearer_auth(self.token()?)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "inventory request failed");
                AppError::Upstream("inventory service unreachable".into())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "inventory service returned status {status}"
            )));
        }

        response.json::<T>().await.map_err(|err| {
            tracing::warn!(error = %err, "inventory response could not be decoded");
            AppError::Upstream("unexpected inventory response".into())
        })
    }

    pub async fn products(&self) -> AppResult<Value> {
        self.send(self.http.get(self.url("product"))).await
    }

    pub async fn orders(&self) -> AppResult<Value> {
        self.send(self.http.get(self.url("order"))).await
    }

    pub async fn place_order_item(&self, item: &RemoteOrderItem) -> AppResult<PlacedOrderItem> {
        self.send(self.http.post(self.url("orderItem")).json(item))
            .await
    }
}

#[async_trait]
impl InventorySource for KuinClient {
    async fn order_items(&self, order_id: i64) -> AppResult<Vec<RemoteOrderItem>> {
        self.send(
            self.http
                .get(self.url("orderItem"))
                .query(&[("order_id", order_id)]),
        )
        .await
    }

    async fn product(&self, product_id: i64) -> AppResult<RemoteProduct> {
        self.send(self.http.get(self.url(&format!("product/{product_id}"))))
            .await
    }
}

/// Overwrite the descriptive fields of a local product with the remote detail.
/// Fields the remote leaves empty keep their local value. A negative price is
/// rejected before anything is written.
pub fn apply_remote_details(
    active: &mut products::ActiveModel,
    remote: &RemoteProduct,
) -> AppResult<()> {
    if let Some(price) = remote.price.filter(|p| *p < 0) {
        return Err(AppError::Upstream(format!(
            "inventory reported a negative price ({price}) for product {}",
            remote.id
        )));
    }
    if !remote.name.trim().is_empty() {
        active.name = Set(remote.name.clone());
    }
    if remote.description.is_some() {
        active.description = Set(remote.description.clone());
    }
    if let Some(price) = remote.price {
        active.price = Set(price);
    }
    if remote.image.is_some() {
        active.image = Set(remote.image.clone());
    }
    if remote.color.is_some() {
        active.color = Set(remote.color.clone());
    }
    if remote.height_cm.is_some() {
        active.height_cm = Set(remote.height_cm);
    }
    if remote.width_cm.is_some() {
        active.width_cm = Set(remote.width_cm);
    }
    if remote.depth_cm.is_some() {
        active.depth_cm = Set(remote.depth_cm);
    }
    if remote.weight_gr.is_some() {
        active.weight_gr = Set(remote.weight_gr);
    }
    Ok(())
}

/// Stock after receiving `quantity` more units.
pub fn received_stock(current: i32, quantity: i32) -> AppResult<i32> {
    if quantity < 0 {
        return Err(AppError::Upstream(format!(
            "inventory reported a negative quantity ({quantity})"
        )));
    }
    current
        .checked_add(quantity)
        .ok_or_else(|| AppError::BadRequest("stock would overflow".into()))
}

fn parse_cents(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (whole, frac) = match raw.split_once('.') {
        Some((w, f)) => (w, f),
        None => (raw, ""),
    };
    if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let frac: i64 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<2}").parse().ok()?
    };
    let sign = if raw.starts_with('-') { -1 } else { 1 };
    whole.checked_mul(100)?.checked_add(sign * frac)
}

fn lenient_cents<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_cents(&s),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i.checked_mul(100),
            None => n.as_f64().map(|f| (f * 100.0).round() as i64),
        },
        _ => None,
    })
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f.round() as i32),
        Some(Value::Number(n)) => n.as_f64().map(|f| f.round() as i32),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue::NotSet;

    #[test]
    fn remote_product_accepts_string_prices() {
        let product: RemoteProduct = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": "Monstera",
            "price": "12.5",
            "height_cm": "80",
        }))
        .unwrap();
        assert_eq!(product.price, Some(1250));
        assert_eq!(product.height_cm, Some(80));
        assert_eq!(product.description, None);
    }

    #[test]
    fn remote_product_accepts_numeric_prices() {
        let product: RemoteProduct = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Cactus",
            "price": 3.99,
            "weight_gr": 250,
        }))
        .unwrap();
        assert_eq!(product.price, Some(399));
        assert_eq!(product.weight_gr, Some(250));
    }

    #[test]
    fn cents_parsing() {
        assert_eq!(parse_cents("10"), Some(1000));
        assert_eq!(parse_cents("10.05"), Some(1005));
        assert_eq!(parse_cents("-1.50"), Some(-150));
        assert_eq!(parse_cents("1.234"), None);
        assert_eq!(parse_cents("abc"), None);
    }

    #[test]
    fn remote_details_overwrite_only_present_fields() {
        let mut active = products::ActiveModel {
            name: Set("Old".into()),
            color: Set(Some("green".into())),
            ..Default::default()
        };
        let remote = RemoteProduct {
            id: 42,
            name: "Monstera".into(),
            price: Some(1299),
            ..Default::default()
        };
        apply_remote_details(&mut active, &remote).unwrap();
        assert_eq!(active.name, Set("Monstera".to_string()));
        assert_eq!(active.price, Set(1299));
        assert_eq!(active.color, Set(Some("green".to_string())));
        assert_eq!(active.image, NotSet);
    }

    #[test]
    fn negative_remote_price_is_an_upstream_error() {
        let remote: RemoteProduct = serde_json::from_value(serde_json::json!({
            "id": 9,
            "name": "Palm",
            "price": "-1.50",
        }))
        .unwrap();
        let mut active = products::ActiveModel {
            price: Set(500),
            ..Default::default()
        };
        let result = apply_remote_details(&mut active, &remote);
        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert_eq!(active.price, Set(500));
        assert_eq!(active.name, NotSet);
    }

    #[test]
    fn received_stock_adds_quantity() {
        assert_eq!(received_stock(3, 5).unwrap(), 8);
        assert!(received_stock(3, -1).is_err());
        assert!(received_stock(i32::MAX, 1).is_err());
    }

    #[test]
    fn missing_token_is_an_upstream_error() {
        let client = KuinClient::new(&InventoryConfig {
            base_url: "http://localhost:9/api/".into(),
            token: None,
        })
        .unwrap();
        assert_eq!(client.url("/product"), "http://localhost:9/api/product");
        assert!(matches!(client.token(), Err(AppError::Upstream(_))));
    }
}
