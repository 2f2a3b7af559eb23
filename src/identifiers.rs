//! Derived identifiers: SKUs, cashier numbers, customer numbers and barcodes.

use std::future::Future;

use rand::Rng;

use crate::error::{AppError, AppResult};

/// Maximum number of draws before giving up on finding a free number.
pub const MAX_NUMBER_ATTEMPTS: usize = 64;

fn prefix(value: &str) -> String {
    value.chars().take(3).collect::<String>().to_uppercase()
}

/// SKU for a product attached to a category, e.g. `KAMFIC000000042`.
pub fn sku_for_category(category_name: &str, product_name: &str, product_id: i32) -> String {
    format!(
        "{}{}{:09}",
        prefix(category_name),
        prefix(product_name),
        product_id
    )
}

/// SKU for a product without a category, keyed by its article number.
pub fn sku_for_product(product_name: &str, article_number: i64) -> String {
    format!("{}{:09}", prefix(product_name), article_number)
}

pub fn cashier_number(user_id: i32) -> String {
    format!("K{:04}", user_id)
}

/// Cashier number a user should carry after moving from `current_role` to `new_role`.
pub fn cashier_number_after_transition(
    user_id: i32,
    current_role: Option<&str>,
    new_role: &str,
    current_number: Option<String>,
    cashier_role: &str,
) -> Option<String> {
    let was_cashier = current_role == Some(cashier_role);
    let is_cashier = new_role == cashier_role;
    match (was_cashier, is_cashier) {
        (false, true) => Some(cashier_number(user_id)),
        (true, false) => None,
        _ => current_number,
    }
}

pub fn random_customer_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:08}", rng.random_range(0..=99_999_999u32))
}

/// 13 digit numeric barcode, first digit never zero.
pub fn random_barcode<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{}{:012}",
        rng.random_range(1..=9u8),
        rng.random_range(0..=999_999_999_999u64)
    )
}

/// Draw candidates from `generate` until `taken` reports one as free.
pub async fn unique_number<G, F, Fut>(mut generate: G, mut taken: F) -> AppResult<String>
where
    G: FnMut() -> String,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    for attempt in 1..=MAX_NUMBER_ATTEMPTS {
        let candidate = generate();
        if !taken(candidate.clone()).await? {
            return Ok(candidate);
        }
        tracing::debug!(attempt, "generated number already taken, retrying");
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "no free number after {MAX_NUMBER_ATTEMPTS} attempts"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const CASHIER: &str = "kassamedewerker";

    #[test]
    fn category_sku_matches_known_value() {
        assert_eq!(sku_for_category("Kamerplanten", "Ficus", 42), "KAMFIC000000042");
    }

    #[test]
    fn sku_handles_short_and_non_ascii_names() {
        assert_eq!(sku_for_category("Orchideeën", "Aa", 7), "ORCAA000000007");
        assert_eq!(sku_for_product("ëik", 12), "ËIK000000012");
    }

    #[test]
    fn product_sku_pads_article_number() {
        assert_eq!(sku_for_product("monstera", 1234), "MON000001234");
    }

    #[test]
    fn cashier_number_is_padded() {
        assert_eq!(cashier_number(7), "K0007");
        assert_eq!(cashier_number(12345), "K12345");
    }

    #[test]
    fn becoming_cashier_assigns_number() {
        let n = cashier_number_after_transition(7, Some("staff"), CASHIER, None, CASHIER);
        assert_eq!(n.as_deref(), Some("K0007"));
    }

    #[test]
    fn leaving_cashier_clears_number() {
        let n = cashier_number_after_transition(
            7,
            Some(CASHIER),
            "staff",
            Some("K0007".into()),
            CASHIER,
        );
        assert_eq!(n, None);
    }

    #[test]
    fn other_transitions_keep_number() {
        let n = cashier_number_after_transition(7, Some("staff"), "user", None, CASHIER);
        assert_eq!(n, None);
        let n = cashier_number_after_transition(
            7,
            Some(CASHIER),
            CASHIER,
            Some("K0007".into()),
            CASHIER,
        );
        assert_eq!(n.as_deref(), Some("K0007"));
    }

    #[test]
    fn customer_numbers_are_eight_digits() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let n = random_customer_number(&mut rng);
            assert_eq!(n.len(), 8);
            assert!(n.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn barcodes_are_thirteen_digits() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let b = random_barcode(&mut rng);
            assert_eq!(b.len(), 13);
            assert!(!b.starts_with('0'));
        }
    }

    #[tokio::test]
    async fn unique_number_skips_taken_candidates() {
        let existing: HashSet<String> = ["00000001", "00000002"].into_iter().map(String::from).collect();
        let mut seq = vec!["00000001", "00000002", "00000003"].into_iter();
        let n = unique_number(
            || seq.next().unwrap_or("99999999").to_string(),
            |c| {
                let hit = existing.contains(&c);
                async move { Ok(hit) }
            },
        )
        .await
        .unwrap();
        assert_eq!(n, "00000003");
    }

    #[tokio::test]
    async fn unique_number_gives_up_eventually() {
        let result = unique_number(|| "00000001".to_string(), |_| async { Ok(true) }).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
