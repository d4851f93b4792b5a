//! # Card Repository
//!
//! Saved cards: processor tokens with masked display metadata.
//!
//! ## Default-Card Invariant
//! At most one card per customer has `is_default = 1`. Every write that
//! can set a default runs inside a transaction that clears the others
//! first, so the invariant holds after any sequence of add/set-default
//! operations.

use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pressline_core::CreditCard;

/// Fields for saving a card.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCard {
    pub customer_id: i64,
    pub processor_token: String,
    pub brand: Option<String>,
    pub card_last_4: String,
    pub exp_month: i64,
    pub exp_year: i64,
    #[serde(default)]
    pub set_as_default: bool,
}

const CARD_COLUMNS: &str =
    "id, customer_id, processor_token, brand, card_last_4, exp_month, exp_year, is_default";

/// Repository for saved cards.
#[derive(Debug, Clone)]
pub struct CardRepository {
    pool: SqlitePool,
}

impl CardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CardRepository { pool }
    }

    /// Saves a card; when `set_as_default`, demotes the customer's
    /// other cards in the same transaction.
    pub async fn add(&self, new: &NewCard) -> DbResult<CreditCard> {
        debug!(
            customer_id = new.customer_id,
            last_4 = %new.card_last_4,
            set_default = new.set_as_default,
            "Saving card"
        );

        let mut tx = self.pool.begin().await?;

        if new.set_as_default {
            sqlx::query("UPDATE credit_cards SET is_default = 0 WHERE customer_id = ?1")
                .bind(new.customer_id)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query(
            r#"
            INSERT INTO credit_cards (
                customer_id, processor_token, brand, card_last_4, exp_month, exp_year, is_default
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(new.customer_id)
        .bind(&new.processor_token)
        .bind(&new.brand)
        .bind(&new.card_last_4)
        .bind(new.exp_month)
        .bind(new.exp_year)
        .bind(new.set_as_default)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("CreditCard", id))
    }

    /// Gets a card by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<CreditCard>> {
        Ok(sqlx::query_as::<_, CreditCard>(&format!(
            "SELECT {CARD_COLUMNS} FROM credit_cards WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// A customer's cards, default first.
    pub async fn list(&self, customer_id: i64) -> DbResult<Vec<CreditCard>> {
        Ok(sqlx::query_as::<_, CreditCard>(&format!(
            r#"
            SELECT {CARD_COLUMNS} FROM credit_cards
            WHERE customer_id = ?1
            ORDER BY is_default DESC, id
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// The customer's default card, if any.
    pub async fn default_card(&self, customer_id: i64) -> DbResult<Option<CreditCard>> {
        Ok(sqlx::query_as::<_, CreditCard>(&format!(
            "SELECT {CARD_COLUMNS} FROM credit_cards WHERE customer_id = ?1 AND is_default = 1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Makes one card the default, demoting the rest transactionally.
    pub async fn set_default(&self, card_id: i64, customer_id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE credit_cards SET is_default = 0 WHERE customer_id = ?1")
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;

        let result =
            sqlx::query("UPDATE credit_cards SET is_default = 1 WHERE id = ?1 AND customer_id = ?2")
                .bind(card_id)
                .bind(customer_id)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CreditCard", card_id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Deletes a card, scoped to its customer.
    pub async fn delete(&self, card_id: i64, customer_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM credit_cards WHERE id = ?1 AND customer_id = ?2")
            .bind(card_id)
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CreditCard", card_id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::NewCustomer;

    async fn db_with_customer() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db
            .customers()
            .create(&NewCustomer {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                phone_number: "512-555-0134".into(),
                email: None,
                notes: None,
            })
            .await
            .unwrap();
        (db, customer.id)
    }

    fn card(customer_id: i64, last_4: &str, default: bool) -> NewCard {
        NewCard {
            customer_id,
            processor_token: format!("pm_{last_4}"),
            brand: Some("visa".into()),
            card_last_4: last_4.into(),
            exp_month: 12,
            exp_year: 2030,
            set_as_default: default,
        }
    }

    async fn default_count(db: &Database, customer_id: i64) -> usize {
        db.cards()
            .list(customer_id)
            .await
            .unwrap()
            .iter()
            .filter(|c| c.is_default)
            .count()
    }

    #[tokio::test]
    async fn test_add_default_demotes_others() {
        let (db, customer_id) = db_with_customer().await;

        db.cards().add(&card(customer_id, "1111", true)).await.unwrap();
        db.cards().add(&card(customer_id, "2222", true)).await.unwrap();

        assert_eq!(default_count(&db, customer_id).await, 1);
        let cards = db.cards().list(customer_id).await.unwrap();
        assert_eq!(cards[0].card_last_4, "2222"); // default listed first
        assert!(cards[0].is_default);
    }

    #[tokio::test]
    async fn test_set_default_invariant() {
        let (db, customer_id) = db_with_customer().await;

        let first = db.cards().add(&card(customer_id, "1111", true)).await.unwrap();
        let second = db.cards().add(&card(customer_id, "2222", false)).await.unwrap();

        db.cards().set_default(second.id, customer_id).await.unwrap();

        assert_eq!(default_count(&db, customer_id).await, 1);
        let refreshed = db.cards().get(first.id).await.unwrap().unwrap();
        assert!(!refreshed.is_default);

        let default = db.cards().default_card(customer_id).await.unwrap().unwrap();
        assert_eq!(default.id, second.id);
    }

    #[tokio::test]
    async fn test_set_default_rejects_foreign_card() {
        let (db, customer_id) = db_with_customer().await;
        let mine = db.cards().add(&card(customer_id, "1111", true)).await.unwrap();

        let err = db.cards().set_default(mine.id, customer_id + 1).await;
        assert!(matches!(err, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_scoped_to_customer() {
        let (db, customer_id) = db_with_customer().await;
        let mine = db.cards().add(&card(customer_id, "1111", false)).await.unwrap();

        assert!(db.cards().delete(mine.id, customer_id + 1).await.is_err());
        db.cards().delete(mine.id, customer_id).await.unwrap();
        assert!(db.cards().get(mine.id).await.unwrap().is_none());
    }
}
