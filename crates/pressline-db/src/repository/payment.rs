//! # Payment Repository
//!
//! Recorded payments: the ledger rows written after cash tenders and
//! processor charges. Balance mutation itself lives on the ticket
//! repository; this one only records and reads history.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pressline_core::{Payment, PaymentMethod};

/// Fields for recording a payment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    pub customer_id: i64,
    pub ticket_id: Option<i64>,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub tendered_cents: Option<i64>,
    pub change_cents: Option<i64>,
    pub processor_charge_id: Option<String>,
}

const PAYMENT_COLUMNS: &str = "id, customer_id, ticket_id, method, amount_cents, \
     tendered_cents, change_cents, processor_charge_id, created_at";

/// Repository for payment records.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Inserts a payment record.
    pub async fn record(&self, new: &NewPayment) -> DbResult<Payment> {
        let now = Utc::now();
        debug!(
            customer_id = new.customer_id,
            amount_cents = new.amount_cents,
            method = ?new.method,
            "Recording payment"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                customer_id, ticket_id, method, amount_cents,
                tendered_cents, change_cents, processor_charge_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(new.customer_id)
        .bind(new.ticket_id)
        .bind(new.method)
        .bind(new.amount_cents)
        .bind(new.tendered_cents)
        .bind(new.change_cents)
        .bind(&new.processor_charge_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", id))
    }

    /// Gets one payment by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Payment history for a customer, newest first.
    pub async fn history(&self, customer_id: i64) -> DbResult<Vec<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS} FROM payments
            WHERE customer_id = ?1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// One receipt, scoped to its customer.
    pub async fn receipt(&self, payment_id: i64, customer_id: i64) -> DbResult<Option<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1 AND customer_id = ?2"
        ))
        .bind(payment_id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?)
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

    #[tokio::test]
    async fn test_record_cash_payment() {
        let (db, customer_id) = db_with_customer().await;

        let payment = db
            .payments()
            .record(&NewPayment {
                customer_id,
                ticket_id: None,
                method: PaymentMethod::Cash,
                amount_cents: 1250,
                tendered_cents: Some(2000),
                change_cents: Some(750),
                processor_charge_id: None,
            })
            .await
            .unwrap();

        assert_eq!(payment.amount_cents, 1250);
        assert_eq!(payment.change_cents, Some(750));
        assert_eq!(payment.method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let (db, customer_id) = db_with_customer().await;

        for amount in [100, 200, 300] {
            db.payments()
                .record(&NewPayment {
                    customer_id,
                    ticket_id: None,
                    method: PaymentMethod::Check,
                    amount_cents: amount,
                    tendered_cents: None,
                    change_cents: None,
                    processor_charge_id: None,
                })
                .await
                .unwrap();
        }

        let history = db.payments().history(customer_id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].amount_cents, 300);
    }

    #[tokio::test]
    async fn test_receipt_scoped_to_customer() {
        let (db, customer_id) = db_with_customer().await;

        let payment = db
            .payments()
            .record(&NewPayment {
                customer_id,
                ticket_id: None,
                method: PaymentMethod::Card,
                amount_cents: 999,
                tendered_cents: None,
                change_cents: None,
                processor_charge_id: Some("ch_123".into()),
            })
            .await
            .unwrap();

        assert!(db
            .payments()
            .receipt(payment.id, customer_id)
            .await
            .unwrap()
            .is_some());
        assert!(db
            .payments()
            .receipt(payment.id, customer_id + 1)
            .await
            .unwrap()
            .is_none());
    }
}
