//! # Customer Repository
//!
//! Database operations for customer accounts.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use pressline_core::Customer;

/// Fields for creating a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// Fields for updating a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCustomer {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub notes: Option<String>,
}

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, phone_number, email, notes, \
     processor_customer_id, created_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer and returns the stored row.
    pub async fn create(&self, new: &NewCustomer) -> DbResult<Customer> {
        let now = Utc::now();
        debug!(first_name = %new.first_name, last_name = %new.last_name, "Creating customer");

        let result = sqlx::query(
            r#"
            INSERT INTO customers (first_name, last_name, phone_number, email, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.phone_number)
        .bind(&new.email)
        .bind(&new.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| DbError::not_found("Customer", result.last_insert_rowid()))
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers, newest first.
    pub async fn list(&self, limit: i64, offset: i64) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Searches customers by name or phone number.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Customer>> {
        let like = format!("%{}%", query.trim());
        let customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS} FROM customers
            WHERE first_name LIKE ?1 OR last_name LIKE ?1 OR phone_number LIKE ?1
            ORDER BY last_name, first_name
            LIMIT 50
            "#
        ))
        .bind(&like)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Updates a customer's contact fields.
    pub async fn update(&self, id: i64, update: &UpdateCustomer) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET first_name = ?2, last_name = ?3, phone_number = ?4, email = ?5, notes = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.phone_number)
        .bind(&update.email)
        .bind(&update.notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Stores the external processor customer id after first creation.
    pub async fn set_processor_customer_id(&self, id: i64, processor_id: &str) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE customers SET processor_customer_id = ?2 WHERE id = ?1")
                .bind(id)
                .bind(processor_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Deletes a customer.
    ///
    /// Deletion is allowed even with outstanding tickets; the count of
    /// still-unpaid tickets is returned so callers can surface it, and a
    /// warning is logged.
    pub async fn delete(&self, id: i64) -> DbResult<i64> {
        let outstanding: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tickets
            WHERE customer_id = ?1 AND total_price_cents > payment_cents AND picked_up = 0
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if outstanding > 0 {
            warn!(
                customer_id = id,
                outstanding, "Deleting customer with outstanding tickets"
            );
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(outstanding)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn ada() -> NewCustomer {
        NewCustomer {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone_number: "512-555-0134".into(),
            email: Some("ada@example.com".into()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let created = db.customers().create(&ada()).await.unwrap();

        let fetched = db.customers().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.full_name(), "Ada Lovelace");
        assert!(fetched.processor_customer_id.is_none());
    }

    #[tokio::test]
    async fn test_search_by_name_and_phone() {
        let db = test_db().await;
        db.customers().create(&ada()).await.unwrap();

        let by_name = db.customers().search("love").await.unwrap();
        assert_eq!(by_name.len(), 1);

        let by_phone = db.customers().search("555-0134").await.unwrap();
        assert_eq!(by_phone.len(), 1);

        let none = db.customers().search("nobody").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update() {
        let db = test_db().await;
        let created = db.customers().create(&ada()).await.unwrap();

        db.customers()
            .update(
                created.id,
                &UpdateCustomer {
                    first_name: "Ada".into(),
                    last_name: "King".into(),
                    phone_number: "512-555-0134".into(),
                    email: None,
                    notes: Some("prefers light starch".into()),
                },
            )
            .await
            .unwrap();

        let fetched = db.customers().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.last_name, "King");
        assert_eq!(fetched.notes.as_deref(), Some("prefers light starch"));
    }

    #[tokio::test]
    async fn test_delete_missing_customer() {
        let db = test_db().await;
        let err = db.customers().delete(999).await;
        assert!(matches!(err, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_set_processor_customer_id() {
        let db = test_db().await;
        let created = db.customers().create(&ada()).await.unwrap();

        db.customers()
            .set_processor_customer_id(created.id, "cus_123")
            .await
            .unwrap();

        let fetched = db.customers().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.processor_customer_id.as_deref(), Some("cus_123"));
    }
}
