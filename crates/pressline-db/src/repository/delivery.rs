//! # Delivery Repository
//!
//! Delivery pickup requests, saved addresses, and the serviceable
//! postal-code range.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pressline_core::{Delivery, DeliveryAddress, DeliveryStatus};

/// Fields for requesting a delivery pickup.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDelivery {
    pub customer_id: i64,
    pub address: String,
    pub pickup_date: String,
    pub notes: Option<String>,
}

/// Fields for saving a delivery address.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDeliveryAddress {
    pub customer_id: i64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

const DELIVERY_COLUMNS: &str =
    "id, customer_id, address, pickup_date, notes, status, created_at";

/// Repository for deliveries.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: SqlitePool,
}

impl DeliveryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DeliveryRepository { pool }
    }

    /// Creates a pending delivery request.
    pub async fn request(&self, new: &NewDelivery) -> DbResult<Delivery> {
        let now = Utc::now();
        debug!(customer_id = new.customer_id, "Creating delivery request");

        let result = sqlx::query(
            r#"
            INSERT INTO deliveries (customer_id, address, pickup_date, notes, status, created_at)
            VALUES (?1, ?2, ?3, ?4, 'pending', ?5)
            "#,
        )
        .bind(new.customer_id)
        .bind(&new.address)
        .bind(&new.pickup_date)
        .bind(&new.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Delivery", id))
    }

    /// Gets a delivery by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Delivery>> {
        Ok(sqlx::query_as::<_, Delivery>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// The customer's most recent delivery.
    pub async fn latest(&self, customer_id: i64) -> DbResult<Option<Delivery>> {
        Ok(sqlx::query_as::<_, Delivery>(&format!(
            r#"
            SELECT {DELIVERY_COLUMNS} FROM deliveries
            WHERE customer_id = ?1
            ORDER BY pickup_date DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Updates a delivery's status, scoped to its customer.
    pub async fn update_status(
        &self,
        delivery_id: i64,
        customer_id: i64,
        status: DeliveryStatus,
    ) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE deliveries SET status = ?3 WHERE id = ?1 AND customer_id = ?2")
                .bind(delivery_id)
                .bind(customer_id)
                .bind(status)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Delivery", delivery_id));
        }

        Ok(())
    }

    /// Cancels a delivery request while it is still pending.
    pub async fn cancel_pending(&self, delivery_id: i64, customer_id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "DELETE FROM deliveries WHERE id = ?1 AND customer_id = ?2 AND status = 'pending'",
        )
        .bind(delivery_id)
        .bind(customer_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Delivery (pending)", delivery_id));
        }

        Ok(())
    }

    // =========================================================================
    // Addresses & Range
    // =========================================================================

    /// A customer's saved delivery addresses.
    pub async fn addresses(&self, customer_id: i64) -> DbResult<Vec<DeliveryAddress>> {
        Ok(sqlx::query_as::<_, DeliveryAddress>(
            r#"
            SELECT id, customer_id, address, city, state, postal_code
            FROM delivery_addresses
            WHERE customer_id = ?1
            ORDER BY id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Saves a delivery address.
    pub async fn add_address(&self, new: &NewDeliveryAddress) -> DbResult<DeliveryAddress> {
        let result = sqlx::query(
            r#"
            INSERT INTO delivery_addresses (customer_id, address, city, state, postal_code)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(new.customer_id)
        .bind(&new.address)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.postal_code)
        .execute(&self.pool)
        .await?;

        Ok(DeliveryAddress {
            id: result.last_insert_rowid(),
            customer_id: new.customer_id,
            address: new.address.clone(),
            city: new.city.clone(),
            state: new.state.clone(),
            postal_code: new.postal_code.clone(),
        })
    }

    /// Whether a postal code is inside the delivery range.
    pub async fn in_range(&self, postal_code: &str) -> DbResult<bool> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT postal_code FROM delivery_ranges WHERE postal_code = ?1")
                .bind(postal_code)
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    /// Adds a postal code to the delivery range.
    pub async fn add_range(&self, postal_code: &str) -> DbResult<()> {
        sqlx::query("INSERT OR IGNORE INTO delivery_ranges (postal_code) VALUES (?1)")
            .bind(postal_code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
