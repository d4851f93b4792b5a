//! # Notification Repository
//!
//! Customer-scoped notifications with a read/unread flag, plus the
//! canned event messages the rest of the system emits.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use pressline_core::{DeliveryStatus, Notification};

const NOTIFICATION_COLUMNS: &str = "id, customer_id, kind, message, is_read, created_at";

/// Repository for notifications.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Creates a notification.
    pub async fn create(&self, customer_id: i64, kind: &str, message: &str) -> DbResult<Notification> {
        let now = Utc::now();
        debug!(customer_id, kind, "Creating notification");

        let result = sqlx::query(
            r#"
            INSERT INTO notifications (customer_id, kind, message, is_read, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            "#,
        )
        .bind(customer_id)
        .bind(kind)
        .bind(message)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Notification {
            id: result.last_insert_rowid(),
            customer_id,
            kind: kind.to_string(),
            message: message.to_string(),
            is_read: false,
            created_at: now,
        })
    }

    /// Lists a customer's notifications, newest first, optionally
    /// filtered by read state.
    pub async fn list(
        &self,
        customer_id: i64,
        is_read: Option<bool>,
    ) -> DbResult<Vec<Notification>> {
        let notifications = match is_read {
            Some(flag) => {
                sqlx::query_as::<_, Notification>(&format!(
                    r#"
                    SELECT {NOTIFICATION_COLUMNS} FROM notifications
                    WHERE customer_id = ?1 AND is_read = ?2
                    ORDER BY created_at DESC, id DESC
                    "#
                ))
                .bind(customer_id)
                .bind(flag)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Notification>(&format!(
                    r#"
                    SELECT {NOTIFICATION_COLUMNS} FROM notifications
                    WHERE customer_id = ?1
                    ORDER BY created_at DESC, id DESC
                    "#
                ))
                .bind(customer_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(notifications)
    }

    /// Marks all of a customer's notifications read.
    pub async fn mark_all_read(&self, customer_id: i64) -> DbResult<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE customer_id = ?1")
                .bind(customer_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Canned Events
    // =========================================================================

    /// Order is ready for pickup.
    pub async fn notify_order_ready(&self, customer_id: i64) -> DbResult<Notification> {
        self.create(
            customer_id,
            "Order Ready",
            "Your order is ready for pickup!",
        )
        .await
    }

    /// Monthly bill is ready to be paid.
    pub async fn notify_monthly_bill_ready(&self, customer_id: i64) -> DbResult<Notification> {
        self.create(
            customer_id,
            "Monthly Bill",
            "Your monthly bill is ready for payment.",
        )
        .await
    }

    /// Delivery status changed.
    pub async fn notify_delivery_status(
        &self,
        customer_id: i64,
        status: DeliveryStatus,
    ) -> DbResult<Notification> {
        let message = match status {
            DeliveryStatus::OutForDelivery => "Your delivery is on its way!",
            DeliveryStatus::Delivered => "Your delivery has been dropped off!",
            DeliveryStatus::Cancelled => "Your delivery has been cancelled.",
            DeliveryStatus::Pending => "Your delivery request has been received.",
        };
        self.create(customer_id, "Delivery Update", message).await
    }

    /// Account information changed.
    pub async fn notify_account_change(&self, customer_id: i64) -> DbResult<Notification> {
        self.create(
            customer_id,
            "Account Update",
            "Your account information has been updated.",
        )
        .await
    }

    /// New message from an employee.
    pub async fn notify_new_message(&self, customer_id: i64) -> DbResult<Notification> {
        self.create(
            customer_id,
            "New Message",
            "You have a new message from our team.",
        )
        .await
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
    async fn test_create_and_filter_by_read_state() {
        let (db, customer_id) = db_with_customer().await;

        db.notifications()
            .notify_order_ready(customer_id)
            .await
            .unwrap();
        db.notifications()
            .notify_monthly_bill_ready(customer_id)
            .await
            .unwrap();

        let unread = db
            .notifications()
            .list(customer_id, Some(false))
            .await
            .unwrap();
        assert_eq!(unread.len(), 2);

        let marked = db.notifications().mark_all_read(customer_id).await.unwrap();
        assert_eq!(marked, 2);

        let unread = db
            .notifications()
            .list(customer_id, Some(false))
            .await
            .unwrap();
        assert!(unread.is_empty());

        let read = db
            .notifications()
            .list(customer_id, Some(true))
            .await
            .unwrap();
        assert_eq!(read.len(), 2);
    }

    #[tokio::test]
    async fn test_delivery_status_messages() {
        let (db, customer_id) = db_with_customer().await;

        let n = db
            .notifications()
            .notify_delivery_status(customer_id, DeliveryStatus::OutForDelivery)
            .await
            .unwrap();
        assert_eq!(n.kind, "Delivery Update");
        assert!(n.message.contains("on its way"));
    }
}
