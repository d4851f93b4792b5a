//! # Quick Ticket Repository
//!
//! Quick tickets are the paper stubs taken at the counter: customer,
//! up to three service slots, shared notes. They sit in the outstanding
//! list until converted — exactly once — into detailed tickets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pressline_core::{QuickTicket, QuickTicketItem, MAX_TICKET_TABS};

/// One slot of a new quick ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuickSlot {
    pub ticket_type_id: i64,
    pub pieces: i64,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Fields for creating a quick ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuickTicket {
    pub customer_id: i64,
    pub employee_id: i64,
    pub all_notes: Option<String>,
    pub slots: Vec<NewQuickSlot>,
}

/// A quick ticket with its slots, as listed and as handed to the
/// detailed-ticket composer on conversion.
#[derive(Debug, Clone, Serialize)]
pub struct QuickTicketWithItems {
    #[serde(flatten)]
    pub quick_ticket: QuickTicket,
    pub items: Vec<QuickTicketItem>,
}

const QUICK_TICKET_COLUMNS: &str =
    "id, ticket_number, customer_id, employee_id, converted, all_notes, date_created";

/// Repository for quick tickets.
#[derive(Debug, Clone)]
pub struct QuickTicketRepository {
    pool: SqlitePool,
}

impl QuickTicketRepository {
    pub fn new(pool: SqlitePool) -> Self {
        QuickTicketRepository { pool }
    }

    /// Creates a quick ticket with 1..=3 slots in one transaction.
    pub async fn create(&self, new: &NewQuickTicket) -> DbResult<QuickTicketWithItems> {
        if new.slots.is_empty() || new.slots.len() > MAX_TICKET_TABS {
            return Err(DbError::conflict(format!(
                "quick ticket needs 1 to {} slots, got {}",
                MAX_TICKET_TABS,
                new.slots.len()
            )));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let ticket_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(ticket_number), 0) + 1 FROM quick_tickets")
                .fetch_one(&mut *tx)
                .await?;

        debug!(
            customer_id = new.customer_id,
            ticket_number,
            slots = new.slots.len(),
            "Creating quick ticket"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO quick_tickets (ticket_number, customer_id, employee_id, converted, all_notes, date_created)
            VALUES (?1, ?2, ?3, 0, ?4, ?5)
            "#,
        )
        .bind(ticket_number)
        .bind(new.customer_id)
        .bind(new.employee_id)
        .bind(&new.all_notes)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let quick_ticket_id = result.last_insert_rowid();

        for (index, slot) in new.slots.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO quick_ticket_items (quick_ticket_id, slot, ticket_type_id, pieces, due_date, notes)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(quick_ticket_id)
            .bind((index + 1) as i64)
            .bind(slot.ticket_type_id)
            .bind(slot.pieces)
            .bind(slot.due_date)
            .bind(&slot.notes)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(quick_ticket_id)
            .await?
            .ok_or_else(|| DbError::not_found("QuickTicket", quick_ticket_id))
    }

    /// Gets a quick ticket with its slots.
    pub async fn get(&self, id: i64) -> DbResult<Option<QuickTicketWithItems>> {
        let quick_ticket = sqlx::query_as::<_, QuickTicket>(&format!(
            "SELECT {QUICK_TICKET_COLUMNS} FROM quick_tickets WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(quick_ticket) = quick_ticket else {
            return Ok(None);
        };

        let items = self.items(id).await?;
        Ok(Some(QuickTicketWithItems {
            quick_ticket,
            items,
        }))
    }

    /// Slots of a quick ticket, in slot order.
    pub async fn items(&self, quick_ticket_id: i64) -> DbResult<Vec<QuickTicketItem>> {
        Ok(sqlx::query_as::<_, QuickTicketItem>(
            r#"
            SELECT quick_ticket_id, slot, ticket_type_id, pieces, due_date, notes
            FROM quick_ticket_items
            WHERE quick_ticket_id = ?1
            ORDER BY slot
            "#,
        )
        .bind(quick_ticket_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Outstanding (not yet converted) quick tickets for a customer,
    /// oldest first.
    pub async fn outstanding(&self, customer_id: i64) -> DbResult<Vec<QuickTicketWithItems>> {
        let quick_tickets = sqlx::query_as::<_, QuickTicket>(&format!(
            r#"
            SELECT {QUICK_TICKET_COLUMNS} FROM quick_tickets
            WHERE customer_id = ?1 AND converted = 0
            ORDER BY id
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(quick_tickets.len());
        for quick_ticket in quick_tickets {
            let items = self.items(quick_ticket.id).await?;
            out.push(QuickTicketWithItems {
                quick_ticket,
                items,
            });
        }
        Ok(out)
    }

    /// Flips `converted` 0→1 and returns the slots for detailed-ticket
    /// composition.
    ///
    /// The guarded UPDATE makes conversion one-shot: a second attempt
    /// affects no rows and reports a conflict.
    pub async fn convert(&self, id: i64) -> DbResult<Vec<QuickTicketItem>> {
        let result =
            sqlx::query("UPDATE quick_tickets SET converted = 1 WHERE id = ?1 AND converted = 0")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            // Either missing or already converted; look to tell apart.
            return match self.get(id).await? {
                Some(_) => Err(DbError::conflict(format!(
                    "quick ticket {id} has already been converted"
                ))),
                None => Err(DbError::not_found("QuickTicket", id)),
            };
        }

        debug!(quick_ticket_id = id, "Quick ticket converted");
        self.items(id).await
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
    use crate::repository::employee::NewEmployee;

    struct Fixture {
        db: Database,
        customer_id: i64,
        employee_id: i64,
        ticket_type_id: i64,
    }

    async fn fixture() -> Fixture {
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
        let employee = db
            .employees()
            .create(&NewEmployee {
                employee_name: "maria".into(),
                password_hash: "hash".into(),
                display_name: "Maria".into(),
                phone_number: None,
                email: None,
            })
            .await
            .unwrap();
        let ticket_type = db
            .catalog()
            .create_ticket_type("Wash & Fold", &Default::default())
            .await
            .unwrap();

        Fixture {
            db,
            customer_id: customer.id,
            employee_id: employee.id,
            ticket_type_id: ticket_type.id,
        }
    }

    fn new_quick(fx: &Fixture, slots: usize) -> NewQuickTicket {
        NewQuickTicket {
            customer_id: fx.customer_id,
            employee_id: fx.employee_id,
            all_notes: Some("rush order".into()),
            slots: (0..slots)
                .map(|i| NewQuickSlot {
                    ticket_type_id: fx.ticket_type_id,
                    pieces: (i + 1) as i64,
                    due_date: Utc::now(),
                    notes: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_with_slots() {
        let fx = fixture().await;
        let created = fx.db.quick_tickets().create(&new_quick(&fx, 2)).await.unwrap();

        assert!(!created.quick_ticket.converted);
        assert_eq!(created.items.len(), 2);
        assert_eq!(created.items[0].slot, 1);
        assert_eq!(created.items[1].slot, 2);
    }

    #[tokio::test]
    async fn test_slot_count_bounds() {
        let fx = fixture().await;

        let none = fx.db.quick_tickets().create(&new_quick(&fx, 0)).await;
        assert!(matches!(none, Err(DbError::Conflict(_))));

        let four = fx.db.quick_tickets().create(&new_quick(&fx, 4)).await;
        assert!(matches!(four, Err(DbError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_convert_is_one_shot() {
        let fx = fixture().await;
        let created = fx.db.quick_tickets().create(&new_quick(&fx, 3)).await.unwrap();
        let id = created.quick_ticket.id;

        let items = fx.db.quick_tickets().convert(id).await.unwrap();
        assert_eq!(items.len(), 3);

        // Converted tickets leave the outstanding list
        let outstanding = fx
            .db
            .quick_tickets()
            .outstanding(fx.customer_id)
            .await
            .unwrap();
        assert!(outstanding.is_empty());

        // Second conversion is rejected
        let err = fx.db.quick_tickets().convert(id).await;
        assert!(matches!(err, Err(DbError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_convert_missing_is_not_found() {
        let fx = fixture().await;
        let err = fx.db.quick_tickets().convert(999).await;
        assert!(matches!(err, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_outstanding_ordering() {
        let fx = fixture().await;
        let first = fx.db.quick_tickets().create(&new_quick(&fx, 1)).await.unwrap();
        let second = fx.db.quick_tickets().create(&new_quick(&fx, 1)).await.unwrap();

        assert_eq!(
            second.quick_ticket.ticket_number,
            first.quick_ticket.ticket_number + 1
        );

        let outstanding = fx
            .db
            .quick_tickets()
            .outstanding(fx.customer_id)
            .await
            .unwrap();
        assert_eq!(outstanding.len(), 2);
        assert_eq!(outstanding[0].quick_ticket.id, first.quick_ticket.id);
    }
}
