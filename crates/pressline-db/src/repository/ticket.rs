//! # Ticket Repository
//!
//! Database operations for detailed tickets.
//!
//! ## Ticket Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Ticket Lifecycle                                  │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create_from_draft() → ticket + line items + modifier links     │
//! │         (one transaction; totals are computed by the core crate        │
//! │          before anything is written)                                   │
//! │                                                                         │
//! │  2. PAY                                                                │
//! │     └── apply_allocations() / pay_in_full()                            │
//! │         payment_cents climbs toward total_price_cents, never past it   │
//! │                                                                         │
//! │  3. PICK UP                                                            │
//! │     └── mark_picked_up() — independent of payment state                │
//! │                                                                         │
//! │  4. DELIVER (optional)                                                 │
//! │     └── set_delivery_status()                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pressline_core::payment::{Allocation, OutstandingTicket};
use pressline_core::ticket::{LineModifiers, TicketDraft, TicketTotals};
use pressline_core::{DeliveryStatus, Ticket, TicketGarment};

const TICKET_COLUMNS: &str = "id, customer_id, ticket_type_id, employee_id, ticket_number, \
     total_price_cents, payment_cents, picked_up, pieces, notes, all_notes, delivery_status, \
     date_created, date_due";

/// Optional filters for ticket listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFilter {
    pub customer_id: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub delivery_status: Option<DeliveryStatus>,
    pub ticket_type_id: Option<i64>,
}

/// One page of a ticket listing, with pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub current_page: i64,
    pub per_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

/// Mutable ticket header fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTicket {
    pub ticket_type_id: i64,
    pub date_due: DateTime<Utc>,
    pub notes: Option<String>,
    pub all_notes: Option<String>,
    pub delivery_status: DeliveryStatus,
}

/// Repository for ticket database operations.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    /// Creates a new TicketRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TicketRepository { pool }
    }

    /// Creates one ticket from a composed draft, writing the header,
    /// line items, and per-line modifier links in a single transaction.
    ///
    /// The caller computes `totals` through the core crate so the stored
    /// total always satisfies the composition contract.
    pub async fn create_from_draft(
        &self,
        customer_id: i64,
        employee_id: i64,
        draft: &TicketDraft,
        totals: &TicketTotals,
        all_notes: Option<&str>,
    ) -> DbResult<Ticket> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Ticket numbers are allocated inside the transaction so two
        // concurrent creations cannot collide.
        let ticket_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(ticket_number), 0) + 1 FROM tickets")
                .fetch_one(&mut *tx)
                .await?;

        debug!(
            customer_id,
            ticket_number,
            total_cents = totals.total_cents,
            "Creating ticket"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO tickets (
                customer_id, ticket_type_id, employee_id, ticket_number,
                total_price_cents, payment_cents, picked_up, pieces,
                notes, all_notes, delivery_status, date_created, date_due
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, ?7, ?8, 'pending', ?9, ?10)
            "#,
        )
        .bind(customer_id)
        .bind(draft.ticket_type_id)
        .bind(employee_id)
        .bind(ticket_number)
        .bind(totals.total_cents)
        .bind(draft.pieces)
        .bind(&draft.notes)
        .bind(all_notes)
        .bind(now)
        .bind(draft.due_date)
        .execute(&mut *tx)
        .await?;

        let ticket_id = result.last_insert_rowid();

        for line in &draft.lines {
            let line_result = sqlx::query(
                r#"
                INSERT INTO ticket_garments (ticket_id, garment_variant_id, quantity, price_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(ticket_id)
            .bind(line.garment_variant_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .execute(&mut *tx)
            .await?;

            let line_id = line_result.last_insert_rowid();

            for color_id in &line.modifiers.color_ids {
                sqlx::query(
                    "INSERT INTO ticket_garment_colors (ticket_garment_id, color_id) VALUES (?1, ?2)",
                )
                .bind(line_id)
                .bind(color_id)
                .execute(&mut *tx)
                .await?;
            }
            for pattern_id in &line.modifiers.pattern_ids {
                sqlx::query(
                    "INSERT INTO ticket_garment_patterns (ticket_garment_id, pattern_id) VALUES (?1, ?2)",
                )
                .bind(line_id)
                .bind(pattern_id)
                .execute(&mut *tx)
                .await?;
            }
            for texture_id in &line.modifiers.texture_ids {
                sqlx::query(
                    "INSERT INTO ticket_garment_textures (ticket_garment_id, texture_id) VALUES (?1, ?2)",
                )
                .bind(line_id)
                .bind(texture_id)
                .execute(&mut *tx)
                .await?;
            }
            for upcharge_id in &line.modifiers.upcharge_ids {
                sqlx::query(
                    "INSERT INTO ticket_garment_upcharges (ticket_garment_id, upcharge_id) VALUES (?1, ?2)",
                )
                .bind(line_id)
                .bind(upcharge_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get_by_id(ticket_id)
            .await?
            .ok_or_else(|| DbError::not_found("Ticket", ticket_id))
    }

    /// Gets a ticket by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Ticket>> {
        Ok(sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Gets a ticket by its human-facing number.
    pub async fn get_by_number(&self, ticket_number: i64) -> DbResult<Option<Ticket>> {
        Ok(sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_number = ?1"
        ))
        .bind(ticket_number)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Lists tickets with optional filters and pagination.
    pub async fn list(&self, filter: &TicketFilter, page: i64, per_page: i64) -> DbResult<TicketPage> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let mut qb = sqlx::QueryBuilder::new(format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE 1=1"
        ));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY date_created DESC LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind((page - 1) * per_page);

        let tickets = qb
            .build_query_as::<Ticket>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_qb =
            sqlx::QueryBuilder::new("SELECT COUNT(*) FROM tickets WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total_items: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(TicketPage {
            tickets,
            current_page: page,
            per_page,
            total_pages: (total_items + per_page - 1) / per_page,
            total_items,
        })
    }

    fn push_filters<'a>(
        qb: &mut sqlx::QueryBuilder<'a, sqlx::Sqlite>,
        filter: &'a TicketFilter,
    ) {
        if let Some(customer_id) = filter.customer_id {
            qb.push(" AND customer_id = ").push_bind(customer_id);
        }
        if let Some(start) = filter.start_date {
            qb.push(" AND date_created >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND date_created <= ").push_bind(end);
        }
        if let Some(status) = filter.delivery_status {
            qb.push(" AND delivery_status = ").push_bind(status);
        }
        if let Some(ticket_type_id) = filter.ticket_type_id {
            qb.push(" AND ticket_type_id = ").push_bind(ticket_type_id);
        }
    }

    /// All tickets for one customer, oldest first.
    pub async fn list_for_customer(&self, customer_id: i64) -> DbResult<Vec<Ticket>> {
        Ok(sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE customer_id = ?1 ORDER BY id"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Line items for a ticket.
    pub async fn lines(&self, ticket_id: i64) -> DbResult<Vec<TicketGarment>> {
        Ok(sqlx::query_as::<_, TicketGarment>(
            r#"
            SELECT id, ticket_id, garment_variant_id, quantity, price_cents
            FROM ticket_garments
            WHERE ticket_id = ?1
            ORDER BY id
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Modifier selections for one line item.
    pub async fn line_modifiers(&self, ticket_garment_id: i64) -> DbResult<LineModifiers> {
        let color_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT color_id FROM ticket_garment_colors WHERE ticket_garment_id = ?1",
        )
        .bind(ticket_garment_id)
        .fetch_all(&self.pool)
        .await?;

        let pattern_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT pattern_id FROM ticket_garment_patterns WHERE ticket_garment_id = ?1",
        )
        .bind(ticket_garment_id)
        .fetch_all(&self.pool)
        .await?;

        let texture_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT texture_id FROM ticket_garment_textures WHERE ticket_garment_id = ?1",
        )
        .bind(ticket_garment_id)
        .fetch_all(&self.pool)
        .await?;

        let upcharge_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT upcharge_id FROM ticket_garment_upcharges WHERE ticket_garment_id = ?1",
        )
        .bind(ticket_garment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(LineModifiers {
            color_ids,
            pattern_ids,
            texture_ids,
            upcharge_ids,
        })
    }

    /// Updates a ticket's header fields.
    pub async fn update(&self, id: i64, update: &UpdateTicket) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET ticket_type_id = ?2, date_due = ?3, notes = ?4, all_notes = ?5,
                delivery_status = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.ticket_type_id)
        .bind(update.date_due)
        .bind(&update.notes)
        .bind(&update.all_notes)
        .bind(update.delivery_status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ticket", id));
        }

        Ok(())
    }

    /// Deletes a ticket; line items cascade.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ticket", id));
        }

        Ok(())
    }

    // =========================================================================
    // Balances & Payments
    // =========================================================================

    /// Unpaid, not-yet-picked-up tickets in creation order, the shape
    /// the payment allocator consumes.
    pub async fn outstanding_for_customer(
        &self,
        customer_id: i64,
    ) -> DbResult<Vec<OutstandingTicket>> {
        let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT id, total_price_cents, payment_cents
            FROM tickets
            WHERE customer_id = ?1 AND picked_up = 0 AND total_price_cents > payment_cents
            ORDER BY id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(ticket_id, total_price_cents, payment_cents)| OutstandingTicket {
                ticket_id,
                total_price_cents,
                payment_cents,
            })
            .collect())
    }

    /// Sum of unpaid balances for one customer.
    pub async fn outstanding_balance(&self, customer_id: i64) -> DbResult<i64> {
        let balance: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_price_cents - payment_cents), 0)
            FROM tickets
            WHERE customer_id = ?1 AND picked_up = 0 AND total_price_cents > payment_cents
            "#,
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    /// Writes a computed allocation back in one transaction.
    ///
    /// The allocator already clamps every new payment at the ticket
    /// total, so this is a plain column update per ticket.
    pub async fn apply_allocations(&self, allocations: &[Allocation]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        for allocation in allocations {
            debug!(
                ticket_id = allocation.ticket_id,
                applied_cents = allocation.applied_cents,
                "Applying payment allocation"
            );

            let result = sqlx::query(
                "UPDATE tickets SET payment_cents = ?2 WHERE id = ?1 AND payment_cents < ?2",
            )
            .bind(allocation.ticket_id)
            .bind(allocation.new_payment_cents)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::conflict(format!(
                    "ticket {} changed while applying payment",
                    allocation.ticket_id
                )));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Settles one ticket in full for a specific customer.
    pub async fn pay_in_full(&self, ticket_id: i64, customer_id: i64) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET payment_cents = total_price_cents
            WHERE id = ?1 AND customer_id = ?2 AND picked_up = 0
              AND payment_cents < total_price_cents
            "#,
        )
        .bind(ticket_id)
        .bind(customer_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ticket (unpaid)", ticket_id));
        }

        Ok(())
    }

    /// Marks tickets picked up. Pickup is independent of payment state.
    pub async fn mark_picked_up(&self, ticket_ids: &[i64]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        for ticket_id in ticket_ids {
            sqlx::query("UPDATE tickets SET picked_up = 1 WHERE id = ?1")
                .bind(ticket_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Tickets with any payment recorded, newest first.
    pub async fn billing_statements(&self, customer_id: i64) -> DbResult<Vec<Ticket>> {
        Ok(sqlx::query_as::<_, Ticket>(&format!(
            r#"
            SELECT {TICKET_COLUMNS} FROM tickets
            WHERE customer_id = ?1 AND payment_cents > 0
            ORDER BY date_created DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // =========================================================================
    // Delivery Status
    // =========================================================================

    /// Reads a ticket's delivery status.
    pub async fn delivery_status(&self, ticket_id: i64) -> DbResult<Option<DeliveryStatus>> {
        Ok(
            sqlx::query_scalar("SELECT delivery_status FROM tickets WHERE id = ?1")
                .bind(ticket_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Updates a ticket's delivery status.
    pub async fn set_delivery_status(
        &self,
        ticket_id: i64,
        status: DeliveryStatus,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE tickets SET delivery_status = ?2 WHERE id = ?1")
            .bind(ticket_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ticket", ticket_id));
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
    use crate::repository::employee::NewEmployee;
    use pressline_core::money::FLAT_TAX;
    use pressline_core::payment::allocate;
    use pressline_core::Money;

    struct Fixture {
        db: Database,
        customer_id: i64,
        employee_id: i64,
        variant_id: i64,
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

        let garment = db.catalog().create_garment("Shirt").await.unwrap();
        let variant = db
            .catalog()
            .create_variant(garment.id, "Long Sleeve", 299)
            .await
            .unwrap();
        let ticket_type = db
            .catalog()
            .create_ticket_type("Dry Clean", &Default::default())
            .await
            .unwrap();

        Fixture {
            db,
            customer_id: customer.id,
            employee_id: employee.id,
            variant_id: variant.id,
            ticket_type_id: ticket_type.id,
        }
    }

    fn draft(fx: &Fixture, quantity: i64) -> (TicketDraft, TicketTotals) {
        let mut draft = TicketDraft::new(fx.ticket_type_id, quantity, Utc::now());
        draft
            .add_line(fx.variant_id, "Long Sleeve", Money::from_cents(299), quantity)
            .unwrap();
        let totals = draft.totals(FLAT_TAX, Money::zero());
        (draft, totals)
    }

    async fn create_ticket(fx: &Fixture, quantity: i64) -> Ticket {
        let (d, totals) = draft(fx, quantity);
        fx.db
            .tickets()
            .create_from_draft(fx.customer_id, fx.employee_id, &d, &totals, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_stores_totals_and_lines() {
        let fx = fixture().await;
        let ticket = create_ticket(&fx, 3).await;

        // 3 × 299 = 897, +10% tax (90) = 987
        assert_eq!(ticket.total_price_cents, 987);
        assert_eq!(ticket.payment_cents, 0);
        assert_eq!(ticket.ticket_number, 1);

        let lines = fx.db.tickets().lines(ticket.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].price_cents, 299);
    }

    #[tokio::test]
    async fn test_ticket_numbers_increment() {
        let fx = fixture().await;
        let first = create_ticket(&fx, 1).await;
        let second = create_ticket(&fx, 1).await;

        assert_eq!(second.ticket_number, first.ticket_number + 1);
    }

    #[tokio::test]
    async fn test_line_modifiers_round_trip() {
        let fx = fixture().await;
        let white = fx.db.catalog().create_color("White", "#fff").await.unwrap();
        let starch = fx
            .db
            .catalog()
            .create_upcharge("Heavy starch", 150)
            .await
            .unwrap();

        let mut d = TicketDraft::new(fx.ticket_type_id, 1, Utc::now());
        d.add_line(fx.variant_id, "Long Sleeve", Money::from_cents(299), 1)
            .unwrap();
        d.attach_modifiers(
            0,
            LineModifiers {
                color_ids: vec![white.id],
                upcharge_ids: vec![starch.id],
                ..Default::default()
            },
        )
        .unwrap();
        let totals = d.totals(FLAT_TAX, Money::zero());

        let ticket = fx
            .db
            .tickets()
            .create_from_draft(fx.customer_id, fx.employee_id, &d, &totals, None)
            .await
            .unwrap();

        // Upcharge attached but not priced into the total
        assert_eq!(ticket.total_price_cents, 299 + 30);

        let lines = fx.db.tickets().lines(ticket.id).await.unwrap();
        let modifiers = fx.db.tickets().line_modifiers(lines[0].id).await.unwrap();
        assert_eq!(modifiers.color_ids, vec![white.id]);
        assert_eq!(modifiers.upcharge_ids, vec![starch.id]);
        assert!(modifiers.pattern_ids.is_empty());
    }

    #[tokio::test]
    async fn test_allocation_scenario_end_to_end() {
        let fx = fixture().await;

        // Two tickets: totals 987 and 1645 (3 and 5 shirts)
        let first = create_ticket(&fx, 3).await;
        let second = create_ticket(&fx, 5).await;

        let outstanding = fx
            .db
            .tickets()
            .outstanding_for_customer(fx.customer_id)
            .await
            .unwrap();
        assert_eq!(outstanding.len(), 2);
        assert_eq!(outstanding[0].ticket_id, first.id);

        // Pay 1200: first fully settled (987), 213 onto the second
        let outcome = allocate(Money::from_cents(1200), &outstanding).unwrap();
        fx.db
            .tickets()
            .apply_allocations(&outcome.allocations)
            .await
            .unwrap();

        let first = fx.db.tickets().get_by_id(first.id).await.unwrap().unwrap();
        let second = fx.db.tickets().get_by_id(second.id).await.unwrap().unwrap();
        assert!(first.is_paid());
        assert_eq!(second.payment_cents, 213);
        assert!(!second.is_paid());

        let balance = fx
            .db
            .tickets()
            .outstanding_balance(fx.customer_id)
            .await
            .unwrap();
        assert_eq!(balance, second.total_price_cents - 213);
    }

    #[tokio::test]
    async fn test_pay_in_full_and_reject_double_pay() {
        let fx = fixture().await;
        let ticket = create_ticket(&fx, 2).await;

        fx.db
            .tickets()
            .pay_in_full(ticket.id, fx.customer_id)
            .await
            .unwrap();

        let paid = fx.db.tickets().get_by_id(ticket.id).await.unwrap().unwrap();
        assert!(paid.is_paid());

        let err = fx.db.tickets().pay_in_full(ticket.id, fx.customer_id).await;
        assert!(matches!(err, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_picked_up_tickets_leave_balance() {
        let fx = fixture().await;
        let ticket = create_ticket(&fx, 2).await;

        fx.db.tickets().mark_picked_up(&[ticket.id]).await.unwrap();

        let outstanding = fx
            .db
            .tickets()
            .outstanding_for_customer(fx.customer_id)
            .await
            .unwrap();
        assert!(outstanding.is_empty());
        assert_eq!(
            fx.db
                .tickets()
                .outstanding_balance(fx.customer_id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_list_filters_and_pagination() {
        let fx = fixture().await;
        for _ in 0..3 {
            create_ticket(&fx, 1).await;
        }

        let filter = TicketFilter {
            customer_id: Some(fx.customer_id),
            ..Default::default()
        };
        let page = fx.db.tickets().list(&filter, 1, 2).await.unwrap();
        assert_eq!(page.tickets.len(), 2);
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);

        let other = TicketFilter {
            customer_id: Some(fx.customer_id + 99),
            ..Default::default()
        };
        let empty = fx.db.tickets().list(&other, 1, 10).await.unwrap();
        assert_eq!(empty.total_items, 0);
    }

    #[tokio::test]
    async fn test_customer_delete_reports_outstanding_tickets() {
        let fx = fixture().await;
        let ticket = create_ticket(&fx, 2).await;

        // Deletion goes through, reporting the open ticket it dropped
        let outstanding = fx.db.customers().delete(fx.customer_id).await.unwrap();
        assert_eq!(outstanding, 1);
        assert!(fx.db.tickets().get_by_id(ticket.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delivery_status_round_trip() {
        let fx = fixture().await;
        let ticket = create_ticket(&fx, 1).await;

        assert_eq!(
            fx.db.tickets().delivery_status(ticket.id).await.unwrap(),
            Some(DeliveryStatus::Pending)
        );

        fx.db
            .tickets()
            .set_delivery_status(ticket.id, DeliveryStatus::OutForDelivery)
            .await
            .unwrap();

        assert_eq!(
            fx.db.tickets().delivery_status(ticket.id).await.unwrap(),
            Some(DeliveryStatus::OutForDelivery)
        );
    }
}
